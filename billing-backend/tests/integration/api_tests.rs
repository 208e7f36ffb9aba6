// tests/integration/api_tests.rs

use axum::http::StatusCode;
use billing_backend::repository::user_subscription_repository::UserSubscriptionRepository;
use chrono::Duration;
use serde_json::json;
use tower::ServiceExt;

use crate::common::app_helper::setup_app;
use crate::common::request::{get_request, json_request, read_json};
use crate::common::test_data::{base_time, create_fixture, create_user};

#[tokio::test]
async fn test_health() {
    let (app, _clock, _db) = setup_app().await;

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn test_purchase_returns_user_subscription() {
    let (app, _clock, db) = setup_app().await;
    let fixture = create_fixture(&db.connection, 500, 200, 30, 30).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/v1/users/{}/subscriptions", fixture.user.id),
            &json!({
                "subscription_id": fixture.plan.id,
                "account_id": fixture.account.id,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], true);
    assert_eq!(body["renewal"], true);
    assert_eq!(body["trial"], false);
    assert_eq!(body["user_subscription"]["id"], fixture.plan.id);
    assert_eq!(body["user_subscription"]["price"], 200);
    assert_eq!(body["user_subscription"]["period"], 30);
    assert_eq!(body["user_subscription"]["cashback"], 30);
    assert!(body["user_subscription"]["trial"].is_null());
    assert_eq!(body["user_subscription"]["service"]["name"], "Music");
    assert!(body["access_code"].is_null());

    let end: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(body["end"].clone()).unwrap();
    assert_eq!(end, base_time() + Duration::days(30));
}

#[tokio::test]
async fn test_purchase_with_insufficient_funds() {
    let (app, _clock, db) = setup_app().await;
    let fixture = create_fixture(&db.connection, 100, 150, 30, 0).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/v1/users/{}/subscriptions", fixture.user.id),
            &json!({
                "subscription_id": fixture.plan.id,
                "account_id": fixture.account.id,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Insufficient funds on the account");
    assert_eq!(body["details"]["balance"], 100);
    assert_eq!(body["details"]["price"], 150);
}

#[tokio::test]
async fn test_purchase_not_found_cases() {
    let (app, _clock, db) = setup_app().await;
    let fixture = create_fixture(&db.connection, 500, 200, 30, 0).await;

    let unknown_user = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/users/999999/subscriptions",
            &json!({
                "subscription_id": fixture.plan.id,
                "account_id": fixture.account.id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown_user.status(), StatusCode::NOT_FOUND);

    let unknown_plan = app
        .oneshot(json_request(
            "POST",
            &format!("/v1/users/{}/subscriptions", fixture.user.id),
            &json!({
                "subscription_id": 999999,
                "account_id": fixture.account.id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown_plan.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_purchase_validation_errors() {
    let (app, _clock, db) = setup_app().await;
    let fixture = create_fixture(&db.connection, 500, 200, 30, 0).await;
    let uri = format!("/v1/users/{}/subscriptions", fixture.user.id);

    let zero_ids = app
        .clone()
        .oneshot(json_request(
            "POST",
            &uri,
            &json!({ "subscription_id": 0, "account_id": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(zero_ids.status(), StatusCode::BAD_REQUEST);
    let body = read_json(zero_ids).await;
    assert_eq!(body["error_type"], "validation_errors");
    assert!(body["validation_errors"]["subscription_id"].is_array());

    let missing_field = app
        .clone()
        .oneshot(json_request("POST", &uri, &json!({ "subscription_id": 1 })))
        .await
        .unwrap();
    assert_eq!(missing_field.status(), StatusCode::BAD_REQUEST);

    let bad_path = app
        .oneshot(json_request(
            "POST",
            "/v1/users/abc/subscriptions",
            &json!({ "subscription_id": 1, "account_id": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(bad_path.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_subscription_read_endpoints() {
    let (app, clock, db) = setup_app().await;
    let fixture = create_fixture(&db.connection, 1000, 200, 30, 0).await;
    let purchase_uri = format!("/v1/users/{}/subscriptions", fixture.user.id);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &purchase_uri,
            &json!({
                "subscription_id": fixture.plan.id,
                "account_id": fixture.account.id,
            }),
        ))
        .await
        .unwrap();
    let purchased = read_json(response).await;
    let subscription_id = purchased["id"].as_i64().unwrap();
    clock.advance(Duration::days(1));

    // メインページは {"user_subscription": {...}} でラップされる
    let main_page = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/users/{}/main_page",
            fixture.user.id
        )))
        .await
        .unwrap();
    assert_eq!(main_page.status(), StatusCode::OK);
    let body = read_json(main_page).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["user_subscription"]["id"], subscription_id);
    assert_eq!(body[0]["user_subscription"]["activation"], true);

    let active = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/users/{}/subscriptions/active",
            fixture.user.id
        )))
        .await
        .unwrap();
    assert_eq!(read_json(active).await.as_array().unwrap().len(), 1);

    let inactive = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/users/{}/subscriptions/inactive",
            fixture.user.id
        )))
        .await
        .unwrap();
    assert!(read_json(inactive).await.as_array().unwrap().is_empty());

    let by_service = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/users/{}/services/{}/subscription",
            fixture.user.id, fixture.service.id
        )))
        .await
        .unwrap();
    assert_eq!(by_service.status(), StatusCode::OK);
    assert_eq!(read_json(by_service).await["id"], subscription_id);

    let payments_plan = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/users/{}/payments_plan",
            fixture.user.id
        )))
        .await
        .unwrap();
    let body = read_json(payments_plan).await;
    assert_eq!(body[0]["user_subscription_cost"], 200);
    assert_eq!(body[0]["service"]["id"], fixture.service.id);

    let renewal_off = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/v1/user_subscriptions/{}/renewal", subscription_id),
            &json!({ "renewal": false }),
        ))
        .await
        .unwrap();
    assert_eq!(renewal_off.status(), StatusCode::OK);
    assert_eq!(read_json(renewal_off).await["renewal"], false);

    let renewal_not_bool = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/v1/user_subscriptions/{}/renewal", subscription_id),
            &json!({ "renewal": "yes" }),
        ))
        .await
        .unwrap();
    assert_eq!(renewal_not_bool.status(), StatusCode::BAD_REQUEST);
    let body = read_json(renewal_not_bool).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "validation_errors");

    UserSubscriptionRepository::new(db.connection.clone())
        .create_access_code(subscription_id, "PROMO-2030", base_time() + Duration::days(30))
        .await
        .unwrap();

    let single = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/user_subscriptions/{}",
            subscription_id
        )))
        .await
        .unwrap();
    let body = read_json(single).await;
    assert_eq!(body["renewal"], false);
    assert_eq!(body["access_code"]["name"], "PROMO-2030");

    let missing = app
        .oneshot(get_request("/v1/user_subscriptions/999999"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_endpoints() {
    let (app, _clock, db) = setup_app().await;
    let fixture = create_fixture(&db.connection, 1000, 200, 30, 25).await;

    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/users/{}/subscriptions", fixture.user.id),
            &json!({
                "subscription_id": fixture.plan.id,
                "account_id": fixture.account.id,
            }),
        ))
        .await
        .unwrap();

    let payments = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/users/{}/payments",
            fixture.user.id
        )))
        .await
        .unwrap();
    assert_eq!(payments.status(), StatusCode::OK);
    let body = read_json(payments).await;
    assert_eq!(body[0]["amount"], 200);
    assert_eq!(body[0]["receipt"], "R000001");
    assert_eq!(body[0]["account"]["account_number"], "AN000001");
    assert_eq!(body[0]["cashback"]["amount"], 25);
    let payment_id = body[0]["id"].as_i64().unwrap();

    let in_period = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/users/{}/payment_history/2030-01-01_2030-01-31",
            fixture.user.id
        )))
        .await
        .unwrap();
    assert_eq!(read_json(in_period).await.as_array().unwrap().len(), 1);

    let bad_period = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/users/{}/payment_history/January",
            fixture.user.id
        )))
        .await
        .unwrap();
    assert_eq!(bad_period.status(), StatusCode::BAD_REQUEST);

    let out_of_range = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/users/{}/payment_history/+262142-12-31_+262142-12-31",
            fixture.user.id
        )))
        .await
        .unwrap();
    assert_eq!(out_of_range.status(), StatusCode::BAD_REQUEST);

    let by_service = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/users/{}/services/{}/payment_history",
            fixture.user.id, fixture.service.id
        )))
        .await
        .unwrap();
    assert_eq!(read_json(by_service).await.as_array().unwrap().len(), 1);

    let by_account = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/accounts/{}/payment_history",
            fixture.account.id
        )))
        .await
        .unwrap();
    assert_eq!(read_json(by_account).await.as_array().unwrap().len(), 1);

    let single = app
        .clone()
        .oneshot(get_request(&format!("/v1/payments/{}", payment_id)))
        .await
        .unwrap();
    assert_eq!(single.status(), StatusCode::OK);

    let missing = app
        .oneshot(get_request("/v1/payments/999999"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_and_rules_endpoints() {
    let (app, _clock, db) = setup_app().await;
    let fixture = create_fixture(&db.connection, 0, 200, 30, 10).await;

    let available = app
        .clone()
        .oneshot(get_request("/v1/services/available"))
        .await
        .unwrap();
    assert_eq!(available.status(), StatusCode::OK);
    let body = read_json(available).await;
    assert_eq!(body[0]["service_id"], fixture.service.id);
    assert_eq!(body[0]["min_subscription_cost"], 200);
    assert_eq!(body[0]["category_name"], "Entertainment");
    assert!(body[0].get("trial_period_days").is_none());

    let rules = app.oneshot(get_request("/v1/rules")).await.unwrap();
    assert_eq!(rules.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_account_endpoints() {
    let (app, _clock, db) = setup_app().await;
    let fixture = create_fixture(&db.connection, 300, 200, 30, 0).await;

    let opened = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/v1/users/{}/accounts", fixture.user.id),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(opened.status(), StatusCode::CREATED);
    let body = read_json(opened).await;
    assert_eq!(body["account_number"], "AN000002");
    assert_eq!(body["balance"], 0);

    let accounts = app
        .clone()
        .oneshot(get_request(&format!(
            "/v1/users/{}/accounts",
            fixture.user.id
        )))
        .await
        .unwrap();
    let body = read_json(accounts).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["balance"], 300);
    let unlinked = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!(
                "/v1/users/{}/accounts/{}",
                fixture.user.id, fixture.account.id
            ),
            &json!({ "account_status": "unlinked" }),
        ))
        .await
        .unwrap();
    assert_eq!(unlinked.status(), StatusCode::OK);
    let body = read_json(unlinked).await;
    assert_eq!(body["id"], fixture.account.id);
    assert_eq!(body["account_status"], "unlinked");
    assert_eq!(body["balance"], 300);

    let other = create_user(&db.connection).await;
    let foreign = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/v1/users/{}/accounts/{}", other.id, fixture.account.id),
            &json!({ "account_status": "linked" }),
        ))
        .await
        .unwrap();
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let empty_status = app
        .oneshot(json_request(
            "PATCH",
            &format!(
                "/v1/users/{}/accounts/{}",
                fixture.user.id, fixture.account.id
            ),
            &json!({ "account_status": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(empty_status.status(), StatusCode::BAD_REQUEST);
}
