// tests/integration/payment_tests.rs

use billing_backend::error::AppError;
use billing_backend::repository::document_repository::DocumentRepository;
use billing_backend::service::payment_service::PaymentService;
use billing_backend::service::subscription_lifecycle_service::{
    PurchaseRequest, SubscriptionLifecycleService,
};
use billing_backend::utils::clock::{Clock, ManualClock};
use chrono::Duration;
use std::sync::Arc;

use crate::common::db::TestDatabase;
use crate::common::test_data::{base_time, create_fixture, create_plan, create_service, create_user};

struct PaymentScenario {
    db: TestDatabase,
    user_id: i64,
    account_id: i64,
    music_service_id: i64,
    video_service_id: i64,
}

/// 音楽（2030-01-01）と動画（40日後）を1回ずつ購入した状態
async fn setup_payments() -> PaymentScenario {
    let db = TestDatabase::new().await;
    let fixture = create_fixture(&db.connection, 1000, 200, 30, 20).await;
    let video = create_service(&db.connection, "Video").await;
    let video_plan = create_plan(&db.connection, video.id, 300, 30, 45).await;

    let clock = Arc::new(ManualClock::new(base_time()));
    let shared: Arc<dyn Clock> = clock.clone();
    let lifecycle = SubscriptionLifecycleService::new(db.connection.clone(), shared);

    lifecycle
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: fixture.plan.id,
            account_id: fixture.account.id,
        })
        .await
        .unwrap();

    clock.advance(Duration::days(40));
    lifecycle
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: video_plan.id,
            account_id: fixture.account.id,
        })
        .await
        .unwrap();

    PaymentScenario {
        user_id: fixture.user.id,
        account_id: fixture.account.id,
        music_service_id: fixture.service.id,
        video_service_id: video.id,
        db,
    }
}

#[tokio::test]
async fn test_user_payments_newest_first() {
    let scenario = setup_payments().await;
    let service = PaymentService::new(scenario.db.connection.clone());

    let payments = service.list_for_user(scenario.user_id).await.unwrap();

    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0].service.id, scenario.video_service_id);
    assert_eq!(payments[0].payment.amount, 300);
    assert_eq!(payments[1].service.id, scenario.music_service_id);
    assert_eq!(payments[1].payment.receipt, "R000001");
    assert_eq!(payments[0].payment.receipt, "R000002");

    let cashback = payments[0].cashback.as_ref().unwrap();
    assert_eq!(cashback.amount, 45);
    assert!(!cashback.applied_status);
}

#[tokio::test]
async fn test_payments_filtered_by_service() {
    let scenario = setup_payments().await;
    let service = PaymentService::new(scenario.db.connection.clone());

    let payments = service
        .list_for_user_and_service(scenario.user_id, scenario.music_service_id)
        .await
        .unwrap();

    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].payment.amount, 200);
    assert_eq!(payments[0].account.id, scenario.account_id);
}

#[tokio::test]
async fn test_payments_filtered_by_period() {
    let scenario = setup_payments().await;
    let service = PaymentService::new(scenario.db.connection.clone());

    let january = service
        .list_for_user_in_period(scenario.user_id, "2030-01-01_2030-01-01")
        .await
        .unwrap();
    assert_eq!(january.len(), 1);
    assert_eq!(january[0].service.id, scenario.music_service_id);

    let february = service
        .list_for_user_in_period(scenario.user_id, "2030-02-01_2030-02-28")
        .await
        .unwrap();
    assert_eq!(february.len(), 1);
    assert_eq!(february[0].service.id, scenario.video_service_id);

    let both = service
        .list_for_user_in_period(scenario.user_id, "2029-12-01_2030-03-01")
        .await
        .unwrap();
    assert_eq!(both.len(), 2);

    let malformed = service
        .list_for_user_in_period(scenario.user_id, "2030-01-01")
        .await;
    assert!(matches!(malformed, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_account_payments_and_single_payment() {
    let scenario = setup_payments().await;
    let service = PaymentService::new(scenario.db.connection.clone());

    let payments = service.list_for_account(scenario.account_id).await.unwrap();
    assert_eq!(payments.len(), 2);

    let payment = service.get(payments[1].payment.id).await.unwrap();
    assert_eq!(payment.payment.receipt, "R000001");
    assert_eq!(payment.plan.price, 200);

    assert!(matches!(
        service.get(999_999).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.list_for_account(999_999).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_user_without_accounts_is_not_found() {
    let db = TestDatabase::new().await;
    let user = create_user(&db.connection).await;
    let service = PaymentService::new(db.connection.clone());

    let result = service.list_for_user(user.id).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_rules_and_payment_document() {
    let db = TestDatabase::new().await;
    let service = PaymentService::new(db.connection.clone());

    assert!(matches!(service.rules().await, Err(AppError::NotFound(_))));

    let documents = DocumentRepository::new(db.connection.clone());
    documents.create("Rules v1", "Old rules").await.unwrap();
    let latest = documents.create("Rules v2", "Current rules").await.unwrap();

    let rules = service.rules().await.unwrap();
    assert_eq!(rules.id, latest.id);
    assert_eq!(rules.text, "Current rules");

    // 購入時点の最新規約が支払いに紐づく
    let fixture = create_fixture(&db.connection, 500, 200, 30, 30).await;
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(base_time()));
    SubscriptionLifecycleService::new(db.connection.clone(), clock)
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: fixture.plan.id,
            account_id: fixture.account.id,
        })
        .await
        .unwrap();

    let payments = service.list_for_user(fixture.user.id).await.unwrap();
    assert_eq!(payments[0].payment.document_id, Some(latest.id));
}
