// tests/integration/lifecycle_tests.rs

use billing_backend::domain::{
    payment_model, user_subscription_model,
};
use billing_backend::error::AppError;
use billing_backend::repository::account_repository::AccountRepository;
use billing_backend::repository::catalog_repository::{CatalogRepository, CreatePlan};
use billing_backend::repository::user_subscription_repository::{
    NewUserSubscription, UserSubscriptionRepository,
};
use billing_backend::service::subscription_lifecycle_service::{
    PurchaseRequest, SubscriptionLifecycleService,
};
use billing_backend::utils::clock::{Clock, ManualClock};
use chrono::Duration;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use std::sync::Arc;

use crate::common::db::TestDatabase;
use crate::common::test_data::{
    base_time, create_account, create_fixture, create_plan, create_service, create_user,
};

fn lifecycle(db: &DatabaseConnection) -> (SubscriptionLifecycleService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(base_time()));
    let shared: Arc<dyn Clock> = clock.clone();
    (SubscriptionLifecycleService::new(db.clone(), shared), clock)
}

async fn balance_of(db: &DatabaseConnection, account_id: i64) -> i64 {
    AccountRepository::new(db.clone())
        .find_by_id(account_id)
        .await
        .unwrap()
        .unwrap()
        .balance
}

async fn subscriptions_of(
    db: &DatabaseConnection,
    user_id: i64,
) -> Vec<user_subscription_model::Model> {
    user_subscription_model::Entity::find()
        .filter(user_subscription_model::Column::UserId.eq(user_id))
        .all(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_insufficient_funds_leaves_state_unchanged() {
    let db = TestDatabase::new().await;
    let fixture = create_fixture(&db.connection, 100, 150, 30, 10).await;
    let (service, _clock) = lifecycle(&db.connection);

    let result = service
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: fixture.plan.id,
            account_id: fixture.account.id,
        })
        .await;

    assert!(matches!(
        result,
        Err(AppError::InsufficientFunds {
            balance: 100,
            price: 150
        })
    ));
    assert_eq!(balance_of(&db.connection, fixture.account.id).await, 100);
    assert!(subscriptions_of(&db.connection, fixture.user.id).await.is_empty());
    assert_eq!(
        payment_model::Entity::find().count(&db.connection).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_first_purchase_creates_active_subscription() {
    let db = TestDatabase::new().await;
    let fixture = create_fixture(&db.connection, 500, 200, 30, 30).await;
    let (service, _clock) = lifecycle(&db.connection);

    let details = service
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: fixture.plan.id,
            account_id: fixture.account.id,
        })
        .await
        .unwrap();

    assert_eq!(balance_of(&db.connection, fixture.account.id).await, 300);

    let subscription = &details.subscription;
    assert!(subscription.status);
    assert!(subscription.renewal);
    assert!(subscription.activation);
    assert!(!subscription.trial);
    assert_eq!(subscription.start, base_time());
    assert_eq!(subscription.end, base_time() + Duration::days(30));
    assert_eq!(details.plan.id, fixture.plan.id);
    assert_eq!(details.service.id, fixture.service.id);
    assert!(details.access_code.is_none());

    let stored = subscriptions_of(&db.connection, fixture.user.id).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, subscription.id);

    // 支払いとキャッシュバックが記録される
    let payments = payment_model::Entity::find().all(&db.connection).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, 200);
    assert_eq!(payments[0].receipt, "R000001");
    assert_eq!(payments[0].account_id, fixture.account.id);
    assert_eq!(payments[0].date, base_time());
    assert!(payments[0].document_id.is_none());
}

#[tokio::test]
async fn test_same_plan_repurchase_extends_from_previous_end() {
    let db = TestDatabase::new().await;
    let fixture = create_fixture(&db.connection, 500, 200, 30, 30).await;
    let (service, clock) = lifecycle(&db.connection);
    let request = PurchaseRequest {
        user_id: fixture.user.id,
        plan_id: fixture.plan.id,
        account_id: fixture.account.id,
    };

    let first = service.purchase(request).await.unwrap();
    let original_end = first.subscription.end;

    clock.advance(Duration::days(10));
    let second = service.purchase(request).await.unwrap();

    assert_eq!(balance_of(&db.connection, fixture.account.id).await, 100);
    assert_eq!(second.subscription.id, first.subscription.id);
    assert_eq!(second.subscription.end, original_end + Duration::days(30));
    assert_eq!(
        second.subscription.end,
        first.subscription.start + Duration::days(60)
    );
    assert_eq!(subscriptions_of(&db.connection, fixture.user.id).await.len(), 1);

    let receipts: Vec<String> = payment_model::Entity::find()
        .all(&db.connection)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.receipt)
        .collect();
    assert_eq!(receipts.len(), 2);
    assert!(receipts.contains(&"R000001".to_string()));
    assert!(receipts.contains(&"R000002".to_string()));
}

#[tokio::test]
async fn test_switching_plan_deactivates_previous_subscription() {
    let db = TestDatabase::new().await;
    let fixture = create_fixture(&db.connection, 1000, 200, 30, 30).await;
    let yearly = create_plan(&db.connection, fixture.service.id, 500, 365, 50).await;
    let (service, clock) = lifecycle(&db.connection);

    let monthly = service
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: fixture.plan.id,
            account_id: fixture.account.id,
        })
        .await
        .unwrap();

    clock.advance(Duration::days(3));
    let switch_time = clock.now();
    let switched = service
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: yearly.id,
            account_id: fixture.account.id,
        })
        .await
        .unwrap();

    assert_eq!(balance_of(&db.connection, fixture.account.id).await, 300);
    assert_ne!(switched.subscription.id, monthly.subscription.id);
    assert_eq!(switched.subscription.plan_id, yearly.id);
    assert_eq!(switched.subscription.end, switch_time + Duration::days(365));

    let stored = subscriptions_of(&db.connection, fixture.user.id).await;
    assert_eq!(stored.len(), 2);

    let previous = stored
        .iter()
        .find(|s| s.id == monthly.subscription.id)
        .unwrap();
    assert!(!previous.status);
    assert!(!previous.renewal);
    assert_eq!(previous.end, switch_time);

    let active: Vec<_> = stored.iter().filter(|s| s.status).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, switched.subscription.id);
}

#[tokio::test]
async fn test_subscriptions_for_different_services_are_independent() {
    let db = TestDatabase::new().await;
    let fixture = create_fixture(&db.connection, 1000, 200, 30, 30).await;
    let video = create_service(&db.connection, "Video").await;
    let video_plan = create_plan(&db.connection, video.id, 300, 30, 0).await;
    let (service, _clock) = lifecycle(&db.connection);

    for plan_id in [fixture.plan.id, video_plan.id] {
        service
            .purchase(PurchaseRequest {
                user_id: fixture.user.id,
                plan_id,
                account_id: fixture.account.id,
            })
            .await
            .unwrap();
    }

    let stored = subscriptions_of(&db.connection, fixture.user.id).await;
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|s| s.status));
    assert_eq!(balance_of(&db.connection, fixture.account.id).await, 500);
}

#[tokio::test]
async fn test_lapsed_same_plan_creates_new_record() {
    let db = TestDatabase::new().await;
    let fixture = create_fixture(&db.connection, 500, 200, 30, 30).await;
    let (service, _clock) = lifecycle(&db.connection);

    // 期限切れで非アクティブになった同一プランの契約
    let lapsed = UserSubscriptionRepository::create(
        &db.connection,
        NewUserSubscription {
            user_id: fixture.user.id,
            plan_id: fixture.plan.id,
            start: base_time() - Duration::days(60),
            end: base_time() - Duration::days(30),
        },
    )
    .await
    .unwrap();
    UserSubscriptionRepository::new(db.connection.clone())
        .deactivate_if_expired(lapsed.id, base_time())
        .await
        .unwrap();

    let details = service
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: fixture.plan.id,
            account_id: fixture.account.id,
        })
        .await
        .unwrap();

    assert_ne!(details.subscription.id, lapsed.id);
    assert_eq!(details.subscription.end, base_time() + Duration::days(30));
    assert_eq!(subscriptions_of(&db.connection, fixture.user.id).await.len(), 2);
}

#[tokio::test]
async fn test_lookup_failures() {
    let db = TestDatabase::new().await;
    let fixture = create_fixture(&db.connection, 500, 200, 30, 30).await;
    let other_user = create_user(&db.connection).await;
    let other_account = create_account(&db.connection, other_user.id, 500).await;
    let (service, _clock) = lifecycle(&db.connection);

    let missing_user = service
        .purchase(PurchaseRequest {
            user_id: 999_999,
            plan_id: fixture.plan.id,
            account_id: fixture.account.id,
        })
        .await;
    assert!(matches!(missing_user, Err(AppError::NotFound(_))));

    let missing_plan = service
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: 999_999,
            account_id: fixture.account.id,
        })
        .await;
    assert!(matches!(missing_plan, Err(AppError::NotFound(_))));

    let missing_account = service
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: fixture.plan.id,
            account_id: 999_999,
        })
        .await;
    assert!(matches!(missing_account, Err(AppError::NotFound(_))));

    // 他人の口座では購入できない
    let foreign_account = service
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: fixture.plan.id,
            account_id: other_account.id,
        })
        .await;
    assert!(matches!(foreign_account, Err(AppError::NotFound(_))));
    assert_eq!(balance_of(&db.connection, other_account.id).await, 500);
    assert!(subscriptions_of(&db.connection, fixture.user.id).await.is_empty());
}

#[tokio::test]
async fn test_unavailable_plan_is_rejected() {
    let db = TestDatabase::new().await;
    let fixture = create_fixture(&db.connection, 500, 200, 30, 30).await;
    let retired = CatalogRepository::new(db.connection.clone())
        .create_plan(CreatePlan {
            name: "Retired".to_string(),
            availability: false,
            price: 100,
            period: 30,
            cashback: 0,
            service_id: fixture.service.id,
            trial_period_days: None,
            trial_period_cost: None,
        })
        .await
        .unwrap();
    let (service, _clock) = lifecycle(&db.connection);

    let result = service
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: retired.id,
            account_id: fixture.account.id,
        })
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert_eq!(balance_of(&db.connection, fixture.account.id).await, 500);
}

#[tokio::test]
async fn test_duplicate_active_subscriptions_abort_purchase() {
    let db = TestDatabase::new().await;
    let fixture = create_fixture(&db.connection, 500, 200, 30, 30).await;
    let other_plan = create_plan(&db.connection, fixture.service.id, 250, 30, 0).await;
    let (service, _clock) = lifecycle(&db.connection);

    for plan_id in [fixture.plan.id, other_plan.id] {
        UserSubscriptionRepository::create(
            &db.connection,
            NewUserSubscription {
                user_id: fixture.user.id,
                plan_id,
                start: base_time(),
                end: base_time() + Duration::days(30),
            },
        )
        .await
        .unwrap();
    }

    let result = service
        .purchase(PurchaseRequest {
            user_id: fixture.user.id,
            plan_id: fixture.plan.id,
            account_id: fixture.account.id,
        })
        .await;

    assert!(matches!(result, Err(AppError::DataIntegrity(_))));
    // ロールバックされる
    assert_eq!(balance_of(&db.connection, fixture.account.id).await, 500);
    let stored = subscriptions_of(&db.connection, fixture.user.id).await;
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|s| s.status));
}

#[tokio::test]
async fn test_concurrent_purchases_do_not_double_debit() {
    let db = TestDatabase::new().await;
    let fixture = create_fixture(&db.connection, 300, 200, 30, 30).await;
    let (service, _clock) = lifecycle(&db.connection);
    let request = PurchaseRequest {
        user_id: fixture.user.id,
        plan_id: fixture.plan.id,
        account_id: fixture.account.id,
    };

    let (first, second) = tokio::join!(service.purchase(request), service.purchase(request));

    let results = [first, second];
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::InsufficientFunds { .. })))
        .count();
    assert_eq!(succeeded, 1);
    assert_eq!(rejected, 1);

    assert_eq!(balance_of(&db.connection, fixture.account.id).await, 100);
    let active_count = user_subscription_model::Entity::find()
        .filter(user_subscription_model::Column::UserId.eq(fixture.user.id))
        .filter(user_subscription_model::Column::Status.eq(true))
        .count(&db.connection)
        .await
        .unwrap();
    assert_eq!(active_count, 1);
}
