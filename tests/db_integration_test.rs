// Repository and service tests against a live Postgres.
// Run with: DATABASE_URL=... cargo test -- --ignored

mod common;

use panchayat_carbon_service::carbon::{
    calculate, EmissionFactors, FactorUpdate, Month, UsageAmounts, UsageAmountsPatch,
};
use panchayat_carbon_service::db::{
    FactorRepository, NewUsageRecord, Role, UsageFilter, UsageRecordUpdate, UsageRepository,
    UserRepository,
};
use panchayat_carbon_service::seed::Seeder;
use panchayat_carbon_service::services::auth_service::{LoginRequest, RegisterRequest};
use panchayat_carbon_service::services::{
    AnalyticsService, AuthService, FactorService, JwtKeys, PaginationParams, ServiceError,
    UsageService,
};
use serial_test::serial;
use std::time::Duration;
use uuid::Uuid;

use common::{create_test_panchayat, create_test_user, test_pool};

fn record(user_id: Uuid, month: Month, year: i32, electricity_kwh: f64) -> NewUsageRecord {
    NewUsageRecord {
        user_id,
        panchayat_id: None,
        month,
        year,
        usage: UsageAmounts {
            electricity_kwh,
            trees_planted: 1,
            ..Default::default()
        },
    }
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_factor_row_created_once_and_updated() {
    let pool = test_pool().await;
    let repo = FactorRepository::new(pool.clone());

    let first = repo.ensure_active(&EmissionFactors::default()).await.unwrap();
    let second = repo.ensure_active(&EmissionFactors::default()).await.unwrap();
    assert_eq!(first.id, second.id);

    let service = FactorService::load(repo.clone(), &EmissionFactors::default())
        .await
        .unwrap();
    let original = service.current().await;

    let updated = service
        .update(&FactorUpdate {
            electricity: Some(0.9),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.factors.electricity, 0.9);
    assert_eq!(service.current().await.electricity, 0.9);

    let rejected = service
        .update(&FactorUpdate {
            diesel: Some(-1.0),
            ..Default::default()
        })
        .await;
    assert!(matches!(rejected, Err(ServiceError::Invalid(_))));
    assert_eq!(service.current().await.diesel, original.diesel);

    // Restore what was there before
    repo.update(first.id, &original).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_usage_record_lifecycle() {
    let pool = test_pool().await;
    let user = create_test_user(&pool, Role::User, None).await;
    let service = UsageService::new(UsageRepository::new(pool.clone()));

    let created = service
        .create(&record(user.id, Month::Mar, 2024, 120.0))
        .await
        .unwrap();
    assert_eq!(created.month, Month::Mar);
    assert_eq!(created.usage.electricity_kwh, 120.0);

    let filter = UsageFilter {
        user_id: Some(user.id),
        ..Default::default()
    };
    let page = service
        .list(&filter, &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.pages, 1);
    assert_eq!(page.items[0].id, created.id);

    let updated = service
        .update(
            created.clone(),
            &UsageRecordUpdate {
                month: Some(Month::Apr),
                year: None,
                usage: UsageAmountsPatch {
                    diesel_liters: Some(4.5),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.month, Month::Apr);
    assert_eq!(updated.usage.electricity_kwh, 120.0);
    assert_eq!(updated.usage.diesel_liters, 4.5);

    let negative = service
        .update(
            updated.clone(),
            &UsageRecordUpdate {
                usage: UsageAmountsPatch {
                    waste_kg: Some(-2.0),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(negative, Err(ServiceError::Invalid(_))));

    service.delete(created.id).await.unwrap();
    assert!(matches!(
        service.get(created.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.delete(created.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore]
async fn test_record_for_unknown_user_is_rejected() {
    let pool = test_pool().await;
    let service = UsageService::new(UsageRepository::new(pool));

    let result = service
        .create(&record(Uuid::new_v4(), Month::Jan, 2024, 10.0))
        .await;
    assert!(matches!(result, Err(ServiceError::Invalid(_))));
}

#[tokio::test]
#[ignore]
async fn test_analytics_over_stored_records() {
    let pool = test_pool().await;
    let panchayat = create_test_panchayat(&pool).await;
    let user = create_test_user(&pool, Role::User, Some(panchayat.id)).await;
    let usage_repo = UsageRepository::new(pool.clone());
    let factors = EmissionFactors::default();
    let analytics = AnalyticsService::new(
        usage_repo.clone(),
        FactorService::new(FactorRepository::new(pool.clone()), factors),
    );

    // Inserted out of calendar order on purpose
    let inputs = [
        record(user.id, Month::Mar, 2024, 150.0),
        record(user.id, Month::Dec, 2023, 90.0),
        record(user.id, Month::Jan, 2024, 110.0),
    ];
    for input in &inputs {
        usage_repo.insert(input).await.unwrap();
    }

    let filter = UsageFilter {
        user_id: Some(user.id),
        ..Default::default()
    };

    let trends = analytics.trends(&filter).await.unwrap();
    let labels: Vec<&str> = trends.iter().map(|t| t.month.as_str()).collect();
    assert_eq!(labels, vec!["Dec 2023", "Jan 2024", "Mar 2024"]);

    let totals = analytics.metrics(&filter).await.unwrap();
    let expected: f64 = inputs
        .iter()
        .map(|r| calculate(&r.usage, &factors).total_emissions)
        .sum();
    assert!((totals.total_emissions - expected).abs() < 1e-9);

    let sectors = analytics.sectors(&filter).await.unwrap();
    assert_eq!(sectors.len(), 1);
    assert_eq!(sectors[0].sector, "Electricity");
    assert!((sectors[0].percentage - 100.0).abs() < 1e-9);

    let history = analytics.forecast_history(&filter).await.unwrap();
    let order: Vec<(i32, Month)> = history.iter().map(|h| (h.year, h.month)).collect();
    assert_eq!(
        order,
        vec![(2023, Month::Dec), (2024, Month::Jan), (2024, Month::Mar)]
    );
    assert!(history[0].calculated_total_emission_kg > 0.0);

    let march_only = UsageFilter {
        month: Some(Month::Mar),
        ..filter
    };
    assert_eq!(analytics.trends(&march_only).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_deleting_user_removes_their_records() {
    let pool = test_pool().await;
    let user = create_test_user(&pool, Role::User, None).await;
    let usage_repo = UsageRepository::new(pool.clone());
    let created = usage_repo
        .insert(&record(user.id, Month::Jun, 2024, 5.0))
        .await
        .unwrap();

    assert!(UserRepository::new(pool.clone())
        .delete(user.id)
        .await
        .unwrap());
    assert!(usage_repo.find_by_id(created.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let pool = test_pool().await;
    let auth = AuthService::new(
        UserRepository::new(pool),
        JwtKeys::new("db-test-secret", Duration::from_secs(60)),
    );
    let username = format!("reg_{}", &Uuid::new_v4().simple().to_string()[..12]);

    let user = auth
        .register(&RegisterRequest {
            username: username.clone(),
            email: Some(format!("{username}@example.com")),
            password: "password123".to_string(),
            panchayat_id: None,
        })
        .await
        .unwrap();
    assert_eq!(user.role, Role::User);
    assert_ne!(user.hashed_password, "password123");

    let duplicate = auth
        .register(&RegisterRequest {
            username: username.clone(),
            email: None,
            password: "other".to_string(),
            panchayat_id: None,
        })
        .await;
    assert!(matches!(duplicate, Err(ServiceError::Invalid(_))));

    let token = auth
        .login(&LoginRequest {
            username: username.clone(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(token.token_type, "bearer");
    assert_eq!(
        auth.authenticate(&token.access_token).await.unwrap().id,
        user.id
    );

    let wrong = auth
        .login(&LoginRequest {
            username,
            password: "nope".to_string(),
        })
        .await;
    assert!(matches!(wrong, Err(ServiceError::Unauthorized(_))));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_seeding_is_idempotent() {
    let pool = test_pool().await;
    let seeder = Seeder::new(pool);

    let first = seeder.seed_factors().await.unwrap();
    let second = seeder.seed_factors().await.unwrap();
    assert_eq!(first.id, second.id);

    seeder.seed_panchayats(None, || {}).await.unwrap();
    seeder.seed_users().await.unwrap();
    assert_eq!(seeder.seed_users().await.unwrap(), 0);
}
