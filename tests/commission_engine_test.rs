//! Commission reconciliation tests: drift detection, justification cycle,
//! receipt bookkeeping and sale/commission referential integrity.

use corretor_hub::db;
use corretor_hub::domain::DomainError;
use corretor_hub::models::receipt::ReceiptDto;
use corretor_hub::models::sale::SaleDto;
use corretor_hub::models::{client, user};
use corretor_hub::services::commission_service::{self, CommissionAmountsPatch};
use corretor_hub::services::sale_service::{self, SaleUpdate};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

// Helper to create a test broker
async fn create_test_broker(db: &DatabaseConnection) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let broker = user::ActiveModel {
        name: Set("Test Broker".to_string()),
        email: Set(Some("broker@example.com".to_string())),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = broker.insert(db).await.expect("Failed to create broker");
    res.id
}

// Helper to create a test client
async fn create_test_client(db: &DatabaseConnection, owner_id: i32, name: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let client = client::ActiveModel {
        owner_id: Set(owner_id),
        name: Set(name.to_string()),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = client.insert(db).await.expect("Failed to create client");
    res.id
}

// Helper to register a sale through the service (creates the commission)
async fn register_sale(
    db: &DatabaseConnection,
    client_id: i32,
    owner_id: i32,
    amount: f64,
    sale_date: &str,
) -> corretor_hub::models::sale::Model {
    sale_service::create_sale(
        db,
        SaleDto {
            id: None,
            client_id,
            owner_id,
            property_type: "apartamento".to_string(),
            address: "Rua das Flores 120".to_string(),
            amount,
            sale_date: sale_date.to_string(),
            broker_commission_amount: None,
            agency_commission_amount: None,
            notes: None,
        },
    )
    .await
    .expect("Failed to create sale")
}

#[tokio::test]
async fn test_sale_creation_initializes_commission() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Carlos Pereira").await;

    let sale = register_sale(&db, client_id, broker_id, 300_000.0, "2025-10-01").await;

    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .expect("Failed to query commission")
        .expect("Commission not created with sale");

    assert_eq!(commission.value_at_creation, 300_000.0);
    assert_eq!(commission.status, "pending");
    assert_eq!(commission.value_status, "up_to_date");
    assert_eq!(commission.broker_commission_amount, 0.0);
    assert_eq!(commission.agency_commission_amount, 0.0);
    assert_eq!(commission.client_name, "Carlos Pereira");
    assert_eq!(commission.sale_date, "2025-10-01");
    assert!(commission.original_sale_amount.is_none());
    assert!(commission.current_sale_amount.is_none());
}

#[tokio::test]
async fn test_sale_amount_edit_marks_commission_outdated() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Carlos Pereira").await;
    let sale = register_sale(&db, client_id, broker_id, 300_000.0, "2025-10-01").await;

    sale_service::update_sale(
        &db,
        sale.id,
        SaleUpdate {
            amount: Some(320_000.0),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to update sale");

    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(commission.value_status, "outdated");
    assert_eq!(commission.original_sale_amount, Some(300_000.0));
    assert_eq!(commission.current_sale_amount, Some(320_000.0));
    assert_eq!(commission.value_difference, Some(20_000.0));
}

#[tokio::test]
async fn test_drift_is_idempotent() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Carlos Pereira").await;
    let sale = register_sale(&db, client_id, broker_id, 300_000.0, "2025-10-01").await;

    let after_first = commission_service::apply_drift(&db, sale.id, 300_000.0, 320_000.0)
        .await
        .expect("First drift failed");
    let after_second = commission_service::apply_drift(&db, sale.id, 300_000.0, 320_000.0)
        .await
        .expect("Second drift failed");

    assert_eq!(after_first, after_second);
    assert_eq!(after_second.original_sale_amount, Some(300_000.0));
    assert_eq!(after_second.current_sale_amount, Some(320_000.0));
}

#[tokio::test]
async fn test_successive_edits_keep_first_baseline() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Carlos Pereira").await;
    let sale = register_sale(&db, client_id, broker_id, 300_000.0, "2025-10-01").await;

    commission_service::apply_drift(&db, sale.id, 300_000.0, 320_000.0)
        .await
        .unwrap();
    let commission = commission_service::apply_drift(&db, sale.id, 320_000.0, 350_000.0)
        .await
        .unwrap();

    // The baseline is the value at the first detected drift, not re-overwritten
    assert_eq!(commission.original_sale_amount, Some(300_000.0));
    assert_eq!(commission.current_sale_amount, Some(350_000.0));
    assert_eq!(commission.value_difference, Some(50_000.0));
    assert_eq!(commission.value_status, "outdated");
}

#[tokio::test]
async fn test_drift_on_unknown_sale_fails() {
    let db = setup_test_db().await;

    let err = commission_service::apply_drift(&db, 999, 100.0, 200.0)
        .await
        .expect_err("Drift on unknown sale should fail");

    assert!(matches!(err, DomainError::NotFound));
}

#[tokio::test]
async fn test_justify_rejects_empty_text() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Carlos Pereira").await;
    let sale = register_sale(&db, client_id, broker_id, 300_000.0, "2025-10-01").await;
    let commission = commission_service::apply_drift(&db, sale.id, 300_000.0, 320_000.0)
        .await
        .unwrap();

    let err = commission_service::justify(&db, commission.id, "")
        .await
        .expect_err("Empty justification should fail");
    assert!(matches!(err, DomainError::Validation(_)));

    let err = commission_service::justify(&db, commission.id, "   ")
        .await
        .expect_err("Blank justification should fail");
    assert!(matches!(err, DomainError::Validation(_)));

    // Nothing was written
    let unchanged = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.value_status, "outdated");
    assert!(unchanged.justification_text.is_none());
}

#[tokio::test]
async fn test_justify_requires_outdated_value() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Carlos Pereira").await;
    let sale = register_sale(&db, client_id, broker_id, 300_000.0, "2025-10-01").await;

    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();

    let err = commission_service::justify(&db, commission.id, "cliente negociou reajuste")
        .await
        .expect_err("Justifying an up-to-date commission should fail");
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_justify_preserves_audit_trail() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Carlos Pereira").await;
    let sale = register_sale(&db, client_id, broker_id, 300_000.0, "2025-10-01").await;
    let commission = commission_service::apply_drift(&db, sale.id, 300_000.0, 320_000.0)
        .await
        .unwrap();

    let justified = commission_service::justify(&db, commission.id, "cliente negociou reajuste")
        .await
        .expect("Justification failed");

    assert_eq!(justified.value_status, "justified");
    assert_eq!(
        justified.justification_text.as_deref(),
        Some("cliente negociou reajuste")
    );
    // Audit trail untouched
    assert_eq!(justified.original_sale_amount, Some(300_000.0));
    assert_eq!(justified.current_sale_amount, Some(320_000.0));
    assert_eq!(justified.value_difference, Some(20_000.0));
}

#[tokio::test]
async fn test_new_drift_after_justification_opens_fresh_episode() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Carlos Pereira").await;
    let sale = register_sale(&db, client_id, broker_id, 300_000.0, "2025-10-01").await;

    let commission = commission_service::apply_drift(&db, sale.id, 300_000.0, 320_000.0)
        .await
        .unwrap();
    commission_service::justify(&db, commission.id, "cliente negociou reajuste")
        .await
        .unwrap();

    let reopened = commission_service::apply_drift(&db, sale.id, 320_000.0, 340_000.0)
        .await
        .unwrap();

    // The baseline resets to the value immediately prior to the new drift
    assert_eq!(reopened.value_status, "outdated");
    assert_eq!(reopened.original_sale_amount, Some(320_000.0));
    assert_eq!(reopened.current_sale_amount, Some(340_000.0));
    assert_eq!(reopened.value_difference, Some(20_000.0));
    assert!(reopened.justification_text.is_none());
}

#[tokio::test]
async fn test_receipts_drive_payment_status() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Marina Souza").await;
    let sale = register_sale(&db, client_id, broker_id, 500_000.0, "2025-11-03").await;
    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();

    commission_service::update_amounts(
        &db,
        commission.id,
        CommissionAmountsPatch {
            agency_commission_amount: None,
            broker_commission_amount: Some(15_000.0),
        },
    )
    .await
    .unwrap();

    let (after_first, _) = commission_service::post_receipt(
        &db,
        commission.id,
        ReceiptDto {
            amount: 5_000.0,
            date: "2025-11-10".to_string(),
            idempotency_key: None,
        },
    )
    .await
    .expect("First receipt failed");
    assert_eq!(after_first.status, "partial");
    assert!(after_first.payment_date.is_none());

    let (after_second, _) = commission_service::post_receipt(
        &db,
        commission.id,
        ReceiptDto {
            amount: 10_000.0,
            date: "2025-12-01".to_string(),
            idempotency_key: None,
        },
    )
    .await
    .expect("Second receipt failed");
    assert_eq!(after_second.status, "received");
    assert_eq!(after_second.payment_date.as_deref(), Some("2025-12-01"));
}

#[tokio::test]
async fn test_receipt_rejects_non_positive_amount() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Marina Souza").await;
    let sale = register_sale(&db, client_id, broker_id, 500_000.0, "2025-11-03").await;
    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();

    for amount in [0.0, -50.0] {
        let err = commission_service::post_receipt(
            &db,
            commission.id,
            ReceiptDto {
                amount,
                date: "2025-11-10".to_string(),
                idempotency_key: None,
            },
        )
        .await
        .expect_err("Non-positive receipt should fail");
        assert!(matches!(err, DomainError::Validation(_)));
    }

    let receipts = commission_service::list_receipts(&db, commission.id)
        .await
        .unwrap();
    assert!(receipts.is_empty());
}

#[tokio::test]
async fn test_receipt_status_is_order_independent() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Marina Souza").await;

    // Two commissions with the same target, receipts posted in opposite order
    let mut finals = Vec::new();
    for amounts in [[9_000.0, 1_000.0, 5_000.0], [5_000.0, 1_000.0, 9_000.0]] {
        let sale = register_sale(&db, client_id, broker_id, 500_000.0, "2025-11-03").await;
        let commission = commission_service::find_by_sale_id(&db, sale.id)
            .await
            .unwrap()
            .unwrap();
        commission_service::update_amounts(
            &db,
            commission.id,
            CommissionAmountsPatch {
                agency_commission_amount: None,
                broker_commission_amount: Some(15_000.0),
            },
        )
        .await
        .unwrap();

        let mut last_status = String::new();
        for amount in amounts {
            let (updated, _) = commission_service::post_receipt(
                &db,
                commission.id,
                ReceiptDto {
                    amount,
                    date: "2025-11-10".to_string(),
                    idempotency_key: None,
                },
            )
            .await
            .unwrap();
            last_status = updated.status;
        }
        finals.push(last_status);
    }

    assert_eq!(finals[0], "received");
    assert_eq!(finals[1], "received");
}

#[tokio::test]
async fn test_overpayment_is_accepted_and_clamped() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Marina Souza").await;
    let sale = register_sale(&db, client_id, broker_id, 500_000.0, "2025-11-03").await;
    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();

    commission_service::update_amounts(
        &db,
        commission.id,
        CommissionAmountsPatch {
            agency_commission_amount: None,
            broker_commission_amount: Some(10_000.0),
        },
    )
    .await
    .unwrap();

    for amount in [6_000.0, 6_000.0] {
        commission_service::post_receipt(
            &db,
            commission.id,
            ReceiptDto {
                amount,
                date: "2025-11-10".to_string(),
                idempotency_key: None,
            },
        )
        .await
        .expect("Overpaying receipt should be accepted");
    }

    let details = commission_service::get_commission(&db, commission.id)
        .await
        .unwrap();
    assert_eq!(details.commission.status, "received");
    assert_eq!(details.total_received, 12_000.0);
    // Remaining never goes negative
    assert_eq!(details.remaining, 0.0);
}

#[tokio::test]
async fn test_manual_override_persists_until_next_receipt() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Roberto Lima").await;
    let sale = register_sale(&db, client_id, broker_id, 400_000.0, "2025-11-03").await;
    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();

    commission_service::update_amounts(
        &db,
        commission.id,
        CommissionAmountsPatch {
            agency_commission_amount: None,
            broker_commission_amount: Some(10_000.0),
        },
    )
    .await
    .unwrap();

    commission_service::post_receipt(
        &db,
        commission.id,
        ReceiptDto {
            amount: 2_000.0,
            date: "2025-11-10".to_string(),
            idempotency_key: None,
        },
    )
    .await
    .unwrap();

    let overridden = commission_service::set_status(&db, commission.id, "received")
        .await
        .expect("Manual override failed");
    assert_eq!(overridden.status, "received");

    // The next receipt recomputes the status from the actual sum
    let (recomputed, _) = commission_service::post_receipt(
        &db,
        commission.id,
        ReceiptDto {
            amount: 1_000.0,
            date: "2025-11-20".to_string(),
            idempotency_key: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(recomputed.status, "partial");
}

#[tokio::test]
async fn test_set_status_rejects_unknown_value() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Roberto Lima").await;
    let sale = register_sale(&db, client_id, broker_id, 400_000.0, "2025-11-03").await;
    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();

    let err = commission_service::set_status(&db, commission.id, "paid")
        .await
        .expect_err("Unknown status should fail");
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_update_amounts_recomputes_against_new_target() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Roberto Lima").await;
    let sale = register_sale(&db, client_id, broker_id, 400_000.0, "2025-11-03").await;
    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();

    // With a zero target, any payment counts as fully received
    let (received, _) = commission_service::post_receipt(
        &db,
        commission.id,
        ReceiptDto {
            amount: 5_000.0,
            date: "2025-11-10".to_string(),
            idempotency_key: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(received.status, "received");

    // Raising the target reopens the partial state
    let updated = commission_service::update_amounts(
        &db,
        commission.id,
        CommissionAmountsPatch {
            agency_commission_amount: None,
            broker_commission_amount: Some(20_000.0),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.status, "partial");
    assert_eq!(updated.broker_commission_amount, 20_000.0);
}

#[tokio::test]
async fn test_mirrored_sale_amounts_reach_commission() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Roberto Lima").await;
    let sale = register_sale(&db, client_id, broker_id, 400_000.0, "2025-11-03").await;

    sale_service::update_sale(
        &db,
        sale.id,
        SaleUpdate {
            broker_commission_amount: Some(12_000.0),
            agency_commission_amount: Some(8_000.0),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to update sale");

    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(commission.broker_commission_amount, 12_000.0);
    assert_eq!(commission.agency_commission_amount, 8_000.0);
    // A split edit alone is not a value drift
    assert_eq!(commission.value_status, "up_to_date");
}

#[tokio::test]
async fn test_delete_sale_blocked_by_commission() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Roberto Lima").await;
    let sale = register_sale(&db, client_id, broker_id, 400_000.0, "2025-11-03").await;
    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();

    let err = sale_service::delete_sale(&db, sale.id)
        .await
        .expect_err("Delete should be blocked");
    assert!(matches!(err, DomainError::ReferentialIntegrity(_)));

    commission_service::delete_commission(&db, commission.id)
        .await
        .expect("Failed to delete commission");

    sale_service::delete_sale(&db, sale.id)
        .await
        .expect("Delete should succeed once the commission is gone");
}

#[tokio::test]
async fn test_delete_commission_removes_payment_history() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Roberto Lima").await;
    let sale = register_sale(&db, client_id, broker_id, 400_000.0, "2025-11-03").await;
    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();

    commission_service::post_receipt(
        &db,
        commission.id,
        ReceiptDto {
            amount: 1_000.0,
            date: "2025-11-10".to_string(),
            idempotency_key: None,
        },
    )
    .await
    .unwrap();

    commission_service::delete_commission(&db, commission.id)
        .await
        .unwrap();

    use corretor_hub::models::receipt::Entity as Receipt;
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    let orphans = Receipt::find()
        .filter(corretor_hub::models::receipt::Column::CommissionId.eq(commission.id))
        .all(&db)
        .await
        .unwrap();
    assert!(orphans.is_empty());
}

#[tokio::test]
async fn test_receipt_idempotency_key_guards_retries() {
    let db = setup_test_db().await;
    let broker_id = create_test_broker(&db).await;
    let client_id = create_test_client(&db, broker_id, "Marina Souza").await;
    let sale = register_sale(&db, client_id, broker_id, 500_000.0, "2025-11-03").await;
    let commission = commission_service::find_by_sale_id(&db, sale.id)
        .await
        .unwrap()
        .unwrap();

    commission_service::update_amounts(
        &db,
        commission.id,
        CommissionAmountsPatch {
            agency_commission_amount: None,
            broker_commission_amount: Some(15_000.0),
        },
    )
    .await
    .unwrap();

    let key = uuid::Uuid::new_v4().to_string();
    let dto = ReceiptDto {
        amount: 5_000.0,
        date: "2025-11-10".to_string(),
        idempotency_key: Some(key.clone()),
    };

    let (_, first) = commission_service::post_receipt(&db, commission.id, dto)
        .await
        .expect("First post failed");

    // A network retry re-submits the same payload
    let (_, second) = commission_service::post_receipt(
        &db,
        commission.id,
        ReceiptDto {
            amount: 5_000.0,
            date: "2025-11-10".to_string(),
            idempotency_key: Some(key),
        },
    )
    .await
    .expect("Retried post failed");

    assert_eq!(first.id, second.id);

    let details = commission_service::get_commission(&db, commission.id)
        .await
        .unwrap();
    assert_eq!(details.total_received, 5_000.0);
    assert_eq!(details.commission.status, "partial");
}
