use sea_orm::*;

use crate::models::receipt::ReceiptDto;
use crate::models::sale::SaleDto;
use crate::models::{annual_goal, client, monthly_goal, user};
use crate::services::{commission_service, sale_service};

/// Seed a demo broker with clients, sales, receipts and goals.
/// Intended for local development only (SEED_DEMO=1).
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339();

    // 1. Create the demo broker
    let broker = user::ActiveModel {
        name: Set("Ana Corretor".to_owned()),
        email: Set(Some("ana@example.com".to_owned())),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };

    let broker = broker.insert(db).await?;

    // 2. Create clients
    let client_names = vec![
        ("Carlos Pereira", "11 91234-5678"),
        ("Marina Souza", "21 99876-5432"),
        ("Roberto Lima", "31 98765-4321"),
    ];

    let mut client_ids = Vec::new();
    for (name, phone) in client_names {
        let client = client::ActiveModel {
            owner_id: Set(broker.id),
            name: Set(name.to_owned()),
            phone: Set(Some(phone.to_owned())),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        let saved = client.insert(db).await?;
        client_ids.push(saved.id);
    }

    // 3. Register sales (each creates its commission)
    let year = chrono::Utc::now().format("%Y").to_string();
    let sales = vec![
        (client_ids[0], "apartamento", "Rua das Flores 120, ap 52", 450_000.0, format!("{}-02-10", year)),
        (client_ids[1], "casa", "Alameda Santos 77", 820_000.0, format!("{}-03-05", year)),
        (client_ids[2], "terreno", "Estrada do Campo km 4", 210_000.0, format!("{}-04-22", year)),
    ];

    for (client_id, property_type, address, amount, sale_date) in sales {
        let sale = sale_service::create_sale(
            db,
            SaleDto {
                id: None,
                client_id,
                owner_id: broker.id,
                property_type: property_type.to_owned(),
                address: address.to_owned(),
                amount,
                sale_date: sale_date.clone(),
                broker_commission_amount: None,
                agency_commission_amount: None,
                notes: None,
            },
        )
        .await
        .map_err(|e| DbErr::Custom(e.to_string()))?;

        // Fill in the split and post a first receipt for the demo
        if let Some(commission) = commission_service::find_by_sale_id(db, sale.id)
            .await
            .map_err(|e| DbErr::Custom(e.to_string()))?
        {
            let broker_cut = amount * 0.03;
            commission_service::update_amounts(
                db,
                commission.id,
                commission_service::CommissionAmountsPatch {
                    agency_commission_amount: Some(amount * 0.02),
                    broker_commission_amount: Some(broker_cut),
                },
            )
            .await
            .map_err(|e| DbErr::Custom(e.to_string()))?;

            commission_service::post_receipt(
                db,
                commission.id,
                ReceiptDto {
                    amount: broker_cut / 2.0,
                    date: sale_date,
                    idempotency_key: Some(uuid::Uuid::new_v4().to_string()),
                },
            )
            .await
            .map_err(|e| DbErr::Custom(e.to_string()))?;
        }
    }

    // 4. Goals
    let year_num: i32 = year.parse().unwrap_or(2026);
    let monthly = monthly_goal::ActiveModel {
        owner_id: Set(broker.id),
        month: Set(chrono::Utc::now().format("%m").to_string().parse().unwrap_or(1)),
        year: Set(year_num),
        value: Set(10_000.0),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };
    monthly_goal::Entity::insert(monthly)
        .on_conflict(
            sea_orm::sea_query::OnConflict::columns([
                monthly_goal::Column::OwnerId,
                monthly_goal::Column::Month,
                monthly_goal::Column::Year,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec(db)
        .await?;

    let annual = annual_goal::ActiveModel {
        owner_id: Set(broker.id),
        year: Set(year_num),
        value: Set(120_000.0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    annual_goal::Entity::insert(annual)
        .on_conflict(
            sea_orm::sea_query::OnConflict::columns([
                annual_goal::Column::OwnerId,
                annual_goal::Column::Year,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec(db)
        .await?;

    Ok(())
}
