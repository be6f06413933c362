//! Sale Service - Registry for the broker's property sales
//!
//! Creating a sale also creates its commission record, in one transaction.
//! Editing the sale amount afterwards feeds the commission drift cycle.

use chrono::Utc;
use sea_orm::*;
use std::collections::HashMap;

use crate::domain::DomainError;
use crate::models::client::{self, Entity as Client};
use crate::models::commission::{self, Entity as Commission};
use crate::models::sale::{self, Entity as Sale, SaleDto};
use crate::services::commission_service;

/// Enriched sale with the client name joined by foreign key
#[derive(Debug, Clone, serde::Serialize)]
pub struct SaleWithClient {
    pub id: i32,
    pub client_id: i32,
    pub owner_id: i32,
    pub property_type: String,
    pub address: String,
    pub amount: f64,
    pub sale_date: String,
    pub broker_commission_amount: Option<f64>,
    pub agency_commission_amount: Option<f64>,
    pub notes: Option<String>,
    pub client_name: String,
}

/// Filter parameters for listing sales
#[derive(Debug, Default, Clone)]
pub struct SaleFilter {
    pub owner_id: Option<i32>,
    pub client_id: Option<i32>,
    pub property_type: Option<String>,
}

/// Patch for updating a sale; commission split amounts, when present, mirror
/// into the commission record
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct SaleUpdate {
    pub property_type: Option<String>,
    pub address: Option<String>,
    pub amount: Option<f64>,
    pub sale_date: Option<String>,
    pub broker_commission_amount: Option<f64>,
    pub agency_commission_amount: Option<f64>,
    pub notes: Option<Option<String>>,
}

fn to_sale_with_client(sale: sale::Model, client_name: String) -> SaleWithClient {
    SaleWithClient {
        id: sale.id,
        client_id: sale.client_id,
        owner_id: sale.owner_id,
        property_type: sale.property_type,
        address: sale.address,
        amount: sale.amount,
        sale_date: sale.sale_date,
        broker_commission_amount: sale.broker_commission_amount,
        agency_commission_amount: sale.agency_commission_amount,
        notes: sale.notes,
        client_name,
    }
}

/// List sales with client names
pub async fn list_sales(
    db: &DatabaseConnection,
    filter: SaleFilter,
) -> Result<Vec<SaleWithClient>, DomainError> {
    let mut condition = Condition::all();

    if let Some(owner_id) = filter.owner_id {
        condition = condition.add(sale::Column::OwnerId.eq(owner_id));
    }

    if let Some(client_id) = filter.client_id {
        condition = condition.add(sale::Column::ClientId.eq(client_id));
    }

    if let Some(property_type) = filter.property_type {
        condition = condition.add(sale::Column::PropertyType.eq(property_type));
    }

    let sales = Sale::find()
        .filter(condition)
        .order_by_desc(sale::Column::SaleDate)
        .all(db)
        .await?;

    let client_ids: Vec<i32> = sales.iter().map(|s| s.client_id).collect();

    let mut client_names: HashMap<i32, String> = HashMap::new();

    if !client_ids.is_empty() {
        let clients = Client::find()
            .filter(client::Column::Id.is_in(client_ids))
            .all(db)
            .await?;

        for c in clients {
            client_names.insert(c.id, c.name);
        }
    }

    let result = sales
        .into_iter()
        .map(|s| {
            let name = client_names
                .get(&s.client_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string());
            to_sale_with_client(s, name)
        })
        .collect();

    Ok(result)
}

/// Get a single sale with its client name
pub async fn get_sale(db: &DatabaseConnection, id: i32) -> Result<SaleWithClient, DomainError> {
    let sale = Sale::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let client_name = Client::find_by_id(sale.client_id)
        .one(db)
        .await?
        .map(|c| c.name)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(to_sale_with_client(sale, client_name))
}

/// Register a new sale. Exactly one commission record is created with it.
pub async fn create_sale(
    db: &DatabaseConnection,
    dto: SaleDto,
) -> Result<sale::Model, DomainError> {
    if dto.amount <= 0.0 {
        return Err(DomainError::Validation(
            "sale amount must be positive".to_string(),
        ));
    }

    let client = Client::find_by_id(dto.client_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::Validation("client does not exist".to_string()))?;

    if client.owner_id != dto.owner_id {
        return Err(DomainError::Validation(
            "client belongs to another user".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();

    let txn = db.begin().await?;

    let new_sale = sale::ActiveModel {
        client_id: Set(dto.client_id),
        owner_id: Set(dto.owner_id),
        property_type: Set(dto.property_type),
        address: Set(dto.address),
        amount: Set(dto.amount),
        sale_date: Set(dto.sale_date),
        broker_commission_amount: Set(dto.broker_commission_amount),
        agency_commission_amount: Set(dto.agency_commission_amount),
        notes: Set(dto.notes),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved_sale = new_sale.insert(&txn).await?;

    commission_service::initialize_commission(&txn, &saved_sale, &client.name).await?;

    txn.commit().await?;
    Ok(saved_sale)
}

/// Update a sale. An amount change feeds the commission drift cycle; split
/// amounts in the patch mirror into the commission record.
pub async fn update_sale(
    db: &DatabaseConnection,
    id: i32,
    patch: SaleUpdate,
) -> Result<sale::Model, DomainError> {
    if patch.amount.map_or(false, |a| a <= 0.0) {
        return Err(DomainError::Validation(
            "sale amount must be positive".to_string(),
        ));
    }

    if patch.broker_commission_amount.map_or(false, |v| v < 0.0)
        || patch.agency_commission_amount.map_or(false, |v| v < 0.0)
    {
        return Err(DomainError::Validation(
            "commission amounts must not be negative".to_string(),
        ));
    }

    let sale = Sale::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let previous_amount = sale.amount;
    let now = Utc::now().to_rfc3339();

    let txn = db.begin().await?;

    let mut active: sale::ActiveModel = sale.into();

    if let Some(property_type) = patch.property_type {
        active.property_type = Set(property_type);
    }
    if let Some(address) = patch.address {
        active.address = Set(address);
    }
    if let Some(amount) = patch.amount {
        active.amount = Set(amount);
    }
    if let Some(sale_date) = patch.sale_date {
        active.sale_date = Set(sale_date);
    }
    if let Some(broker) = patch.broker_commission_amount {
        active.broker_commission_amount = Set(Some(broker));
    }
    if let Some(agency) = patch.agency_commission_amount {
        active.agency_commission_amount = Set(Some(agency));
    }
    if let Some(notes) = patch.notes {
        active.notes = Set(notes);
    }
    active.updated_at = Set(now);

    let updated_sale = active.update(&txn).await?;

    // A manually deleted commission is terminal; nothing left to reconcile
    if let Some(commission) = commission_service::find_by_sale_id(&txn, id).await? {
        let commission = match patch.amount {
            Some(new_amount) if new_amount != previous_amount => {
                commission_service::apply_drift_to(&txn, commission, previous_amount, new_amount)
                    .await?
            }
            _ => commission,
        };

        if patch.broker_commission_amount.is_some() || patch.agency_commission_amount.is_some() {
            commission_service::apply_amounts(
                &txn,
                commission,
                commission_service::CommissionAmountsPatch {
                    agency_commission_amount: patch.agency_commission_amount,
                    broker_commission_amount: patch.broker_commission_amount,
                },
            )
            .await?;
        }
    }

    txn.commit().await?;
    Ok(updated_sale)
}

/// Delete a sale. Blocked while a commission still references it.
pub async fn delete_sale(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    Sale::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let referencing = Commission::find()
        .filter(commission::Column::SaleId.eq(id))
        .count(db)
        .await?;

    if referencing > 0 {
        return Err(DomainError::ReferentialIntegrity(
            "sale has a commission record; delete the commission first".to_string(),
        ));
    }

    Sale::delete_by_id(id).exec(db).await?;
    Ok(())
}
