//! Commission Service - Reconciliation engine keeping commissions consistent
//! with the sales they originate from.
//!
//! A commission tracks two independent status axes:
//! - payment status ('pending', 'partial', 'received'), derived from the sum
//!   of posted receipts against broker_commission_amount; a manual override
//!   persists until the next receipt posting recomputes it;
//! - value status ('up_to_date', 'outdated', 'justified'), driven by edits to
//!   the underlying sale amount after the commission was created.
//!
//! Every read-then-write sequence runs inside a transaction so a drift
//! episode's baseline or a receipt sum cannot be lost to an interleaved write.

use chrono::Utc;
use sea_orm::*;
use std::collections::HashMap;

use crate::domain::DomainError;
use crate::models::commission::{self, Entity as Commission};
use crate::models::receipt::{self, Entity as Receipt, ReceiptDto};
use crate::models::sale;

/// Filter parameters for listing commissions
#[derive(Debug, Default, Clone)]
pub struct CommissionFilter {
    pub owner_id: Option<i32>,
    pub status: Option<String>,
    pub value_status: Option<String>,
}

/// Commission enriched with receipt totals for tabular display
#[derive(Debug, Clone, serde::Serialize)]
pub struct CommissionWithTotals {
    pub id: i32,
    pub sale_id: i32,
    pub client_name: String,
    pub property: String,
    pub value_at_creation: f64,
    pub agency_commission_amount: f64,
    pub broker_commission_amount: f64,
    pub contract_date: String,
    pub sale_date: String,
    pub payment_date: Option<String>,
    pub status: String,
    pub value_status: String,
    pub original_sale_amount: Option<f64>,
    pub current_sale_amount: Option<f64>,
    pub value_difference: Option<f64>,
    pub justification_text: Option<String>,
    pub total_received: f64,
    pub remaining: f64,
}

/// Single-commission detail view with its payment history
#[derive(Debug, Clone, serde::Serialize)]
pub struct CommissionDetails {
    pub commission: commission::Model,
    pub receipts: Vec<receipt::Model>,
    pub total_received: f64,
    pub remaining: f64,
}

/// Patch for direct edits of the commission split amounts
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct CommissionAmountsPatch {
    pub agency_commission_amount: Option<f64>,
    pub broker_commission_amount: Option<f64>,
}

/// Derive the payment status from the receipt sum (clamped, no rollover)
fn derive_status(receipt_sum: f64, broker_amount: f64) -> &'static str {
    if receipt_sum <= 0.0 {
        "pending"
    } else if receipt_sum < broker_amount {
        "partial"
    } else {
        "received"
    }
}

async fn receipt_sum<C: ConnectionTrait>(db: &C, commission_id: i32) -> Result<f64, DomainError> {
    let receipts = Receipt::find()
        .filter(receipt::Column::CommissionId.eq(commission_id))
        .all(db)
        .await?;

    Ok(receipts.iter().map(|r| r.amount).sum())
}

/// Locate the commission derived from a sale, if it still exists
pub async fn find_by_sale_id<C: ConnectionTrait>(
    db: &C,
    sale_id: i32,
) -> Result<Option<commission::Model>, DomainError> {
    let commission = Commission::find()
        .filter(commission::Column::SaleId.eq(sale_id))
        .one(db)
        .await?;
    Ok(commission)
}

/// Create the commission record for a freshly registered sale.
///
/// Called by the sale registry inside the sale-creation transaction, so a
/// sale and its commission appear together or not at all. Commission split
/// amounts start at zero; the broker fills them in later.
pub async fn initialize_commission<C: ConnectionTrait>(
    db: &C,
    sale: &sale::Model,
    client_name: &str,
) -> Result<commission::Model, DomainError> {
    let now = Utc::now().to_rfc3339();
    let today = Utc::now().format("%Y-%m-%d").to_string();

    let new_commission = commission::ActiveModel {
        sale_id: Set(sale.id),
        owner_id: Set(sale.owner_id),
        client_name: Set(client_name.to_owned()),
        property: Set(format!("{} - {}", sale.property_type, sale.address)),
        value_at_creation: Set(sale.amount),
        agency_commission_amount: Set(0.0),
        broker_commission_amount: Set(0.0),
        contract_date: Set(today),
        sale_date: Set(sale.sale_date.clone()),
        payment_date: Set(None),
        status: Set("pending".to_owned()),
        value_status: Set("up_to_date".to_owned()),
        original_sale_amount: Set(None),
        current_sale_amount: Set(None),
        value_difference: Set(None),
        justification_text: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_commission.insert(db).await?)
}

/// Apply a sale-amount drift to an already-loaded commission.
///
/// The baseline (original_sale_amount) is taken only when a new episode
/// opens, i.e. when the commission was 'up_to_date' or 'justified' at the
/// time of the edit; further edits inside an open episode keep the first
/// detected baseline. A repeated event carrying an amount equal to the
/// recorded current_sale_amount is a no-op.
pub async fn apply_drift_to<C: ConnectionTrait>(
    db: &C,
    commission: commission::Model,
    previous_amount: f64,
    new_amount: f64,
) -> Result<commission::Model, DomainError> {
    if commission.current_sale_amount == Some(new_amount) {
        return Ok(commission);
    }

    let fresh_episode = matches!(
        commission.value_status.as_str(),
        "up_to_date" | "justified"
    );
    let original = if fresh_episode {
        previous_amount
    } else {
        commission.original_sale_amount.unwrap_or(previous_amount)
    };

    let now = Utc::now().to_rfc3339();
    let mut active: commission::ActiveModel = commission.into();
    active.original_sale_amount = Set(Some(original));
    active.current_sale_amount = Set(Some(new_amount));
    active.value_difference = Set(Some(new_amount - original));
    active.value_status = Set("outdated".to_owned());
    if fresh_episode {
        // The stored justification closed the previous episode
        active.justification_text = Set(None);
    }
    active.updated_at = Set(now);

    Ok(active.update(db).await?)
}

/// Apply a drift event `(sale_id, previous_amount, new_amount)` emitted by
/// the sale registry. Fails with NotFound when no commission references the
/// sale.
pub async fn apply_drift(
    db: &DatabaseConnection,
    sale_id: i32,
    previous_amount: f64,
    new_amount: f64,
) -> Result<commission::Model, DomainError> {
    let txn = db.begin().await?;

    let commission = find_by_sale_id(&txn, sale_id)
        .await?
        .ok_or(DomainError::NotFound)?;
    let updated = apply_drift_to(&txn, commission, previous_amount, new_amount).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Acknowledge an outdated commission value with a justification.
///
/// Only valid while the value status is 'outdated'; the audit trail
/// (original/current/difference) is kept untouched.
pub async fn justify(
    db: &DatabaseConnection,
    commission_id: i32,
    text: &str,
) -> Result<commission::Model, DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::Validation(
            "justification text must not be empty".to_string(),
        ));
    }

    let commission = Commission::find_by_id(commission_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    if commission.value_status != "outdated" {
        return Err(DomainError::Validation(format!(
            "commission value is {}, only an outdated value can be justified",
            commission.value_status
        )));
    }

    let now = Utc::now().to_rfc3339();
    let mut active: commission::ActiveModel = commission.into();
    active.value_status = Set("justified".to_owned());
    active.justification_text = Set(Some(text.trim().to_owned()));
    active.updated_at = Set(now);

    Ok(active.update(db).await?)
}

/// Record a partial payment against a commission and recompute its payment
/// status.
///
/// Receipts are immutable once created. A duplicate idempotency key on the
/// same commission returns the already-recorded receipt without posting a
/// second one, so a retried submission cannot double-count.
pub async fn post_receipt(
    db: &DatabaseConnection,
    commission_id: i32,
    dto: ReceiptDto,
) -> Result<(commission::Model, receipt::Model), DomainError> {
    if dto.amount <= 0.0 {
        return Err(DomainError::Validation(
            "receipt amount must be positive".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let commission = Commission::find_by_id(commission_id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    if let Some(key) = &dto.idempotency_key {
        let existing = Receipt::find()
            .filter(receipt::Column::CommissionId.eq(commission_id))
            .filter(receipt::Column::IdempotencyKey.eq(key.clone()))
            .one(&txn)
            .await?;
        if let Some(existing) = existing {
            txn.commit().await?;
            return Ok((commission, existing));
        }
    }

    let now = Utc::now().to_rfc3339();
    let saved_receipt = receipt::ActiveModel {
        commission_id: Set(commission_id),
        amount: Set(dto.amount),
        date: Set(dto.date.clone()),
        idempotency_key: Set(dto.idempotency_key.clone()),
        created_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let total = receipt_sum(&txn, commission_id).await?;
    let new_status = derive_status(total, commission.broker_commission_amount);
    let became_received = new_status == "received" && commission.status != "received";

    let mut active: commission::ActiveModel = commission.into();
    active.status = Set(new_status.to_owned());
    if became_received {
        active.payment_date = Set(Some(dto.date));
    }
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok((updated, saved_receipt))
}

/// Manual payment-status override. Persists until the next receipt posting
/// recomputes the status; the value status is never touched.
pub async fn set_status(
    db: &DatabaseConnection,
    commission_id: i32,
    status: &str,
) -> Result<commission::Model, DomainError> {
    if !matches!(status, "pending" | "partial" | "received") {
        return Err(DomainError::Validation(format!(
            "unknown commission status '{}'",
            status
        )));
    }

    let commission = Commission::find_by_id(commission_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let mut active: commission::ActiveModel = commission.into();
    active.status = Set(status.to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Apply a split-amount patch to an already-loaded commission and recompute
/// the payment status against the new broker amount using the existing
/// receipt sum. Shared by the direct edit path and the sale mirror path.
pub async fn apply_amounts<C: ConnectionTrait>(
    db: &C,
    commission: commission::Model,
    patch: CommissionAmountsPatch,
) -> Result<commission::Model, DomainError> {
    let broker_amount = patch
        .broker_commission_amount
        .unwrap_or(commission.broker_commission_amount);
    let total = receipt_sum(db, commission.id).await?;

    let mut active: commission::ActiveModel = commission.into();
    if let Some(agency) = patch.agency_commission_amount {
        active.agency_commission_amount = Set(agency);
    }
    if let Some(broker) = patch.broker_commission_amount {
        active.broker_commission_amount = Set(broker);
    }
    active.status = Set(derive_status(total, broker_amount).to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());

    Ok(active.update(db).await?)
}

/// Direct edits of the agency/broker split amounts
pub async fn update_amounts(
    db: &DatabaseConnection,
    commission_id: i32,
    patch: CommissionAmountsPatch,
) -> Result<commission::Model, DomainError> {
    if patch.agency_commission_amount.map_or(false, |v| v < 0.0)
        || patch.broker_commission_amount.map_or(false, |v| v < 0.0)
    {
        return Err(DomainError::Validation(
            "commission amounts must not be negative".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let commission = Commission::find_by_id(commission_id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;
    let updated = apply_amounts(&txn, commission, patch).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Manually delete a commission. Terminal; the payment history goes with it.
pub async fn delete_commission(
    db: &DatabaseConnection,
    commission_id: i32,
) -> Result<(), DomainError> {
    let txn = db.begin().await?;

    let commission = Commission::find_by_id(commission_id)
        .one(&txn)
        .await?
        .ok_or(DomainError::NotFound)?;

    Receipt::delete_many()
        .filter(receipt::Column::CommissionId.eq(commission.id))
        .exec(&txn)
        .await?;
    Commission::delete_by_id(commission.id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// List commissions with receipt totals joined by commission id
pub async fn list_commissions(
    db: &DatabaseConnection,
    filter: CommissionFilter,
) -> Result<Vec<CommissionWithTotals>, DomainError> {
    let mut condition = Condition::all();

    if let Some(owner_id) = filter.owner_id {
        condition = condition.add(commission::Column::OwnerId.eq(owner_id));
    }

    if let Some(status) = filter.status {
        condition = condition.add(commission::Column::Status.eq(status));
    }

    if let Some(value_status) = filter.value_status {
        condition = condition.add(commission::Column::ValueStatus.eq(value_status));
    }

    let commissions = Commission::find()
        .filter(condition)
        .order_by_desc(commission::Column::SaleDate)
        .all(db)
        .await?;

    let ids: Vec<i32> = commissions.iter().map(|c| c.id).collect();

    let mut totals: HashMap<i32, f64> = HashMap::new();

    if !ids.is_empty() {
        let receipts = Receipt::find()
            .filter(receipt::Column::CommissionId.is_in(ids))
            .all(db)
            .await?;

        for r in receipts {
            *totals.entry(r.commission_id).or_insert(0.0) += r.amount;
        }
    }

    let result = commissions
        .into_iter()
        .map(|c| {
            let total_received = totals.get(&c.id).copied().unwrap_or(0.0);
            let remaining = (c.broker_commission_amount - total_received).max(0.0);

            CommissionWithTotals {
                id: c.id,
                sale_id: c.sale_id,
                client_name: c.client_name,
                property: c.property,
                value_at_creation: c.value_at_creation,
                agency_commission_amount: c.agency_commission_amount,
                broker_commission_amount: c.broker_commission_amount,
                contract_date: c.contract_date,
                sale_date: c.sale_date,
                payment_date: c.payment_date,
                status: c.status,
                value_status: c.value_status,
                original_sale_amount: c.original_sale_amount,
                current_sale_amount: c.current_sale_amount,
                value_difference: c.value_difference,
                justification_text: c.justification_text,
                total_received,
                remaining,
            }
        })
        .collect();

    Ok(result)
}

/// Single commission with its full payment history
pub async fn get_commission(
    db: &DatabaseConnection,
    commission_id: i32,
) -> Result<CommissionDetails, DomainError> {
    let commission = Commission::find_by_id(commission_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let receipts = Receipt::find()
        .filter(receipt::Column::CommissionId.eq(commission_id))
        .order_by_asc(receipt::Column::Date)
        .all(db)
        .await?;

    let total_received: f64 = receipts.iter().map(|r| r.amount).sum();
    let remaining = (commission.broker_commission_amount - total_received).max(0.0);

    Ok(CommissionDetails {
        commission,
        receipts,
        total_received,
        remaining,
    })
}

/// List the receipts posted against a commission
pub async fn list_receipts(
    db: &DatabaseConnection,
    commission_id: i32,
) -> Result<Vec<receipt::Model>, DomainError> {
    Commission::find_by_id(commission_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;

    let receipts = Receipt::find()
        .filter(receipt::Column::CommissionId.eq(commission_id))
        .order_by_asc(receipt::Column::Date)
        .all(db)
        .await?;

    Ok(receipts)
}
