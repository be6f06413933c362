//! Goal Service - Received-vs-target progress from commissions and receipts
//!
//! Receipts are attributed to the period in which they were paid, never the
//! period of the underlying sale. A sale closed in December whose receipt is
//! posted in January counts toward January's received total only.

use chrono::Utc;
use sea_orm::*;
use std::collections::HashMap;

use crate::domain::DomainError;
use crate::models::annual_goal::{self, Entity as AnnualGoal};
use crate::models::commission::{self, Entity as Commission};
use crate::models::monthly_goal::{self, Entity as MonthlyGoal};
use crate::models::receipt::{self, Entity as Receipt};

/// A month-of-year or whole-year reporting period
#[derive(Debug, Clone, Copy)]
pub struct Period {
    pub year: i32,
    pub month: Option<u32>,
}

impl Period {
    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    // Dates are stored as 'YYYY-MM-DD' text, so period membership is a
    // prefix match
    fn prefix(&self) -> String {
        match self.month {
            Some(m) => format!("{:04}-{:02}", self.year, m),
            None => format!("{:04}-", self.year),
        }
    }
}

/// One month of an annual rollup
#[derive(Debug, Clone, serde::Serialize)]
pub struct MonthlyBucket {
    pub month: u32,
    pub received: f64,
}

/// Twelve monthly buckets plus the annual target, for charting
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnnualRollup {
    pub year: i32,
    pub months: Vec<MonthlyBucket>,
    pub total_received: f64,
    pub annual_goal_value: Option<f64>,
    pub progress_percent: f64,
}

/// Dashboard summary for one month
#[derive(Debug, Clone, serde::Serialize)]
pub struct MonthlySummary {
    pub month: u32,
    pub year: i32,
    pub received: f64,
    pub pending: f64,
    pub goal_value: Option<f64>,
    pub progress_percent: f64,
}

/// Cash received in the period: the sum of receipt amounts dated inside it
pub async fn received_total(
    db: &DatabaseConnection,
    owner_id: i32,
    period: Period,
) -> Result<f64, DomainError> {
    let receipts = Receipt::find()
        .join(JoinType::InnerJoin, receipt::Relation::Commission.def())
        .filter(commission::Column::OwnerId.eq(owner_id))
        .filter(receipt::Column::Date.starts_with(&period.prefix()))
        .all(db)
        .await?;

    Ok(receipts.iter().map(|r| r.amount).sum())
}

/// Outstanding broker commission for the period: over pending/partial
/// commissions whose sale date falls in it, the broker amount minus what was
/// received in the same period, clamped at zero per commission.
pub async fn pending_total(
    db: &DatabaseConnection,
    owner_id: i32,
    period: Period,
) -> Result<f64, DomainError> {
    let prefix = period.prefix();

    let commissions = Commission::find()
        .filter(commission::Column::OwnerId.eq(owner_id))
        .filter(commission::Column::Status.is_in(["pending", "partial"]))
        .filter(commission::Column::SaleDate.starts_with(&prefix))
        .all(db)
        .await?;

    if commissions.is_empty() {
        return Ok(0.0);
    }

    let ids: Vec<i32> = commissions.iter().map(|c| c.id).collect();

    let receipts = Receipt::find()
        .filter(receipt::Column::CommissionId.is_in(ids))
        .filter(receipt::Column::Date.starts_with(&prefix))
        .all(db)
        .await?;

    let mut received: HashMap<i32, f64> = HashMap::new();
    for r in receipts {
        *received.entry(r.commission_id).or_insert(0.0) += r.amount;
    }

    let total = commissions
        .iter()
        .map(|c| {
            let in_period = received.get(&c.id).copied().unwrap_or(0.0);
            (c.broker_commission_amount - in_period).max(0.0)
        })
        .sum();

    Ok(total)
}

/// Progress toward a goal, as a percentage. Zero when there is no target.
pub fn progress_percent(received: f64, goal_value: f64) -> f64 {
    if goal_value > 0.0 {
        received / goal_value * 100.0
    } else {
        0.0
    }
}

/// Twelve monthly received buckets for a year, plus the annual target
pub async fn annual_rollup(
    db: &DatabaseConnection,
    owner_id: i32,
    year: i32,
) -> Result<AnnualRollup, DomainError> {
    let receipts = Receipt::find()
        .join(JoinType::InnerJoin, receipt::Relation::Commission.def())
        .filter(commission::Column::OwnerId.eq(owner_id))
        .filter(receipt::Column::Date.starts_with(&format!("{:04}-", year)))
        .all(db)
        .await?;

    let mut buckets = [0.0f64; 12];
    for r in &receipts {
        // 'YYYY-MM-DD': the month lives at positions 5..7
        if let Some(month) = r.date.get(5..7).and_then(|m| m.parse::<usize>().ok()) {
            if (1..=12).contains(&month) {
                buckets[month - 1] += r.amount;
            }
        }
    }

    let total_received: f64 = buckets.iter().sum();

    let goal = get_annual_goal(db, owner_id, year).await?;
    let goal_value = goal.map(|g| g.value);

    Ok(AnnualRollup {
        year,
        months: buckets
            .iter()
            .enumerate()
            .map(|(i, received)| MonthlyBucket {
                month: (i + 1) as u32,
                received: *received,
            })
            .collect(),
        total_received,
        annual_goal_value: goal_value,
        progress_percent: progress_percent(total_received, goal_value.unwrap_or(0.0)),
    })
}

/// Received, pending and goal progress for one month's dashboard cards
pub async fn monthly_summary(
    db: &DatabaseConnection,
    owner_id: i32,
    month: u32,
    year: i32,
) -> Result<MonthlySummary, DomainError> {
    let period = Period::month(year, month);

    let received = received_total(db, owner_id, period).await?;
    let pending = pending_total(db, owner_id, period).await?;
    let goal = get_monthly_goal(db, owner_id, month, year).await?;
    let goal_value = goal.map(|g| g.value);

    Ok(MonthlySummary {
        month,
        year,
        received,
        pending,
        goal_value,
        progress_percent: progress_percent(received, goal_value.unwrap_or(0.0)),
    })
}

/// Get the monthly goal row for a period, if set
pub async fn get_monthly_goal(
    db: &DatabaseConnection,
    owner_id: i32,
    month: u32,
    year: i32,
) -> Result<Option<monthly_goal::Model>, DomainError> {
    let goal = MonthlyGoal::find()
        .filter(monthly_goal::Column::OwnerId.eq(owner_id))
        .filter(monthly_goal::Column::Month.eq(month as i32))
        .filter(monthly_goal::Column::Year.eq(year))
        .one(db)
        .await?;
    Ok(goal)
}

/// Get the annual goal row for a year, if set
pub async fn get_annual_goal(
    db: &DatabaseConnection,
    owner_id: i32,
    year: i32,
) -> Result<Option<annual_goal::Model>, DomainError> {
    let goal = AnnualGoal::find()
        .filter(annual_goal::Column::OwnerId.eq(owner_id))
        .filter(annual_goal::Column::Year.eq(year))
        .one(db)
        .await?;
    Ok(goal)
}

/// Set or replace the monthly target. One row per (owner, month, year).
pub async fn upsert_monthly_goal(
    db: &DatabaseConnection,
    owner_id: i32,
    month: u32,
    year: i32,
    value: f64,
) -> Result<monthly_goal::Model, DomainError> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::Validation(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }
    if value < 0.0 {
        return Err(DomainError::Validation(
            "goal value must not be negative".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();

    if let Some(existing) = get_monthly_goal(db, owner_id, month, year).await? {
        let mut active: monthly_goal::ActiveModel = existing.into();
        active.value = Set(value);
        active.updated_at = Set(now);
        Ok(active.update(db).await?)
    } else {
        let new_goal = monthly_goal::ActiveModel {
            owner_id: Set(owner_id),
            month: Set(month as i32),
            year: Set(year),
            value: Set(value),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(new_goal.insert(db).await?)
    }
}

/// Set or replace the annual target. One row per (owner, year).
pub async fn upsert_annual_goal(
    db: &DatabaseConnection,
    owner_id: i32,
    year: i32,
    value: f64,
) -> Result<annual_goal::Model, DomainError> {
    if value < 0.0 {
        return Err(DomainError::Validation(
            "goal value must not be negative".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();

    if let Some(existing) = get_annual_goal(db, owner_id, year).await? {
        let mut active: annual_goal::ActiveModel = existing.into();
        active.value = Set(value);
        active.updated_at = Set(now);
        Ok(active.update(db).await?)
    } else {
        let new_goal = annual_goal::ActiveModel {
            owner_id: Set(owner_id),
            year: Set(year),
            value: Set(value),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(new_goal.insert(db).await?)
    }
}
