use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub sale_id: i32,
    pub owner_id: i32,
    pub client_name: String, // Snapshot at creation time
    pub property: String,    // Snapshot description of the sold property
    pub value_at_creation: f64,
    pub agency_commission_amount: f64,
    pub broker_commission_amount: f64,
    pub contract_date: String,
    pub sale_date: String,
    pub payment_date: Option<String>,
    pub status: String,       // 'pending', 'partial', 'received'
    pub value_status: String, // 'up_to_date', 'outdated', 'justified'
    pub original_sale_amount: Option<f64>,
    pub current_sale_amount: Option<f64>,
    pub value_difference: Option<f64>,
    pub justification_text: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sale::Entity",
        from = "Column::SaleId",
        to = "super::sale::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Sale,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sale.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
