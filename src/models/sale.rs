use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    pub owner_id: i32,
    pub property_type: String, // 'apartamento', 'casa', 'terreno', 'comercial', ...
    pub address: String,
    pub amount: f64, // Valor da venda (BRL)
    pub sale_date: String,
    pub broker_commission_amount: Option<f64>,
    pub agency_commission_amount: Option<f64>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaleDto {
    pub id: Option<i32>,
    pub client_id: i32,
    pub owner_id: i32,
    pub property_type: String,
    pub address: String,
    pub amount: f64,
    pub sale_date: String,
    pub broker_commission_amount: Option<f64>,
    pub agency_commission_amount: Option<f64>,
    pub notes: Option<String>,
}
