//! Service request entity: the audit trail of AI usage

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of paid service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "ANL")]
    Analyze,
    #[serde(rename = "GEN")]
    Generate,
    #[serde(rename = "QRY")]
    Query,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Analyze => "ANL",
            ServiceType::Generate => "GEN",
            ServiceType::Query => "QRY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceType::Analyze => "Contract analysis",
            ServiceType::Generate => "Contract generation",
            ServiceType::Query => "Knowledge base query",
        }
    }
}

impl From<String> for ServiceType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "GEN" => ServiceType::Generate,
            "QRY" => ServiceType::Query,
            _ => ServiceType::Analyze,
        }
    }
}

impl From<ServiceType> for String {
    fn from(service_type: ServiceType) -> Self {
        service_type.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub owner_id: Uuid,

    /// Cleared when the contract is deleted
    pub related_contract_id: Option<Uuid>,

    #[sea_orm(column_type = "Text")]
    pub service_type: String,

    pub tokens_used: i32,

    pub is_paid: bool,

    pub request_timestamp: DateTimeWithTimeZone,
}

impl Model {
    pub fn kind(&self) -> ServiceType {
        ServiceType::from(self.service_type.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contract::Entity",
        from = "Column::RelatedContractId",
        to = "super::contract::Column::Id",
        on_delete = "SetNull"
    )]
    Contract,
}

impl Related<super::contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
