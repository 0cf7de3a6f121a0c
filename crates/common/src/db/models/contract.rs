//! Contract entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contract lifecycle tag. There is no enforced transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    #[serde(rename = "UPL")]
    Uploaded,
    #[serde(rename = "GEN")]
    Generated,
    #[serde(rename = "ARC")]
    Archived,
    #[serde(rename = "ANL")]
    AnalysisComplete,
}

impl ContractStatus {
    /// Stored column value
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Uploaded => "UPL",
            ContractStatus::Generated => "GEN",
            ContractStatus::Archived => "ARC",
            ContractStatus::AnalysisComplete => "ANL",
        }
    }

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            ContractStatus::Uploaded => "Uploaded",
            ContractStatus::Generated => "Generated",
            ContractStatus::Archived => "Archived",
            ContractStatus::AnalysisComplete => "Analysis complete",
        }
    }
}

impl From<String> for ContractStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "GEN" => ContractStatus::Generated,
            "ARC" => ContractStatus::Archived,
            "ANL" => ContractStatus::AnalysisComplete,
            _ => ContractStatus::Uploaded,
        }
    }
}

impl From<ContractStatus> for String {
    fn from(status: ContractStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub owner_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub original_text: String,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    /// Structured analysis output as JSONB
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub analysis_results: Option<serde_json::Value>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the contract status as an enum
    pub fn contract_status(&self) -> ContractStatus {
        ContractStatus::from(self.status.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_request::Entity")]
    ServiceRequests,
}

impl Related<super::service_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
