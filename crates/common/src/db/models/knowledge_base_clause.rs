//! Knowledge base clause entity: pre-approved legal text fragments

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Contract category a clause belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseCategory {
    #[serde(rename = "GEN")]
    General,
    #[serde(rename = "EMP")]
    Employment,
    #[serde(rename = "REN")]
    Rental,
    #[serde(rename = "NDA")]
    Nda,
}

impl ClauseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseCategory::General => "GEN",
            ClauseCategory::Employment => "EMP",
            ClauseCategory::Rental => "REN",
            ClauseCategory::Nda => "NDA",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ClauseCategory::General => "General",
            ClauseCategory::Employment => "Employment",
            ClauseCategory::Rental => "Rental",
            ClauseCategory::Nda => "Non-disclosure",
        }
    }
}

impl fmt::Display for ClauseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClauseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GEN" => Ok(ClauseCategory::General),
            "EMP" => Ok(ClauseCategory::Employment),
            "REN" => Ok(ClauseCategory::Rental),
            "NDA" => Ok(ClauseCategory::Nda),
            other => Err(format!("unknown clause type: {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "knowledge_base_clauses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub clause_type: String,

    #[sea_orm(column_type = "Text")]
    pub text_content: String,

    pub is_verified: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
