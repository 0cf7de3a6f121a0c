//! SeaORM entity models
//!
//! Database entities for the contracts API

mod contract;
mod knowledge_base_clause;
mod service_request;
mod user_profile;

pub use contract::{
    Entity as ContractEntity,
    Model as Contract,
    ActiveModel as ContractActiveModel,
    Column as ContractColumn,
    ContractStatus,
};

pub use service_request::{
    Entity as ServiceRequestEntity,
    Model as ServiceRequest,
    ActiveModel as ServiceRequestActiveModel,
    Column as ServiceRequestColumn,
    ServiceType,
};

pub use user_profile::{
    Entity as UserProfileEntity,
    Model as UserProfile,
    ActiveModel as UserProfileActiveModel,
    Column as UserProfileColumn,
};

pub use knowledge_base_clause::{
    Entity as KnowledgeBaseClauseEntity,
    Model as KnowledgeBaseClause,
    ActiveModel as KnowledgeBaseClauseActiveModel,
    Column as KnowledgeBaseClauseColumn,
    ClauseCategory,
};
