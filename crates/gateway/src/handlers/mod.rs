//! API handlers module

pub mod account;
pub mod clauses;
pub mod contracts;
pub mod health;
