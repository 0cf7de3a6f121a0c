//! Balance check performed before any paid AI call

use crate::db::models::UserProfile;
use crate::errors::{AppError, Result};
use crate::metrics;
use tracing::warn;

/// Minimum-balance gate. The real cost is only known after the call, so the
/// balance may still end up below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub estimated_cost: i32,
}

impl AdmissionPolicy {
    pub fn new(estimated_cost: i32) -> Self {
        Self { estimated_cost }
    }

    pub fn check(&self, profile: &UserProfile, operation: &'static str) -> Result<()> {
        if profile.tokens_remaining < self.estimated_cost {
            metrics::record_admission_rejection(operation);
            warn!(
                user_id = %profile.user_id,
                operation,
                tokens_remaining = profile.tokens_remaining,
                required = self.estimated_cost,
                "Paid call refused: insufficient balance"
            );
            return Err(AppError::InsufficientTokens {
                required: self.estimated_cost,
                remaining: profile.tokens_remaining,
            });
        }
        Ok(())
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::new(500)
    }
}
