//! Subscription ledger - activation and derived liveness.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta, Utc};
use uuid::Uuid;

use crate::domain::Profile;
use crate::error::DomainError;
use crate::ports::ProfileRepository;

/// Length of one activation, in days.
pub const SUBSCRIPTION_DAYS: i64 = 30;

/// Snapshot of a user's subscription state, liveness derived.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionStatus {
    pub active: bool,
    pub end_date: Option<NaiveDate>,
}

/// The single writer of subscription state.
#[derive(Clone)]
pub struct SubscriptionService {
    profiles: Arc<dyn ProfileRepository>,
}

impl SubscriptionService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Activate premium for a user and return the new expiry.
    ///
    /// Activation is not cumulative: re-activating a still-active
    /// subscription resets the clock to 30 days from today instead of
    /// extending the existing expiry. Product-policy choice carried over
    /// from the original behavior.
    pub async fn activate(&self, user_id: Uuid) -> Result<NaiveDate, DomainError> {
        let mut profile = self
            .profiles
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| Profile::for_user(user_id));

        let expiry = Utc::now().date_naive() + TimeDelta::days(SUBSCRIPTION_DAYS);
        profile.is_subscribed = true;
        profile.subscription_end_date = Some(expiry);
        self.profiles.save(profile).await?;
        Ok(expiry)
    }

    /// Derived premium liveness - what the entitlement evaluator must be
    /// fed. Never trusts the raw flag on its own.
    pub async fn is_premium(&self, user_id: Uuid) -> Result<bool, DomainError> {
        let today = Utc::now().date_naive();
        Ok(self
            .profiles
            .find_by_user(user_id)
            .await?
            .is_some_and(|p| p.is_active_on(today)))
    }

    pub async fn status(&self, user_id: Uuid) -> Result<SubscriptionStatus, DomainError> {
        let today = Utc::now().date_naive();
        let profile = self.profiles.find_by_user(user_id).await?;
        Ok(SubscriptionStatus {
            active: profile.as_ref().is_some_and(|p| p.is_active_on(today)),
            end_date: profile.and_then(|p| p.subscription_end_date),
        })
    }
}
