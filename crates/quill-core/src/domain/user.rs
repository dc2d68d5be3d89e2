use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a user account.
///
/// A closed enumeration: authorization points match on it exhaustively
/// instead of comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reader,
    Author,
    Admin,
}

impl Role {
    /// Whether this role may create posts.
    pub fn can_publish(self) -> bool {
        match self {
            Role::Author | Role::Admin => true,
            Role::Reader => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Author => "author",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reader" => Ok(Role::Reader),
            "author" => Ok(Role::Author),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// User entity - an account that reads, writes, and reacts to posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-user profile carrying the subscription state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub bio: String,
    pub is_subscribed: bool,
    pub subscription_end_date: Option<NaiveDate>,
}

impl Profile {
    /// Explicit factory invoked by the registration flow when the user is
    /// created. There is no implicit creation hook anywhere else.
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            bio: String::new(),
            is_subscribed: false,
            subscription_end_date: None,
        }
    }

    /// Derived subscription liveness.
    ///
    /// The raw `is_subscribed` flag is never cleared on expiry, so it alone
    /// must not grant entitlement: a past end date means inactive.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.is_subscribed && self.subscription_end_date.is_some_and(|end| end >= today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn stale_flag_does_not_grant_entitlement() {
        let today = Utc::now().date_naive();
        let mut profile = Profile::for_user(Uuid::new_v4());
        profile.is_subscribed = true;
        profile.subscription_end_date = Some(today - TimeDelta::days(1));

        assert!(!profile.is_active_on(today));
    }

    #[test]
    fn active_until_end_date_inclusive() {
        let today = Utc::now().date_naive();
        let mut profile = Profile::for_user(Uuid::new_v4());
        profile.is_subscribed = true;
        profile.subscription_end_date = Some(today);

        assert!(profile.is_active_on(today));
    }

    #[test]
    fn end_date_alone_is_not_enough() {
        let today = Utc::now().date_naive();
        let mut profile = Profile::for_user(Uuid::new_v4());
        profile.subscription_end_date = Some(today + TimeDelta::days(10));

        assert!(!profile.is_active_on(today));
    }
}
