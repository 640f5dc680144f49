//! # User Directory
//!
//! Registered people. Emails are unique ignoring case. A user's role is
//! fixed at registration: self-service registration always yields
//! [`Role::User`], and only seeding creates administrators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use leasehold_core::{EntityKind, LeaseholdError, UserId, ValidationError};

use crate::Engine;

/// What a user may do. Ordered by privilege: `User < Admin`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browses the catalog and requests bookings.
    #[default]
    User,
    /// Manages the catalog and decides bookings.
    Admin,
}

impl Role {
    /// Lowercase token, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// A registered person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Email address, unique ignoring case.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Role.
    pub role: Role,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// The fields of a user shown next to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Registration input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewUser {
    /// Check required fields and the email shape.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyField("email"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(ValidationError::InvalidEmail(self.email.clone())),
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        Ok(())
    }
}

impl Engine {
    /// Register a user with the `user` role.
    pub fn register_user(&self, new: NewUser) -> Result<User, LeaseholdError> {
        self.add_user(new, Role::User)
    }

    pub(crate) fn add_user(&self, new: NewUser, role: Role) -> Result<User, LeaseholdError> {
        new.validate()?;
        let id: UserId = self.ids.users.next();
        let user = User {
            id,
            email: new.email.trim().to_string(),
            name: new.name.trim().to_string(),
            phone: new
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            role,
            created_at: self.clock.now(),
        };
        let user = self.users.insert_checked(id, user, |candidate, existing| {
            if existing
                .values()
                .any(|u| u.email.eq_ignore_ascii_case(&candidate.email))
            {
                tracing::warn!(email = %candidate.email, "registration rejected: email taken");
                return Err(LeaseholdError::conflict(format!(
                    "email {} is already registered",
                    candidate.email
                )));
            }
            Ok(())
        })?;
        tracing::info!(user_id = %id, role = ?role, "user registered");
        Ok(user)
    }

    /// Fetch a user.
    pub fn user(&self, id: UserId) -> Result<User, LeaseholdError> {
        self.users
            .get(&id)
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::User, id))
    }

    /// Find a user by email, ignoring case.
    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let email = email.trim();
        self.users
            .filter(|u| u.email.eq_ignore_ascii_case(email))
            .into_iter()
            .next()
    }

    /// All users in id order.
    pub fn users(&self) -> Vec<User> {
        self.users.list()
    }
}
