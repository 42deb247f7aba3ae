//! Caller identity and the role-based capability check.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::entry::UserId;
use crate::core::ScheduleError;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May read everything and write entries.
    Teacher,
    /// May read entries of their own class.
    Student,
}

/// What a caller may do with timetable entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create, update and delete entries.
    Write,
    /// List and fetch entries.
    Read,
}

impl Role {
    /// Whether this role grants `capability`.
    pub const fn allows(self, capability: Capability) -> bool {
        match (self, capability) {
            (Self::Teacher, _) | (Self::Student, Capability::Read) => true,
            (Self::Student, Capability::Write) => false,
        }
    }
}

/// Resolved identity of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// User identifier.
    pub id: UserId,
    /// Role of the user.
    pub role: Role,
    /// Class the user belongs to, if any.
    pub class_id: Option<String>,
}

impl Caller {
    /// A teacher with no class affiliation.
    pub const fn teacher(id: UserId) -> Self {
        Self {
            id,
            role: Role::Teacher,
            class_id: None,
        }
    }

    /// A student belonging to `class_id`.
    pub fn student(id: UserId, class_id: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Student,
            class_id: Some(class_id.into()),
        }
    }

    /// Fail with [`ScheduleError::Forbidden`] unless the role grants `capability`.
    pub const fn require(&self, capability: Capability) -> Result<(), ScheduleError> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            Err(ScheduleError::Forbidden)
        }
    }

    /// Class a read is confined to, if the caller is scoped to one.
    pub fn read_scope(&self) -> Option<&str> {
        match self.role {
            Role::Student => self.class_id.as_deref(),
            Role::Teacher => None,
        }
    }
}

/// Identity resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token was presented.
    #[error("access token required")]
    Unauthenticated,
    /// Token did not verify.
    #[error("invalid or expired token")]
    InvalidToken,
}

impl From<AuthError> for ScheduleError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => Self::Unauthenticated,
            AuthError::InvalidToken => Self::InvalidToken,
        }
    }
}

/// Resolves presented credentials to a [`Caller`].
#[async_trait]
pub trait AuthorizationGate: Send + Sync {
    /// Resolve `token`, which may be absent.
    async fn resolve_caller(&self, token: Option<&str>) -> Result<Caller, AuthError>;
}

/// Strip an optional `Bearer ` prefix from an authorization value.
pub fn bearer_token(raw: &str) -> Option<&str> {
    let raw = raw.trim_start();
    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
        .unwrap_or(raw)
        .trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn students_cannot_write() {
        let student = Caller::student(5, "1A");
        assert_eq!(student.require(Capability::Write), Err(ScheduleError::Forbidden));
        assert!(student.require(Capability::Read).is_ok());
        assert!(Caller::teacher(1).require(Capability::Write).is_ok());
    }

    #[test]
    fn only_affiliated_students_are_scoped() {
        assert_eq!(Caller::student(5, "1A").read_scope(), Some("1A"));
        let unaffiliated = Caller {
            id: 6,
            role: Role::Student,
            class_id: None,
        };
        assert_eq!(unaffiliated.read_scope(), None);
        let mut teacher = Caller::teacher(1);
        teacher.class_id = Some("3B".into());
        assert_eq!(teacher.read_scope(), None);
    }

    #[test]
    fn bearer_prefix_is_optional() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer   "), None);
    }
}
