//! Token-table authorization gate for development and testing.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::auth::{bearer_token, AuthError, AuthorizationGate, Caller};

/// Resolves tokens against a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenGate {
    callers: HashMap<String, Caller>,
}

impl StaticTokenGate {
    /// Create an empty gate; every token is rejected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` for `caller`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, caller: Caller) -> Self {
        self.callers.insert(token.into(), caller);
        self
    }

    /// Number of registered tokens.
    pub fn len(&self) -> usize {
        self.callers.len()
    }

    /// True when no token is registered.
    pub fn is_empty(&self) -> bool {
        self.callers.is_empty()
    }
}

#[async_trait]
impl AuthorizationGate for StaticTokenGate {
    async fn resolve_caller(&self, token: Option<&str>) -> Result<Caller, AuthError> {
        let token = token.and_then(bearer_token).ok_or(AuthError::Unauthenticated)?;
        self.callers.get(token).cloned().ok_or_else(|| {
            tracing::debug!("unknown token presented");
            AuthError::InvalidToken
        })
    }
}
