//! Session Context
//!
//! Identity of the caller as resolved by the out-of-scope auth layer. The
//! withdrawal path trusts this over any caller-supplied account id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for a settlement operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Authenticated user ID from the active session
    pub user_id: Uuid,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl SessionContext {
    /// Create a context for an authenticated user
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            correlation_id: None,
        }
    }

    /// Attach a correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let user_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let ctx = SessionContext::new(user_id).with_correlation_id(correlation_id);

        assert_eq!(ctx.user_id, user_id);
        assert_eq!(ctx.correlation_id, Some(correlation_id));
    }
}
