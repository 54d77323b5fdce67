//! Authenticated identity as seen by the storefront.
//!
//! Session issuance lives outside this crate; the embedding application hands
//! the store an [`Identity`] once sign-in completes.

use crate::ids::UserId;
use std::fmt;

/// Bearer token for identity-scoped endpoints. Never printed in full.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the Authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the token is blank.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// A signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Customer id.
    pub user_id: UserId,
    /// Bearer token for the customer's session.
    pub token: AuthToken,
}

impl Identity {
    /// Create a new identity.
    pub fn new(user_id: impl Into<UserId>, token: AuthToken) -> Self {
        Self {
            user_id: user_id.into(),
            token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_redacted_in_debug() {
        let identity = Identity::new("user-1", AuthToken::new("secret-token"));
        let printed = format!("{:?}", identity);
        assert!(printed.contains("user-1"));
        assert!(!printed.contains("secret-token"));
        assert_eq!(identity.token.expose(), "secret-token");
    }

    #[test]
    fn test_blank_token() {
        assert!(AuthToken::new("  ").is_empty());
        assert!(!AuthToken::new("t").is_empty());
    }
}
