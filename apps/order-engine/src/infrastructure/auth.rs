//! Bearer-token actor resolution.
//!
//! Real identity management is an external collaborator; this adapter only
//! resolves an opaque bearer token to an [`Actor`]. The static table
//! implementation serves tests and development.

use std::collections::HashMap;

use crate::domain::authorization::Actor;

/// Resolves bearer tokens to actors.
pub trait Authenticator: Send + Sync {
    /// Resolve a token; None means the token is unknown or expired.
    fn authenticate(&self, token: &str) -> Option<Actor>;
}

/// Token table built at startup.
#[derive(Debug, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, Actor>,
}

impl StaticTokenAuthenticator {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for an actor.
    pub fn insert(&mut self, token: impl Into<String>, actor: Actor) {
        self.tokens.insert(token.into(), actor);
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, token: &str) -> Option<Actor> {
        self.tokens.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::authorization::Role;
    use crate::domain::shared::ActorId;

    #[test]
    fn known_token_resolves() {
        let mut auth = StaticTokenAuthenticator::new();
        auth.insert(
            "tok-1",
            Actor::new(ActorId::new("cust-1"), Role::Customer, vec![]),
        );

        assert!(auth.authenticate("tok-1").is_some());
        assert!(auth.authenticate("tok-2").is_none());
    }
}
