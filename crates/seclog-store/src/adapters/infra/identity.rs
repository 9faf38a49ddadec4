use crate::domain::errors::IdentityError;
use crate::ports::outbound::IdentityProvider;
use parking_lot::RwLock;
use std::sync::Arc;

/// Fixed submitter identity, switchable between invocations.
///
/// Clones share the same identity slot, so a test can keep a handle after
/// moving the provider into a service.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    identity: Arc<RwLock<Option<String>>>,
}

impl StaticIdentity {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: Arc::new(RwLock::new(Some(identity.into()))),
        }
    }

    /// A provider with no identity; every lookup fails.
    pub fn unavailable() -> Self {
        Self {
            identity: Arc::new(RwLock::new(None)),
        }
    }

    pub fn switch_to(&self, identity: impl Into<String>) {
        *self.identity.write() = Some(identity.into());
    }

    pub fn revoke(&self) {
        *self.identity.write() = None;
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_identity(&self) -> Result<String, IdentityError> {
        match self.identity.read().as_deref() {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            Some(_) => Err(IdentityError::Unavailable("identity is empty".to_string())),
            None => Err(IdentityError::Unavailable(
                "no identity in invocation context".to_string(),
            )),
        }
    }
}
