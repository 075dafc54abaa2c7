//! Client-side authentication state.
//!
//! Synthesises an identity from the `(token, role, name)` triple a client
//! persisted after signin. The token is only checked for presence: signature
//! and expiry are enforced server-side on every request, never here.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::Role;

pub const TOKEN_KEY: &str = "authToken";
pub const ROLE_KEY: &str = "userRole";
pub const NAME_KEY: &str = "userName";

/// Read access to whatever the client persisted (browser storage, keychain, ...).
pub trait CredentialStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
}

impl CredentialStorage for HashMap<String, String> {
    fn get_item(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Who the client believes it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated {
        name: String,
        role: Role,
        /// Scheme the identity was established with (`"jwt"`).
        authentication_type: &'static str,
    },
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated { .. })
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Identity::Authenticated { name, .. } => Some(name),
            Identity::Anonymous => None,
        }
    }

    pub fn is_in_role(&self, role: &str) -> bool {
        match self {
            Identity::Authenticated { role: r, .. } => r.as_str() == role,
            Identity::Anonymous => false,
        }
    }
}

type Listener = Box<dyn Fn(&Identity) + Send + Sync>;

/// Derives [`Identity`] from stored credentials and fans out changes.
pub struct AuthStateProvider<S> {
    storage: S,
    listeners: Mutex<Vec<Listener>>,
}

impl<S: CredentialStorage> AuthStateProvider<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current identity, re-read from storage on every call.
    pub fn authentication_state(&self) -> Identity {
        let token = self.storage.get_item(TOKEN_KEY);
        if token.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Identity::Anonymous;
        }

        let name = self
            .storage
            .get_item(NAME_KEY)
            .unwrap_or_else(|| Role::USER.to_string());
        let role = self
            .storage
            .get_item(ROLE_KEY)
            .map(Role::new)
            .unwrap_or_default();

        Identity::Authenticated {
            name,
            role,
            authentication_type: "jwt",
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&Identity) + Send + Sync + 'static) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(Box::new(listener));
        }
    }

    /// Call after the client wrote or cleared credentials.
    pub fn notify_state_changed(&self) -> Identity {
        let state = self.authentication_state();
        if let Ok(listeners) = self.listeners.lock() {
            for listener in listeners.iter() {
                listener(&state);
            }
        }
        state
    }
}
