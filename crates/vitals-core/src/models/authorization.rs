use serde::{Deserialize, Serialize};

/// Read-permission state for the provider.
///
/// Moves one way in normal operation: `NotRequested` to `Granted` or
/// `Denied`. A grant is sticky; later failed or denied requests do not
/// demote it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    #[default]
    NotRequested,
    Granted,
    /// Denied by the user, or the provider is unavailable.
    Denied,
}

impl AuthorizationState {
    pub fn is_granted(self) -> bool {
        self == AuthorizationState::Granted
    }

    /// The state after a request resolved with `granted`.
    pub fn resolve(self, granted: bool) -> Self {
        match (self, granted) {
            (_, true) | (AuthorizationState::Granted, false) => AuthorizationState::Granted,
            (_, false) => AuthorizationState::Denied,
        }
    }
}
