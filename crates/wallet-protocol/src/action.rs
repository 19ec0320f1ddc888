//! Action kinds and cluster selection

use serde::{Deserialize, Serialize};

/// Wallet action kinds carried over the deep-link transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Establish a session (unauthenticated handshake)
    Connect,
    /// Tear down the current session
    Disconnect,
    /// Arbitrary signed operation within an established session
    SignRequest,
}

impl Action {
    /// Path segment appended to the wallet base URL for outbound requests
    pub fn path(&self) -> &'static str {
        match self {
            Action::Connect => "connect",
            Action::Disconnect => "disconnect",
            Action::SignRequest => "signRequest",
        }
    }

    /// Path segment the wallet redirects back to for this action
    pub fn callback_path(&self) -> &'static str {
        match self {
            Action::Connect => "onConnect",
            Action::Disconnect => "onDisconnect",
            Action::SignRequest => "onSignRequest",
        }
    }

    /// Classify an inbound callback URL path (case-sensitive substring match)
    pub fn from_callback_path(path: &str) -> Option<Self> {
        [Action::Connect, Action::Disconnect, Action::SignRequest]
            .into_iter()
            .find(|action| path.contains(action.callback_path()))
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Target cluster advertised during connect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cluster {
    #[serde(rename = "mainnet-beta")]
    MainnetBeta,
    #[serde(rename = "testnet")]
    Testnet,
    #[serde(rename = "devnet")]
    Devnet,
}

impl Cluster {
    /// Wire representation used in the `cluster` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Testnet => "testnet",
            Cluster::Devnet => "devnet",
        }
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Self::MainnetBeta
    }
}

impl std::fmt::Display for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_callback_paths() {
        assert_eq!(
            Action::from_callback_path("/onConnect"),
            Some(Action::Connect)
        );
        assert_eq!(
            Action::from_callback_path("/ul/onDisconnect"),
            Some(Action::Disconnect)
        );
        assert_eq!(
            Action::from_callback_path("/onSignRequest"),
            Some(Action::SignRequest)
        );
        assert_eq!(Action::from_callback_path("/onSomethingElse"), None);
    }

    #[test]
    fn classification_is_case_sensitive() {
        assert_eq!(Action::from_callback_path("/onconnect"), None);
    }

    #[test]
    fn cluster_wire_names() {
        assert_eq!(Cluster::MainnetBeta.as_str(), "mainnet-beta");
        assert_eq!(Cluster::default(), Cluster::MainnetBeta);
    }
}
