//! Provider status rows.

use serde::{Deserialize, Serialize};

use super::ProviderId;

/// Connectivity as reported by an adapter's non-blocking check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl From<bool> for ConnectionStatus {
    fn from(connected: bool) -> Self {
        if connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

/// One row of a provider listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub provider: ProviderId,
    pub enabled: bool,
    pub model: Option<String>,
    pub status: ConnectionStatus,
    pub priority: i32,
}
