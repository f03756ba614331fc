use super::{NetworkConfigReconciler, confirmation::PendingConfirmation};
use crate::types::{
    ApplyOutcome, NetworkConfig, OnionHosts, ReconcilerState, SessionMode, TransportTimeouts,
};
use serde::Serialize;

/// Which buttons of the proxy form are currently disabled
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonFlags {
    pub revert_disabled: bool,
    pub save_disabled: bool,
    pub reset_disabled: bool,
}

/// Snapshot of everything a settings screen renders
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub state: ReconcilerState,
    pub host: String,
    pub port: String,
    pub use_socks_proxy: bool,
    pub onion_hosts: OnionHosts,
    pub onion_hosts_enabled: bool,
    pub session_mode: SessionMode,
    pub session_mode_visible: bool,
    pub timeouts: TransportTimeouts,
    pub buttons: ButtonFlags,
    pub committed: NetworkConfig,
    pub pending_confirmation: Option<PendingConfirmation>,
    pub last_outcome: Option<ApplyOutcome>,
}

impl From<&NetworkConfigReconciler> for SettingsView {
    fn from(reconciler: &NetworkConfigReconciler) -> Self {
        Self {
            state: reconciler.state(),
            host: reconciler.host_text().to_string(),
            port: reconciler.port_text().to_string(),
            use_socks_proxy: reconciler.use_socks_proxy(),
            onion_hosts: reconciler.onion_hosts(),
            onion_hosts_enabled: reconciler.onion_hosts_enabled(),
            session_mode: reconciler.session_mode(),
            session_mode_visible: reconciler.developer_tools(),
            timeouts: reconciler.timeouts(),
            buttons: ButtonFlags {
                revert_disabled: reconciler.revert_disabled(),
                save_disabled: reconciler.save_disabled(),
                reset_disabled: reconciler.reset_disabled(),
            },
            committed: reconciler.committed().clone(),
            pending_confirmation: reconciler.pending_confirmation().cloned(),
            last_outcome: reconciler.last_outcome(),
        }
    }
}
