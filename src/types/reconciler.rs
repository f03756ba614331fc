use super::network::NetworkConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally visible state of a settings screen.
///
/// ```text
///            field edit                save / toggle
///   Idle ───────────────► Editing ─────────────────► PendingApply
///    ▲                      ▲  ▲                       │      │
///    │                      │  └──────── dismiss ──────┘      │ confirm
///    │                      │                                 ▼
///    └──── apply ok ────────┴──────── apply failed ───── Applying
/// ```
///
/// The state is derived from the staged fields, it is never stored.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReconcilerState {
    /// Every displayed value equals the committed one
    #[default]
    Idle,
    /// At least one displayed value differs from the committed one
    Editing,
    /// A confirmation dialog is waiting for the user
    PendingApply,
    /// A confirmed change is being applied remotely
    Applying,
}

/// Fields of the settings screen that go through the staged apply flow
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingsField {
    ProxyAddress,
    SocksProxy,
    OnionHosts,
    SessionMode,
    Timeouts,
}

impl SettingsField {
    /// Take this field from `from` and every other field from `onto`.
    ///
    /// The SOCKS switch also carries the proxy preset that comes with it.
    pub fn carry(self, from: &NetworkConfig, onto: &NetworkConfig) -> NetworkConfig {
        match self {
            SettingsField::ProxyAddress => onto.with_proxy(from.proxy.clone()),
            SettingsField::SocksProxy => onto.with_socks_proxy(from.use_socks_proxy),
            SettingsField::OnionHosts => onto.with_onion_hosts(from.onion_hosts),
            SettingsField::SessionMode => onto.with_session_mode(from.session_mode),
            SettingsField::Timeouts => onto.with_timeouts(from.timeouts),
        }
    }
}

/// Why a mutation was not accepted.
///
/// A rejection never changes any state.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rejected {
    /// A confirmation or an apply is outstanding
    Busy,
    /// Host or port text does not pass validation
    InvalidInput,
    /// The requested value equals the current one
    Unchanged,
    /// Onion hosts can only be chosen while the SOCKS proxy is enabled
    ProxyDisabled,
    /// Session mode is only selectable with developer tools enabled
    DeveloperToolsDisabled,
    /// There is no confirmation to act on
    NothingPending,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejected::Busy => "a network settings change is already in progress",
            Rejected::InvalidInput => "invalid proxy host or port",
            Rejected::Unchanged => "value is unchanged",
            Rejected::ProxyDisabled => "onion hosts require the SOCKS proxy to be enabled",
            Rejected::DeveloperToolsDisabled => "session mode requires developer tools",
            Rejected::NothingPending => "no pending confirmation",
        };

        f.write_str(reason)
    }
}

/// Result of feeding a remote apply result back into a screen
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplyOutcome {
    /// The candidate became the committed config
    Committed,
    /// The apply failed and the displayed value was restored
    RolledBack,
    /// The result belongs to an apply that is no longer in flight
    Stale,
    /// The screen was closed before the result arrived
    Discarded,
}

/// Identifies one confirmed apply of one screen
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ApplyTicket(pub u64);
