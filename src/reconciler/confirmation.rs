use crate::types::{NetworkConfig, OnionHosts, SessionMode, SettingsField};
use serde::{Deserialize, Serialize};

const RECONNECT_NOTICE: &str = "Updating settings will re-connect the client to all servers.";
const UPDATE_LABEL: &str = "Update";
const CONFIRM_LABEL: &str = "Confirm";

/// The change a confirmation dialog asks about
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum ChangeKind {
    SocksProxy(bool),
    OnionHosts(OnionHosts),
    SessionMode(SessionMode),
    ProxyAddress,
    ResetProxyAddress,
    Timeouts,
}

impl ChangeKind {
    pub fn field(&self) -> SettingsField {
        match self {
            ChangeKind::SocksProxy(_) => SettingsField::SocksProxy,
            ChangeKind::OnionHosts(_) => SettingsField::OnionHosts,
            ChangeKind::SessionMode(_) => SettingsField::SessionMode,
            ChangeKind::ProxyAddress | ChangeKind::ResetProxyAddress => {
                SettingsField::ProxyAddress
            }
            ChangeKind::Timeouts => SettingsField::Timeouts,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ChangeKind::SocksProxy(true) => "Use SOCKS proxy?",
            ChangeKind::SocksProxy(false) => "Use direct Internet connection?",
            ChangeKind::OnionHosts(_) => "Update .onion hosts setting?",
            ChangeKind::SessionMode(_) => "Update transport isolation mode?",
            ChangeKind::ProxyAddress
            | ChangeKind::ResetProxyAddress
            | ChangeKind::Timeouts => "Update network settings?",
        }
    }

    fn lead(&self) -> Option<&'static str> {
        match self {
            ChangeKind::OnionHosts(OnionHosts::Never) => Some("Onion hosts will not be used."),
            ChangeKind::OnionHosts(OnionHosts::Prefer) => {
                Some("Onion hosts will be used when available.")
            }
            ChangeKind::OnionHosts(OnionHosts::Required) => {
                Some("Onion hosts will be required for connection.")
            }
            ChangeKind::SessionMode(SessionMode::User) => Some(
                "A separate TCP connection (and SOCKS credential) will be used for each chat profile.",
            ),
            ChangeKind::SessionMode(SessionMode::Entity) => Some(
                "A separate TCP connection (and SOCKS credential) will be used for each contact and group member. \
                 With many connections battery and traffic use can be substantially higher and some connections may fail.",
            ),
            ChangeKind::ResetProxyAddress => {
                Some("The proxy address will be reset to localhost:9050.")
            }
            ChangeKind::SocksProxy(_) | ChangeKind::ProxyAddress | ChangeKind::Timeouts => None,
        }
    }

    fn body(&self) -> String {
        match self {
            // the proxy switch has its own explanations instead of the reconnect notice
            ChangeKind::SocksProxy(true) => {
                "Access the servers via the SOCKS proxy on port 9050? The proxy must be started before enabling this option."
                    .to_string()
            }
            ChangeKind::SocksProxy(false) => {
                "If you confirm, the messaging servers will be able to see your IP address, and your provider which servers you are connecting to."
                    .to_string()
            }
            kind => match kind.lead() {
                Some(lead) => format!("{lead}\n\n{RECONNECT_NOTICE}"),
                None => RECONNECT_NOTICE.to_string(),
            },
        }
    }

    fn confirm_label(&self) -> &'static str {
        match self {
            ChangeKind::SocksProxy(_) => CONFIRM_LABEL,
            _ => UPDATE_LABEL,
        }
    }
}

/// A proposed transition waiting for the user's decision
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingConfirmation {
    pub change: ChangeKind,
    pub title: String,
    pub body: String,
    pub confirm_label: String,
    pub from: NetworkConfig,
    pub to: NetworkConfig,
}

impl PendingConfirmation {
    pub fn new(change: ChangeKind, from: NetworkConfig, to: NetworkConfig) -> Self {
        Self {
            title: change.title().to_string(),
            body: change.body(),
            confirm_label: change.confirm_label().to_string(),
            change,
            from,
            to,
        }
    }

    pub fn field(&self) -> SettingsField {
        self.change.field()
    }
}
