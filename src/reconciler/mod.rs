pub mod confirmation;
pub mod view;

use crate::{
    staged::{OnDismiss, Staged, StagedControl},
    types::{
        ApplyOutcome, ApplyTicket, NetworkConfig, OnionHosts, ProxyAddress, ReconcilerState,
        Rejected, SessionMode, SettingsField, TransportTimeouts,
    },
};
use confirmation::{ChangeKind, PendingConfirmation};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

pub use view::SettingsView;

/// Raw text of the proxy host and port inputs
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyForm {
    pub host: String,
    pub port: String,
}

impl ProxyForm {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
        }
    }

    /// The address these texts describe, if both pass validation
    pub fn address(&self) -> Option<ProxyAddress> {
        ProxyAddress::from_texts(&self.host, &self.port).ok()
    }
}

impl From<&ProxyAddress> for ProxyForm {
    fn from(address: &ProxyAddress) -> Self {
        Self::new(address.host.clone(), address.port.to_string())
    }
}

/// A confirmed change the caller has to apply remotely
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplyRequest {
    pub ticket: ApplyTicket,
    pub candidate: NetworkConfig,
}

#[derive(Clone, Debug)]
struct InFlight {
    ticket: ApplyTicket,
    field: SettingsField,
    candidate: NetworkConfig,
}

/// State of one network settings screen.
///
/// All mutations are synchronous and never block. The single suspending step,
/// the remote apply, is left to the caller: [`confirm`](Self::confirm) hands
/// out an [`ApplyRequest`] and the result comes back through
/// [`complete_apply`](Self::complete_apply).
#[derive(Clone, Debug)]
pub struct NetworkConfigReconciler {
    committed: NetworkConfig,
    proxy_form: Staged<ProxyForm>,
    socks_proxy: Staged<bool>,
    onion_hosts: Staged<OnionHosts>,
    session_mode: Staged<SessionMode>,
    timeouts: Staged<TransportTimeouts>,
    pending: Option<PendingConfirmation>,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    developer_tools: bool,
    last_outcome: Option<ApplyOutcome>,
}

impl NetworkConfigReconciler {
    pub fn new(committed: NetworkConfig, developer_tools: bool) -> Self {
        Self {
            proxy_form: Staged::new(ProxyForm::from(&committed.proxy)),
            socks_proxy: Staged::new(committed.use_socks_proxy),
            onion_hosts: Staged::new(committed.onion_hosts),
            session_mode: Staged::new(committed.session_mode),
            timeouts: Staged::new(committed.timeouts),
            committed,
            pending: None,
            in_flight: None,
            next_ticket: 0,
            developer_tools,
            last_outcome: None,
        }
    }

    pub fn committed(&self) -> &NetworkConfig {
        &self.committed
    }

    /// Move the baseline to a config committed elsewhere, e.g. by another
    /// screen.
    ///
    /// A pending change is carried over onto the new baseline so confirming
    /// it only changes its own field. Ignored while an apply is in flight, its
    /// result moves the baseline then.
    pub fn sync_committed(&mut self, live: NetworkConfig) -> bool {
        if self.in_flight.is_some() || live == self.committed {
            return false;
        }

        debug!("baseline moved to {live:?}");
        self.committed = live;
        self.rebase();

        if let Some(pending) = &mut self.pending {
            pending.to = pending.field().carry(&pending.to, &self.committed);
            pending.from = self.committed.clone();
        }

        true
    }

    pub fn state(&self) -> ReconcilerState {
        if self.in_flight.is_some() {
            ReconcilerState::Applying
        } else if self.pending.is_some() {
            ReconcilerState::PendingApply
        } else if self.controls().iter().any(|control| control.is_dirty()) {
            ReconcilerState::Editing
        } else {
            ReconcilerState::Idle
        }
    }

    pub fn host_text(&self) -> &str {
        &self.proxy_form.displayed().host
    }

    pub fn port_text(&self) -> &str {
        &self.proxy_form.displayed().port
    }

    pub fn use_socks_proxy(&self) -> bool {
        *self.socks_proxy.displayed()
    }

    pub fn onion_hosts(&self) -> OnionHosts {
        *self.onion_hosts.displayed()
    }

    pub fn session_mode(&self) -> SessionMode {
        *self.session_mode.displayed()
    }

    pub fn timeouts(&self) -> TransportTimeouts {
        *self.timeouts.displayed()
    }

    pub fn developer_tools(&self) -> bool {
        self.developer_tools
    }

    pub fn pending_confirmation(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    pub fn last_outcome(&self) -> Option<ApplyOutcome> {
        self.last_outcome
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some() || self.in_flight.is_some()
    }

    pub fn revert_disabled(&self) -> bool {
        self.is_busy() || !self.proxy_form.is_dirty()
    }

    pub fn save_disabled(&self) -> bool {
        self.is_busy()
            || self
                .proxy_form
                .displayed()
                .address()
                .is_none_or(|address| address == self.committed.proxy)
    }

    pub fn reset_disabled(&self) -> bool {
        self.is_busy() || self.committed.proxy.is_default()
    }

    pub fn onion_hosts_enabled(&self) -> bool {
        self.use_socks_proxy()
    }

    pub fn set_host_text(&mut self, host: impl Into<String>) -> Result<(), Rejected> {
        self.ensure_not_busy()?;

        let form = ProxyForm {
            host: host.into(),
            ..self.proxy_form.displayed().clone()
        };
        self.proxy_form.edit(form);
        Ok(())
    }

    pub fn set_port_text(&mut self, port: impl Into<String>) -> Result<(), Rejected> {
        self.ensure_not_busy()?;

        let form = ProxyForm {
            port: port.into(),
            ..self.proxy_form.displayed().clone()
        };
        self.proxy_form.edit(form);
        Ok(())
    }

    /// Put the committed host and port back into the inputs.
    pub fn revert_proxy(&mut self) -> Result<(), Rejected> {
        self.ensure_not_busy()?;

        if !self.proxy_form.is_dirty() {
            return Err(Rejected::Unchanged);
        }

        self.proxy_form.revert();
        Ok(())
    }

    /// Ask to apply the typed proxy address.
    ///
    /// Dismissing the dialog leaves the typed text in place.
    pub fn save_proxy(&mut self) -> Result<&PendingConfirmation, Rejected> {
        self.ensure_not_busy()?;

        let form = self.proxy_form.displayed().clone();
        let address = form.address().ok_or(Rejected::InvalidInput)?;

        if address == self.committed.proxy {
            return Err(Rejected::Unchanged);
        }

        let candidate = self.committed.with_proxy(address);
        self.proxy_form.propose(form, OnDismiss::Keep);
        Ok(self.stage(ChangeKind::ProxyAddress, candidate))
    }

    /// Ask to go back to `localhost:9050`.
    pub fn reset_proxy(&mut self) -> Result<&PendingConfirmation, Rejected> {
        self.ensure_not_busy()?;

        if self.committed.proxy.is_default() {
            return Err(Rejected::Unchanged);
        }

        let address = ProxyAddress::default();
        let candidate = self.committed.with_proxy(address.clone());
        self.proxy_form
            .propose(ProxyForm::from(&address), OnDismiss::Restore);
        Ok(self.stage(ChangeKind::ResetProxyAddress, candidate))
    }

    pub fn toggle_socks_proxy(&mut self, enable: bool) -> Result<&PendingConfirmation, Rejected> {
        self.ensure_not_busy()?;

        if enable == self.use_socks_proxy() {
            return Err(Rejected::Unchanged);
        }

        let candidate = self.committed.with_socks_proxy(enable);
        self.socks_proxy.propose(enable, OnDismiss::Restore);
        Ok(self.stage(ChangeKind::SocksProxy(enable), candidate))
    }

    pub fn select_onion_hosts(
        &mut self,
        mode: OnionHosts,
    ) -> Result<&PendingConfirmation, Rejected> {
        self.ensure_not_busy()?;

        if !self.onion_hosts_enabled() {
            return Err(Rejected::ProxyDisabled);
        }

        if mode == self.onion_hosts() {
            return Err(Rejected::Unchanged);
        }

        let candidate = self.committed.with_onion_hosts(mode);
        self.onion_hosts.propose(mode, OnDismiss::Restore);
        Ok(self.stage(ChangeKind::OnionHosts(mode), candidate))
    }

    pub fn select_session_mode(
        &mut self,
        mode: SessionMode,
    ) -> Result<&PendingConfirmation, Rejected> {
        if !self.developer_tools {
            return Err(Rejected::DeveloperToolsDisabled);
        }

        self.ensure_not_busy()?;

        if mode == self.session_mode() {
            return Err(Rejected::Unchanged);
        }

        let candidate = self.committed.with_session_mode(mode);
        self.session_mode.propose(mode, OnDismiss::Restore);
        Ok(self.stage(ChangeKind::SessionMode(mode), candidate))
    }

    pub fn update_timeouts(
        &mut self,
        timeouts: TransportTimeouts,
    ) -> Result<&PendingConfirmation, Rejected> {
        self.ensure_not_busy()?;

        if timeouts.validate().is_err() {
            return Err(Rejected::InvalidInput);
        }

        if timeouts == self.timeouts() {
            return Err(Rejected::Unchanged);
        }

        let candidate = self.committed.with_timeouts(timeouts);
        self.timeouts.propose(timeouts, OnDismiss::Restore);
        Ok(self.stage(ChangeKind::Timeouts, candidate))
    }

    /// The user declined the pending change.
    pub fn dismiss(&mut self) -> Result<(), Rejected> {
        let pending = self.pending.take().ok_or(Rejected::NothingPending)?;

        debug!("dismissed {:?}", pending.change);
        self.control_mut(pending.field()).dismiss();
        Ok(())
    }

    /// The user accepted the pending change; the caller now owns the apply.
    pub fn confirm(&mut self) -> Result<ApplyRequest, Rejected> {
        let pending = self.pending.take().ok_or(Rejected::NothingPending)?;
        let field = pending.field();

        self.control_mut(field).begin_apply();
        self.next_ticket += 1;
        let ticket = ApplyTicket(self.next_ticket);

        debug!("confirmed {:?} as {ticket:?}", pending.change);

        self.in_flight = Some(InFlight {
            ticket,
            field,
            candidate: pending.to.clone(),
        });
        self.last_outcome = None;

        Ok(ApplyRequest {
            ticket,
            candidate: pending.to,
        })
    }

    /// Feed the result of a remote apply back in.
    pub fn complete_apply(&mut self, ticket: ApplyTicket, success: bool) -> ApplyOutcome {
        let in_flight = match self.in_flight.take() {
            Some(in_flight) if in_flight.ticket == ticket => in_flight,
            other => {
                self.in_flight = other;
                warn!("ignoring result of {ticket:?}: not in flight");
                return ApplyOutcome::Stale;
            }
        };

        self.control_mut(in_flight.field).finish_apply(success);

        let outcome = if success {
            info!("network config committed ({:?})", in_flight.field);
            self.committed = in_flight.candidate;
            self.rebase();
            ApplyOutcome::Committed
        } else {
            warn!("network config apply failed, rolled back {:?}", in_flight.field);
            ApplyOutcome::RolledBack
        };

        self.last_outcome = Some(outcome);
        outcome
    }

    fn stage(&mut self, change: ChangeKind, candidate: NetworkConfig) -> &PendingConfirmation {
        debug!("staged {change:?}");

        self.pending
            .insert(PendingConfirmation::new(change, self.committed.clone(), candidate))
    }

    fn rebase(&mut self) {
        let committed = &self.committed;

        self.proxy_form.rebase(ProxyForm::from(&committed.proxy));
        self.socks_proxy.rebase(committed.use_socks_proxy);
        self.onion_hosts.rebase(committed.onion_hosts);
        self.session_mode.rebase(committed.session_mode);
        self.timeouts.rebase(committed.timeouts);
    }

    fn ensure_not_busy(&self) -> Result<(), Rejected> {
        if self.is_busy() {
            Err(Rejected::Busy)
        } else {
            Ok(())
        }
    }

    fn controls(&self) -> [&dyn StagedControl; 5] {
        [
            &self.proxy_form,
            &self.socks_proxy,
            &self.onion_hosts,
            &self.session_mode,
            &self.timeouts,
        ]
    }

    fn control_mut(&mut self, field: SettingsField) -> &mut dyn StagedControl {
        match field {
            SettingsField::ProxyAddress => &mut self.proxy_form,
            SettingsField::SocksProxy => &mut self.socks_proxy,
            SettingsField::OnionHosts => &mut self.onion_hosts,
            SettingsField::SessionMode => &mut self.session_mode,
            SettingsField::Timeouts => &mut self.timeouts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconciler(committed: NetworkConfig) -> NetworkConfigReconciler {
        NetworkConfigReconciler::new(committed, true)
    }

    fn apply(reconciler: &mut NetworkConfigReconciler, success: bool) -> ApplyOutcome {
        let request = reconciler.confirm().unwrap();
        reconciler.complete_apply(request.ticket, success)
    }

    mod proxy_form {
        use super::*;

        #[test]
        fn starts_idle_with_committed_texts() {
            let reconciler = reconciler(NetworkConfig::proxy_defaults());

            assert_eq!(reconciler.state(), ReconcilerState::Idle);
            assert_eq!(reconciler.host_text(), "localhost");
            assert_eq!(reconciler.port_text(), "9050");
            assert!(reconciler.revert_disabled());
            assert!(reconciler.save_disabled());
        }

        #[test]
        fn typing_enters_editing_and_enables_revert() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());

            reconciler.set_host_text("10.0.0.1").unwrap();

            assert_eq!(reconciler.state(), ReconcilerState::Editing);
            assert!(!reconciler.revert_disabled());
            assert!(!reconciler.save_disabled());
        }

        #[test]
        fn out_of_range_port_keeps_save_disabled() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());

            reconciler.set_port_text("99999").unwrap();
            assert!(reconciler.save_disabled());

            reconciler.set_host_text("proxy.example.com").unwrap();
            assert!(reconciler.save_disabled());
            assert_eq!(reconciler.save_proxy().unwrap_err(), Rejected::InvalidInput);
        }

        #[test]
        fn invalid_host_keeps_save_disabled() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());

            reconciler.set_host_text("-bad.com").unwrap();

            assert!(reconciler.save_disabled());
            assert!(!reconciler.revert_disabled());
        }

        #[test]
        fn equal_value_keeps_save_disabled() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());

            reconciler.set_port_text("09050").unwrap();

            assert_eq!(reconciler.state(), ReconcilerState::Editing);
            assert!(reconciler.save_disabled());
            assert_eq!(reconciler.save_proxy().unwrap_err(), Rejected::Unchanged);
        }

        #[test]
        fn revert_restores_committed_texts() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());
            reconciler.set_host_text("10.0.0.1").unwrap();
            reconciler.set_port_text("1080").unwrap();

            reconciler.revert_proxy().unwrap();

            assert_eq!(reconciler.host_text(), "localhost");
            assert_eq!(reconciler.port_text(), "9050");
            assert_eq!(reconciler.state(), ReconcilerState::Idle);
            assert_eq!(reconciler.revert_proxy().unwrap_err(), Rejected::Unchanged);
        }

        #[test]
        fn save_then_dismiss_keeps_typed_text() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());
            reconciler.set_port_text("9150").unwrap();

            let confirmation = reconciler.save_proxy().unwrap();
            assert_eq!(confirmation.to.proxy, ProxyAddress::new("localhost", 9150));
            assert_eq!(reconciler.state(), ReconcilerState::PendingApply);

            reconciler.dismiss().unwrap();

            assert_eq!(reconciler.state(), ReconcilerState::Editing);
            assert_eq!(reconciler.port_text(), "9150");
            assert_eq!(reconciler.committed().proxy.port, 9050);
        }

        #[test]
        fn save_then_apply_commits_address() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());
            reconciler.set_host_text("10.0.0.1").unwrap();
            reconciler.set_port_text("01080").unwrap();
            reconciler.save_proxy().unwrap();

            assert_eq!(apply(&mut reconciler, true), ApplyOutcome::Committed);

            assert_eq!(reconciler.state(), ReconcilerState::Idle);
            assert_eq!(reconciler.committed().proxy, ProxyAddress::new("10.0.0.1", 1080));
            assert_eq!(reconciler.host_text(), "10.0.0.1");
            assert_eq!(reconciler.port_text(), "1080");
        }

        #[test]
        fn failed_apply_restores_committed_texts() {
            let committed = NetworkConfig::proxy_defaults();
            let mut reconciler = reconciler(committed.clone());
            reconciler.set_host_text("10.0.0.1").unwrap();
            reconciler.save_proxy().unwrap();

            assert_eq!(apply(&mut reconciler, false), ApplyOutcome::RolledBack);

            assert_eq!(reconciler.host_text(), committed.proxy.host);
            assert_eq!(reconciler.port_text(), committed.proxy.port.to_string());
            assert_eq!(reconciler.committed(), &committed);
            assert_eq!(reconciler.last_outcome(), Some(ApplyOutcome::RolledBack));
        }

        #[test]
        fn reset_is_disabled_for_default_address() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());

            assert!(reconciler.reset_disabled());
            assert_eq!(reconciler.reset_proxy().unwrap_err(), Rejected::Unchanged);
        }

        #[test]
        fn reset_proposes_default_address() {
            let committed = NetworkConfig::proxy_defaults()
                .with_proxy(ProxyAddress::new("proxy.example.com", 1080));
            let mut reconciler = reconciler(committed);

            let confirmation = reconciler.reset_proxy().unwrap();
            assert_eq!(confirmation.to.proxy, ProxyAddress::default());
            assert_eq!(reconciler.host_text(), "localhost");

            reconciler.dismiss().unwrap();
            assert_eq!(reconciler.host_text(), "proxy.example.com");
            assert_eq!(reconciler.port_text(), "1080");
        }
    }

    mod toggles {
        use super::*;

        #[test]
        fn enabling_proxy_applies_proxy_defaults() {
            let mut reconciler = reconciler(NetworkConfig::defaults());

            let confirmation = reconciler.toggle_socks_proxy(true).unwrap();
            assert_eq!(confirmation.title, "Use SOCKS proxy?");
            assert!(reconciler.use_socks_proxy());

            assert_eq!(apply(&mut reconciler, true), ApplyOutcome::Committed);

            assert!(reconciler.use_socks_proxy());
            assert_eq!(reconciler.host_text(), "localhost");
            assert_eq!(reconciler.port_text(), "9050");
            assert_eq!(reconciler.onion_hosts(), OnionHosts::Prefer);
            assert_eq!(reconciler.state(), ReconcilerState::Idle);
        }

        #[test]
        fn declining_restores_previous_value() {
            let mut reconciler = reconciler(NetworkConfig::defaults());

            reconciler.toggle_socks_proxy(true).unwrap();
            reconciler.dismiss().unwrap();

            assert!(!reconciler.use_socks_proxy());
            assert_eq!(reconciler.state(), ReconcilerState::Idle);
        }

        #[test]
        fn failed_apply_restores_previous_value() {
            let committed = NetworkConfig::proxy_defaults();
            let mut reconciler = reconciler(committed.clone());

            reconciler.select_onion_hosts(OnionHosts::Required).unwrap();
            assert_eq!(reconciler.onion_hosts(), OnionHosts::Required);

            assert_eq!(apply(&mut reconciler, false), ApplyOutcome::RolledBack);

            assert_eq!(reconciler.onion_hosts(), committed.onion_hosts);
            assert_eq!(reconciler.committed(), &committed);
        }

        #[test]
        fn selecting_current_value_is_a_no_op() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());

            assert_eq!(
                reconciler.select_onion_hosts(OnionHosts::Prefer).unwrap_err(),
                Rejected::Unchanged
            );
            assert_eq!(
                reconciler.toggle_socks_proxy(true).unwrap_err(),
                Rejected::Unchanged
            );
            assert!(reconciler.pending_confirmation().is_none());
        }

        #[test]
        fn onion_hosts_need_enabled_proxy() {
            let mut reconciler = reconciler(NetworkConfig::defaults());

            assert!(!reconciler.onion_hosts_enabled());
            assert_eq!(
                reconciler.select_onion_hosts(OnionHosts::Prefer).unwrap_err(),
                Rejected::ProxyDisabled
            );
        }

        #[test]
        fn session_mode_needs_developer_tools() {
            let mut reconciler = NetworkConfigReconciler::new(NetworkConfig::defaults(), false);

            assert_eq!(
                reconciler.select_session_mode(SessionMode::Entity).unwrap_err(),
                Rejected::DeveloperToolsDisabled
            );
        }

        #[test]
        fn session_mode_commit_keeps_other_fields() {
            let committed = NetworkConfig::proxy_defaults();
            let mut reconciler = reconciler(committed.clone());

            reconciler.select_session_mode(SessionMode::Entity).unwrap();
            assert_eq!(apply(&mut reconciler, true), ApplyOutcome::Committed);

            assert_eq!(
                reconciler.committed(),
                &committed.with_session_mode(SessionMode::Entity)
            );
        }

        #[test]
        fn timeouts_are_validated() {
            let mut reconciler = reconciler(NetworkConfig::defaults());

            let invalid = TransportTimeouts {
                tcp_timeout: 0,
                ..Default::default()
            };
            assert_eq!(
                reconciler.update_timeouts(invalid).unwrap_err(),
                Rejected::InvalidInput
            );

            let valid = TransportTimeouts {
                tcp_timeout: 15_000_000,
                ..Default::default()
            };
            reconciler.update_timeouts(valid).unwrap();
            assert_eq!(apply(&mut reconciler, true), ApplyOutcome::Committed);
            assert_eq!(reconciler.committed().timeouts, valid);
        }
    }

    mod orchestration {
        use super::*;

        #[test]
        fn only_one_change_at_a_time() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());
            reconciler.select_onion_hosts(OnionHosts::Never).unwrap();

            assert_eq!(reconciler.toggle_socks_proxy(false).unwrap_err(), Rejected::Busy);
            assert_eq!(reconciler.set_host_text("x").unwrap_err(), Rejected::Busy);

            reconciler.confirm().unwrap();

            assert_eq!(reconciler.state(), ReconcilerState::Applying);
            assert_eq!(reconciler.set_port_text("1").unwrap_err(), Rejected::Busy);
            assert_eq!(reconciler.revert_proxy().unwrap_err(), Rejected::Busy);
            assert!(reconciler.save_disabled());
            assert!(reconciler.revert_disabled());
        }

        #[test]
        fn confirm_and_dismiss_need_a_pending_change() {
            let mut reconciler = reconciler(NetworkConfig::defaults());

            assert_eq!(reconciler.confirm().unwrap_err(), Rejected::NothingPending);
            assert_eq!(reconciler.dismiss().unwrap_err(), Rejected::NothingPending);
        }

        #[test]
        fn mismatched_ticket_is_stale() {
            let mut reconciler = reconciler(NetworkConfig::defaults());
            reconciler.toggle_socks_proxy(true).unwrap();
            let request = reconciler.confirm().unwrap();

            assert_eq!(
                reconciler.complete_apply(ApplyTicket(request.ticket.0 + 1), true),
                ApplyOutcome::Stale
            );
            assert_eq!(reconciler.state(), ReconcilerState::Applying);

            assert_eq!(
                reconciler.complete_apply(request.ticket, true),
                ApplyOutcome::Committed
            );
            assert_eq!(
                reconciler.complete_apply(request.ticket, true),
                ApplyOutcome::Stale
            );
        }

        #[test]
        fn tickets_increase() {
            let mut reconciler = reconciler(NetworkConfig::defaults());

            reconciler.toggle_socks_proxy(true).unwrap();
            let first = reconciler.confirm().unwrap();
            reconciler.complete_apply(first.ticket, false);

            reconciler.toggle_socks_proxy(true).unwrap();
            let second = reconciler.confirm().unwrap();

            assert!(second.ticket.0 > first.ticket.0);
        }

        #[test]
        fn sync_moves_idle_fields_to_new_baseline() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());
            reconciler.set_host_text("10.1.1.1").unwrap();

            let live = NetworkConfig::proxy_defaults().with_onion_hosts(OnionHosts::Required);
            assert!(reconciler.sync_committed(live.clone()));
            assert!(!reconciler.sync_committed(live.clone()));

            assert_eq!(reconciler.committed(), &live);
            assert_eq!(reconciler.onion_hosts(), OnionHosts::Required);
            assert_eq!(reconciler.host_text(), "10.1.1.1");
        }

        #[test]
        fn sync_carries_pending_change_onto_new_baseline() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());
            reconciler.select_session_mode(SessionMode::Entity).unwrap();

            let live = NetworkConfig::proxy_defaults().with_onion_hosts(OnionHosts::Required);
            reconciler.sync_committed(live.clone());

            let request = reconciler.confirm().unwrap();
            assert_eq!(
                request.candidate,
                live.with_session_mode(SessionMode::Entity)
            );

            reconciler.complete_apply(request.ticket, true);
            assert_eq!(reconciler.onion_hosts(), OnionHosts::Required);
            assert_eq!(reconciler.session_mode(), SessionMode::Entity);
        }

        #[test]
        fn dismiss_after_sync_shows_new_baseline() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());
            reconciler.select_onion_hosts(OnionHosts::Never).unwrap();

            reconciler.sync_committed(
                NetworkConfig::proxy_defaults().with_onion_hosts(OnionHosts::Required),
            );
            reconciler.dismiss().unwrap();

            assert_eq!(reconciler.onion_hosts(), OnionHosts::Required);
            assert_eq!(reconciler.state(), ReconcilerState::Idle);
        }

        #[test]
        fn sync_is_ignored_while_applying() {
            let mut reconciler = reconciler(NetworkConfig::defaults());
            reconciler.toggle_socks_proxy(true).unwrap();
            reconciler.confirm().unwrap();

            assert!(!reconciler.sync_committed(
                NetworkConfig::defaults().with_session_mode(SessionMode::Entity)
            ));
            assert_eq!(reconciler.committed(), &NetworkConfig::defaults());
        }

        #[test]
        fn commit_keeps_unrelated_dirty_text() {
            let mut reconciler = reconciler(NetworkConfig::proxy_defaults());
            reconciler.set_host_text("10.1.1.1").unwrap();

            reconciler.select_onion_hosts(OnionHosts::Required).unwrap();
            assert_eq!(apply(&mut reconciler, true), ApplyOutcome::Committed);

            assert_eq!(reconciler.host_text(), "10.1.1.1");
            assert_eq!(reconciler.state(), ReconcilerState::Editing);
        }
    }
}
