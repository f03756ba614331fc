use crate::{
    controller_client::NetworkConfigClient,
    reconciler::{NetworkConfigReconciler, SettingsView},
    services::network::NetworkConfigService,
    settings_store::SettingsStore,
    types::{ApplyOutcome, Rejected},
};
use log::warn;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

/// One open network settings screen
///
/// Owns the reconciler of the screen and runs confirmed applies in the
/// background. Every access first moves the screen onto the config in the
/// store, so changes committed by other screens are never undone. An apply
/// that finishes after the screen was dropped still updates the store but no
/// longer touches the screen.
pub struct SettingsScreen<C, S> {
    reconciler: Arc<Mutex<NetworkConfigReconciler>>,
    client: Arc<C>,
    store: Arc<S>,
}

impl<C, S> SettingsScreen<C, S>
where
    C: NetworkConfigClient + Send + Sync + 'static,
    S: SettingsStore + 'static,
{
    /// Open a screen showing the currently committed config
    pub fn open(client: Arc<C>, store: Arc<S>, developer_tools: bool) -> Self {
        let reconciler = NetworkConfigReconciler::new(store.current(), developer_tools);

        Self {
            reconciler: Arc::new(Mutex::new(reconciler)),
            client,
            store,
        }
    }

    pub fn view(&self) -> SettingsView {
        SettingsView::from(&*self.synced())
    }

    /// Run a synchronous mutation against the screen's reconciler
    pub fn update<R>(&self, f: impl FnOnce(&mut NetworkConfigReconciler) -> R) -> R {
        f(&mut self.synced())
    }

    /// Accept the pending confirmation and start the remote apply
    ///
    /// The returned handle resolves to the outcome once the apply finished.
    pub fn confirm(&self) -> Result<JoinHandle<ApplyOutcome>, Rejected> {
        let request = self.synced().confirm()?;

        let reconciler = Arc::downgrade(&self.reconciler);
        let client = Arc::clone(&self.client);
        let store = Arc::clone(&self.store);

        Ok(tokio::spawn(async move {
            let success = NetworkConfigService::apply_network_config(
                client.as_ref(),
                store.as_ref(),
                request.candidate,
            )
            .await;

            match reconciler.upgrade() {
                Some(reconciler) => reconciler
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .complete_apply(request.ticket, success),
                None => {
                    warn!(
                        "settings screen closed during apply, discarding result of {:?}",
                        request.ticket
                    );
                    ApplyOutcome::Discarded
                }
            }
        }))
    }

    fn synced(&self) -> MutexGuard<'_, NetworkConfigReconciler> {
        let mut reconciler = self.lock();
        reconciler.sync_committed(self.store.current());
        reconciler
    }

    fn lock(&self) -> MutexGuard<'_, NetworkConfigReconciler> {
        self.reconciler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
