//! Network configuration apply service
//!
//! Sends a candidate config to the controller and records it as committed
//! once the controller accepted it.

use crate::{
    controller_client::NetworkConfigClient, settings_store::SettingsStore, types::NetworkConfig,
};
use log::{error, info};

/// Service for applying network configuration changes
pub struct NetworkConfigService;

impl NetworkConfigService {
    /// Apply `candidate` remotely and persist it on success
    ///
    /// # Returns
    /// `true` if the controller applied the config. A failed write to the
    /// store after that is logged but does not change the result, the live
    /// state already moved.
    pub async fn apply_network_config<C, S>(client: &C, store: &S, candidate: NetworkConfig) -> bool
    where
        C: NetworkConfigClient,
        S: SettingsStore + ?Sized,
    {
        info!("apply network config: {candidate:?}");

        if let Err(e) = candidate.check() {
            error!("refusing to apply invalid network config: {e:#}");
            return false;
        }

        if let Err(e) = client.set_network_config(candidate.clone()).await {
            error!("failed to apply network config: {e:#}");
            return false;
        }

        if let Err(e) = store.set_committed(candidate) {
            error!("failed to persist committed network config: {e:#}");
        }

        true
    }
}
