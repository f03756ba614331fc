use crate::{
    config::AppConfig,
    http_client::{controller_http_client, handle_http_response},
    types::NetworkConfig,
};
use anyhow::{Context, Result};
use log::info;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use reqwest::Client;
use trait_variant::make;

/// Remote side of a network configuration change
///
/// `Ok` means the controller accepted and applied the whole config.
#[make(Send)]
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait NetworkConfigClient {
    async fn set_network_config(&self, config: NetworkConfig) -> Result<()>;
}

#[derive(Clone)]
pub struct ControllerClient {
    client: Client,
    base_url: String,
}

impl ControllerClient {
    const NETWORK_CONFIG_ENDPOINT: &str = "/network-config/v1";

    pub fn new() -> Result<Self> {
        let config = AppConfig::get();
        let client = controller_http_client(config.controller.apply_timeout)?;

        Ok(Self::with_client(client, &config.controller.url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        ControllerClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_url(&self, path: &str) -> String {
        let normalized_path = path.trim_start_matches('/');
        format!("{}/{normalized_path}", self.base_url)
    }
}

impl NetworkConfigClient for ControllerClient {
    async fn set_network_config(&self, config: NetworkConfig) -> Result<()> {
        let url = self.build_url(Self::NETWORK_CONFIG_ENDPOINT);
        info!("POST {url}");

        let res = self
            .client
            .post(&url)
            .json(&config)
            .send()
            .await
            .context(format!("failed to send POST request to {url}"))?;

        handle_http_response(res, &format!("POST {url}")).await?;
        Ok(())
    }
}
