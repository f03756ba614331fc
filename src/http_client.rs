use anyhow::{Context, Result, ensure};
use reqwest::{Client, Response};
use std::time::Duration;

/// Create an HTTP client for talking to the network controller
///
/// Every request made through the client is bounded by `timeout`, so a
/// controller that never answers surfaces as an error instead of hanging.
pub fn controller_http_client(timeout: Duration) -> Result<Client> {
    ensure!(!timeout.is_zero(), "failed since request timeout is zero");

    Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to create controller HTTP client")
}

/// Handle HTTP response by checking status and extracting body
///
/// # Arguments
/// * `res` - The HTTP response to handle
/// * `context_msg` - Context message describing the request (e.g., "POST /network-config")
///
/// # Returns
/// * `Ok(String)` - The response body if the status is successful
/// * `Err` - If the status is not successful or reading the body fails
pub async fn handle_http_response(res: Response, context_msg: &str) -> Result<String> {
    let status = res.status();
    let body = res.text().await.context("failed to read response body")?;

    ensure!(
        status.is_success(),
        "{context_msg} failed with status {status} and body: {body}"
    );

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_timeout() {
        let result = controller_http_client(Duration::ZERO);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout is zero"));
    }

    #[test]
    fn builds_client_with_timeout() {
        assert!(controller_http_client(Duration::from_secs(5)).is_ok());
    }
}
