//! Outbound HTTP helpers.

use std::time::Duration;

use crate::error::CoreResult;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

fn client() -> CoreResult<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(CONNECT_TIMEOUT).build()?)
}

/// Returns `true` if a GET request to `url` gets any HTTP response.
///
/// Pass `settings.internet_connection_url` for the configured default.
pub async fn has_internet_connection(url: &str) -> bool {
    let Ok(client) = client() else {
        return false;
    };
    match client.get(url).send().await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(url, error = %e, "connectivity check failed");
            false
        }
    }
}

/// Fetches `api_url` and decodes the body as JSON.
pub async fn get_json_api_contents(api_url: &str) -> CoreResult<serde_json::Value> {
    let response = client()?.get(api_url).send().await?.error_for_status()?;
    Ok(response.json::<serde_json::Value>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_host_is_offline() {
        assert!(!has_internet_connection("http://127.0.0.1:9/").await);
    }

    #[tokio::test]
    async fn test_invalid_url_is_error() {
        let err = get_json_api_contents("not a url").await.unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
