use crate::config::Config;
use crate::util::{validate_url, UrlValidationError};
use futures::StreamExt;
use thiserror::Error;

/// Errors that can occur while retrieving a feed.
///
/// Any of these means the location contributes no items.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, invalid URL, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded `max_feed_size`
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// Location refused by the SSRF policy (`block_private_hosts`)
    #[error("Location blocked: {0}")]
    Blocked(#[from] UrlValidationError),
}

/// Retrieves the raw body of one feed location.
///
/// Issues a single GET with no retries. Non-2xx statuses, transport
/// failures, oversized or truncated bodies and, when configured, timeouts
/// and blocked locations are all reported as [`FetchError`].
///
/// # Arguments
///
/// * `client` - HTTP client (caller controls headers, TLS and its own timeouts)
/// * `url` - Feed location
/// * `config` - Size limit, optional timeout and SSRF policy
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    config: &Config,
) -> Result<Vec<u8>, FetchError> {
    if config.block_private_hosts {
        validate_url(url)?;
    }

    let request = fetch_body(client, url, config.max_feed_size);
    match config.request_timeout() {
        Some(limit) => tokio::time::timeout(limit, request)
            .await
            .map_err(|_| FetchError::Timeout)?,
        None => request.await,
    }
}

async fn fetch_body(
    client: &reqwest::Client,
    url: &str,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    read_limited_bytes(response, limit).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    // EDGE-005: Body shorter than Content-Length means the connection dropped mid-read
    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><title>Test</title><link>https://example.com/1</link><description>d</description></item>
</channel></rss>"#;

    async fn serve(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = serve(
            ResponseTemplate::new(200)
                .set_body_string(VALID_RSS)
                .insert_header("Content-Type", "application/xml"),
        )
        .await;
        let client = reqwest::Client::new();

        let body = fetch_feed(&client, &format!("{}/feed", mock_server.uri()), &Config::default())
            .await
            .unwrap();
        assert_eq!(body, VALID_RSS.as_bytes());
    }

    #[tokio::test]
    async fn test_fetch_404_error() {
        let mock_server = serve(ResponseTemplate::new(404)).await;
        let client = reqwest::Client::new();

        let result =
            fetch_feed(&client, &format!("{}/feed", mock_server.uri()), &Config::default()).await;
        match result {
            Err(FetchError::HttpStatus(404)) => {}
            other => panic!("Expected HttpStatus(404), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_500_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = reqwest::Client::new();

        let result =
            fetch_feed(&client, &format!("{}/feed", mock_server.uri()), &Config::default()).await;
        assert!(matches!(result, Err(FetchError::HttpStatus(500))));
    }

    #[tokio::test]
    async fn test_fetch_oversized_body_rejected() {
        let mock_server = serve(ResponseTemplate::new(200).set_body_string(VALID_RSS)).await;
        let client = reqwest::Client::new();
        let config = Config {
            max_feed_size: 16,
            ..Config::default()
        };

        let result = fetch_feed(&client, &format!("{}/feed", mock_server.uri()), &config).await;
        assert!(matches!(result, Err(FetchError::ResponseTooLarge)));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = serve(
            ResponseTemplate::new(200)
                .set_body_string(VALID_RSS)
                .set_delay(Duration::from_secs(5)),
        )
        .await;
        let client = reqwest::Client::new();
        let config = Config {
            request_timeout_secs: Some(1),
            ..Config::default()
        };

        let result = fetch_feed(&client, &format!("{}/feed", mock_server.uri()), &config).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_blocked_location_never_requested() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(0)
            .mount(&mock_server)
            .await;
        let client = reqwest::Client::new();
        let config = Config {
            block_private_hosts: true,
            ..Config::default()
        };

        // MockServer listens on 127.0.0.1
        let result = fetch_feed(&client, &format!("{}/feed", mock_server.uri()), &config).await;
        assert!(matches!(result, Err(FetchError::Blocked(_))));
    }

    #[tokio::test]
    async fn test_invalid_location_is_network_error() {
        let client = reqwest::Client::new();
        let result = fetch_feed(&client, "not a url", &Config::default()).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
