use reqwest::{Client, Response};
use tracing::debug;

use crate::core::RateError;

pub fn http_client() -> Result<Client, RateError> {
    Client::builder()
        .user_agent("exrates/0.1")
        .build()
        .map_err(|e| RateError::Fetch(format!("failed to build http client: {e}")))
}

/// Issues a single GET; non-success statuses are reported as fetch failures.
async fn get(client: &Client, url: &str) -> Result<Response, RateError> {
    debug!("Requesting {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RateError::Fetch(format!("request error: {e} for URL: {url}")))?;

    if !response.status().is_success() {
        return Err(RateError::Fetch(format!(
            "HTTP error: {} for URL: {url}",
            response.status()
        )));
    }
    Ok(response)
}

pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>, RateError> {
    let body = get(client, url)
        .await?
        .bytes()
        .await
        .map_err(|e| RateError::Fetch(format!("failed to read body from {url}: {e}")))?;
    debug!(bytes = body.len(), "Received response body");
    Ok(body.to_vec())
}

pub async fn fetch_text(client: &Client, url: &str) -> Result<String, RateError> {
    get(client, url)
        .await?
        .text()
        .await
        .map_err(|e| RateError::Fetch(format!("failed to read body from {url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_text_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hello"))
            .respond_with(ResponseTemplate::new(200).set_body_string("world"))
            .mount(&mock_server)
            .await;

        let client = http_client().unwrap();
        let body = fetch_text(&client, &format!("{}/hello", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "world");
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = http_client().unwrap();
        let url = format!("{}/missing", mock_server.uri());
        let err = fetch_bytes(&client, &url).await.unwrap_err();
        assert_eq!(
            err,
            RateError::Fetch(format!("HTTP error: 500 Internal Server Error for URL: {url}"))
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let client = http_client().unwrap();
        let err = fetch_bytes(&client, "http://127.0.0.1:9/unreachable")
            .await
            .unwrap_err();
        assert!(matches!(err, RateError::Fetch(_)));
    }
}
