//! Feed retrieval over HTTP.
//!
//! Kept deliberately thin: one bounded-timeout GET, with non-2xx responses
//! surfaced as a single error condition. Any failure here aborts the run
//! before tokenization begins — there is no partial-feed processing. Retries,
//! if ever wanted, belong in this collaborator, not in the pipeline.

use std::time::Duration;

use crate::error::{FetchError, FetchResult};

/// Download the raw feed body.
pub async fn fetch_feed(url: &str, timeout: Duration) -> FetchResult<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::BadStatus {
            status: status.as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/csv/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("artnr;pris\nA1;10\n"))
            .mount(&server)
            .await;

        let url = format!("{}/csv/", server.uri());
        let body = fetch_feed(&url, Duration::from_secs(5)).await.unwrap();
        assert_eq!(body, b"artnr;pris\nA1;10\n");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = fetch_feed(&server.uri(), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(FetchError::BadStatus { status: 503 })));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_error() {
        // Reserved TEST-NET address; nothing listens there.
        let result = fetch_feed("http://192.0.2.1:9/csv/", Duration::from_millis(200)).await;
        assert!(matches!(result, Err(FetchError::RequestFailed(_))));
    }
}
