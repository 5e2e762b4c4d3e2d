//! Translation of HTTP responses into client results.
//!
//! Every function here takes the `Response` by value, so the body is either
//! consumed or dropped exactly once on every path.

use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::{ClientError, Result};

/// Pass a 2xx response through for the caller to read.
///
/// Transport failures are returned as-is. Any other status has its body read
/// and reported in `ClientError::Server`.
pub(crate) async fn ensure_success(sent: reqwest::Result<Response>) -> Result<Response> {
    let response = sent?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Only the path: the query string carries credentials.
    let path = response.url().path().to_string();
    let body = response.text().await?;
    tracing::warn!(status = status.as_u16(), path = %path, "Server rejected request");
    Err(ClientError::Server {
        status: status.as_u16(),
        body,
    })
}

/// Like `ensure_success`, but releases the response on success.
pub(crate) async fn response_to_error(sent: reqwest::Result<Response>) -> Result<()> {
    ensure_success(sent).await.map(drop)
}

/// Buffer the whole body and decode it as JSON.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use influxdb_core::Record;

    fn response(status: u16, body: &'static str) -> reqwest::Result<Response> {
        Ok(http::Response::builder()
            .status(status)
            .body(body)
            .unwrap()
            .into())
    }

    #[tokio::test]
    async fn test_success_range_ignores_body() {
        for status in [200, 201, 204, 250, 299] {
            let result = response_to_error(response(status, "not even json")).await;
            assert!(result.is_ok(), "status {} should succeed", status);
        }
    }

    #[tokio::test]
    async fn test_non_success_embeds_status_and_body() {
        for status in [100, 199, 300, 301, 400, 404, 409, 500, 503] {
            let err = response_to_error(response(status, "Database already exists"))
                .await
                .unwrap_err();

            match &err {
                ClientError::Server { status: s, body } => {
                    assert_eq!(*s, status);
                    assert_eq!(body, "Database already exists");
                }
                other => panic!("unexpected error: {:?}", other),
            }
            let message = err.to_string();
            assert!(message.contains(&status.to_string()));
            assert!(message.contains("Database already exists"));
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_body_is_replaced() {
        let sent: reqwest::Result<Response> = Ok(http::Response::builder()
            .status(500)
            .body(vec![b'b', b'a', b'd', 0xff])
            .unwrap()
            .into());

        match response_to_error(sent).await.unwrap_err() {
            ClientError::Server { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "bad\u{fffd}");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_error_is_propagated() {
        let sent: reqwest::Result<Response> =
            Err(reqwest::Client::new().get("not a url").build().unwrap_err());
        let err = response_to_error(sent).await.unwrap_err();
        assert!(matches!(err, ClientError::Request(_)));
    }

    #[tokio::test]
    async fn test_keep_open_variant_leaves_body_readable() {
        let response = ensure_success(response(200, r#"[{"name":"root"}]"#))
            .await
            .unwrap();
        let records: Vec<Record> = decode_json(response).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "root");
    }

    #[tokio::test]
    async fn test_decode_rejects_non_array() {
        let response = ensure_success(response(200, r#"{"name":"root"}"#))
            .await
            .unwrap();
        let err = decode_json::<Vec<Record>>(response).await.unwrap_err();
        assert!(matches!(err, ClientError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_decode_rejects_array_of_scalars() {
        let response = ensure_success(response(200, "[1, 2]")).await.unwrap();
        let err = decode_json::<Vec<Record>>(response).await.unwrap_err();
        assert!(matches!(err, ClientError::Serialization(_)));
    }
}
