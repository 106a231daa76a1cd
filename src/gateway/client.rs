//! Backend HTTP client with timeouts and error classification.
//!
//! # Responsibilities
//! - Build requests for the three backend operations
//! - Apply the submission or poll deadline to each call
//! - Classify failures into `GatewayError`
//! - Emit request/response diagnostics in development mode only

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::BackendConfig;
use crate::gateway::types::{ErrorBody, GatewayError, GatewayResult, DEFAULT_REJECTION};
use crate::types::check::CheckRequest;
use crate::types::{BatchFile, ChainReference, CheckResult, TransactionId, TxnStatus, UploadResponse};

/// The outbound operations the workflows depend on.
///
/// Implementations never retry; retry policy belongs to the caller.
pub trait Gateway: Send + Sync + 'static {
    /// `POST /check_txn`.
    fn check_transaction(
        &self,
        id: &TransactionId,
    ) -> impl Future<Output = GatewayResult<CheckResult>> + Send;

    /// `POST /upload_csv`.
    fn upload_batch(
        &self,
        file: &BatchFile,
    ) -> impl Future<Output = GatewayResult<UploadResponse>> + Send;

    /// `GET /txn_status/{hash}`.
    fn poll_status(
        &self,
        reference: &ChainReference,
    ) -> impl Future<Output = GatewayResult<TxnStatus>> + Send;
}

/// `Gateway` backed by the scoring service's HTTP API.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    submit_timeout: Duration,
    poll_timeout: Duration,
    dev_mode: bool,
}

impl HttpGateway {
    /// Create a gateway for the configured backend.
    pub fn new(config: &BackendConfig, dev_mode: bool) -> Result<Self, url::ParseError> {
        let mut base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            submit_timeout: config.submit_timeout(),
            poll_timeout: config.poll_timeout(),
            dev_mode,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        timeout: Duration,
    ) -> GatewayResult<T> {
        let request = builder.timeout(timeout).build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        if self.dev_mode {
            tracing::debug!(method = %method, path = %path, "Outbound request");
        }

        let started = Instant::now();
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let err = GatewayError::from(e);
                if self.dev_mode {
                    tracing::debug!(method = %method, path = %path, kind = err.kind(), "Request failed");
                }
                return Err(err);
            }
        };

        let status = response.status();
        if self.dev_mode {
            tracing::debug!(
                method = %method,
                path = %path,
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Inbound response"
            );
        }

        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| DEFAULT_REJECTION.to_string());
            return Err(GatewayError::BackendRejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

impl Gateway for HttpGateway {
    async fn check_transaction(&self, id: &TransactionId) -> GatewayResult<CheckResult> {
        let builder = self
            .client
            .post(self.endpoint(&["check_txn"]))
            .json(&CheckRequest { txn_id: id.as_str() });
        self.execute(builder, self.submit_timeout).await
    }

    async fn upload_batch(&self, file: &BatchFile) -> GatewayResult<UploadResponse> {
        let part = Part::bytes(file.contents.clone()).file_name(file.file_name.clone());
        let builder = self
            .client
            .post(self.endpoint(&["upload_csv"]))
            .multipart(Form::new().part("file", part));
        self.execute(builder, self.submit_timeout).await
    }

    async fn poll_status(&self, reference: &ChainReference) -> GatewayResult<TxnStatus> {
        let builder = self
            .client
            .get(self.endpoint(&["txn_status", reference.as_str()]));
        self.execute(builder, self.poll_timeout).await
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url.as_str())
            .field("submit_timeout", &self.submit_timeout)
            .field("poll_timeout", &self.poll_timeout)
            .field("dev_mode", &self.dev_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn gateway_for(url: &str) -> HttpGateway {
        let config = BackendConfig {
            base_url: url.to_string(),
            submit_timeout_secs: 5,
            poll_timeout_secs: 1,
        };
        HttpGateway::new(&config, true).unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_path() {
        let gateway = gateway_for("http://scoring.local:5001/api");
        assert_eq!(
            gateway.endpoint(&["check_txn"]).as_str(),
            "http://scoring.local:5001/api/check_txn"
        );

        let gateway = gateway_for("http://scoring.local:5001");
        assert_eq!(
            gateway.endpoint(&["txn_status", "0xabc"]).as_str(),
            "http://scoring.local:5001/txn_status/0xabc"
        );
    }

    #[tokio::test]
    async fn test_check_transaction() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/check_txn")
            .match_body(Matcher::Json(serde_json::json!({ "txn_id": "C1231006815" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"fraud":false,"confidence":0.97}"#)
            .create_async()
            .await;

        let gateway = gateway_for(&server.url());
        let id = TransactionId::parse("C1231006815").unwrap();
        let result = gateway.check_transaction(&id).await.unwrap();

        assert!(!result.fraud);
        assert_eq!(result.confidence_percent(), "97.00%");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_backend_rejection_uses_error_field() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/check_txn")
            .with_status(404)
            .with_body(r#"{"error":"Transaction not found"}"#)
            .create_async()
            .await;

        let gateway = gateway_for(&server.url());
        let id = TransactionId::parse("C1").unwrap();
        let err = gateway.check_transaction(&id).await.unwrap_err();

        assert_eq!(
            err,
            GatewayError::BackendRejected {
                status: 404,
                message: "Transaction not found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_backend_rejection_without_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/txn_status/0xabc")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let gateway = gateway_for(&server.url());
        let reference = ChainReference::normalize("abc").unwrap();
        let err = gateway.poll_status(&reference).await.unwrap_err();

        assert_eq!(err.to_string(), "Request failed");
    }

    #[tokio::test]
    async fn test_invalid_success_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/txn_status/0xabc")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let gateway = gateway_for(&server.url());
        let reference = ChainReference::normalize("0xabc").unwrap();
        let err = gateway.poll_status(&reference).await.unwrap_err();

        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_upload_is_multipart() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload_csv")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::Regex(r#"name="file"; filename="txns.csv""#.to_string()))
            .with_status(200)
            .with_body(r#"{"processed":1,"results":[{"transaction_id":"C1","hashed_value":"","sender_id":"C1","receiver_id":"M1","fraud_status":"Legitimate","reason":"Genuine Account/Wallet","blockchain_link":""}]}"#)
            .create_async()
            .await;

        let gateway = gateway_for(&server.url());
        let file = BatchFile::new("txns.csv", b"nameOrig\nC1\n".to_vec());
        let response = gateway.upload_batch(&file).await.unwrap();

        assert_eq!(response.results.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Bind then drop a listener so the port is closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = gateway_for(&format!("http://{}", addr));
        let id = TransactionId::parse("C1").unwrap();
        let err = gateway.check_transaction(&id).await.unwrap_err();

        assert_eq!(err, GatewayError::NetworkUnreachable);
    }

    #[tokio::test]
    async fn test_timeout_is_classified() {
        // Accept the connection but never answer.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let gateway = gateway_for(&format!("http://{}", addr));
        let reference = ChainReference::normalize("abc").unwrap();
        let err = gateway.poll_status(&reference).await.unwrap_err();

        assert_eq!(err, GatewayError::Timeout);
    }
}
