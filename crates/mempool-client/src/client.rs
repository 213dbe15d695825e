//! HTTP client for the explorer REST API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use satsentry_gap_limit::{ActivityCheckError, ActivityChecker};
use satsentry_primitives::TransactionSummary;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::{config::ExplorerConfig, errors::ClientError, types::EsploraTx};

/// Connection timeout for new sockets.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for a mempool.space compatible explorer.
#[derive(Debug, Clone)]
pub struct MempoolClient {
    http: Client,
    api_url: String,
    timeout: Duration,
}

impl MempoolClient {
    /// Builds a client for the endpoint described by `config`.
    pub fn new(config: &ExplorerConfig) -> Result<Self, ClientError> {
        let timeout = config.request_timeout();
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            api_url: config.api_url(),
            timeout,
        })
    }

    /// Base URL of the REST API.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Transactions touching `address`, newest first.
    pub async fn address_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<EsploraTx>, ClientError> {
        self.get_json(&format!("address/{address}/txs")).await
    }

    /// Height of the current chain tip; doubles as a connectivity check.
    pub async fn tip_height(&self) -> Result<u64, ClientError> {
        self.get_json("blocks/tip/height").await
    }

    /// Summary of the newest transaction touching `address`.
    pub async fn latest_activity(
        &self,
        address: &str,
    ) -> Result<Option<TransactionSummary>, ClientError> {
        let txs = self.address_transactions(address).await?;
        trace!(%address, count = txs.len(), "fetched address transactions");

        Ok(txs.first().map(|tx| tx.summarize(address, Utc::now())))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}/{path}", self.api_url);
        debug!(%url, "explorer request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.request_error(&url, e))?;

        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { url, source })
    }

    fn request_error(&self, url: &str, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            ClientError::Request {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

#[async_trait]
impl ActivityChecker for MempoolClient {
    async fn check_activity(
        &self,
        address: &str,
    ) -> Result<Option<TransactionSummary>, ActivityCheckError> {
        Ok(self.latest_activity(address).await?)
    }
}

#[cfg(test)]
mod tests {
    use satsentry_primitives::Direction;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    use super::*;

    /// Serves one canned HTTP response and returns the request line it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (u16, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            request.lines().next().unwrap_or_default().to_string()
        });

        (port, handle)
    }

    fn client(port: u16) -> MempoolClient {
        let config = ExplorerConfig::default().with_self_hosted("127.0.0.1", port);
        MempoolClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn newest_transaction_is_summarized() {
        let body = r#"[
            {"txid": "ff", "vin": [], "status": {"confirmed": true, "block_time": 1700000000}},
            {"txid": "ee", "vin": [], "status": {"confirmed": true, "block_time": 1600000000}}
        ]"#;
        let (port, server) = serve_once("200 OK", body).await;

        let activity = client(port).check_activity("bc1qwatched").await.unwrap().unwrap();

        assert_eq!(activity.txid, "ff");
        assert_eq!(activity.direction, Direction::Incoming);
        assert_eq!(activity.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(
            server.await.unwrap(),
            "GET /api/address/bc1qwatched/txs HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn empty_history_means_unused() {
        let (port, _server) = serve_once("200 OK", "[]").await;
        assert_eq!(client(port).check_activity("bc1qfresh").await.unwrap(), None);
    }

    #[tokio::test]
    async fn error_status_is_transport_failure() {
        let (port, _server) = serve_once("503 Service Unavailable", "{}").await;

        let err = client(port).address_transactions("bc1qx").await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 503, .. }));
        assert!(matches!(
            ActivityCheckError::from(err),
            ActivityCheckError::Transport(_)
        ));
    }

    #[tokio::test]
    async fn garbage_body_is_invalid_response() {
        let (port, _server) = serve_once("200 OK", "not json").await;

        let err = client(port).check_activity("bc1qx").await.unwrap_err();
        assert!(matches!(err, ActivityCheckError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn tip_height_parses_plain_number() {
        let (port, server) = serve_once("200 OK", "840000").await;

        assert_eq!(client(port).tip_height().await.unwrap(), 840_000);
        assert_eq!(server.await.unwrap(), "GET /api/blocks/tip/height HTTP/1.1");
    }
}
