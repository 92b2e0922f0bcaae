use crate::types::{CommandReply, StatusSnapshot};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;

/// Fetch seam between the poller and the network, so the poll chain can be
/// exercised against a scripted source in tests.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<StatusSnapshot>;
}

/// HTTP client for one deadlockd service.
///
/// No request timeout is set; a hung fetch stalls the poll chain until the
/// transport gives up.
#[derive(Clone)]
pub struct StatusClient {
    client: Client,
    base: String,
}

impl StatusClient {
    pub fn new(base: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// Issue the kill command for `pid` and parse the reply body.
    ///
    /// The body is read without checking the HTTP status: deadlockd answers
    /// command failures with an error status whose body still describes the
    /// outcome, and an unrecognized body degrades to an empty reply.
    pub async fn kill_process(&self, pid: u32) -> Result<CommandReply> {
        self.post_command(pid, "kill").await
    }

    pub async fn restart_process(&self, pid: u32) -> Result<CommandReply> {
        self.post_command(pid, "restart").await
    }

    async fn post_command(&self, pid: u32, verb: &str) -> Result<CommandReply> {
        let url = format!("{}/system/process/{}/{}", self.base, pid, verb);
        let resp = self
            .client
            .post(&url)
            .send()
            .await
            .with_context(|| format!("{verb} request failed"))?;
        resp.json()
            .await
            .with_context(|| format!("failed to parse {verb} reply"))
    }
}

#[async_trait]
impl StatusSource for StatusClient {
    async fn fetch_status(&self) -> Result<StatusSnapshot> {
        let url = format!("{}/system/status", self.base);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("status request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("status request returned {}", resp.status()));
        }
        resp.json().await.context("failed to parse status snapshot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn fetch_parses_snapshot() {
        let server = MockServer::start_async().await;
        let _m = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/system/status");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"stats": {"deadlock_risk": 0.5}}"#);
            })
            .await;

        let client = StatusClient::new(&format!("{}/api", server.base_url())).unwrap();
        let snapshot = client.fetch_status().await.unwrap();
        assert_eq!(snapshot.stats.unwrap().deadlock_risk, Some(0.5));
    }

    #[tokio::test]
    async fn fetch_fails_on_error_status() {
        let server = MockServer::start_async().await;
        let _m = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/system/status");
                then.status(500).body("boom");
            })
            .await;

        let client = StatusClient::new(&format!("{}/api", server.base_url())).unwrap();
        let err = client.fetch_status().await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn fetch_fails_on_malformed_body() {
        let server = MockServer::start_async().await;
        let _m = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/system/status");
                then.status(200).body("not json");
            })
            .await;

        let client = StatusClient::new(&format!("{}/api", server.base_url())).unwrap();
        assert!(client.fetch_status().await.is_err());
    }

    #[tokio::test]
    async fn command_reply_is_read_even_on_error_status() {
        let server = MockServer::start_async().await;
        let _m = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/system/process/42/kill");
                then.status(400)
                    .header("content-type", "application/json")
                    .body(r#"{"success": false, "message": "Process 42 not found"}"#);
            })
            .await;

        let client = StatusClient::new(&format!("{}/api", server.base_url())).unwrap();
        let reply = client.kill_process(42).await.unwrap();
        assert!(!reply.success);
        assert_eq!(reply.message, "Process 42 not found");
    }
}
