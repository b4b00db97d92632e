//! Remote agent client
//!
//! Talks JSON-RPC 2.0 to participant agents over HTTP: role offers at game
//! start, action requests during play, and a cheap reachability probe before
//! anything else. [`AgentTransport`] is the seam; [`HttpTransport`] is the
//! real implementation and tests script their own.
//!
//! Retry discipline: only timeouts and transport failures are retried, with
//! linear backoff between attempts. An error reported by the agent itself, or
//! a response that does not parse, fails the call immediately.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::{ActionCall, ActionReply, RoleOffer};

/// Errors from remote agent calls
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("Transport failure for {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("Agent at {endpoint} returned an error: {message}")]
    Agent { endpoint: String, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Client setup failed: {message}")]
    Setup { message: String },

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<ClientError> },
}

impl ClientError {
    pub fn timeout(endpoint: impl Into<String>) -> Self {
        Self::Timeout {
            endpoint: endpoint.into(),
        }
    }

    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn agent(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Agent {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Strip the trailing slash agents often configure by accident
pub(crate) fn normalize_endpoint(endpoint: &str) -> &str {
    endpoint.trim_end_matches('/')
}

/// Transport seam between the client and the network
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Send one JSON-RPC request and return its `result` member
    async fn call(
        &self,
        endpoint: &str,
        method: &str,
        params: Value,
        request_id: &str,
    ) -> ClientResult<Value>;

    /// Cheap liveness check against one agent
    async fn probe(&self, endpoint: &str) -> ClientResult<()>;
}

/// Shared reference to a transport
pub type SharedTransport = Arc<dyn AgentTransport>;

/// HTTP transport: POST `{endpoint}/a2a` for calls, GET `{endpoint}/info`
/// for probes
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the transport with its own outer request timeout.
    ///
    /// The per-call deadline enforced by [`AgentClient`] is the one that
    /// matters; this timeout is a backstop slightly above it.
    pub fn new(request_timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::setup(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn map_send_error(endpoint: &str, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::timeout(endpoint)
        } else {
            ClientError::transport(endpoint, e.to_string())
        }
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    async fn call(
        &self,
        endpoint: &str,
        method: &str,
        params: Value,
        request_id: &str,
    ) -> ClientResult<Value> {
        let url = format!("{}/a2a", normalize_endpoint(endpoint));
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": request_id,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_send_error(endpoint, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::transport(
                endpoint,
                format!("HTTP {}: {}", status, text),
            ));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ClientError::invalid_response(e.to_string()))?;

        if let Some(error) = payload.get("error") {
            return Err(ClientError::agent(endpoint, error.to_string()));
        }

        Ok(payload
            .get("result")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default())))
    }

    async fn probe(&self, endpoint: &str) -> ClientResult<()> {
        let url = format!("{}/info", normalize_endpoint(endpoint));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::map_send_error(endpoint, e))?;

        if !response.status().is_success() {
            return Err(ClientError::transport(
                endpoint,
                format!("HTTP {}", response.status()),
            ));
        }

        // Read the body so a hung server fails the probe, not just a dead one
        let _ = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(endpoint, e.to_string()))?;
        Ok(())
    }
}

/// Retry configuration for remote calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per call, first try included
    pub max_attempts: u32,
    /// Backoff after attempt k is `base_delay * k`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Client wrapping a transport with deadlines, retries, and fan-out
pub struct AgentClient {
    transport: SharedTransport,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl AgentClient {
    pub fn new(transport: SharedTransport, policy: RetryPolicy, call_timeout: Duration) -> Self {
        Self {
            transport,
            policy,
            call_timeout,
        }
    }

    /// Client backed by [`HttpTransport`] with the default retry policy
    pub fn http(call_timeout: Duration) -> ClientResult<Self> {
        let transport = HttpTransport::new(call_timeout + Duration::from_secs(5))?;
        Ok(Self::new(
            Arc::new(transport),
            RetryPolicy::default(),
            call_timeout,
        ))
    }

    /// One call under the retry policy. Each attempt is bounded by the
    /// call timeout; only retryable failures earn another attempt.
    async fn call_with_retry(
        &self,
        endpoint: &str,
        method: &str,
        params: Value,
        request_id: &str,
    ) -> ClientResult<Value> {
        let mut last: Option<ClientError> = None;

        for attempt in 1..=self.policy.max_attempts {
            let outcome = tokio::time::timeout(
                self.call_timeout,
                self.transport
                    .call(endpoint, method, params.clone(), request_id),
            )
            .await;

            match outcome {
                Ok(Ok(value)) => {
                    if attempt > 1 {
                        debug!(endpoint, method, attempt, "call succeeded after retry");
                    }
                    return Ok(value);
                }
                Ok(Err(e)) if e.is_retryable() => {
                    warn!(endpoint, method, attempt, error = %e, "retryable call failure");
                    last = Some(e);
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!(endpoint, method, attempt, "call timed out");
                    last = Some(ClientError::timeout(endpoint));
                }
            }

            if attempt < self.policy.max_attempts {
                tokio::time::sleep(self.policy.base_delay * attempt).await;
            }
        }

        Err(ClientError::Exhausted {
            attempts: self.policy.max_attempts,
            last: Box::new(last.unwrap_or_else(|| ClientError::timeout(endpoint))),
        })
    }

    /// Deliver one player's role offer
    pub async fn send_role_offer(&self, endpoint: &str, offer: &RoleOffer) -> ClientResult<()> {
        let params = serde_json::to_value(offer)
            .map_err(|e| ClientError::invalid_response(format!("encode role offer: {}", e)))?;
        self.call_with_retry(endpoint, "role_assignment", params, &offer.rpc_id())
            .await?;
        Ok(())
    }

    /// Deliver all role offers in parallel, returning each player's outcome.
    /// A failed delivery is that player's problem, not the game's.
    pub async fn send_role_offers(
        &self,
        offers: &[(String, RoleOffer)],
    ) -> Vec<(String, ClientResult<()>)> {
        let deliveries = offers.iter().map(|(endpoint, offer)| async move {
            let outcome = self.send_role_offer(endpoint, offer).await;
            (offer.player_name.clone(), outcome)
        });
        join_all(deliveries).await
    }

    /// Ask one player to act
    pub async fn request_action(
        &self,
        endpoint: &str,
        call: &ActionCall,
    ) -> ClientResult<ActionReply> {
        let params = serde_json::to_value(call)
            .map_err(|e| ClientError::invalid_response(format!("encode action call: {}", e)))?;
        let result = self
            .call_with_retry(endpoint, "action_request", params, &call.rpc_id())
            .await?;

        let decision = result
            .get("decision")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let reasoning = result
            .get("reasoning")
            .and_then(Value::as_str)
            .map(String::from);

        Ok(ActionReply::answer(call, decision, reasoning))
    }

    /// Ask a batch of players to act at once.
    ///
    /// Every player gets a reply: failures degrade to
    /// [`ActionReply::declined`] so one unreachable agent never sinks the
    /// batch.
    pub async fn request_actions_parallel(
        &self,
        calls: &[(String, ActionCall)],
    ) -> HashMap<String, ActionReply> {
        let requests = calls.iter().map(|(endpoint, call)| async move {
            let reply = match self.request_action(endpoint, call).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(player = %call.player_name, error = %e, "action degraded to decline");
                    ActionReply::declined(call, e)
                }
            };
            (call.player_name.clone(), reply)
        });
        join_all(requests).await.into_iter().collect()
    }

    /// Probe every participant once, in parallel, under a short deadline.
    /// Returns per-player reachability.
    pub async fn verify_connectivity(
        &self,
        participants: &HashMap<String, String>,
        probe_timeout: Duration,
    ) -> HashMap<String, bool> {
        let probes = participants.iter().map(|(player, endpoint)| async move {
            let ok = matches!(
                tokio::time::timeout(probe_timeout, self.transport.probe(endpoint)).await,
                Ok(Ok(()))
            );
            if !ok {
                warn!(player = %player, endpoint = %endpoint, "agent unreachable");
            }
            (player.clone(), ok)
        });
        join_all(probes).await.into_iter().collect()
    }
}
