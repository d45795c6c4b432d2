//! Reward reconciliation with the external loot service
//!
//! The single piece of true I/O in a combat session. The reconciler issues
//! exactly one outbound request per session, bounds it with a timeout, and
//! degrades every failure to "victory with no bonus loot". Nothing here is
//! ever surfaced to the player as a blocking error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use combat_core::{DropBundle, OpponentKind};

/// Identifier of one defeated opponent, forwarded to the loot service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentRef {
    pub id: String,
    pub kind: OpponentKind,
}

/// The outbound loot resolution request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootRequest {
    pub opponents: Vec<OpponentRef>,
}

/// The loot service's response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<DropBundle>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Loot service call failure
#[derive(Debug, Error)]
pub enum LootError {
    #[error("loot request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("loot service rejected the request with status {status}: {body}")]
    Service { status: u16, body: String },
    #[error("failed to parse loot response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The outbound seam to the loot service
#[async_trait]
pub trait LootService: Send + Sync {
    async fn resolve_drops(&self, request: &LootRequest) -> Result<LootResponse, LootError>;
}

/// HTTP client for the production loot service
pub struct HttpLootService {
    endpoint: String,
    auth_token: String,
    http_client: reqwest::Client,
}

impl HttpLootService {
    /// Build a client posting to `endpoint`, authorized with the session's
    /// token. The timeout bounds the whole request.
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LootError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpLootService {
            endpoint: endpoint.into(),
            auth_token: auth_token.into(),
            http_client,
        })
    }
}

#[async_trait]
impl LootService for HttpLootService {
    async fn resolve_drops(&self, request: &LootRequest) -> Result<LootResponse, LootError> {
        debug!(
            opponents = request.opponents.len(),
            "requesting loot resolution"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.auth_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LootError::Service {
                status: status.as_u16(),
                body,
            });
        }

        debug!("loot response: {body}");
        let parsed: LootResponse = serde_json::from_str(&body)?;
        Ok(parsed)
    }
}

/// Where the reconciler is in its one-shot lifecycle
#[derive(Debug, Clone)]
enum ReconcileState {
    Idle,
    InFlight,
    Settled(Option<DropBundle>),
}

/// Requests and aggregates post-victory loot, exactly once per session
///
/// The in-flight flag makes re-entry a no-op: a second call while a
/// request is pending, or after settlement, never issues another request.
pub struct RewardReconciler {
    service: Arc<dyn LootService>,
    timeout: Duration,
    state: ReconcileState,
}

impl RewardReconciler {
    pub fn new(service: Arc<dyn LootService>, timeout: Duration) -> Self {
        RewardReconciler {
            service,
            timeout,
            state: ReconcileState::Idle,
        }
    }

    /// Resolve drops for the defeated opponents
    ///
    /// Returns `Some` on service success (the bundle may still be empty)
    /// and `None` on any failure. Failures are logged for diagnostics and
    /// never retried.
    pub async fn reconcile(&mut self, request: LootRequest) -> Option<DropBundle> {
        match &self.state {
            ReconcileState::Settled(result) => return result.clone(),
            ReconcileState::InFlight => return None,
            ReconcileState::Idle => {}
        }
        self.state = ReconcileState::InFlight;

        let outcome = match tokio::time::timeout(self.timeout, self.service.resolve_drops(&request))
            .await
        {
            Err(_) => {
                warn!(timeout = ?self.timeout, "loot resolution timed out");
                None
            }
            Ok(Err(err)) => {
                warn!(error = %err, "loot resolution failed");
                None
            }
            Ok(Ok(response)) if response.success => Some(response.data.unwrap_or_default()),
            Ok(Ok(response)) => {
                warn!(
                    message = response.message.as_deref().unwrap_or(""),
                    error = response.error.as_deref().unwrap_or(""),
                    "loot service reported failure"
                );
                None
            }
        };

        self.state = ReconcileState::Settled(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingService {
        calls: AtomicUsize,
        succeed: bool,
    }

    #[async_trait]
    impl LootService for CountingService {
        async fn resolve_drops(&self, _request: &LootRequest) -> Result<LootResponse, LootError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LootResponse {
                success: self.succeed,
                data: self.succeed.then(|| DropBundle {
                    gold: 50,
                    exp: 120,
                    items: vec![],
                    cards: vec![],
                }),
                message: None,
                error: None,
                details: None,
            })
        }
    }

    fn request() -> LootRequest {
        LootRequest {
            opponents: vec![OpponentRef {
                id: "slime-1".to_string(),
                kind: OpponentKind::Normal,
            }],
        }
    }

    #[tokio::test]
    async fn test_success_yields_bundle() {
        let service = Arc::new(CountingService {
            calls: AtomicUsize::new(0),
            succeed: true,
        });
        let mut reconciler = RewardReconciler::new(service.clone(), Duration::from_secs(10));

        let drops = reconciler.reconcile(request()).await;
        assert_eq!(drops.unwrap().gold, 50);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reported_failure_yields_none() {
        let service = Arc::new(CountingService {
            calls: AtomicUsize::new(0),
            succeed: false,
        });
        let mut reconciler = RewardReconciler::new(service, Duration::from_secs(10));

        assert!(reconciler.reconcile(request()).await.is_none());
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let service = Arc::new(CountingService {
            calls: AtomicUsize::new(0),
            succeed: true,
        });
        let mut reconciler = RewardReconciler::new(service.clone(), Duration::from_secs(10));

        let first = reconciler.reconcile(request()).await;
        let second = reconciler.reconcile(request()).await;

        // Drops are not double-counted and no second request goes out
        assert_eq!(first, second);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_service_times_out() {
        struct HungService;

        #[async_trait]
        impl LootService for HungService {
            async fn resolve_drops(
                &self,
                _request: &LootRequest,
            ) -> Result<LootResponse, LootError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("the reconciler timeout fires first")
            }
        }

        let mut reconciler =
            RewardReconciler::new(Arc::new(HungService), Duration::from_secs(10));
        assert!(reconciler.reconcile(request()).await.is_none());
    }

    #[test]
    fn test_response_envelope_parses() {
        let json = r#"{
            "success": true,
            "data": {
                "gold": 75,
                "exp": 200,
                "items": [{"name": "Tattered Map"}],
                "cards": [{"title": "Inbox Zero", "bonus": {"experienceMultiplier": 1.2, "goldMultiplier": 1.0}}]
            }
        }"#;

        let response: LootResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data.gold, 75);
        assert_eq!(data.cards[0].title, "Inbox Zero");
    }

    #[test]
    fn test_failure_envelope_parses() {
        let json = r#"{"success": false, "error": "invalid opponent ids", "details": {"ids": []}}"#;
        let response: LootResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("invalid opponent ids"));
    }
}
