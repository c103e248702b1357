//! Poll loop behavior with scripted API responses and a recording sink.

use async_trait::async_trait;
use homework_bot_core::api::HomeworkApi;
use homework_bot_core::error::{DeliveryError, PollError, RequestInfo, ResponseError};
use homework_bot_core::poller::WatermarkStore;
use homework_bot_core::providers::NotificationSink;
use homework_bot_core::{PollOutcome, Poller};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

const APPROVED_MESSAGE: &str = "The review status of \"hw1\" has changed. \
     The work has been reviewed: the reviewer liked everything. Hooray!";

/// API stub replaying queued responses; answers with an empty list once the queue runs out.
struct ScriptedApi {
    responses: Mutex<VecDeque<Result<Value, PollError>>>,
    requested: Mutex<Vec<i64>>,
}

impl ScriptedApi {
    fn new(responses: Vec<Result<Value, PollError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requested: Mutex::new(Vec::new()),
        })
    }

    fn requested(&self) -> Vec<i64> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HomeworkApi for ScriptedApi {
    async fn get_api_answer(&self, from_date: i64) -> Result<Value, PollError> {
        self.requested.lock().unwrap().push(from_date);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"homeworks": []})))
    }
}

/// Mock sink that records received messages.
struct MockSink {
    received: Arc<RwLock<Vec<String>>>,
}

impl MockSink {
    fn new() -> (Arc<Self>, Arc<RwLock<Vec<String>>>) {
        let received = Arc::new(RwLock::new(Vec::new()));
        let sink = Arc::new(Self {
            received: Arc::clone(&received),
        });
        (sink, received)
    }
}

#[async_trait]
impl NotificationSink for MockSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        self.received.write().await.push(text.to_string());
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    async fn send(&self, _text: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::Rejected {
            status: 400,
            body: "chat not found".to_string(),
        })
    }
}

fn not_authenticated(from_date: i64) -> PollError {
    PollError::RemoteReported {
        key: "code".to_string(),
        value: "not_authenticated".to_string(),
        request: RequestInfo {
            url: "http://api.test/homework_statuses/".to_string(),
            from_date,
        },
    }
}

fn poller(api: Arc<ScriptedApi>, sink: Arc<dyn NotificationSink>) -> Poller {
    Poller::new(api, sink, Duration::from_millis(5)).with_watermark(1_000)
}

#[tokio::test]
async fn test_approved_homework_is_notified() {
    let api = ScriptedApi::new(vec![Ok(json!({
        "homeworks": [{"status": "approved", "homework_name": "hw1"}]
    }))]);
    let (sink, received) = MockSink::new();
    let mut poller = poller(api, sink);

    let outcome = poller.poll_once().await;

    assert_eq!(
        outcome,
        PollOutcome::Notified {
            message: APPROVED_MESSAGE.to_string(),
            delivered: true,
        }
    );
    assert_eq!(*received.read().await, vec![APPROVED_MESSAGE.to_string()]);
}

#[tokio::test]
async fn test_only_first_homework_is_reported() {
    let api = ScriptedApi::new(vec![Ok(json!({
        "homeworks": [
            {"status": "reviewing", "homework_name": "latest"},
            {"status": "approved", "homework_name": "older"}
        ]
    }))]);
    let (sink, received) = MockSink::new();
    let mut poller = poller(api, sink);

    poller.poll_once().await;

    let messages = received.read().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0],
        "The review status of \"latest\" has changed. \
         The work has been taken for review by the reviewer."
    );
}

#[tokio::test]
async fn test_empty_list_sends_nothing() {
    let api = ScriptedApi::new(vec![Ok(json!({"homeworks": []}))]);
    let (sink, received) = MockSink::new();
    let mut poller = poller(api, sink);

    assert_eq!(poller.poll_once().await, PollOutcome::NoChange);
    assert!(received.read().await.is_empty());
}

#[tokio::test]
async fn test_remote_error_is_reported_and_loop_continues() {
    let api = ScriptedApi::new(vec![
        Err(not_authenticated(1_000)),
        Ok(json!({
            "homeworks": [{"status": "approved", "homework_name": "hw1"}],
            "current_date": 2_000
        })),
    ]);
    let (sink, received) = MockSink::new();
    let mut poller = poller(Arc::clone(&api), sink);

    let outcomes = poller.run_iterations(2).await;

    assert_eq!(outcomes.len(), 2);
    match &outcomes[0] {
        PollOutcome::Failed {
            kind,
            message,
            notified,
        } => {
            assert_eq!(*kind, "remote_reported");
            assert!(message.starts_with("Program failure: "));
            assert!(message.contains("not_authenticated"));
            assert!(*notified);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(matches!(outcomes[1], PollOutcome::Notified { .. }));

    let messages = received.read().await;
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("not_authenticated"));
    assert_eq!(messages[1], APPROVED_MESSAGE);
    assert_eq!(api.requested(), vec![1_000, 1_000]);
    assert_eq!(poller.watermark(), 2_000);
}

#[tokio::test]
async fn test_watermark_follows_current_date() {
    let api = ScriptedApi::new(vec![
        Ok(json!({"homeworks": [], "current_date": 1_500})),
        Ok(json!({"homeworks": []})),
        Ok(json!({"homeworks": [], "current_date": "soon"})),
        Ok(json!({"homeworks": [], "current_date": 1_900})),
    ]);
    let (sink, _) = MockSink::new();
    let mut poller = poller(Arc::clone(&api), sink);

    poller.run_iterations(5).await;

    assert_eq!(api.requested(), vec![1_000, 1_500, 1_500, 1_500, 1_900]);
    assert_eq!(poller.watermark(), 1_900);
}

#[tokio::test]
async fn test_failed_iteration_keeps_watermark() {
    let api = ScriptedApi::new(vec![Ok(json!({
        "homeworks": [{"status": "lost", "homework_name": "hw1"}],
        "current_date": 5_000
    }))]);
    let (sink, received) = MockSink::new();
    let mut poller = poller(api, sink);

    let outcome = poller.poll_once().await;

    match outcome {
        PollOutcome::Failed { kind, message, .. } => {
            assert_eq!(kind, "unknown_status");
            assert!(message.contains("lost"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(poller.watermark(), 1_000);
    assert_eq!(received.read().await.len(), 1);
}

#[tokio::test]
async fn test_malformed_response_is_reported() {
    let api = ScriptedApi::new(vec![
        Ok(json!({"homeworks": "none"})),
        Ok(json!(["not", "an", "object"])),
        Err(PollError::MalformedResponse(ResponseError::NotJson(
            "expected value".to_string(),
        ))),
    ]);
    let (sink, _) = MockSink::new();
    let mut poller = poller(api, sink).suppress_repeated_errors(false);

    for outcome in poller.run_iterations(3).await {
        match outcome {
            PollOutcome::Failed { kind, .. } => assert_eq!(kind, "malformed_response"),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_repeated_failure_is_notified_once() {
    let api = ScriptedApi::new(vec![
        Err(not_authenticated(1_000)),
        Err(not_authenticated(1_000)),
        Ok(json!({"homeworks": []})),
        Err(not_authenticated(1_000)),
    ]);
    let (sink, received) = MockSink::new();
    let mut poller = poller(api, sink);

    let outcomes = poller.run_iterations(4).await;

    let notified: Vec<bool> = outcomes
        .iter()
        .filter_map(|o| match o {
            PollOutcome::Failed { notified, .. } => Some(*notified),
            _ => None,
        })
        .collect();
    // A successful poll in between resets suppression.
    assert_eq!(notified, vec![true, false, true]);
    assert_eq!(received.read().await.len(), 2);
}

#[tokio::test]
async fn test_repeated_failure_without_suppression() {
    let api = ScriptedApi::new(vec![
        Err(not_authenticated(1_000)),
        Err(not_authenticated(1_000)),
    ]);
    let (sink, received) = MockSink::new();
    let mut poller = poller(api, sink).suppress_repeated_errors(false);

    poller.run_iterations(2).await;

    assert_eq!(received.read().await.len(), 2);
}

#[tokio::test]
async fn test_delivery_failure_does_not_stop_polling() {
    let api = ScriptedApi::new(vec![
        Ok(json!({
            "homeworks": [{"status": "rejected", "homework_name": "hw1"}],
            "current_date": 3_000
        })),
        Err(not_authenticated(3_000)),
    ]);
    let mut poller = poller(Arc::clone(&api), Arc::new(FailingSink));

    let outcomes = poller.run_iterations(3).await;

    assert!(matches!(
        outcomes[0],
        PollOutcome::Notified {
            delivered: false,
            ..
        }
    ));
    assert!(matches!(
        outcomes[1],
        PollOutcome::Failed {
            notified: false,
            ..
        }
    ));
    assert_eq!(outcomes[2], PollOutcome::NoChange);
    assert_eq!(api.requested(), vec![1_000, 3_000, 3_000]);
}

#[tokio::test]
async fn test_initial_watermark_is_one_interval_ago() {
    let api = ScriptedApi::new(vec![]);
    let (sink, _) = MockSink::new();
    let before = chrono::Utc::now().timestamp();
    let poller = Poller::new(api, sink, Duration::from_secs(600));
    let after = chrono::Utc::now().timestamp();

    assert!(poller.watermark() >= before - 600);
    assert!(poller.watermark() <= after - 600);
    assert_eq!(poller.interval(), Duration::from_secs(600));
}

#[tokio::test]
async fn test_watermark_store_resumes_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let store = WatermarkStore::new(dir.path().join("watermark.json"));
    store.save(4_000).unwrap();

    let api = ScriptedApi::new(vec![Ok(json!({"homeworks": [], "current_date": 4_600}))]);
    let (sink, _) = MockSink::new();
    let mut poller = Poller::new(Arc::<ScriptedApi>::clone(&api), sink, Duration::from_millis(5))
        .with_store(store.clone());

    assert_eq!(poller.watermark(), 4_000);
    poller.poll_once().await;

    assert_eq!(api.requested(), vec![4_000]);
    assert_eq!(store.load(), Some(4_600));
}
