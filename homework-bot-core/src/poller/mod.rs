//! Poll loop: fetch, validate, render, notify, sleep, repeat.
//!
//! The loop never terminates on its own. Every `PollError` is logged and reported through the
//! notification sink, then the next iteration runs after the fixed interval. There is no retry
//! cap and no backoff.

mod watermark;

pub use watermark::WatermarkStore;

use crate::api::{check_response, HomeworkApi, PracticumClient};
use crate::error::PollError;
use crate::models::{parse_status, Configuration, Credentials};
use crate::providers::{send_message, NotificationSink, TelegramSink};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Key carrying the server's notion of "now"
const CURRENT_DATE_KEY: &str = "current_date";

/// Result of one polling iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A status change was rendered and handed to the sink
    Notified { message: String, delivered: bool },
    /// The API returned no new statuses
    NoChange,
    /// The iteration failed; `notified` is false when delivery failed or was suppressed
    Failed {
        kind: &'static str,
        message: String,
        notified: bool,
    },
}

/// Sequential poller for one (API, chat) pair. Owns the watermark exclusively.
pub struct Poller {
    api: Arc<dyn HomeworkApi>,
    sink: Arc<dyn NotificationSink>,
    interval: Duration,
    watermark: i64,
    store: Option<WatermarkStore>,
    suppress_repeated_errors: bool,
    last_error: Option<String>,
}

impl Poller {
    /// Create a poller whose watermark starts one interval before now.
    pub fn new(
        api: Arc<dyn HomeworkApi>,
        sink: Arc<dyn NotificationSink>,
        interval: Duration,
    ) -> Self {
        let watermark = chrono::Utc::now().timestamp() - interval.as_secs() as i64;
        Self {
            api,
            sink,
            interval,
            watermark,
            store: None,
            suppress_repeated_errors: true,
            last_error: None,
        }
    }

    /// Build the production poller: Practicum API client plus Telegram sink.
    pub fn from_config(
        config: &Configuration,
        credentials: &Credentials,
    ) -> Result<Self, reqwest::Error> {
        let api = PracticumClient::new(
            config.endpoint.clone(),
            credentials.practicum_token.clone(),
            config.request_timeout(),
        )?;
        let sink = TelegramSink::with_api_base(
            config.telegram_api_base.clone(),
            credentials.telegram_token.clone(),
            credentials.telegram_chat_id.clone(),
            config.request_timeout(),
        )?;
        let mut poller = Poller::new(Arc::new(api), Arc::new(sink), config.retry_interval())
            .suppress_repeated_errors(config.suppress_repeated_errors);
        if let Some(path) = &config.state_file {
            poller = poller.with_store(WatermarkStore::new(path));
        }
        Ok(poller)
    }

    pub fn with_watermark(mut self, from_date: i64) -> Self {
        self.watermark = from_date;
        self
    }

    /// Persist the watermark in `store`, resuming from its stored value if there is one.
    pub fn with_store(mut self, store: WatermarkStore) -> Self {
        if let Some(from_date) = store.load() {
            tracing::info!(from_date, path = %store.path().display(), "Resuming from stored watermark");
            self.watermark = from_date;
        }
        self.store = Some(store);
        self
    }

    pub fn suppress_repeated_errors(mut self, enabled: bool) -> Self {
        self.suppress_repeated_errors = enabled;
        self
    }

    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll forever, sleeping the fixed interval after every iteration.
    pub async fn run(&mut self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            from_date = self.watermark,
            "Polling started"
        );
        loop {
            self.poll_once().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Run a bounded number of iterations with the interval between them.
    pub async fn run_iterations(&mut self, iterations: u64) -> Vec<PollOutcome> {
        let mut outcomes = Vec::new();
        for i in 0..iterations {
            outcomes.push(self.poll_once().await);
            if i + 1 < iterations {
                tokio::time::sleep(self.interval).await;
            }
        }
        outcomes
    }

    /// One iteration. Never fails: errors become `PollOutcome::Failed`.
    pub async fn poll_once(&mut self) -> PollOutcome {
        match self.check().await {
            Ok(Some(message)) => {
                self.last_error = None;
                tracing::info!(message = %message, "Homework status changed");
                let delivered = send_message(self.sink.as_ref(), &message).await;
                PollOutcome::Notified { message, delivered }
            }
            Ok(None) => {
                self.last_error = None;
                tracing::debug!(from_date = self.watermark, "No status changes");
                PollOutcome::NoChange
            }
            Err(err) => self.report_failure(err).await,
        }
    }

    async fn check(&mut self) -> Result<Option<String>, PollError> {
        let response = self.api.get_api_answer(self.watermark).await?;
        let homeworks = check_response(&response)?;
        let message = homeworks.first().map(parse_status).transpose()?;
        self.advance_watermark(&response);
        Ok(message)
    }

    fn advance_watermark(&mut self, response: &Value) {
        let Some(current_date) = response.get(CURRENT_DATE_KEY).and_then(Value::as_i64) else {
            tracing::debug!(from_date = self.watermark, "No current_date in response; watermark kept");
            return;
        };
        if current_date == self.watermark {
            return;
        }
        self.watermark = current_date;
        if let Some(store) = &self.store {
            if let Err(e) = store.save(current_date) {
                tracing::warn!(path = %store.path().display(), error = %e, "Failed to persist watermark");
            }
        }
    }

    async fn report_failure(&mut self, err: PollError) -> PollOutcome {
        let kind = err.kind();
        let message = format!("Program failure: {}", err);

        match &err {
            PollError::Connectivity { request, source } => tracing::error!(
                kind,
                url = %request.url,
                from_date = request.from_date,
                error = ?source,
                "API server unreachable"
            ),
            PollError::RemoteReported { request, .. } | PollError::Protocol { request, .. } => {
                tracing::error!(
                    kind,
                    url = %request.url,
                    from_date = request.from_date,
                    error = %err,
                    "API request rejected"
                )
            }
            PollError::MalformedResponse(_) | PollError::UnknownStatus(_) => {
                tracing::error!(kind, error = %err, "Unexpected API data")
            }
        }

        let repeated = self.suppress_repeated_errors
            && self.last_error.as_deref() == Some(message.as_str());
        let notified = if repeated {
            tracing::debug!(kind, "Same failure as last iteration; notification skipped");
            false
        } else {
            send_message(self.sink.as_ref(), &message).await
        };
        self.last_error = Some(message.clone());

        PollOutcome::Failed {
            kind,
            message,
            notified,
        }
    }
}
