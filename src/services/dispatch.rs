//! Best-effort batch delivery to the telemetry endpoint.
//!
//! Batches are sent strictly sequentially; a failed batch is warned about and
//! never prevents the remaining batches from being attempted. The run's own
//! outcome is not conditioned on delivery results.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::{API_KEY_HEADER, TelemetryKind};
use crate::error::{AppError, AppResult};
use crate::models::telemetry::Batch;

/// HTTP connect timeout for telemetry requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Response surfaced by a successful delivery.
#[derive(Debug, Clone)]
pub struct SinkResponse {
    pub status: u16,
    pub body: String,
}

/// Transport boundary for batch delivery. The production implementation is
/// an HTTP POST; tests substitute a recording double.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn send(&self, body: &Value) -> AppResult<SinkResponse>;
}

/// POSTs JSON payloads to the telemetry ingestion endpoint with the API
/// credential header and a bounded timeout.
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
    license_key: SecretString,
}

impl HttpSink {
    /// Build the sink with its own HTTP client.
    pub fn new(url: String, license_key: SecretString, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .build()
            .expect("Failed to build HTTP client for telemetry");

        HttpSink {
            client,
            url,
            license_key,
        }
    }
}

#[async_trait]
impl TelemetrySink for HttpSink {
    async fn send(&self, body: &Value) -> AppResult<SinkResponse> {
        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, self.license_key.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AppError::Delivery(format!(
                "endpoint returned {}: {}",
                status, text
            )));
        }

        Ok(SinkResponse {
            status: status.as_u16(),
            body: text,
        })
    }
}

/// Outcome of one batch delivery attempt.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub batch_index: usize,
    pub records: usize,
    pub result: AppResult<SinkResponse>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Send each batch as an independent request, in order, and collect one
/// outcome per batch. Failures are contained here: they are logged and the
/// sweep continues with the next batch. No retry.
pub async fn dispatch(
    sink: &dyn TelemetrySink,
    batches: &[Batch],
    common: &Map<String, Value>,
    kind: TelemetryKind,
) -> Vec<DispatchOutcome> {
    info!(
        "Sending {} request(s) to the telemetry endpoint ({})",
        batches.len(),
        kind
    );

    let mut outcomes = Vec::with_capacity(batches.len());

    for (batch_index, batch) in batches.iter().enumerate() {
        let body = batch.to_body(kind, common);
        debug!(
            "Batch {}/{} payload: {}",
            batch_index + 1,
            batches.len(),
            body
        );

        let result = sink.send(&body).await;
        match &result {
            Ok(response) => {
                info!(
                    "Batch {}/{} delivered: {}\n{}",
                    batch_index + 1,
                    batches.len(),
                    response.status,
                    response.body
                );
            }
            Err(e) => {
                warn!(
                    "dispatch: batch {}/{} failed, continuing with remaining batches: {}",
                    batch_index + 1,
                    batches.len(),
                    e
                );
            }
        }

        outcomes.push(DispatchOutcome {
            batch_index,
            records: batch.records.len(),
            result,
        });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every payload it receives; fails on configured batch indices.
    struct RecordingSink {
        sent: Mutex<Vec<Value>>,
        fail_on: Vec<usize>,
    }

    impl RecordingSink {
        fn new(fail_on: Vec<usize>) -> Self {
            RecordingSink {
                sent: Mutex::new(Vec::new()),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl TelemetrySink for RecordingSink {
        async fn send(&self, body: &Value) -> AppResult<SinkResponse> {
            let mut sent = self.sent.lock().unwrap();
            let index = sent.len();
            sent.push(body.clone());

            if self.fail_on.contains(&index) {
                return Err(AppError::Delivery("connection reset".to_string()));
            }
            Ok(SinkResponse {
                status: 202,
                body: "{\"requestId\":\"ok\"}".to_string(),
            })
        }
    }

    fn batches(n: usize) -> Vec<Batch> {
        (0..n)
            .map(|i| Batch {
                records: vec![crate::models::telemetry::TelemetryRecord {
                    file: None,
                    title: format!("t{}", i),
                    full_title: None,
                    suite: None,
                    duration_ms: 1,
                    failed: false,
                    error_message: None,
                    error_stack: None,
                }],
                timestamp: 1,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_stop_the_sweep() {
        let sink = RecordingSink::new(vec![1]);
        let outcomes = dispatch(
            &sink,
            &batches(3),
            &Map::new(),
            TelemetryKind::Metrics,
        )
        .await;

        // All three batches were attempted despite the middle failure.
        assert_eq!(sink.sent.lock().unwrap().len(), 3);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success());
        assert!(!outcomes[1].is_success());
        assert!(outcomes[2].is_success());
    }

    #[tokio::test]
    async fn test_batches_are_sent_in_order() {
        let sink = RecordingSink::new(Vec::new());
        dispatch(&sink, &batches(3), &Map::new(), TelemetryKind::Metrics).await;

        let sent = sink.sent.lock().unwrap();
        for (i, body) in sent.iter().enumerate() {
            assert_eq!(
                body[0]["metrics"][0]["attributes"]["title"],
                format!("t{}", i)
            );
        }
    }

    #[tokio::test]
    async fn test_no_batches_means_no_requests() {
        let sink = RecordingSink::new(Vec::new());
        let outcomes = dispatch(&sink, &[], &Map::new(), TelemetryKind::Logs).await;

        assert!(outcomes.is_empty());
        assert!(sink.sent.lock().unwrap().is_empty());
    }
}
