mod webhook_test;

use crate::app::{AppState, AppStateBuilder};
use crate::config::{Config, StateCarry};
use crate::report::{FaultReport, LogNotifier, ReportStore, ReportingSink, SinkOptions};
use async_trait::async_trait;
use axum::response::Response;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Keeps every inserted report in memory.
#[derive(Clone, Default)]
pub struct RecordingStore {
    pub reports: Arc<Mutex<Vec<FaultReport>>>,
}

#[async_trait]
impl ReportStore for RecordingStore {
    async fn insert(&self, report: &FaultReport) -> anyhow::Result<String> {
        self.reports
            .lock()
            .map_err(|_| anyhow::anyhow!("poisoned"))?
            .push(report.clone());
        Ok(format!("mem://{}", report.id))
    }
}

pub async fn build_state(carry: StateCarry) -> (AppState, RecordingStore) {
    let store = RecordingStore::default();
    let mut config = Config::default();
    config.ivr.state_carry = carry;
    config.report.operations_email = Some("ops@example.com".to_string());
    let sink = ReportingSink::new(
        Arc::new(store.clone()),
        Arc::new(LogNotifier),
        SinkOptions {
            timeout: Duration::from_secs(1),
            ..SinkOptions::from(&config.report)
        },
    );
    let state = AppStateBuilder::new()
        .with_config(config)
        .with_sink(Arc::new(sink))
        .build()
        .await
        .expect("build app state");
    (state, store)
}

// Helper function to convert axum response to a string body
pub async fn response_to_string(response: Response) -> String {
    let body = response.into_body();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
