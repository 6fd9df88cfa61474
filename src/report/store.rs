use super::{FaultReport, ReportStore};
use crate::config::ReportStoreConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::{path::PathBuf, sync::Arc};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, error, info};

pub fn build_store(
    config: &ReportStoreConfig,
    client: reqwest::Client,
) -> Result<Arc<dyn ReportStore>> {
    let store: Arc<dyn ReportStore> = match config {
        ReportStoreConfig::None => Arc::new(NoopReportStore),
        ReportStoreConfig::Local { root } => Arc::new(LocalReportStore::new(root)?),
        ReportStoreConfig::Rest {
            url,
            api_key,
            table,
        } => Arc::new(RestReportStore::new(client, url, api_key, table)),
    };
    Ok(store)
}

pub struct NoopReportStore;

#[async_trait]
impl ReportStore for NoopReportStore {
    async fn insert(&self, report: &FaultReport) -> Result<String> {
        debug!(report_id = %report.id, "report store disabled, dropping report");
        Ok(String::new())
    }
}

/// One pretty-printed JSON file per report, named by report id.
pub struct LocalReportStore {
    root: PathBuf,
}

impl LocalReportStore {
    pub fn new(root: &str) -> Result<Self> {
        let root = PathBuf::from(root);
        if !root.exists() {
            match std::fs::create_dir_all(&root) {
                Ok(_) => {
                    info!("LocalReportStore created directory: {}", root.display());
                }
                Err(e) => {
                    error!("LocalReportStore failed to create directory: {}", e);
                    return Err(e).with_context(|| format!("create {}", root.display()));
                }
            }
        }
        Ok(Self { root })
    }
}

#[async_trait]
impl ReportStore for LocalReportStore {
    async fn insert(&self, report: &FaultReport) -> Result<String> {
        let content = serde_json::to_string_pretty(report)?;
        let file_name = self.root.join(format!("{}.json", report.id));
        let mut file = File::create(&file_name)
            .await
            .with_context(|| format!("create {}", file_name.display()))?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(file_name.to_string_lossy().to_string())
    }
}

/// Inserts into a PostgREST table (`POST {url}/rest/v1/{table}`).
pub struct RestReportStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RestReportStore {
    pub fn new(client: reqwest::Client, url: &str, api_key: &str, table: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/rest/v1/{}", url.trim_end_matches('/'), table),
            api_key: api_key.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReportStore for RestReportStore {
    async fn insert(&self, report: &FaultReport) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(&[report])
            .send()
            .await
            .with_context(|| format!("insert into {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "store returned non-success status: {} {}",
                status,
                body
            ));
        }
        Ok(format!("{}#{}", self.endpoint, report.id))
    }
}
