//! Fault report hand-off: durable insert plus two notification mails.
//!
//! The sink never fails the caller's turn. All three deliveries share one
//! deadline, each is logged on its own and attempted regardless of how the
//! previous one went.

use crate::config::ReportConfig;
use crate::dialogue::{CollectedFields, Language, Urgency};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{future::Future, sync::Arc, time::Duration, time::Instant};
use tracing::{error, info, warn};

pub mod notify;
pub mod store;

pub use notify::{build_notifier, LogNotifier, SendgridNotifier};
pub use store::{build_store, LocalReportStore, NoopReportStore, RestReportStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultReport {
    pub id: String,
    pub tenant_name: String,
    pub email: String,
    pub room: String,
    pub fault_description: String,
    pub fault_date: String,
    pub urgency: Option<Urgency>,
    pub language: Language,
    pub created_at: DateTime<Utc>,
}

impl FaultReport {
    /// Missing answers become empty strings; nothing is validated.
    pub fn from_fields(fields: &CollectedFields, language: Language) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_name: fields.tenant_name.clone().unwrap_or_default(),
            email: fields.email.clone().unwrap_or_default(),
            room: fields.room.clone().unwrap_or_default(),
            fault_description: fields.fault_description.clone().unwrap_or_default(),
            fault_date: fields.fault_date.clone().unwrap_or_default(),
            urgency: fields.urgency,
            language,
            created_at: Utc::now(),
        }
    }

    fn urgency_text(&self) -> &'static str {
        self.urgency.map(|u| u.as_str()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist one report, returning where it landed.
    async fn insert(&self, report: &FaultReport) -> Result<String>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub stored: bool,
    pub tenant_notified: bool,
    pub operations_notified: bool,
}

#[derive(Debug, Clone)]
pub struct SinkOptions {
    pub from: String,
    pub operations_email: Option<String>,
    pub team_name: String,
    pub timeout: Duration,
}

impl From<&ReportConfig> for SinkOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            from: config.from.clone(),
            operations_email: config.operations_email.clone().filter(|e| !e.is_empty()),
            team_name: config.team_name.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

pub struct ReportingSink {
    store: Arc<dyn ReportStore>,
    notifier: Arc<dyn Notifier>,
    options: SinkOptions,
}

impl ReportingSink {
    pub fn new(
        store: Arc<dyn ReportStore>,
        notifier: Arc<dyn Notifier>,
        options: SinkOptions,
    ) -> Self {
        Self {
            store,
            notifier,
            options,
        }
    }

    pub fn from_config(config: &ReportConfig, client: reqwest::Client) -> Result<Self> {
        let store = build_store(&config.store, client.clone())?;
        let notifier = build_notifier(&config.notifier, client);
        Ok(Self::new(store, notifier, SinkOptions::from(config)))
    }

    pub fn tenant_mail(&self, report: &FaultReport) -> Mail {
        Mail {
            to: report.email.clone(),
            from: self.options.from.clone(),
            subject: "Your Fault Report Summary".to_string(),
            body: format!(
                "Dear {},\n\nThank you for reporting the fault. Here's a summary of the information provided:\n\nRoom: {}\nFault: {}\nDate: {}\nUrgency: {}\n\nWe will be in touch shortly regarding next steps.\n\nBest regards,\n{}",
                report.tenant_name,
                report.room,
                report.fault_description,
                report.fault_date,
                report.urgency_text(),
                self.options.team_name,
            ),
        }
    }

    pub fn operations_mail(&self, report: &FaultReport, to: &str) -> Mail {
        Mail {
            to: to.to_string(),
            from: self.options.from.clone(),
            subject: "New Fault Report".to_string(),
            body: format!(
                "A new fault has been reported:\n\nTenant: {}\nEmail: {}\nRoom: {}\nFault: {}\nDate: {}\nUrgency: {}\nLanguage: {}\nReported at: {}",
                report.tenant_name,
                report.email,
                report.room,
                report.fault_description,
                report.fault_date,
                report.urgency_text(),
                report.language,
                report.created_at.to_rfc3339(),
            ),
        }
    }

    /// Store the report and send both mails. Failures are logged, never returned.
    ///
    /// The whole hand-off finishes within `options.timeout`; whatever is
    /// still pending at the deadline is abandoned.
    pub async fn ingest(&self, report: FaultReport) -> IngestSummary {
        let start_time = Instant::now();
        let deadline = tokio::time::Instant::now() + self.options.timeout;
        let mut summary = IngestSummary::default();

        match self.bounded(deadline, self.store.insert(&report)).await {
            Ok(location) => {
                info!(report_id = %report.id, location, "fault report stored");
                summary.stored = true;
            }
            Err(e) => {
                error!(report_id = %report.id, "failed to store fault report: {}", e);
            }
        }

        if report.email.trim().is_empty() {
            warn!(report_id = %report.id, "no tenant email collected, skipping tenant mail");
        } else {
            let mail = self.tenant_mail(&report);
            match self.bounded(deadline, self.notifier.send(&mail)).await {
                Ok(_) => summary.tenant_notified = true,
                Err(e) => {
                    error!(report_id = %report.id, to = %mail.to, "failed to send tenant mail: {}", e);
                }
            }
        }

        match self.options.operations_email.as_deref() {
            Some(to) => {
                let mail = self.operations_mail(&report, to);
                match self.bounded(deadline, self.notifier.send(&mail)).await {
                    Ok(_) => summary.operations_notified = true,
                    Err(e) => {
                        error!(report_id = %report.id, to, "failed to send operations mail: {}", e);
                    }
                }
            }
            None => {
                warn!(report_id = %report.id, "no operations email configured, skipping");
            }
        }

        info!(
            report_id = %report.id,
            stored = summary.stored,
            tenant_notified = summary.tenant_notified,
            operations_notified = summary.operations_notified,
            elapsed = start_time.elapsed().as_millis(),
            "fault report hand-off finished"
        );
        summary
    }

    async fn bounded<T, F>(&self, deadline: tokio::time::Instant, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout_at(deadline, fut).await.map_err(|_| {
            anyhow::anyhow!("hand-off deadline of {:?} reached", self.options.timeout)
        })?
    }
}
