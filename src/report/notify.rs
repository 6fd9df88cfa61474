use super::{Mail, Notifier};
use crate::config::{NotifierConfig, DEFAULT_SENDGRID_ENDPOINT};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub fn build_notifier(config: &NotifierConfig, client: reqwest::Client) -> Arc<dyn Notifier> {
    match config {
        NotifierConfig::Log => Arc::new(LogNotifier),
        NotifierConfig::Sendgrid { api_key, endpoint } => Arc::new(SendgridNotifier::new(
            client,
            api_key,
            endpoint.as_deref().unwrap_or(DEFAULT_SENDGRID_ENDPOINT),
        )),
    }
}

/// Writes mails to the log instead of delivering them.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, mail: &Mail) -> Result<()> {
        info!(to = %mail.to, subject = %mail.subject, "mail (not delivered):\n{}", mail.body);
        Ok(())
    }
}

/// SendGrid v3 `mail/send`.
pub struct SendgridNotifier {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl SendgridNotifier {
    pub fn new(client: reqwest::Client, api_key: &str, endpoint: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn payload(mail: &Mail) -> serde_json::Value {
        json!({
            "personalizations": [{ "to": [{ "email": mail.to }] }],
            "from": { "email": mail.from },
            "subject": mail.subject,
            "content": [{ "type": "text/plain", "value": mail.body }],
        })
    }
}

#[async_trait]
impl Notifier for SendgridNotifier {
    async fn send(&self, mail: &Mail) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&Self::payload(mail))
            .send()
            .await
            .with_context(|| format!("send mail to {}", mail.to))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "mail service returned non-success status: {} {}",
                status,
                body
            ));
        }
        info!(to = %mail.to, subject = %mail.subject, "mail sent");
        Ok(())
    }
}
