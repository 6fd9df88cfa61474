use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

pub const DEFAULT_FROM_ADDRESS: &str = "noreply@agentfixit.com";
pub const DEFAULT_SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub http_addr: String,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub ivr: IvrConfig,
    pub report: ReportConfig,
}

/// How dialogue progress travels between two webhook calls.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StateCarry {
    /// Answers collected so far ride along in the gather action URL.
    #[default]
    Query,
    /// Every call starts again at the first step with nothing collected.
    Reset,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IvrConfig {
    pub voice_path: String,
    pub process_path: String,
    pub fallback_path: String,
    pub state_carry: StateCarry,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub from: String,
    pub operations_email: Option<String>,
    pub team_name: String,
    /// Budget for the whole report hand-off made while the caller waits.
    /// Kept below the transport's ~15s webhook deadline.
    pub timeout_secs: u64,
    pub store: ReportStoreConfig,
    pub notifier: NotifierConfig,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ReportStoreConfig {
    None,
    Local {
        root: String,
    },
    Rest {
        url: String,
        api_key: String,
        #[serde(default = "default_table")]
        table: String,
    },
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum NotifierConfig {
    Log,
    Sendgrid {
        api_key: String,
        endpoint: Option<String>,
    },
}

fn default_table() -> String {
    "calls".to_string()
}

impl Default for IvrConfig {
    fn default() -> Self {
        Self {
            voice_path: "/api/call/voice".to_string(),
            process_path: "/api/call/process".to_string(),
            fallback_path: "/api/call/fallback".to_string(),
            state_carry: StateCarry::default(),
        }
    }
}

impl Default for ReportStoreConfig {
    fn default() -> Self {
        Self::Local {
            #[cfg(target_os = "windows")]
            root: "./reports".to_string(),
            #[cfg(not(target_os = "windows"))]
            root: "/tmp/faultline/reports".to_string(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self::Log
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            from: DEFAULT_FROM_ADDRESS.to_string(),
            operations_email: None,
            team_name: "Agent Fix It Team".to_string(),
            timeout_secs: 8,
            store: ReportStoreConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8080".to_string(),
            log_level: Some("info".to_string()),
            log_file: None,
            ivr: IvrConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("read config {}", path))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parse config {}", path))?;
        Ok(config)
    }

    /// Overlay secrets from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
    }

    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("SENDGRID_API_KEY") {
            self.report.notifier = match self.report.notifier.clone() {
                NotifierConfig::Sendgrid { endpoint, .. } => {
                    NotifierConfig::Sendgrid { api_key, endpoint }
                }
                NotifierConfig::Log => NotifierConfig::Sendgrid {
                    api_key,
                    endpoint: None,
                },
            };
        }
        if let Some(email) = lookup("PROPERTY_AGENCY_EMAIL") {
            self.report.operations_email = Some(email);
        }
        if let (Some(url), Some(api_key)) = (lookup("SUPABASE_URL"), lookup("SUPABASE_ANON_KEY")) {
            let table = match &self.report.store {
                ReportStoreConfig::Rest { table, .. } => table.clone(),
                _ => default_table(),
            };
            self.report.store = ReportStoreConfig::Rest {
                url,
                api_key,
                table,
            };
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.http_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("http_addr '{}' is not a socket address", self.http_addr))?;

        for (name, path) in [
            ("ivr.voice_path", &self.ivr.voice_path),
            ("ivr.process_path", &self.ivr.process_path),
            ("ivr.fallback_path", &self.ivr.fallback_path),
        ] {
            if !path.starts_with('/') {
                anyhow::bail!("{} must start with '/': {}", name, path);
            }
        }
        if self.ivr.voice_path == self.ivr.process_path
            || self.ivr.voice_path == self.ivr.fallback_path
            || self.ivr.process_path == self.ivr.fallback_path
        {
            anyhow::bail!("ivr paths must be distinct");
        }

        if self.report.timeout_secs == 0 {
            anyhow::bail!("report.timeout_secs must be greater than zero");
        }
        match &self.report.store {
            ReportStoreConfig::Rest { url, api_key, .. } if url.is_empty() || api_key.is_empty() => {
                anyhow::bail!("report.store: rest store requires url and api_key");
            }
            ReportStoreConfig::Local { root } if root.is_empty() => {
                anyhow::bail!("report.store: local store requires root");
            }
            _ => {}
        }
        if let NotifierConfig::Sendgrid { api_key, .. } = &self.report.notifier {
            if api_key.is_empty() {
                anyhow::bail!("report.notifier: sendgrid requires api_key");
            }
        }
        Ok(())
    }
}
