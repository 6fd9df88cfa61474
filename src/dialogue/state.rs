use super::language::Language;
use super::step::{CollectedFields, Step, Urgency};
use crate::config::StateCarry;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Query parameters of the step-processing webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProcessParams {
    pub language: Option<String>,
    pub step: Option<String>,
    pub tenant_name: Option<String>,
    pub email: Option<String>,
    pub room: Option<String>,
    pub fault_description: Option<String>,
    pub fault_date: Option<String>,
    pub urgency: Option<String>,
}

/// Per-call progress, rebuilt at the start of every webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueState {
    pub step: Step,
    pub fields: CollectedFields,
}

impl Default for DialogueState {
    fn default() -> Self {
        Self {
            step: Step::FIRST,
            fields: CollectedFields::default(),
        }
    }
}

impl DialogueState {
    pub fn from_params(params: &ProcessParams, carry: StateCarry) -> Result<Self> {
        if carry == StateCarry::Reset {
            return Ok(Self::default());
        }
        let step = match params.step.as_deref() {
            None | Some("") => Step::FIRST,
            Some(name) => {
                Step::from_name(name).ok_or_else(|| anyhow!("unknown step '{}'", name))?
            }
        };
        let urgency = match params.urgency.as_deref() {
            None | Some("") => None,
            Some(name) => Some(
                Urgency::from_name(name).ok_or_else(|| anyhow!("unknown urgency '{}'", name))?,
            ),
        };
        Ok(Self {
            step,
            fields: CollectedFields {
                tenant_name: params.tenant_name.clone(),
                email: params.email.clone(),
                room: params.room.clone(),
                fault_description: params.fault_description.clone(),
                fault_date: params.fault_date.clone(),
                urgency,
            },
        })
    }

    /// Query string for the next webhook call, always starting with `language`.
    pub fn to_query(&self, language: Language, carry: StateCarry) -> String {
        let mut query = format!("language={}", urlencoding::encode(language.code()));
        if carry == StateCarry::Reset {
            return query;
        }
        let fields = &self.fields;
        let pairs = [
            ("step", Some(self.step.name())),
            ("tenant_name", fields.tenant_name.as_deref()),
            ("email", fields.email.as_deref()),
            ("room", fields.room.as_deref()),
            ("fault_description", fields.fault_description.as_deref()),
            ("fault_date", fields.fault_date.as_deref()),
            ("urgency", fields.urgency.as_ref().map(Urgency::as_str)),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                query.push('&');
                query.push_str(key);
                query.push('=');
                query.push_str(&urlencoding::encode(value));
            }
        }
        query
    }
}
