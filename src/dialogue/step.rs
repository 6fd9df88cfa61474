use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed question sequence, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    TenantConfirmation,
    Name,
    Email,
    Room,
    FaultDescription,
    FaultDate,
    Urgency,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// How a step judges the caller's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Must contain "yes", otherwise the call ends.
    Affirmative,
    /// Anything is kept verbatim.
    FreeText,
    /// Must name an urgency tier, otherwise the step repeats.
    UrgencyTier,
    /// Nothing more to ask.
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TenantName,
    Email,
    Room,
    FaultDescription,
    FaultDate,
    Urgency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub check: Check,
    pub field: Option<Field>,
    pub next: Option<Step>,
}

impl Step {
    pub const ALL: [Step; 8] = [
        Step::TenantConfirmation,
        Step::Name,
        Step::Email,
        Step::Room,
        Step::FaultDescription,
        Step::FaultDate,
        Step::Urgency,
        Step::Summary,
    ];

    pub const FIRST: Step = Step::TenantConfirmation;

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::TenantConfirmation => "tenant_confirmation",
            Step::Name => "name",
            Step::Email => "email",
            Step::Room => "room",
            Step::FaultDescription => "fault_description",
            Step::FaultDate => "fault_date",
            Step::Urgency => "urgency",
            Step::Summary => "summary",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn transition(&self) -> Transition {
        let (check, field, next) = match self {
            Step::TenantConfirmation => (Check::Affirmative, None, Some(Step::Name)),
            Step::Name => (Check::FreeText, Some(Field::TenantName), Some(Step::Email)),
            Step::Email => (Check::FreeText, Some(Field::Email), Some(Step::Room)),
            Step::Room => (Check::FreeText, Some(Field::Room), Some(Step::FaultDescription)),
            Step::FaultDescription => (
                Check::FreeText,
                Some(Field::FaultDescription),
                Some(Step::FaultDate),
            ),
            Step::FaultDate => (Check::FreeText, Some(Field::FaultDate), Some(Step::Urgency)),
            Step::Urgency => (Check::UrgencyTier, Some(Field::Urgency), Some(Step::Summary)),
            Step::Summary => (Check::Terminal, None, None),
        };
        Transition { check, field, next }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [Urgency::Low, Urgency::Medium, Urgency::High]
            .into_iter()
            .find(|u| u.as_str() == name)
    }

    /// First tier mentioned, checked in the order low, medium, high.
    pub fn resolve(utterance: &str) -> Option<Self> {
        let lower = utterance.to_lowercase();
        [Urgency::Low, Urgency::Medium, Urgency::High]
            .into_iter()
            .find(|u| lower.contains(u.as_str()))
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_affirmative(utterance: &str) -> bool {
    utterance.to_lowercase().contains("yes")
}

/// Answers gathered so far; absent until the matching step accepts one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedFields {
    pub tenant_name: Option<String>,
    pub email: Option<String>,
    pub room: Option<String>,
    pub fault_description: Option<String>,
    pub fault_date: Option<String>,
    pub urgency: Option<Urgency>,
}

impl CollectedFields {
    pub fn store(&mut self, field: Field, answer: &str) {
        let value = Some(answer.to_string());
        match field {
            Field::TenantName => self.tenant_name = value,
            Field::Email => self.email = value,
            Field::Room => self.room = value,
            Field::FaultDescription => self.fault_description = value,
            Field::FaultDate => self.fault_date = value,
            Field::Urgency => self.urgency = Urgency::resolve(answer),
        }
    }
}
