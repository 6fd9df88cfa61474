use serde::{Deserialize, Serialize};
use std::fmt;

/// Spoken language chosen once from the keypad menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-GB")]
    EnglishUk,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "nl")]
    Dutch,
}

/// Keypad digit → language, in menu order.
const MENU: [(char, Language); 7] = [
    ('1', Language::EnglishUk),
    ('2', Language::French),
    ('3', Language::Spanish),
    ('4', Language::German),
    ('5', Language::Italian),
    ('6', Language::Portuguese),
    ('7', Language::Dutch),
];

/// Language → speech recognition locale accepted by the transport.
/// The transport has no pt-PT recogniser, so Portuguese uses pt-BR.
const SPEECH_LOCALES: [(Language, &str); 7] = [
    (Language::EnglishUk, "en-GB"),
    (Language::French, "fr-FR"),
    (Language::Spanish, "es-ES"),
    (Language::German, "de-DE"),
    (Language::Italian, "it-IT"),
    (Language::Portuguese, "pt-BR"),
    (Language::Dutch, "nl-NL"),
];

impl Language {
    pub const ALL: [Language; 7] = [
        Language::EnglishUk,
        Language::French,
        Language::Spanish,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Dutch,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::EnglishUk => "en-GB",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Dutch => "nl",
        }
    }

    /// Unknown or missing codes resolve to English-UK.
    pub fn from_code(code: Option<&str>) -> Self {
        code.map(str::trim)
            .and_then(|code| Self::ALL.into_iter().find(|l| l.code() == code))
            .unwrap_or_default()
    }

    /// Anything other than a single digit 1-7 resolves to English-UK.
    pub fn from_digits(digits: Option<&str>) -> Self {
        let mut chars = digits.map(str::trim).unwrap_or_default().chars();
        match (chars.next(), chars.next()) {
            (Some(digit), None) => MENU
                .iter()
                .find(|(d, _)| *d == digit)
                .map(|(_, l)| *l)
                .unwrap_or_default(),
            _ => Language::default(),
        }
    }

    pub fn speech_locale(&self) -> &'static str {
        SPEECH_LOCALES
            .iter()
            .find(|(l, _)| l == self)
            .map(|(_, locale)| *locale)
            .unwrap_or("en-GB")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
