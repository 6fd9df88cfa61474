//! Voice response markup understood by the telephony webhook transport.
//!
//! A [`VoiceResponse`] is a flat list of verbs rendered into a single
//! `<Response>` document. Only the verbs the hotline needs are modelled.

use anyhow::Result;
use std::fmt::Write;

pub const CONTENT_TYPE: &str = "text/xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherInput {
    Dtmf,
    Speech,
}

impl GatherInput {
    fn as_str(&self) -> &'static str {
        match self {
            GatherInput::Dtmf => "dtmf",
            GatherInput::Speech => "speech",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Say {
    pub text: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gather {
    pub input: GatherInput,
    pub action: String,
    pub method: String,
    pub num_digits: Option<u8>,
    /// Speech recognition locale hint.
    pub language: Option<String>,
    pub prompts: Vec<Say>,
}

impl Gather {
    pub fn dtmf(action: impl Into<String>, num_digits: u8) -> Self {
        Self {
            input: GatherInput::Dtmf,
            action: action.into(),
            method: "POST".to_string(),
            num_digits: Some(num_digits),
            language: None,
            prompts: vec![],
        }
    }

    pub fn speech(action: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            input: GatherInput::Speech,
            action: action.into(),
            method: "POST".to_string(),
            num_digits: None,
            language: Some(language.into()),
            prompts: vec![],
        }
    }

    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.prompts.push(Say {
            text: text.into(),
            language: self.language.clone(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Say(Say),
    Gather(Gather),
    Redirect { method: String, url: String },
    Hangup,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, text: impl Into<String>, language: Option<&str>) -> Self {
        self.verbs.push(Verb::Say(Say {
            text: text.into(),
            language: language.map(|l| l.to_string()),
        }));
        self
    }

    pub fn gather(mut self, gather: Gather) -> Self {
        self.verbs.push(Verb::Gather(gather));
        self
    }

    pub fn redirect(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Redirect {
            method: "POST".to_string(),
            url: url.into(),
        });
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push(Verb::Hangup);
        self
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    pub fn is_hangup(&self) -> bool {
        matches!(self.verbs.last(), Some(Verb::Hangup))
    }

    /// All spoken text in document order, gathered prompts included.
    pub fn spoken(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for verb in &self.verbs {
            match verb {
                Verb::Say(say) => out.push(say.text.as_str()),
                Verb::Gather(gather) => out.extend(gather.prompts.iter().map(|s| s.text.as_str())),
                _ => {}
            }
        }
        out
    }

    pub fn render(&self) -> Result<String> {
        let mut xml = String::with_capacity(256);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push_str("<Response>");
        for verb in &self.verbs {
            match verb {
                Verb::Say(say) => write_say(&mut xml, say)?,
                Verb::Gather(gather) => {
                    write!(
                        xml,
                        r#"<Gather input="{}" action="{}" method="{}""#,
                        gather.input.as_str(),
                        escape(&gather.action),
                        escape(&gather.method)
                    )?;
                    if let Some(n) = gather.num_digits {
                        write!(xml, r#" numDigits="{}""#, n)?;
                    }
                    if let Some(language) = &gather.language {
                        write!(xml, r#" language="{}""#, escape(language))?;
                    }
                    xml.push('>');
                    for say in &gather.prompts {
                        write_say(&mut xml, say)?;
                    }
                    xml.push_str("</Gather>");
                }
                Verb::Redirect { method, url } => {
                    write!(
                        xml,
                        r#"<Redirect method="{}">{}</Redirect>"#,
                        escape(method),
                        escape(url)
                    )?;
                }
                Verb::Hangup => xml.push_str("<Hangup/>"),
            }
        }
        xml.push_str("</Response>");
        Ok(xml)
    }
}

fn write_say(xml: &mut String, say: &Say) -> std::fmt::Result {
    match &say.language {
        Some(language) => write!(
            xml,
            r#"<Say language="{}">{}</Say>"#,
            escape(language),
            escape(&say.text)
        ),
        None => write!(xml, "<Say>{}</Say>", escape(&say.text)),
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
