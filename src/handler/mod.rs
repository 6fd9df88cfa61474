use anyhow::{Context, Result};

pub mod handler;
pub mod middleware;
#[cfg(test)]
mod tests;
pub use handler::{panic_to_fallback, router};

/// Form fields posted by the telephony transport on every webhook call.
/// Fields the hotline does not use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookForm {
    /// Keypad input from a DTMF gather.
    pub digits: Option<String>,
    /// Transcription from a speech gather.
    pub speech_result: Option<String>,
    pub call_sid: Option<String>,
}

impl WebhookForm {
    pub fn parse(body: &[u8]) -> Result<Self> {
        std::str::from_utf8(body).context("webhook body is not valid UTF-8")?;
        let mut form = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            let slot = match key.as_ref() {
                "Digits" => &mut form.digits,
                "SpeechResult" => &mut form.speech_result,
                "CallSid" => &mut form.call_sid,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        Ok(form)
    }

    pub fn call_sid(&self) -> &str {
        self.call_sid.as_deref().unwrap_or("-")
    }
}
