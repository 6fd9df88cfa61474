//! Hotline dialogue: language menu, question sequence, recap.
//!
//! # State Machine
//!
//! ```text
//! menu ─digit→ TenantConfirmation ─yes→ Name → Email → Room
//!                    │                 → FaultDescription → FaultDate
//!                    └─other→ refusal      → Urgency ─tier→ Summary (recap, hangup)
//!                                              └─unrecognised→ Urgency
//! ```
//!
//! Nothing here performs I/O. Each webhook call rebuilds a
//! [`DialogueState`], feeds it one answer and gets back the markup to
//! return plus what happened, see [`TurnOutcome`].

use crate::config::{IvrConfig, StateCarry};
use crate::report::FaultReport;
use crate::twiml::{Gather, VoiceResponse};
use tracing::debug;

pub mod language;
pub mod prompts;
pub mod state;
pub mod step;

pub use language::Language;
pub use prompts::{prompt, recap, PromptKey};
pub use state::{DialogueState, ProcessParams};
pub use step::{Check, CollectedFields, Field, Step, Transition, Urgency};

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// A new question was asked; the call goes on.
    Continue { step: Step },
    /// The caller is not the tenant; the call was ended.
    Refused,
    /// The dialogue reached the recap and produced a report.
    Completed(FaultReport),
    /// Recap replayed for a call already past the last question.
    Finished,
}

#[derive(Debug, Clone)]
pub struct Turn {
    pub response: VoiceResponse,
    pub outcome: TurnOutcome,
}

#[derive(Debug, Clone)]
pub struct DialogueController {
    voice_path: String,
    process_path: String,
    fallback_path: String,
    carry: StateCarry,
}

impl DialogueController {
    pub fn new(config: &IvrConfig) -> Self {
        Self {
            voice_path: config.voice_path.clone(),
            process_path: config.process_path.clone(),
            fallback_path: config.fallback_path.clone(),
            carry: config.state_carry,
        }
    }

    pub fn state_carry(&self) -> StateCarry {
        self.carry
    }

    /// First contact: ask for a language digit.
    pub fn language_menu(&self) -> VoiceResponse {
        VoiceResponse::new().gather(
            Gather::dtmf(&self.voice_path, 1)
                .say(prompt(Language::EnglishUk, PromptKey::Welcome)),
        )
    }

    /// Send the call to step processing in the chosen language.
    pub fn select_language(&self, digits: Option<&str>) -> (Language, VoiceResponse) {
        let language = Language::from_digits(digits);
        let url = format!(
            "{}?{}",
            self.process_path,
            DialogueState::default().to_query(language, StateCarry::Reset)
        );
        (language, VoiceResponse::new().redirect(url))
    }

    pub fn fallback_redirect(&self) -> VoiceResponse {
        VoiceResponse::new().redirect(&self.fallback_path)
    }

    pub fn apology(&self) -> VoiceResponse {
        VoiceResponse::new()
            .say(prompt(Language::EnglishUk, PromptKey::Apology), None)
            .hangup()
    }

    /// Evaluate one answer against the current step and decide what to say next.
    pub fn process_turn(
        &self,
        mut state: DialogueState,
        language: Language,
        speech: Option<&str>,
    ) -> Turn {
        let locale = language.speech_locale();
        let current = state.step;
        let transition = current.transition();

        if transition.check == Check::Terminal {
            return Turn {
                response: self.summary(language, &state.fields),
                outcome: TurnOutcome::Finished,
            };
        }

        if let Some(answer) = speech.map(str::trim).filter(|s| !s.is_empty()) {
            let accepted = match transition.check {
                Check::Affirmative => {
                    if !step::is_affirmative(answer) {
                        debug!(step = %current, "caller is not the tenant, ending call");
                        return Turn {
                            response: VoiceResponse::new()
                                .say(prompt(language, PromptKey::Refusal), Some(locale))
                                .hangup(),
                            outcome: TurnOutcome::Refused,
                        };
                    }
                    true
                }
                Check::FreeText => true,
                Check::UrgencyTier => Urgency::resolve(answer).is_some(),
                Check::Terminal => false,
            };

            if accepted {
                if let Some(field) = transition.field {
                    state.fields.store(field, answer);
                }
                if let Some(next) = transition.next {
                    state.step = next;
                }
            } else {
                debug!(step = %current, answer, "answer not recognised, asking again");
            }
        }

        if state.step.transition().check == Check::Terminal {
            let report = FaultReport::from_fields(&state.fields, language);
            return Turn {
                response: self.summary(language, &state.fields),
                outcome: TurnOutcome::Completed(report),
            };
        }

        let action = format!(
            "{}?{}",
            self.process_path,
            state.to_query(language, self.carry)
        );
        Turn {
            response: VoiceResponse::new().gather(
                Gather::speech(action, locale).say(prompt(language, PromptKey::Step(state.step))),
            ),
            outcome: TurnOutcome::Continue { step: state.step },
        }
    }

    fn summary(&self, language: Language, fields: &CollectedFields) -> VoiceResponse {
        let locale = Some(language.speech_locale());
        VoiceResponse::new()
            .say(prompt(language, PromptKey::Step(Step::Summary)), locale)
            .say(recap(language, fields), locale)
            .say(prompt(language, PromptKey::Goodbye), locale)
            .hangup()
    }
}
