use super::WebhookForm;
use crate::{
    app::AppState,
    config::IvrConfig,
    dialogue::{DialogueState, Language, ProcessParams, TurnOutcome},
    twiml,
};
use anyhow::{anyhow, Result};
use axum::{
    body::{Body, Bytes},
    extract::{rejection::QueryRejection, Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::any::Any;
use tracing::{debug, error, field, info, info_span, Instrument, Span};

pub fn router(ivr: &IvrConfig) -> Router<AppState> {
    Router::new()
        .route(&ivr.voice_path, post(voice_handler))
        .route(&ivr.process_path, post(process_handler))
        .route(&ivr.fallback_path, post(fallback_handler).get(fallback_handler))
        .route("/health", get(health_handler))
}

/// Language menu on first contact, redirect to step processing once a digit arrives.
pub async fn voice_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let span = webhook_span("voice");
    async move {
        let result = WebhookForm::parse(&body).and_then(|form| handle_voice(&state, form));
        respond(&state, "voice", result)
    }
    .instrument(span)
    .await
}

/// One question/answer turn of the dialogue.
pub async fn process_handler(
    State(state): State<AppState>,
    query: Result<Query<ProcessParams>, QueryRejection>,
    body: Bytes,
) -> Response {
    let span = webhook_span("process");
    async move {
        let result = match (WebhookForm::parse(&body), query) {
            (Ok(form), Ok(Query(params))) => handle_process(&state, params, form).await,
            (Err(e), _) => Err(e),
            (_, Err(rejection)) => Err(anyhow!("invalid query: {}", rejection)),
        };
        respond(&state, "process", result)
    }
    .instrument(span)
    .await
}

fn webhook_span(route: &'static str) -> Span {
    info_span!("webhook", route, call_sid = field::Empty)
}

/// Generic apology and hangup. Always succeeds.
pub async fn fallback_handler(State(state): State<AppState>) -> Response {
    match state.controller.apology().render() {
        Ok(xml) => xml_response(xml),
        Err(e) => {
            error!("failed to render apology: {}", e);
            xml_response(format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Response><Say>{}</Say><Hangup/></Response>"#,
                twiml::escape(crate::dialogue::prompt(
                    Language::EnglishUk,
                    crate::dialogue::PromptKey::Apology
                ))
            ))
        }
    }
}

async fn health_handler() -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::version::get_short_version(),
    }))
    .into_response()
}

fn handle_voice(state: &AppState, form: WebhookForm) -> Result<String> {
    Span::current().record("call_sid", form.call_sid());
    let digits = form.digits.as_deref().filter(|d| !d.trim().is_empty());
    let response = match digits {
        None => {
            debug!("new call, playing language menu");
            state.controller.language_menu()
        }
        Some(digits) => {
            let (language, response) = state.controller.select_language(Some(digits));
            info!(digits, %language, "language selected");
            response
        }
    };
    response.render()
}

async fn handle_process(
    state: &AppState,
    params: ProcessParams,
    form: WebhookForm,
) -> Result<String> {
    Span::current().record("call_sid", form.call_sid());
    let language = Language::from_code(params.language.as_deref());
    let dialogue = DialogueState::from_params(&params, state.controller.state_carry())?;
    let step = dialogue.step;

    let turn = state
        .controller
        .process_turn(dialogue, language, form.speech_result.as_deref());
    // markup is final before the hand-off starts
    let xml = turn.response.render()?;

    match turn.outcome {
        TurnOutcome::Continue { step: next } => {
            debug!(%language, %step, %next, "dialogue turn");
        }
        TurnOutcome::Refused => {
            info!(%language, "caller is not a tenant, call ended");
        }
        TurnOutcome::Finished => {
            info!(%language, "recap replayed");
        }
        TurnOutcome::Completed(report) => {
            info!(
                %language,
                report_id = %report.id,
                "dialogue completed, handing off fault report"
            );
            state.sink.ingest(report).await;
        }
    }
    Ok(xml)
}

fn respond(state: &AppState, route: &'static str, result: Result<String>) -> Response {
    match result {
        Ok(xml) => xml_response(xml),
        Err(e) => {
            error!(route, "webhook failed, redirecting to fallback: {:#}", e);
            let xml = state
                .controller
                .fallback_redirect()
                .render()
                .unwrap_or_else(|_| fallback_redirect_xml(&state.config.ivr.fallback_path));
            xml_response(xml)
        }
    }
}

fn fallback_redirect_xml(fallback_path: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Response><Redirect method="POST">{}</Redirect></Response>"#,
        twiml::escape(fallback_path)
    )
}

fn xml_response(xml: String) -> Response {
    (StatusCode::OK, [(CONTENT_TYPE, twiml::CONTENT_TYPE)], xml).into_response()
}

/// Turns a panic inside a webhook into the same fallback redirect as any
/// other failure, so the transport still gets one markup document.
pub fn panic_to_fallback(
    fallback_path: String,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response<Body> + Clone + Send + Sync + 'static {
    move |err: Box<dyn Any + Send + 'static>| {
        let detail = err
            .downcast_ref::<String>()
            .map(|s| s.as_str())
            .or_else(|| err.downcast_ref::<&str>().copied())
            .unwrap_or("unknown panic");
        error!("webhook panicked, redirecting to fallback: {}", detail);
        xml_response(fallback_redirect_xml(&fallback_path))
    }
}
