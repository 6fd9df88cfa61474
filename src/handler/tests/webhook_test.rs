use super::{build_state, response_to_string};
use crate::config::StateCarry;
use crate::dialogue::{ProcessParams, Urgency};
use crate::handler::handler::{fallback_handler, process_handler, voice_handler};
use crate::handler::{panic_to_fallback, WebhookForm};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    routing::post,
    Router,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{
    field::{Field, Visit},
    span::{Attributes, Id, Record},
    Subscriber,
};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    Layer,
};

const FALLBACK_REDIRECT: &str = r#"<Redirect method="POST">/api/call/fallback</Redirect>"#;

fn params(pairs: &[(&str, &str)]) -> ProcessParams {
    let mut params = ProcessParams::default();
    for (key, value) in pairs {
        let value = Some(value.to_string());
        match *key {
            "language" => params.language = value,
            "step" => params.step = value,
            "tenant_name" => params.tenant_name = value,
            "email" => params.email = value,
            "room" => params.room = value,
            "fault_description" => params.fault_description = value,
            "fault_date" => params.fault_date = value,
            "urgency" => params.urgency = value,
            other => panic!("unknown param {other}"),
        }
    }
    params
}

#[test]
fn test_webhook_form_parse() {
    let form =
        WebhookForm::parse(b"CallSid=CA42&Digits=3&SpeechResult=it%27s+pretty+high&From=%2B44").unwrap();
    assert_eq!(form.call_sid(), "CA42");
    assert_eq!(form.digits.as_deref(), Some("3"));
    assert_eq!(form.speech_result.as_deref(), Some("it's pretty high"));

    let empty = WebhookForm::parse(b"").unwrap();
    assert_eq!(empty, WebhookForm::default());
    assert_eq!(empty.call_sid(), "-");

    assert!(WebhookForm::parse(&[0xff, 0xfe, b'=', 0x80]).is_err());
}

#[tokio::test]
async fn test_first_contact_plays_language_menu() {
    let (state, _) = build_state(StateCarry::Query).await;
    let response = voice_handler(State(state), Bytes::new()).await;
    assert_eq!(response.headers()[CONTENT_TYPE], "text/xml");

    let xml = response_to_string(response).await;
    assert!(xml.contains(r#"<Gather input="dtmf" action="/api/call/voice" method="POST" numDigits="1">"#));
    assert!(xml.contains("Press 1 for English, 2 for French"));
}

#[tokio::test]
async fn test_digit_redirects_with_language() {
    let (state, _) = build_state(StateCarry::Query).await;
    for (digit, code) in [("2", "fr"), ("7", "nl"), ("0", "en-GB"), ("#", "en-GB")] {
        let body = format!("Digits={}", urlencoding::encode(digit));
        let xml = response_to_string(voice_handler(State(state.clone()), Bytes::from(body)).await).await;
        assert!(
            xml.contains(&format!(
                r#"<Redirect method="POST">/api/call/process?language={}</Redirect>"#,
                code
            )),
            "{digit}: {xml}"
        );
    }
}

#[tokio::test]
async fn test_malformed_body_redirects_to_fallback() {
    let (state, _) = build_state(StateCarry::Query).await;
    let xml = response_to_string(
        voice_handler(State(state.clone()), Bytes::from_static(&[0xc3, 0x28])).await,
    )
    .await;
    assert!(xml.contains(FALLBACK_REDIRECT), "{xml}");

    let xml = response_to_string(
        process_handler(
            State(state),
            Ok(Query(params(&[("language", "fr")]))),
            Bytes::from_static(&[0xc3, 0x28]),
        )
        .await,
    )
    .await;
    assert!(xml.contains(FALLBACK_REDIRECT), "{xml}");
}

#[tokio::test]
async fn test_unknown_step_redirects_to_fallback() {
    let (state, _) = build_state(StateCarry::Query).await;
    let response = process_handler(
        State(state),
        Ok(Query(params(&[("language", "fr"), ("step", "teleport")]))),
        Bytes::from_static(b"SpeechResult=yes"),
    )
    .await;
    assert_eq!(response.status(), 200);
    let xml = response_to_string(response).await;
    assert!(xml.contains(FALLBACK_REDIRECT));
    assert!(!xml.contains("<Gather"));
}

#[tokio::test]
async fn test_french_call_start() {
    let (state, _) = build_state(StateCarry::Query).await;

    let xml = response_to_string(
        process_handler(
            State(state.clone()),
            Ok(Query(params(&[("language", "fr")]))),
            Bytes::new(),
        )
        .await,
    )
    .await;
    assert!(xml.contains(r#"language="fr-FR""#));
    assert!(xml.contains("Êtes-vous le locataire? Veuillez dire oui ou non."));

    let xml = response_to_string(
        process_handler(
            State(state),
            Ok(Query(params(&[
                ("language", "fr"),
                ("step", "tenant_confirmation"),
            ]))),
            Bytes::from_static(b"SpeechResult=Oui%2C+yes"),
        )
        .await,
    )
    .await;
    assert!(xml.contains("Veuillez indiquer votre nom complet."), "{xml}");
    assert!(xml.contains("action=\"/api/call/process?language=fr&amp;step=name\""));
}

#[tokio::test]
async fn test_refusal_hangs_up() {
    let (state, store) = build_state(StateCarry::Query).await;
    let xml = response_to_string(
        process_handler(
            State(state),
            Ok(Query(params(&[("language", "en-GB")]))),
            Bytes::from_static(b"SpeechResult=no+I+am+the+landlord"),
        )
        .await,
    )
    .await;
    assert!(xml.contains("only available for tenants"));
    assert!(xml.ends_with("<Hangup/></Response>"));
    assert!(store.reports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_urgency_retry_then_completion() {
    let (state, store) = build_state(StateCarry::Query).await;
    let collected = [
        ("language", "en-GB"),
        ("step", "urgency"),
        ("tenant_name", "Ada Lovelace"),
        ("email", "ada@example.com"),
        ("room", "kitchen"),
        ("fault_description", "leaking tap"),
        ("fault_date", "last Tuesday"),
    ];

    let xml = response_to_string(
        process_handler(
            State(state.clone()),
            Ok(Query(params(&collected))),
            Bytes::from_static(b"SpeechResult=not+sure"),
        )
        .await,
    )
    .await;
    assert!(xml.contains("How urgent is this fault? Please say low, medium, or high."));
    assert!(xml.contains("step=urgency"));
    assert!(store.reports.lock().unwrap().is_empty());

    let xml = response_to_string(
        process_handler(
            State(state),
            Ok(Query(params(&collected))),
            Bytes::from_static(b"SpeechResult=it%27s+pretty+high+priority&CallSid=CA1"),
        )
        .await,
    )
    .await;
    assert!(!xml.contains("<Gather"));
    assert!(xml.ends_with("<Hangup/></Response>"));
    for value in ["Ada Lovelace", "ada@example.com", "kitchen", "leaking tap", "last Tuesday", "high"] {
        assert!(xml.contains(value), "{value} missing from {xml}");
    }

    let reports = store.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].urgency, Some(Urgency::High));
    assert_eq!(reports[0].tenant_name, "Ada Lovelace");
}

#[tokio::test]
async fn test_reset_mode_starts_over_each_turn() {
    let (state, _) = build_state(StateCarry::Reset).await;
    let xml = response_to_string(
        process_handler(
            State(state),
            Ok(Query(params(&[("language", "de"), ("step", "urgency")]))),
            Bytes::new(),
        )
        .await,
    )
    .await;
    assert!(xml.contains("Sind Sie der Mieter?"));
    assert!(xml.contains(r#"action="/api/call/process?language=de""#));
}

#[tokio::test]
async fn test_fallback_apologises() {
    let (state, _) = build_state(StateCarry::Query).await;
    let response = fallback_handler(State(state)).await;
    assert_eq!(response.headers()[CONTENT_TYPE], "text/xml");
    let xml = response_to_string(response).await;
    assert!(xml.contains("<Say>We apologize, but we encountered an error."));
    assert!(xml.ends_with("<Hangup/></Response>"));
}

async fn explode() -> &'static str {
    panic!("boom")
}

#[tokio::test]
async fn test_panic_becomes_fallback_redirect() {
    let app = Router::new()
        .route("/api/call/process", post(explode))
        .layer(CatchPanicLayer::custom(panic_to_fallback(
            "/api/call/fallback".to_string(),
        )));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/call/process", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/xml");
    let xml = response.text().await.unwrap();
    assert!(xml.contains(FALLBACK_REDIRECT), "{xml}");
}

/// Collects every field recorded on any span.
#[derive(Clone, Default)]
struct SpanFields(Arc<Mutex<Vec<(String, String)>>>);

struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{:?}", value)));
    }
}

impl<S: Subscriber> Layer<S> for SpanFields {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut fields = Vec::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        self.0.lock().unwrap().extend(fields);
    }

    fn on_record(&self, _id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
        let mut fields = Vec::new();
        values.record(&mut FieldVisitor(&mut fields));
        self.0.lock().unwrap().extend(fields);
    }
}

#[tokio::test]
async fn test_call_sid_is_recorded_on_webhook_span() {
    let recorded = SpanFields::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(recorded.clone()));
    let (state, _) = build_state(StateCarry::Query).await;

    process_handler(
        State(state),
        Ok(Query(params(&[("language", "en-GB")]))),
        Bytes::from_static(b"CallSid=CA77&SpeechResult=yes"),
    )
    .await;

    let fields = recorded.0.lock().unwrap().clone();
    assert!(fields.contains(&("route".to_string(), "process".to_string())), "{fields:?}");
    assert!(fields.contains(&("call_sid".to_string(), "CA77".to_string())), "{fields:?}");
}
