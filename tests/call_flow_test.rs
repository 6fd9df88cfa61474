use faultline::app::{create_router, AppStateBuilder};
use faultline::config::{Config, NotifierConfig, ReportStoreConfig};
use std::net::SocketAddr;
use tempfile::tempdir;
use tokio::net::TcpListener;

async fn start_server(config: Config) -> SocketAddr {
    let state = AppStateBuilder::new()
        .with_config(config)
        .build()
        .await
        .expect("build app state");
    let app = create_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .ok();
    });
    addr
}

fn test_config(report_root: &str) -> Config {
    let mut config = Config::default();
    config.http_addr = "127.0.0.1:0".to_string();
    config.report.operations_email = Some("ops@example.com".to_string());
    config.report.timeout_secs = 2;
    config.report.store = ReportStoreConfig::Local {
        root: report_root.to_string(),
    };
    config.report.notifier = NotifierConfig::Log;
    config
}

fn attribute<'a>(xml: &'a str, tag: &str, name: &str) -> Option<&'a str> {
    let start = xml.find(&format!("<{} ", tag))?;
    let rest = &xml[start..];
    let key = format!("{}=\"", name);
    let value_start = rest.find(&key)? + key.len();
    let value_end = rest[value_start..].find('"')? + value_start;
    Some(&rest[value_start..value_end])
}

fn redirect_target(xml: &str) -> Option<String> {
    let start = xml.find("<Redirect method=\"POST\">")? + "<Redirect method=\"POST\">".len();
    let end = xml[start..].find("</Redirect>")? + start;
    Some(xml[start..end].replace("&amp;", "&"))
}

async fn post(client: &reqwest::Client, addr: SocketAddr, path: &str, body: &str) -> String {
    let response = client
        .post(format!("http://{}{}", addr, path))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/xml");
    response.text().await.unwrap()
}

#[tokio::test]
async fn test_full_french_call_writes_report() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("reports");
    let addr = start_server(test_config(root.to_str().unwrap())).await;
    let client = reqwest::Client::new();

    let xml = post(&client, addr, "/api/call/voice", "CallSid=CA100").await;
    assert!(xml.contains("Press 1 for English, 2 for French"));
    assert_eq!(
        attribute(&xml, "Gather", "action"),
        Some("/api/call/voice")
    );

    let xml = post(&client, addr, "/api/call/voice", "CallSid=CA100&Digits=2").await;
    let mut next = redirect_target(&xml).expect("redirect to processing");
    assert_eq!(next, "/api/call/process?language=fr");

    let xml = post(&client, addr, &next, "CallSid=CA100").await;
    assert!(xml.contains("Êtes-vous le locataire?"));
    next = attribute(&xml, "Gather", "action").unwrap().replace("&amp;", "&");

    let answers = [
        "oui yes",
        "Marie Curie",
        "marie@example.com",
        "salle de bain",
        "the shower is broken",
        "yesterday",
        "medium please",
    ];
    let mut last = String::new();
    for answer in answers {
        let body = format!(
            "CallSid=CA100&SpeechResult={}",
            urlencoding::encode(answer)
        );
        last = post(&client, addr, &next, &body).await;
        if let Some(action) = attribute(&last, "Gather", "action") {
            next = action.replace("&amp;", "&");
        }
    }

    assert!(!last.contains("<Gather"), "{last}");
    assert!(last.ends_with("<Hangup/></Response>"));
    for value in ["Marie Curie", "marie@example.com", "salle de bain", "the shower is broken"] {
        assert!(last.contains(value), "{value} missing from {last}");
    }

    let entries: Vec<_> = std::fs::read_dir(&root)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .collect();
    assert_eq!(entries.len(), 1);
    let content = std::fs::read_to_string(entries[0].path()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(report["tenantName"], "Marie Curie");
    assert_eq!(report["email"], "marie@example.com");
    assert_eq!(report["room"], "salle de bain");
    assert_eq!(report["faultDescription"], "the shower is broken");
    assert_eq!(report["faultDate"], "yesterday");
    assert_eq!(report["urgency"], "medium");
    assert_eq!(report["language"], "fr");
}

#[tokio::test]
async fn test_duplicate_query_param_redirects_to_fallback() {
    let dir = tempdir().unwrap();
    let addr = start_server(test_config(dir.path().to_str().unwrap())).await;
    let client = reqwest::Client::new();

    let xml = post(
        &client,
        addr,
        "/api/call/process?language=fr&language=de",
        "SpeechResult=yes",
    )
    .await;
    assert_eq!(redirect_target(&xml).as_deref(), Some("/api/call/fallback"));

    let xml = post(&client, addr, "/api/call/fallback", "").await;
    assert!(xml.contains("We apologize, but we encountered an error."));
}

#[tokio::test]
async fn test_health() {
    let dir = tempdir().unwrap();
    let addr = start_server(test_config(dir.path().to_str().unwrap())).await;
    let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some());
}
