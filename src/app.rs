use crate::config::Config;
use crate::dialogue::DialogueController;
use crate::report::ReportingSink;
use anyhow::Result;
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
};
use tracing::info;

pub struct AppStateInner {
    pub config: Arc<Config>,
    pub controller: DialogueController,
    pub sink: Arc<ReportingSink>,
    pub token: CancellationToken,
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateBuilder {
    pub config: Option<Config>,
    pub sink: Option<Arc<ReportingSink>>,
    pub token: Option<CancellationToken>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            sink: None,
            token: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_sink(mut self, sink: Arc<ReportingSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub async fn build(self) -> Result<AppState> {
        let config = Arc::new(self.config.unwrap_or_default());
        let token = self.token.unwrap_or_default();

        let sink = match self.sink {
            Some(sink) => sink,
            None => {
                let client = reqwest::Client::builder()
                    .user_agent(crate::version::get_useragent())
                    .timeout(Duration::from_secs(config.report.timeout_secs.max(1)))
                    .build()?;
                Arc::new(ReportingSink::from_config(&config.report, client)?)
            }
        };

        Ok(Arc::new(AppStateInner {
            controller: DialogueController::new(&config.ivr),
            config,
            sink,
            token,
        }))
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::ORIGIN,
        ]);

    let fallback_path = state.config.ivr.fallback_path.clone();
    crate::handler::router(&state.config.ivr)
        .with_state(state)
        .layer(CatchPanicLayer::custom(crate::handler::panic_to_fallback(
            fallback_path,
        )))
        .layer(middleware::from_fn(
            crate::handler::middleware::request_log::log_requests,
        ))
        .layer(cors)
}

pub async fn run(state: AppState) -> Result<()> {
    let token = state.token.clone();
    let app = create_router(state.clone());
    let addr: SocketAddr = state.config.http_addr.parse()?;
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            return Err(anyhow::anyhow!("Failed to bind to {}: {}", addr, e));
        }
    };
    info!("faultline listening on {}", addr);

    let http_task = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    select! {
        http_result = http_task => {
            match http_result {
                Ok(_) => info!("Server shut down gracefully"),
                Err(e) => {
                    tracing::error!("Server error: {}", e);
                    return Err(anyhow::anyhow!("Server error: {}", e));
                }
            }
        }
        _ = token.cancelled() => {
            info!("Application shutting down due to cancellation");
        }
    }
    token.cancel();
    Ok(())
}
