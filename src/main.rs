//! Browser chat for a local Ollama server
//!
//! (c) Softlandia 2025

use local_llm_chat::SETTINGS;
use local_llm_chat::api;
use local_llm_chat::core::services::RelayChatService;
use local_llm_chat::infrastructure::config::ChatSettings;
use local_llm_chat::infrastructure::ollama::OllamaBackend;
use local_llm_chat::infrastructure::traits::InferenceBackend;
use local_llm_chat::infrastructure::tunnel;

use axum::http::Method;
use axum::response::Html;
use axum::{Router, routing::get};
use clap::Parser;
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::{info, warn};
use tokio::runtime::{Builder, Runtime};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

const BIND_ADDR: &str = "127.0.0.1:7860";

/// Browser chat for a locally running Ollama server.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Expose the local UI through a public tunnel link.
    #[arg(long)]
    share: bool,
}

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // A missing model name aborts launch before any UI is served.
    let settings = ChatSettings::from_env()?;
    info!(
        "using model {} on backend {}",
        settings.model, settings.host_url
    );
    SETTINGS.set(settings).expect("settings should not be set");

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    if cli.share {
        runtime.spawn(tunnel::share_task(BIND_ADDR));
    }

    let web_task_handle = runtime.spawn(web_server_task());

    runtime.block_on(async {
        web_task_handle
            .await
            .expect("failed to join web_task_handle");
    });

    Ok(())
}

async fn web_server_task() {
    warn_if_model_missing().await;

    let provider = ServiceCollection::new()
        .add(OllamaBackend::singleton())
        .add(RelayChatService::scoped())
        .build_provider()
        .unwrap();

    // build our application with a route
    let app = Router::new()
        .route("/", get(index))
        .nest_service(
            "/static",
            ServiceBuilder::new().service(ServeDir::new("static")),
        )
        .nest("/api", api::router())
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(Any),
        )
        .with_provider(provider);

    let listener = tokio::net::TcpListener::bind(BIND_ADDR).await.unwrap();
    info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
    info!("Shutting down...");
}

/// One-time startup check. A model missing from the backend only warns;
/// requests report their own errors.
async fn warn_if_model_missing() {
    let backend = OllamaBackend::create();
    let model = &local_llm_chat::settings().model;

    match backend.list_models().await {
        Ok(models) if !models.iter().any(|m| m.name == *model) => {
            warn!("model {model} is not installed on the backend");
        }
        Ok(_) => {}
        Err(e) => warn!("could not check installed models: {e}"),
    }
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}
