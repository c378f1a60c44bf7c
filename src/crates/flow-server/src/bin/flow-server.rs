//! `flow-server` binary: wires settings, the node registry, the LLM client,
//! the run store, and the event bus into an [`AppState`], then serves the
//! HTTP/WebSocket surface until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use flow_core::{EventBus, NodeRegistry};
use flow_llm::{LocalLlmConfig, ProviderChoice, RemoteLlmConfig};
use flow_nodes::BuiltinDeps;
use flow_server::AppState;
use flow_toolkit::config::{get_env_or, RunSettings};

/// Workflow execution core: HTTP and WebSocket surface.
///
/// Every setting below is environment-driven; no positional arguments are
/// accepted.
#[derive(Parser, Debug)]
#[command(name = "flow-server", version, about)]
struct Cli {}

fn build_provider_choice() -> Result<ProviderChoice, Box<dyn std::error::Error>> {
    let provider = get_env_or("LLM_PROVIDER", "local")?;
    match provider.as_str() {
        "remote" => {
            let base_url = get_env_or("OPENAI_BASE_URL", "https://api.openai.com/v1")?;
            let model = get_env_or("OPENAI_MODEL", "gpt-4o-mini")?;
            let config = RemoteLlmConfig::from_env("OPENAI_API_KEY", base_url, model)?;
            Ok(ProviderChoice::Remote(config))
        }
        _ => {
            let base_url = get_env_or("OLLAMA_BASE_URL", "http://localhost:11434")?;
            let model = get_env_or("OLLAMA_MODEL", "llama3")?;
            Ok(ProviderChoice::Local(LocalLlmConfig::new(base_url, model)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = RunSettings::from_env()?;
    let bind_addr: SocketAddr = settings.bind_addr.parse()?;

    let store = Arc::new(flow_store::InMemoryRunStore::new(settings.memory_ttl));
    let llm: Arc<dyn flow_llm::LlmClient> = Arc::from(flow_llm::build_client(build_provider_choice()?));

    let mut registry = NodeRegistry::new();
    flow_nodes::register_builtin(
        &mut registry,
        BuiltinDeps { llm, store: store.clone(), react_agent_max_steps: settings.react_agent_max_steps },
    );

    let events = Arc::new(EventBus::new(settings.event_channel_capacity));
    let system_fingerprint = hostname_fingerprint();

    let state = AppState::new(Arc::new(registry), store, events, Arc::new(settings), system_fingerprint);
    let router = flow_server::api::create_router(state);

    tracing::info!(%bind_addr, "starting flow-server");
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

fn hostname_fingerprint() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "flow-server".to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
