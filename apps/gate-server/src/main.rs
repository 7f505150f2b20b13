//! Demo server wiring the access gate as the first pipeline stage.

mod config;
mod identity;

use std::path::PathBuf;
use std::sync::Arc;

use access_gate::{AccessDecider, AccessGateLayer, CurrentIdentity, IdentityProvider};
use anyhow::Context as _;
use axum::{Router, routing::get};
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::identity::HeaderIdentityProvider;

#[derive(Parser)]
#[command(name = "gate-server", about = "Access gate demo server")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,
}

fn load_config(args: &Args) -> anyhow::Result<ServerConfig> {
    let mut figment = Figment::from(Serialized::defaults(ServerConfig::default()));
    if let Some(path) = &args.config {
        figment = figment.merge(Yaml::file(path));
    }
    figment
        .merge(Env::prefixed("GATE_SERVER_").split("__"))
        .extract()
        .context("loading configuration")
}

fn demo_router() -> Router {
    Router::new()
        .route("/public/info", get(public_info))
        .route("/admin/dashboard", get(admin_dashboard))
}

// Handlers are async because axum requires futures, even without awaits.
#[allow(clippy::unused_async)]
async fn public_info() -> &'static str {
    "public information\n"
}

#[allow(clippy::unused_async)]
async fn admin_dashboard(CurrentIdentity(identity): CurrentIdentity) -> String {
    let subject = identity
        .subject_id()
        .map_or_else(|| "anonymous".to_owned(), |id| id.to_string());
    format!("admin dashboard for {subject}\n")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let bind_addr = args.bind.unwrap_or_else(|| config.bind_addr.clone());

    let rules = config
        .authorization
        .compile()
        .context("compiling role rules")?;
    let identity: Arc<dyn IdentityProvider> = Arc::new(HeaderIdentityProvider);
    let decider: Arc<dyn AccessDecider> = Arc::new(rules);

    // The gate is the outermost layer: it runs before any handler
    let router = demo_router().layer(AccessGateLayer::new(identity, decider, config.gate));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!("gate-server listening on {bind_addr}");
    axum::serve(listener, router).await.context("server error")
}
