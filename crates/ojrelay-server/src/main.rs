//! ojrelay Gateway Server
//!
//! HTTP gateway that fronts the Luogu web API for browser clients (spoofed
//! browser identity, session-cookie relay, captcha pass-through) and
//! dispatches GitHub Actions workflows.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ojrelay_server::github::WorkflowDispatcher;
use ojrelay_server::routes::{build_router, AppState};
use ojrelay_server::session::SessionStore;
use ojrelay_server::upstream::UpstreamClient;

#[derive(Parser, Debug)]
#[command(name = "ojrelay-server")]
#[command(version, about = "ojrelay gateway - upstream relay and workflow dispatch")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080", env = "LISTEN_ADDR")]
    addr: SocketAddr,

    /// Upstream host base URL (no trailing slash).
    #[arg(long, default_value = "https://www.luogu.com.cn", env = "UPSTREAM_URL")]
    upstream_url: String,

    /// GitHub repository whose workflows are dispatched (owner/repo).
    #[arg(long, default_value = "CB-X2-Jun/luogu-problem-reader", env = "GITHUB_REPO")]
    github_repo: String,

    /// Git ref the dispatched workflows run on.
    #[arg(long, default_value = "main", env = "DISPATCH_REF")]
    dispatch_ref: String,

    /// GitHub API base URL.
    #[arg(long, default_value = "https://api.github.com", env = "GITHUB_API_URL")]
    github_api_url: String,

    /// Upstream request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    request_timeout: u64,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "ojrelay_server=info".into()),
    );
    if args.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        upstream = %args.upstream_url,
        repo = %args.github_repo,
        workflows = ?ojrelay_core::workflow::all_workflows(),
        "Starting ojrelay-server"
    );

    let upstream = UpstreamClient::new(
        args.upstream_url,
        Duration::from_secs(args.request_timeout),
    )?;
    let dispatcher =
        WorkflowDispatcher::new(args.github_api_url, args.github_repo, args.dispatch_ref);
    let state = AppState {
        upstream,
        sessions: SessionStore::new(),
        dispatcher,
    };

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await?;

    info!("Gateway stopped");
    Ok(())
}
