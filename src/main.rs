//! Burrow demo server.
//!
//! ```text
//! options file (--config) → env file (--env-file) + process env → CLI flags
//!     → Config → logging → routes → serve until Ctrl+C
//! ```

use std::path::PathBuf;

use axum::http::StatusCode;
use clap::Parser;
use serde::Deserialize;
use serde_json::json;

use burrow::lifecycle::{resolve_options, StartupSources};
use burrow::middleware::from_fn;
use burrow::{observability, Config, Reply, RequestContext, Server};

#[derive(Debug, Parser)]
#[command(name = "burrow", version, about = "Burrow demo HTTP server")]
struct Cli {
    /// KEY=VALUE file read before the process environment
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// TOML options file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listening port (overrides file and environment)
    #[arg(long)]
    port: Option<String>,

    /// Bind host (overrides file and environment)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Greeting {
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let options = resolve_options(&StartupSources {
        config_file: cli.config,
        env_file: cli.env_file,
        host: cli.host,
        port: cli.port,
    })?;
    let config = Config::from_options(options);

    observability::init(&config.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "burrow starting");

    let mut server = Server::with_config(config);
    register_routes(&mut server)?;

    server.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn register_routes(server: &mut Server) -> Result<(), burrow::SetupError> {
    server.middleware(from_fn(|ctx: RequestContext, next| async move {
        let mut response = next.call(ctx).await;
        response
            .headers_mut()
            .insert("server", axum::http::HeaderValue::from_static("burrow"));
        response
    }))?;

    server.get("/health", |_ctx| async { Reply::ok(&json!({ "healthy": true })) })?;

    // Registered before `/users/:id`, so it wins for this exact path.
    server.get("/users/active", |_ctx| async {
        Reply::ok(&json!(["ada", "grace"])).message("active users")
    })?;

    server.get("/users/:id", |ctx: RequestContext| async move {
        let id = ctx.param("id").unwrap_or_default().to_string();
        match id.parse::<u64>() {
            Ok(id) => Reply::ok(&json!({ "id": id })),
            Err(_) => Reply::error(StatusCode::BAD_REQUEST, "id must be a number"),
        }
    })?;

    server.post("/greetings", |ctx: RequestContext| async move {
        match ctx.json::<Greeting>().await {
            Ok(greeting) => Reply::status(StatusCode::CREATED)
                .json(&json!({ "greeting": format!("hello, {}", greeting.name) })),
            Err(e) => Reply::error(StatusCode::BAD_REQUEST, e.to_string()),
        }
    })?;

    server.get("/files/*path", |ctx: RequestContext| async move {
        let path = ctx.param("path").unwrap_or_default().to_string();
        Reply::ok(&json!({ "path": path }))
    })?;

    server.get("/panic", |_ctx| async { explode() })?;

    Ok(())
}

/// Exercises the recovery layer: 500 with recovery on, a dropped
/// connection with it off.
fn explode() -> Reply {
    panic!("demo handler panic")
}
