use anyhow::Result;
use axum::Router;
use clap::Parser;
use newsrank_core::{IndexSettings, DEFAULT_CHAMPION_SIZE};
use newsrank_server::{build_app, ServerOptions};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    /// Corpus JSON file the index is built from
    #[arg(long, default_value = "./IR_data_news_12k.json")]
    corpus: PathBuf,
    /// Rebuild the index before serving
    #[arg(long = "create-index", alias = "createIndex")]
    create_index: bool,
    /// Champion list size used when building
    #[arg(long, default_value_t = DEFAULT_CHAMPION_SIZE)]
    champions: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let opts = ServerOptions {
        index_dir: args.index,
        corpus: args.corpus,
        settings: IndexSettings { champion_size: args.champions, ..Default::default() },
        rebuild: args.create_index,
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
        cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
    };
    let app: Router = build_app(opts)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
