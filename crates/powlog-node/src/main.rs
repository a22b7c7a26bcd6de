use anyhow::Context;
use clap::{Parser, ValueEnum};
use powlog_core::{constants::DEFAULT_DIFFICULTY, Chain, ChainStore};
use powlog_node::{app, AppState};
use powlog_storage::{FileStore, SledStore, CHAIN_FILE};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::{info, Level};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    /// Single bincode file, rewritten on every append
    File,
    /// sled database
    Sled,
}

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Data directory for the persisted chain
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Storage backend
    #[arg(long, value_enum, default_value_t = Backend::File)]
    backend: Backend,

    /// Leading zero hex characters required of a mined block hash
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let store: Arc<dyn ChainStore> = match args.backend {
        Backend::File => Arc::new(FileStore::open(args.data_dir.join(CHAIN_FILE))?),
        Backend::Sled => Arc::new(SledStore::open(args.data_dir.join("sled"))?),
    };
    let chain = Chain::open(store, args.difficulty).context("loading chain")?;
    info!(
        "chain ready: {} blocks at difficulty {}",
        chain.len(),
        chain.difficulty()
    );

    let state = AppState::new(chain);
    let router = app(state.clone());

    let addr: SocketAddr = args.listen.parse()?;
    info!("powlog-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let chain = state
        .chain
        .lock()
        .map_err(|_| anyhow::anyhow!("chain lock poisoned"))?;
    chain.save().context("saving chain on shutdown")?;
    info!("chain saved, {} blocks", chain.len());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
