use clap::Parser;
use gossip_broadcast::broadcast::service::BroadcastService;
use gossip_broadcast::config::Config;
use gossip_broadcast::node::service::Node;
use gossip_broadcast::node::wire;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting broadcast node with {:?}", config);

    // 1. Node runtime:
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let node = Node::new(outbound_tx);

    // 2. Broadcast engine:
    let service = BroadcastService::new(node.clone(), &config);
    service.register_handlers();

    // 3. Spawn disseminator:
    service.start();

    // 4. Serve stdin until the workbench closes it:
    wire::run_stdio(node, outbound_rx).await
}
