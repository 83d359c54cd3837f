use anyhow::Result;
use heartbeat_monitor::client::config::ClientConfig;
use heartbeat_monitor::client::service::HeartbeatClient;
use heartbeat_monitor::events::bus::next_event;
use heartbeat_monitor::server::config::ServerConfig;
use heartbeat_monitor::server::service::HeartbeatServer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("server") => run_server(&args[2..]).await,
        Some("client") => run_client(&args[2..]).await,
        _ => {
            eprintln!("Usage: {} server [port]", args[0]);
            eprintln!(
                "       {} client [node_id] [server_address] [server_port]",
                args[0]
            );
            eprintln!("Example: {} server 5000", args[0]);
            eprintln!("Example: {} client cache-1 127.0.0.1 5000", args[0]);

            std::process::exit(1);
        }
    }
}

async fn run_server(args: &[String]) -> Result<()> {
    let mut config = ServerConfig::default();
    if let Some(port) = args.first() {
        config.listen_port = port.parse()?;
    }

    let server = HeartbeatServer::bind(config).await?;

    // Log every lifecycle event. External integrations (load balancers,
    // alerting) subscribe through the same channel.
    let mut events = server.subscribe();
    tokio::spawn(async move {
        while let Some(event) = next_event(&mut events).await {
            let record = event.record();
            tracing::info!(
                "Node {} {} (status {:?}, missed {})",
                record.node_id,
                event.name(),
                record.status,
                record.missed_heartbeats
            );
        }
    });

    let handle = server.start();
    tracing::info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;

    handle.shutdown();
    handle.stopped().await;

    Ok(())
}

async fn run_client(args: &[String]) -> Result<()> {
    let mut config = ClientConfig::default();
    if let Some(node_id) = args.first() {
        config.node_id = node_id.clone();
    }
    let host = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = match args.get(2) {
        Some(port) => port.parse()?,
        None => 5000,
    };
    config.server_addr = format!("{}:{}", host, port).parse()?;

    let client = HeartbeatClient::connect(config).await?;

    let mut events = client.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!("Connection state: {:?}", event);
        }
    });

    tracing::info!(
        "Sending heartbeats as {}; press Ctrl+C to leave",
        client.node_id()
    );
    let handle = client.start();
    tokio::signal::ctrl_c().await?;

    handle.stop().await;

    Ok(())
}
