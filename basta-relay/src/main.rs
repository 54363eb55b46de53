use std::future::Future;
use std::sync::Arc;

use axum::Router;
use envconfig::Envconfig;
use eyre::{eyre, Result};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use basta_relay::config::Config;
use basta_relay::handlers::{app, AppState};
use basta_relay::metrics::setup_metrics_recorder;
use basta_relay::publisher::{sale_channel, PublishError, RedisPublisher};

async fn listen(app: Router, bind: String) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

fn server_exit(served: Result<Result<()>, tokio::task::JoinError>) -> eyre::Report {
    match served {
        Ok(Ok(())) => eyre!("http server stopped"),
        Ok(Err(e)) => e.wrap_err("http server failed"),
        Err(e) => eyre!("http server task failed, {}", e),
    }
}

/// Waits for the first redis connection while the server is already running.
/// Whichever fails first wins, the server stopping before redis connects is
/// an error too.
async fn connect_while_serving<C>(server: &mut JoinHandle<Result<()>>, connect: C) -> Result<()>
where
    C: Future<Output = Result<(), PublishError>>,
{
    tokio::select! {
        served = server => Err(server_exit(served)),
        connected = connect => connected.map_err(|e| eyre!("failed to connect to redis, {}", e)),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::init_from_env().expect("failed to load configuration from env");

    let publisher = Arc::new(
        RedisPublisher::new(&config.redis_url).expect("failed to create redis client"),
    );
    let channel = sale_channel(config.sale_id.as_str());

    let metrics = config
        .export_prometheus
        .then(|| setup_metrics_recorder().expect("failed to install metrics recorder"));

    let state = AppState::new(publisher.clone(), channel.clone());
    let app = app(state, config.max_body_size, metrics);

    let bind = config.bind();
    tracing::info!(%bind, %channel, "starting basta-relay");

    // Serve while connecting, /health reports the bus as disconnected until then
    let mut http_server = tokio::spawn(listen(app, bind));

    if let Err(e) = connect_while_serving(&mut http_server, publisher.connect()).await {
        tracing::error!("basta-relay failed to start, {:#}", e);
        std::process::exit(1);
    }
    tracing::info!("connected to redis");

    let e = server_exit(http_server.await);
    tracing::error!("basta-relay exiting, {:#}", e);
    std::process::exit(1);
}
