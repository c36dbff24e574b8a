use tracing::{error, info};

use updateip_metrics::config::{load_config, print_schema};
use updateip_metrics::startup::MetricsServer;
use updateip_metrics::utils::init_logging;

#[tokio::main]
async fn main() {
    if std::env::args().skip(1).any(|arg| arg == "--schema") {
        print_schema();
        return;
    }

    let config = load_config();
    init_logging(&config.logging);

    let server = match MetricsServer::new(&config.metrics) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Could not set up metrics server");
            std::process::exit(1);
        }
    };

    info!(
        "Starting metrics server on {}{}",
        server.config().bind_address(),
        server.config().path
    );
    let _server = server.run();

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for shutdown signal");
    }
    info!("Shutting down");
}
