use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use assignment_server::config::AppConfig;
use assignment_server::metrics::Metrics;
use assignment_server::state::AppState;
use assignment_server::{build_router, database, logging, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(&config.log).context("Failed to initialise logging")?;

    let db = database::init_db(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!(host = %config.database.host, name = %config.database.name, "Database ready");

    if let Some(ref path) = config.bootstrap.users_csv {
        if let Err(e) = seed::bootstrap_accounts(&db, path).await {
            error!(error = %e, "Account bootstrap failed");
        }
    }

    let mq = if config.notification.enabled {
        let mq_config = mq::MqConfig {
            url: config.notification.url.clone(),
            pool_size: config.notification.pool_size,
        };
        match mq::init_mq(mq_config).await {
            Ok(queue) => {
                info!(topic = %config.notification.topic, "Notification publisher connected");
                Some(Arc::new(queue))
            }
            Err(e) => {
                warn!(error = %e, "Notification broker unreachable, submissions will not be announced");
                None
            }
        }
    } else {
        info!("Notifications disabled");
        None
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config,
        mq,
        metrics: Arc::new(Metrics::new()),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
