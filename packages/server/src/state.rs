use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    /// `None` when notifications are disabled or the broker was unreachable at start-up.
    pub mq: Option<Arc<mq::Mq>>,
    pub metrics: Arc<Metrics>,
}
