pub mod config;
pub mod error;
pub mod models;

pub use config::MqConfig;
pub use error::MqError;
pub use models::{MqQueue, init_mq, publish_json};

pub type Mq = MqQueue;
