use serde::Deserialize;

/// Submission notification settings.
#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Whether submissions are published at all. Default: false.
    #[serde(default)]
    pub enabled: bool,
    /// Broker connection URL. Default: "redis://localhost:6379".
    #[serde(default = "default_notification_url")]
    pub url: String,
    /// Connection pool size. Default: 5.
    #[serde(default = "default_notification_pool_size")]
    pub pool_size: u8,
    /// Topic the submission payload is published to. Default: "submissions".
    #[serde(default = "default_notification_topic")]
    pub topic: String,
}

fn default_notification_url() -> String {
    "redis://localhost:6379".into()
}
fn default_notification_pool_size() -> u8 {
    5
}
fn default_notification_topic() -> String {
    "submissions".into()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_notification_url(),
            pool_size: default_notification_pool_size(),
            topic: default_notification_topic(),
        }
    }
}
