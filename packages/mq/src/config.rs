/// Connection settings for the broker.
#[derive(Debug, Clone)]
pub struct MqConfig {
    pub url: String,
    pub pool_size: u8,
}
