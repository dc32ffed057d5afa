use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Recipient identity used by the flat surface when the caller omits
    /// `userId`. Dev/test convenience only; leave unset in production so
    /// requests without an identity are rejected instead of silently
    /// scoped to a shared recipient.
    #[serde(default)]
    pub fallback_recipient_id: Option<String>,
    /// Broadcast buffer per channel address; subscribers further behind
    /// than this lag instead of blocking publishers.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_port() -> u16 {
    3005
}

fn default_channel_capacity() -> usize {
    256
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("COURIER_NOTIFICATION").separator("__"))
            .build()?;
        Ok(config.try_deserialize().unwrap_or_else(|_| Self {
            port: default_port(),
            fallback_recipient_id: None,
            channel_capacity: default_channel_capacity(),
        }))
    }
}
