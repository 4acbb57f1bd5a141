use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub realtime: RealtimeConfig,
    pub business_rules: BusinessRules,
    pub fixtures: FixturesConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeConfig {
    pub channel_capacity: usize,
    pub topic: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    pub tax_rate: f64,
    pub currency: String,
    #[serde(default = "default_booking_prefix")]
    pub booking_prefix: String,
}

fn default_booking_prefix() -> String { "SB".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct FixturesConfig {
    pub flights_path: String,
    /// Seats already taken on every flight's seat map.
    #[serde(default)]
    pub booked_seats: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "skybook=debug,skybook_live=debug,skybook_booking=debug".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // optional per-mode overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. SKYBOOK__REALTIME__CHANNEL_CAPACITY=512
            .add_source(config::Environment::with_prefix("SKYBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
