use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL. `PIXBANK_DATABASE_URL` overrides.
    pub database_url: String,
    /// JWT signing secret. `PIXBANK_JWT_SECRET` overrides.
    pub jwt_secret: String,
    /// Balance every new account opens with, as a 2-decimal string.
    #[serde(default = "default_starter_balance")]
    pub starter_balance: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

fn default_starter_balance() -> String {
    "300.00".to_string()
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        let mut config: AppConfig =
            serde_yaml::from_str(&content).expect("Failed to parse config yaml");
        config.apply_env_overrides();
        config
    }

    /// Secrets come from the environment when present; the YAML values
    /// are development defaults.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("PIXBANK_DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(secret) = std::env::var("PIXBANK_JWT_SECRET") {
            self.jwt_secret = secret;
        }
    }
}
