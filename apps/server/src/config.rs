use std::{net::SocketAddr, time::Duration};

use clearcost_core::CustomsSettings;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub autoria_api_key: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Optional JSON file overriding the statutory defaults.
    pub settings_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("CLEARCOST_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .expect("Invalid CLEARCOST_LISTEN_ADDR");
        let db_path =
            std::env::var("CLEARCOST_DB_PATH").unwrap_or_else(|_| "./db/clearcost.db".into());
        let autoria_api_key = std::env::var("AUTORIA_API_KEY").unwrap_or_default();
        let cors_allow = std::env::var("CLEARCOST_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("CLEARCOST_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "60000".into())
            .parse()
            .unwrap_or(60000);
        let settings_path = std::env::var("CLEARCOST_SETTINGS_FILE").ok();
        Self {
            listen_addr,
            db_path,
            autoria_api_key,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            settings_path,
        }
    }

    /// Statutory rates: the compiled defaults, unless a settings file says
    /// otherwise. A present-but-unreadable file is fatal, silently falling
    /// back to defaults would misprice every calculation.
    pub fn load_customs_settings(&self) -> anyhow::Result<CustomsSettings> {
        match &self.settings_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("cannot read settings file {}: {}", path, e))?;
                let settings = serde_json::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("cannot parse settings file {}: {}", path, e))?;
                Ok(settings)
            }
            None => Ok(CustomsSettings::default()),
        }
    }
}
