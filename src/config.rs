use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

fn default_backend_url() -> String {
    option_env!("MENSTRA_BACKEND_URL").unwrap_or("http://localhost:8080/backend").to_owned()
}
fn default_auth_url() -> String {
    option_env!("MENSTRA_AUTH_URL").unwrap_or("http://localhost:8080/auth").to_owned()
}
fn default_timeout() -> u64 { 30 }
fn default_two()     -> u32 { 2 }
fn default_one()     -> u32 { 1 }

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend:  BackendConfig,
    #[serde(default)]
    pub auth:     AuthConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url:             String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { url: default_backend_url(), timeout_seconds: default_timeout() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_url")]
    pub url: String,
}

impl Default for AuthConfig {
    fn default() -> Self { Self { url: default_auth_url() } }
}

/// How many months around today each calendar view shows.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_two")]
    pub dashboard_previous_months: u32,
    #[serde(default = "default_one")]
    pub dashboard_upcoming_months: u32,
    #[serde(default = "default_one")]
    pub create_previous_months:    u32,
    #[serde(default = "default_one")]
    pub create_upcoming_months:    u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            dashboard_previous_months: 2,
            dashboard_upcoming_months: 1,
            create_previous_months:    1,
            create_upcoming_months:    1,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = config_dir().join("config.toml");
        if path.exists() {
            Ok(toml::from_str(&std::fs::read_to_string(&path)?)?)
        } else {
            Ok(AppConfig::default())
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("menstra")
}
