use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to load .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
    #[error("no API key found; set WEATHER_API_KEY in env or .env")]
    NoApiKey,
}

/// The weather provider credential: a single API key passed as a query param.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
}

/// Return candidate .env paths in priority order.
fn env_file_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/skycast/.env"));
    }
    paths.push(PathBuf::from(".env"));
    paths
}

/// Load .env files so WEATHER_API_KEY becomes visible. Earlier files have
/// higher priority because dotenvy does NOT overwrite existing env vars.
pub fn load_env_files() {
    for path in env_file_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

/// Load the provider API key from the environment, trying .env files first.
pub fn load_credentials() -> Result<Credentials, CredentialError> {
    load_env_files();

    std::env::var("WEATHER_API_KEY")
        .ok()
        .filter(|v| !v.is_empty())
        .map(|api_key| Credentials { api_key })
        .ok_or(CredentialError::NoApiKey)
}
