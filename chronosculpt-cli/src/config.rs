//! Environment loading for the CLI

use std::path::PathBuf;

/// Load `.env` files without overriding variables that are already set.
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.chronosculpt/.env
///
/// Runs before argument parsing so `env = ...` flags see the values, which
/// is also before tracing exists; the outcome is returned for logging.
pub fn load_dotenv() -> DotenvReport {
    let mut report = DotenvReport::default();

    match dotenvy::dotenv() {
        Ok(path) => report.loaded.push(path),
        Err(e) if e.not_found() => {}
        Err(e) => report.failed.push(format!("./.env: {}", e)),
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(()) => report.loaded.push(env_file),
                Err(e) => report.failed.push(format!("{}: {}", env_file.display(), e)),
            }
        }
    }

    report
}

/// Which `.env` files were applied
#[derive(Debug, Default)]
pub struct DotenvReport {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<String>,
}

impl DotenvReport {
    pub fn log(&self) {
        for failure in &self.failed {
            tracing::warn!("Failed to load {}", failure);
        }

        if self.loaded.is_empty() {
            tracing::debug!("No .env files found (current dir or ~/.chronosculpt)");
        } else {
            let paths: Vec<String> = self.loaded.iter().map(|p| p.display().to_string()).collect();
            tracing::info!("Loaded configuration from: {}", paths.join(", "));
        }
    }
}

/// The chronosculpt config directory (~/.chronosculpt)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".chronosculpt"))
}
