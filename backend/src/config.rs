//! Command line and environment configuration.
//!
//! Every flag falls back to an environment variable, and `main` loads a `.env`
//! file before parsing so local overrides need no shell exports.

use axum::http::HeaderValue;
use clap::Parser;
use std::net::SocketAddr;

/// Subscription tracker HTTP service
#[derive(Parser, Debug, Clone)]
#[command(name = "subscription-tracker")]
#[command(about = "Tracks recurring subscriptions and their upcoming payments")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// SQLite database URL; the file is created if missing
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:subscriptions.db")]
    pub database_url: String,

    /// Origin allowed to call the API from a browser
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:8080")]
    pub cors_origin: String,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Check values clap cannot check on its own
    pub fn validate(&self) -> Result<(), String> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(format!(
                "DATABASE_URL must be a sqlite URL, got '{}'",
                self.database_url
            ));
        }

        if !(self.cors_origin.starts_with("http://") || self.cors_origin.starts_with("https://")) {
            return Err(format!(
                "CORS_ORIGIN must start with http:// or https://, got '{}'",
                self.cors_origin
            ));
        }
        self.cors_origin_header()?;

        Ok(())
    }

    /// The CORS origin as a header value
    pub fn cors_origin_header(&self) -> Result<HeaderValue, String> {
        self.cors_origin
            .parse::<HeaderValue>()
            .map_err(|e| format!("Invalid CORS_ORIGIN '{}': {}", self.cors_origin, e))
    }
}
