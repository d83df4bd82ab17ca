// src/config.rs

use std::{env, path::PathBuf};

use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one JSON file per collection.
    pub data_dir: PathBuf,
    /// Directory the rolling log files are written to (and read back by the log viewer).
    pub log_dir: PathBuf,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let log_dir = env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let admin_username = env::var("ADMIN_USERNAME").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        Self {
            data_dir,
            log_dir,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            admin_username,
            admin_password,
        }
    }
}
