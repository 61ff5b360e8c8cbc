use anyhow::Result;
use dotenvy::dotenv;
use std::collections::HashMap;
use std::env;

use crate::banks::BankId;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub log_request_body: bool,
    /// HMAC secrets keyed by bank slug, from `WEBHOOK_SECRET_<SLUG>` env
    /// vars (slug uppercased, dashes to underscores). Banks without a
    /// configured secret keep the legacy unverified behavior.
    pub webhook_secrets: HashMap<String, String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env file if present

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        });

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            cors_allowed_origins,
            log_request_body: env::var("LOG_REQUEST_BODY")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            webhook_secrets: collect_webhook_secrets(env::vars()),
        })
    }

    pub fn webhook_secret_for(&self, bank: BankId) -> Option<&str> {
        self.webhook_secrets.get(bank.slug()).map(String::as_str)
    }
}

fn collect_webhook_secrets(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    const PREFIX: &str = "WEBHOOK_SECRET_";

    vars.filter_map(|(key, value)| {
        let suffix = key.strip_prefix(PREFIX)?;
        let slug = suffix.to_lowercase().replace('_', "-");
        BankId::from_slug(&slug)?;
        Some((slug, value))
    })
    .collect()
}
