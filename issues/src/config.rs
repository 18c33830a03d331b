use std::{env, time::Duration};

use anyhow::{bail, Context};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `None` runs the service on the in-memory store.
    pub mongo_uri: Option<String>,
    pub database: String,
    pub collection: String,
    pub host: String,
    pub port: u16,
    pub issue_ttl: Duration,
    pub seed_sample_issues: bool,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = or("PORT", "3000");
        let port = port
            .parse::<u16>()
            .with_context(|| format!("PORT must be a port number, got {:?}", port))?;

        let ttl = or("ISSUE_TTL_SECONDS", "86400");
        let ttl = ttl
            .parse::<u64>()
            .with_context(|| format!("ISSUE_TTL_SECONDS must be a whole number, got {:?}", ttl))?;

        Ok(Self {
            mongo_uri: lookup("MONGOURI").filter(|uri| !uri.is_empty()),
            database: or("DB_NAME", "issue_tracker"),
            collection: or("ISSUES_COLLECTION", "issues"),
            host: or("HOST", "0.0.0.0"),
            port,
            issue_ttl: Duration::from_secs(ttl),
            seed_sample_issues: parse_flag("SEED_SAMPLE_ISSUES", lookup("SEED_SAMPLE_ISSUES"))?,
        })
    }
}

fn parse_flag(key: &str, value: Option<String>) -> anyhow::Result<bool> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => bail!("{} must be true or false, got {:?}", key, value),
    }
}
