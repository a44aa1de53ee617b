//! Server configuration
//!
//! Every flag can also be set through its environment variable, so the
//! admin secret never has to live in code.

use beans_business::EconomyConfig;
use beans_core::DEFAULT_SESSION_TTL_HOURS;
use chrono::Duration;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Longest admin session lifetime accepted on the command line (one year)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Beans - virtual currency backend
#[derive(Parser, Debug, Clone)]
#[command(name = "beans")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:data/beans.db?mode=rwc")]
    pub database_url: String,

    /// Address to listen on
    #[arg(long, env = "BEANS_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Admin login secret. Empty disables admin login.
    #[arg(long, env = "BEANS_ADMIN_PASSWORD", default_value = "", hide_env_values = true)]
    pub admin_password: String,

    /// Admin session lifetime in hours (1 to 8760)
    #[arg(
        long,
        env = "BEANS_SESSION_TTL_HOURS",
        default_value_t = DEFAULT_SESSION_TTL_HOURS,
        value_parser = clap::value_parser!(i64).range(1..=MAX_SESSION_TTL_HOURS)
    )]
    pub session_ttl_hours: i64,

    /// Connection pool size
    #[arg(long, env = "BEANS_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,
}

impl Cli {
    pub fn economy_config(&self) -> EconomyConfig {
        EconomyConfig::default()
            .with_admin_password(self.admin_password.clone())
            .with_session_ttl(Duration::hours(self.session_ttl_hours))
    }

    /// Directory holding the database file, if the URL points at one
    pub fn database_dir(&self) -> Option<PathBuf> {
        database_dir(&self.database_url)
    }
}

fn database_dir(database_url: &str) -> Option<PathBuf> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    PathBuf::from(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(PathBuf::from)
}
