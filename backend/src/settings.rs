//! Server settings loaded via OrthoConfig.
//!
//! Values merge from `LABELFLOW_*` environment variables, an optional
//! configuration file, and command-line flags.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Runtime settings for the order service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LABELFLOW")]
pub struct ServerSettings {
    /// Address to listen on.
    pub host: Option<IpAddr>,
    /// Port to listen on.
    pub port: Option<u16>,
    /// PostgreSQL connection string. Without one the server keeps orders in
    /// memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Leave embedded migrations unapplied at start-up.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
}

impl ServerSettings {
    /// Socket address assembled from host and port.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(DEFAULT_HOST),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Database URL with surrounding whitespace removed; blank counts as unset.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "LABELFLOW_HOST",
        "LABELFLOW_PORT",
        "LABELFLOW_DATABASE_URL",
        "LABELFLOW_DB_MAX_CONNECTIONS",
        "LABELFLOW_SKIP_MIGRATIONS",
    ];

    fn load() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("labelflow")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load();

        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert!(settings.database_url().is_none());
        assert_eq!(settings.db_max_connections(), DEFAULT_DB_MAX_CONNECTIONS);
        assert!(!settings.skip_migrations);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("LABELFLOW_HOST", Some("127.0.0.1".to_owned())),
            ("LABELFLOW_PORT", Some("9090".to_owned())),
            (
                "LABELFLOW_DATABASE_URL",
                Some(" postgres://labelflow@localhost/orders ".to_owned()),
            ),
            ("LABELFLOW_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("LABELFLOW_SKIP_MIGRATIONS", Some("true".to_owned())),
        ]);

        let settings = load();

        assert_eq!(settings.bind_addr(), "127.0.0.1:9090".parse().expect("addr"));
        assert_eq!(
            settings.database_url(),
            Some("postgres://labelflow@localhost/orders")
        );
        assert_eq!(settings.db_max_connections(), 4);
        assert!(settings.skip_migrations);
    }

    #[rstest]
    fn blank_database_url_counts_as_unset() {
        let mut vars = VARS.map(|name| (name, None::<String>));
        vars[2].1 = Some("   ".to_owned());
        let _guard = lock_env(vars);

        assert!(load().database_url().is_none());
    }
}
