use crate::services::cascade::DeletePolicy;
use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use std::{env, str::FromStr};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub delete_policy: DeletePolicy,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Boat inventory REST API")]
pub struct Args {
    /// Host to bind to (overrides BOAT_INVENTORY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BOAT_INVENTORY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides BOAT_INVENTORY_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Pool size (overrides BOAT_INVENTORY_MAX_CONNECTIONS)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Soft or hard deletes (overrides BOAT_INVENTORY_DELETE_POLICY)
    #[arg(long, value_enum)]
    pub delete_policy: Option<DeletePolicy>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        Ok((Self::merge(args, |key| env::var(key))?, migrate))
    }

    /// CLI values win over environment values, which win over defaults.
    pub fn merge(
        args: Args,
        var: impl Fn(&str) -> Result<String, env::VarError>,
    ) -> Result<Self> {
        let env_host = var("BOAT_INVENTORY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_var(&var, "BOAT_INVENTORY_PORT", 3001u16)?;
        let env_db = var("BOAT_INVENTORY_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/boat_inventory.db".into());
        let env_max_connections = parse_var(&var, "BOAT_INVENTORY_MAX_CONNECTIONS", 5u32)?;
        let env_policy = match var("BOAT_INVENTORY_DELETE_POLICY") {
            Ok(value) => <DeletePolicy as ValueEnum>::from_str(&value, true)
                .map_err(|err| anyhow!(err))
                .with_context(|| {
                    format!("parsing BOAT_INVENTORY_DELETE_POLICY value `{}`", value)
                })?,
            Err(env::VarError::NotPresent) => DeletePolicy::default(),
            Err(err) => return Err(err).context("reading BOAT_INVENTORY_DELETE_POLICY"),
        };

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            max_connections: args.max_connections.unwrap_or(env_max_connections),
            delete_policy: args.delete_policy.unwrap_or(env_policy),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(
    var: &impl Fn(&str) -> Result<String, env::VarError>,
    key: &str,
    default: T,
) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, env::VarError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned().ok_or(env::VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_without_env_or_args() {
        let cfg = AppConfig::merge(Args::default(), lookup(&[])).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:3001");
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.delete_policy, DeletePolicy::Soft);
    }

    #[test]
    fn args_override_env() {
        let args = Args {
            port: Some(8080),
            delete_policy: Some(DeletePolicy::Soft),
            ..Args::default()
        };
        let env = lookup(&[
            ("BOAT_INVENTORY_PORT", "9000"),
            ("BOAT_INVENTORY_HOST", "127.0.0.1"),
            ("BOAT_INVENTORY_DELETE_POLICY", "hard"),
        ]);
        let cfg = AppConfig::merge(args, env).unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:8080");
        assert_eq!(cfg.delete_policy, DeletePolicy::Soft);
    }

    #[test]
    fn env_delete_policy_is_case_insensitive() {
        let cfg = AppConfig::merge(
            Args::default(),
            lookup(&[("BOAT_INVENTORY_DELETE_POLICY", "HARD")]),
        )
        .unwrap();
        assert_eq!(cfg.delete_policy, DeletePolicy::Hard);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = AppConfig::merge(Args::default(), lookup(&[("BOAT_INVENTORY_PORT", "abc")]))
            .unwrap_err();
        assert!(err.to_string().contains("BOAT_INVENTORY_PORT"));
    }
}
