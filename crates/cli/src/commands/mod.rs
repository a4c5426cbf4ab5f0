//! CLI command implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

/// Errors resolving the database connection string.
#[derive(Debug, Error)]
pub enum DatabaseUrlError {
    #[error("Missing environment variable: {0} (or set DATABASE_URL)")]
    MissingEnvVar(&'static str),
}

/// Database URL from `DATABASE_URL`, or from the discrete `PG*` variables.
///
/// # Errors
///
/// Returns `DatabaseUrlError` if neither form is fully set.
pub fn database_url() -> Result<SecretString, DatabaseUrlError> {
    dotenvy::dotenv().ok();
    database_url_from(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
}

fn database_url_from(
    get: impl Fn(&'static str) -> Option<String>,
) -> Result<SecretString, DatabaseUrlError> {
    if let Some(url) = get("DATABASE_URL") {
        return Ok(SecretString::from(url));
    }

    let require = |key| get(key).ok_or(DatabaseUrlError::MissingEnvVar(key));
    let host = require("PGHOST")?;
    let user = require("PGUSER")?;
    let password = require("PGPASSWORD")?;
    let name = require("DBNAME")?;
    let port = get("PGPORT").unwrap_or_else(|| "5432".to_string());

    Ok(SecretString::from(format!(
        "postgres://{user}:{password}@{host}:{port}/{name}"
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, (*v).to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_database_url_wins() {
        let url = database_url_from(lookup(&[
            ("DATABASE_URL", "postgres://a@b/c"),
            ("PGHOST", "ignored"),
        ]))
        .unwrap();
        assert_eq!(url.expose_secret(), "postgres://a@b/c");
    }

    #[test]
    fn test_assembled_from_parts() {
        let url = database_url_from(lookup(&[
            ("PGHOST", "db"),
            ("PGUSER", "orders"),
            ("PGPASSWORD", "pw"),
            ("DBNAME", "orders"),
        ]))
        .unwrap();
        assert_eq!(url.expose_secret(), "postgres://orders:pw@db:5432/orders");
    }

    #[test]
    fn test_missing_part() {
        let err = database_url_from(lookup(&[("PGHOST", "db")])).unwrap_err();
        assert!(matches!(err, DatabaseUrlError::MissingEnvVar("PGUSER")));
    }
}
