//! Server configuration from environment variables.
//!
//! | Variable             | Default                                        |
//! |----------------------|------------------------------------------------|
//! | `HOST`               | `0.0.0.0`                                      |
//! | `PORT`               | `3000`                                         |
//! | `DATABASE_PATH`      | `<local data dir>/nihongo-companion/companion.db` |
//! | `GRAMMAR_RULES_PATH` | bundled rule file                              |

use std::path::PathBuf;

use anyhow::Context;

const APP_DIR: &str = "nihongo-companion";
const DATABASE_FILE: &str = "companion.db";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub grammar_rules_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("PORT must be a port number, got {port:?}"))?,
            None => 3000,
        };

        let database_path = match lookup("DATABASE_PATH") {
            Some(path) => PathBuf::from(path),
            None => dirs::data_local_dir()
                .context("no local data directory; set DATABASE_PATH")?
                .join(APP_DIR)
                .join(DATABASE_FILE),
        };

        Ok(Self {
            host,
            port,
            database_path,
            grammar_rules_path: lookup("GRAMMAR_RULES_PATH").map(PathBuf::from),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
