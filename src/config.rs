use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_PATH: &str = "/etc/elastic-mail/elastic-mail.toml";
const ENV_PREFIX: &str = "ELASTIC_MAIL";

/// Transport configuration. Loaded once by the surrounding glue and
/// passed into the transport at construction; the transport itself
/// never reads the process environment.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub api_key: String,
    pub account: String,

    /// Endpoint override, mainly for tests. The provider's fixed send
    /// endpoint is used when unset.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Root directory of the attachment staging area.
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// TLS certificate verification. On by default; turning it off is
    /// a known weakness and is logged loudly by the transport.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_storage_root() -> PathBuf {
    std::env::temp_dir().join("elastic-mail")
}

fn default_verify_tls() -> bool {
    true
}

/// Loads config from the filesystem and merges it with any environment
/// variables prefixed with ELASTIC_MAIL_.
///
/// See sample config keys in the `Config` struct.
pub fn load_config(path: Option<&str>) -> Result<Config, crate::Error> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path.unwrap_or(DEFAULT_PATH)))
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    settings.try_deserialize::<Config>().map_err(|e| e.into())
}
