//! Server configuration.
//!
//! Loaded from `STRAND_`-prefixed environment variables with `envy`:
//!
//! - `STRAND_ADDR` (optional): listen address, defaults to `0.0.0.0:3000`
//! - `STRAND_DRAIN_TIMEOUT_SECS` (optional): how long shutdown waits for
//!   in-flight connections before aborting them. Unset means wait forever.
//! - `STRAND_MAX_BODY_BYTES` (optional): largest request body accepted,
//!   defaults to 2 MiB. Larger bodies are answered with `413`.

use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;

const ENV_PREFIX: &str = "STRAND_";

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_addr")]
    pub addr: String,

    #[serde(default)]
    pub drain_timeout_secs: Option<u64>,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_addr() -> String {
    "0.0.0.0:3000".to_owned()
}

pub(crate) fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            drain_timeout_secs: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Ok(envy::prefixed(ENV_PREFIX).from_env::<Self>()?)
    }

    /// Reads an explicit list of `(name, value)` pairs, prefix included.
    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter::<_, Self>(vars)?)
    }

    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_vars(vars(&[("PATH", "/usr/bin")])).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.drain_timeout(), None);
        assert_eq!(cfg.max_body_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn prefixed_vars_override() {
        let cfg = Config::from_vars(vars(&[
            ("STRAND_ADDR", "127.0.0.1:8080"),
            ("STRAND_DRAIN_TIMEOUT_SECS", "25"),
            ("STRAND_MAX_BODY_BYTES", "4096"),
        ]))
        .unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:8080");
        assert_eq!(cfg.drain_timeout(), Some(Duration::from_secs(25)));
        assert_eq!(cfg.max_body_bytes, 4096);
    }

    #[test]
    fn bad_number_is_config_error() {
        let err = Config::from_vars(vars(&[("STRAND_DRAIN_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
