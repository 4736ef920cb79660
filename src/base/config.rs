//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Configuration for the triage form client.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Runtime override of the triage service base URL (`TRIAGE_FORM_API_BASE`).
    #[serde(default)]
    pub api_base: Option<String>,
    /// Origin the client was served from (`TRIAGE_FORM_PAGE_ORIGIN`).
    /// Only considered when it is an `http` or `https` URL.
    #[serde(default)]
    pub page_origin: Option<String>,
    /// Export spans over OTLP in addition to stderr logging (`TRIAGE_FORM_OTLP_ENABLED`).
    #[serde(default)]
    pub otlp_enabled: bool,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("TRIAGE_FORM"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    fn validate(&self) -> Res<()> {
        if let Some(api_base) = &self.api_base {
            if api_base.trim().is_empty() {
                return Err(anyhow::anyhow!("API base override must not be blank."));
            }
        }

        Ok(())
    }
}
