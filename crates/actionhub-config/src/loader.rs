// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! `./actionhub.toml` > `~/.config/actionhub/actionhub.toml` >
//! `/etc/actionhub/actionhub.toml`, with `ACTIONHUB_*` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ActionHubConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/actionhub/actionhub.toml";
pub(crate) const LOCAL_CONFIG: &str = "actionhub.toml";

/// Sections recognised in `ACTIONHUB_<SECTION>_<KEY>` variable names.
const ENV_SECTIONS: &[&str] = &["engine", "remote", "catalog", "trello"];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("actionhub/actionhub.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/actionhub/actionhub.toml`
/// 3. `~/.config/actionhub/actionhub.toml`
/// 4. `./actionhub.toml`
/// 5. `ACTIONHUB_*` environment variables
pub fn load_config() -> Result<ActionHubConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<ActionHubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ActionHubConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
///
/// Unlike the standard hierarchy, the file must exist.
pub fn load_config_from_path(path: &Path) -> Result<ActionHubConfig, figment::Error> {
    if !path.is_file() {
        return Err(figment::Error::from(format!(
            "configuration file `{}` not found",
            path.display()
        )));
    }
    Figment::new()
        .merge(Serialized::defaults(ActionHubConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ActionHubConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `ACTIONHUB_REMOTE_TIMEOUT_SECS` maps to `remote.timeout_secs`.
fn env_provider() -> Env {
    Env::prefixed("ACTIONHUB_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    ENV_SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(*section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or(key)
}
