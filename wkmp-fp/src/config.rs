//! Configuration resolution for wkmp-fp
//!
//! Provides multi-tier resolution with CLI → ENV → TOML → compiled default priority.

use crate::loader::{Decoder, DecoderKind, FileLoader};
use crate::lookup::acoustid::DEFAULT_CLIENT_KEY;
use crate::lookup::ClientIdentity;
use std::path::PathBuf;
use tracing::{info, warn};
use wkmp_common::config::{resolve_setting, TomlConfig};

/// Module name, also the config file stem (`wkmp-fp.toml`)
pub const MODULE_NAME: &str = "wkmp-fp";

pub const ENV_ACOUSTID_API_KEY: &str = "WKMP_ACOUSTID_API_KEY";
pub const ENV_LAME: &str = "WKMP_LAME";
pub const ENV_OGGDEC: &str = "WKMP_OGGDEC";

/// Client name and version reported to the lookup service
pub fn client_version() -> String {
    format!("{} {}", MODULE_NAME, env!("CARGO_PKG_VERSION"))
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct FpConfig {
    pub client: ClientIdentity,
    pub lame_program: String,
    pub oggdec_program: String,
    pub scratch_root: PathBuf,
}

impl FpConfig {
    /// Resolve settings from the command line, environment and TOML config
    pub fn resolve(cli_client_key: Option<&str>, toml_config: &TomlConfig) -> Self {
        let client_id = match resolve_setting(
            cli_client_key,
            ENV_ACOUSTID_API_KEY,
            toml_config.acoustid_api_key.as_deref(),
        ) {
            Some((key, source)) => {
                info!("AcoustID client key loaded from {}", source);
                key
            }
            None => {
                warn!(
                    "AcoustID client key not configured, using the public demo key. \
                     Obtain a key at https://acoustid.org/new-application and set {} \
                     or acoustid_api_key in {}.toml",
                    ENV_ACOUSTID_API_KEY, MODULE_NAME
                );
                DEFAULT_CLIENT_KEY.to_string()
            }
        };

        let lame_program = resolve_program(
            DecoderKind::Lame,
            ENV_LAME,
            toml_config.decoders.lame.as_deref(),
        );
        let oggdec_program = resolve_program(
            DecoderKind::OggDec,
            ENV_OGGDEC,
            toml_config.decoders.oggdec.as_deref(),
        );

        let scratch_root = toml_config
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        Self {
            client: ClientIdentity {
                client_id,
                client_version: client_version(),
            },
            lame_program,
            oggdec_program,
            scratch_root,
        }
    }

    /// File loader using the configured decoders and scratch root
    pub fn file_loader(&self) -> FileLoader {
        FileLoader::new(
            Decoder::new(DecoderKind::Lame, &self.lame_program, &self.scratch_root),
            Decoder::new(DecoderKind::OggDec, &self.oggdec_program, &self.scratch_root),
        )
    }
}

fn resolve_program(kind: DecoderKind, env_var: &str, toml_value: Option<&str>) -> String {
    resolve_setting(None, env_var, toml_value)
        .map(|(program, _)| program)
        .unwrap_or_else(|| kind.default_program().to_string())
}
