// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Command-line configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::automation::bridge::BridgeCommand;

/// Environment variable holding a default bridge command line.
pub const BRIDGE_ENV: &str = "HWP_MCP_BRIDGE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("unknown argument `{0}`")]
    UnknownArgument(String),
    #[error("`{0}` given more than once")]
    Duplicate(&'static str),
    #[error("`{0}` requires a value")]
    MissingValue(&'static str),
    #[error("invalid value `{value}` for `{flag}`")]
    InvalidValue { flag: &'static str, value: String },
    #[error("`--demo` cannot be combined with a bridge command")]
    DemoWithBridge,
    #[error("`--bridge-arg` requires `--bridge`")]
    BridgeArgWithoutBridge,
}

/// Where the session controller gets its automation handles from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Backend {
    /// Every connect attempt fails.
    #[default]
    Unconfigured,
    /// In-process simulated editor.
    Demo,
    Bridge(BridgeCommand),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerOptions {
    pub backend: Backend,
    pub hidden: bool,
    /// Serve streamable HTTP on this port instead of stdio.
    pub http_port: Option<u16>,
    pub log_file: Option<PathBuf>,
    pub temp_save_path: Option<PathBuf>,
}

fn value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, OptionsError> {
    args.next().ok_or(OptionsError::MissingValue(flag))
}

fn set_once<T>(slot: &mut Option<T>, flag: &'static str, value: T) -> Result<(), OptionsError> {
    if slot.is_some() {
        return Err(OptionsError::Duplicate(flag));
    }
    *slot = Some(value);
    Ok(())
}

/// Parse the arguments after the program name. `env_bridge` is the value of [`BRIDGE_ENV`]
/// and only applies when neither `--bridge` nor `--demo` is given.
pub fn parse_options(
    mut args: impl Iterator<Item = String>,
    env_bridge: Option<String>,
) -> Result<ServerOptions, OptionsError> {
    let mut options = ServerOptions::default();
    let mut demo = false;
    let mut bridge: Option<String> = None;
    let mut bridge_args = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if demo {
                    return Err(OptionsError::Duplicate("--demo"));
                }
                demo = true;
            }
            "--hidden" => {
                if options.hidden {
                    return Err(OptionsError::Duplicate("--hidden"));
                }
                options.hidden = true;
            }
            "--bridge" => {
                let command = value(&mut args, "--bridge")?;
                set_once(&mut bridge, "--bridge", command)?;
            }
            "--bridge-arg" => bridge_args.push(value(&mut args, "--bridge-arg")?),
            "--http-port" => {
                let raw = value(&mut args, "--http-port")?;
                let port = raw
                    .parse()
                    .map_err(|_| OptionsError::InvalidValue { flag: "--http-port", value: raw })?;
                set_once(&mut options.http_port, "--http-port", port)?;
            }
            "--log-file" => {
                let path = value(&mut args, "--log-file")?;
                set_once(&mut options.log_file, "--log-file", PathBuf::from(path))?;
            }
            "--temp-save-path" => {
                let path = value(&mut args, "--temp-save-path")?;
                set_once(&mut options.temp_save_path, "--temp-save-path", PathBuf::from(path))?;
            }
            _ => return Err(OptionsError::UnknownArgument(arg)),
        }
    }

    if demo && bridge.is_some() {
        return Err(OptionsError::DemoWithBridge);
    }
    if bridge.is_none() && !bridge_args.is_empty() {
        return Err(OptionsError::BridgeArgWithoutBridge);
    }

    options.backend = match bridge {
        Some(raw) => {
            let mut command = BridgeCommand::parse(&raw).ok_or(OptionsError::InvalidValue {
                flag: "--bridge",
                value: raw.clone(),
            })?;
            command.args.extend(bridge_args);
            Backend::Bridge(command)
        }
        None if demo => Backend::Demo,
        None => env_bridge
            .as_deref()
            .and_then(BridgeCommand::parse)
            .map_or(Backend::Unconfigured, Backend::Bridge),
    };

    Ok(options)
}
