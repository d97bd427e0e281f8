// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Automation boundary of the external word processor.
//!
//! The running application is treated as an opaque, stateful target with four kinds of calls:
//! document lifecycle commands, macro/command execution, staged-parameter actions and a
//! whole-document text export. Everything above this module only talks to [`Automation`].

pub mod bridge;
pub mod memory;
mod params;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use params::{
    CharShapeParams, FindReplaceParams, InsertPictureParams, InsertTextParams, ParamItem,
    ParamValue, ParameterSet, StagedAction, TableCreationParams, MAX_TABLE_COLS, MAX_TABLE_ROWS,
    NOMINAL_TABLE_WIDTH, TABLE_ROW_HEIGHT,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomationError {
    /// The application could not be reached or instantiated.
    #[error("automation target unavailable: {0}")]
    Unavailable(String),
    /// The application refused a call.
    #[error("`{action}` was rejected: {message}")]
    Rejected { action: String, message: String },
    /// The channel to the application broke mid-call.
    #[error("automation transport error: {0}")]
    Transport(String),
    /// The application answered with something we cannot interpret.
    #[error("automation protocol error: {0}")]
    Protocol(String),
}

impl AutomationError {
    pub fn rejected(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected { action: action.into(), message: message.into() }
    }

    /// Whether the handle that produced this error should be considered dead.
    pub fn is_connection_loss(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Transport(_))
    }
}

/// Optional parts of the automation surface, probed once when a handle is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub window_visibility: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    #[serde(rename = "HWP")]
    Hwp,
}

impl DocumentFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hwp => "HWP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextFormat {
    #[serde(rename = "TEXT")]
    Text,
}

impl TextFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
        }
    }
}

/// Explicit destination for a save-as call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAsTarget {
    pub path: String,
    pub format: DocumentFormat,
}

impl SaveAsTarget {
    pub fn native(path: impl Into<String>) -> Self {
        Self { path: path.into(), format: DocumentFormat::Hwp }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandArg {
    Int(i64),
    Str(String),
}

/// A macro command with positional arguments, e.g. `CharShape "Batang" 1000 1 0 ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    args: Vec<CommandArg>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), args: Vec::new() }
    }

    pub fn str_arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(CommandArg::Str(value.into()));
        self
    }

    pub fn int_arg(mut self, value: i64) -> Self {
        self.args.push(CommandArg::Int(value));
        self
    }

    pub fn flag_arg(self, value: bool) -> Self {
        self.int_arg(i64::from(value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[CommandArg] {
        &self.args
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for arg in &self.args {
            match arg {
                CommandArg::Int(value) => write!(f, " {value}")?,
                CommandArg::Str(value) => write!(f, " \"{}\"", value.replace('"', "\\\""))?,
            }
        }
        Ok(())
    }
}

/// A live handle to the word processor.
///
/// Calls are blocking and may wait on the application indefinitely (an interactive save
/// prompt, for example). Boolean results mirror what the application reports for the call.
pub trait Automation: Send {
    fn capabilities(&self) -> Capabilities;

    fn set_window_visible(&mut self, visible: bool) -> Result<(), AutomationError>;

    fn new_document(&mut self) -> Result<bool, AutomationError>;

    fn open(&mut self, path: &str) -> Result<bool, AutomationError>;

    fn save(&mut self) -> Result<bool, AutomationError>;

    /// `None` asks the application to prompt the user for a destination.
    fn save_as(&mut self, target: Option<&SaveAsTarget>) -> Result<bool, AutomationError>;

    fn run(&mut self, command: &Command) -> Result<bool, AutomationError>;

    /// Stage `params` on `action` and execute it.
    fn execute(&mut self, action: &str, params: &ParameterSet) -> Result<bool, AutomationError>;

    fn export_text(&mut self, format: TextFormat) -> Result<String, AutomationError>;
}

/// Creates fresh automation handles.
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn Automation>, AutomationError>;

    fn describe(&self) -> String;
}

/// Connector used when no backend has been configured; every connect attempt fails.
#[derive(Debug, Clone, Default)]
pub struct Unconfigured;

impl Connector for Unconfigured {
    fn connect(&self) -> Result<Box<dyn Automation>, AutomationError> {
        Err(AutomationError::Unavailable(
            "no automation backend configured (use --bridge or --demo)".to_owned(),
        ))
    }

    fn describe(&self) -> String {
        "unconfigured".to_owned()
    }
}
