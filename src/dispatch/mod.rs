// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tool dispatcher.
//!
//! One method per tool. Each validates its required parameters, lazily creates and connects
//! the session controller, invokes the controller and turns the outcome into the reply text
//! sent back to the caller. Replies are always plain strings; nothing here returns an error.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::automation::Connector;
use crate::session::{
    ControlError, ControlResult, ErrorKind, FontSpec, Orientation, PageSetup, SaveOutcome,
    SessionController,
};

pub const DEFAULT_TEMP_DOCUMENT: &str = "temp_document.hwp";
pub const DEFAULT_FONT_NAME: &str = "함초롬바탕";
pub const DEFAULT_FONT_SIZE: f64 = 10.0;
/// Page margin in HWP units used for any margin the caller leaves out.
pub const DEFAULT_PAGE_MARGIN: i64 = 1000;

pub const CONNECTION_FAILED: &str = "Error: Failed to connect to HWP program";
pub const ALREADY_CLOSED: &str = "HWP is already closed";
pub const CLOSED: &str = "HWP connection closed successfully";

#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherOptions {
    /// Window visibility applied when the session connects.
    pub visible: bool,
    /// Destination of `save` calls that do not name a path.
    pub temp_save_path: PathBuf,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        let temp_save_path = std::env::current_dir()
            .map(|dir| dir.join(DEFAULT_TEMP_DOCUMENT))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TEMP_DOCUMENT));
        Self { visible: true, temp_save_path }
    }
}

fn required(param: &str) -> String {
    format!("Error: {param} is required")
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |value| value.trim().is_empty())
}

fn failure_reply(failure: &str, err: &ControlError) -> String {
    match err.kind {
        ErrorKind::Connection | ErrorKind::Unknown => format!("Error: {}", err.message),
        ErrorKind::Precondition | ErrorKind::Automation => failure.to_owned(),
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse a JSON 2-D array (`[["a","b"],["c","d"]]`) into cell strings.
pub fn parse_table_data(data: &str) -> Result<Vec<Vec<String>>, serde_json::Error> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(data)?;
    Ok(rows.into_iter().map(|row| row.into_iter().map(cell_text).collect()).collect())
}

pub struct Dispatcher {
    connector: Arc<dyn Connector>,
    options: DispatcherOptions,
    controller: Option<SessionController>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("connector", &self.connector.describe())
            .field("options", &self.options)
            .field("controller", &self.controller)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(connector: Arc<dyn Connector>, options: DispatcherOptions) -> Self {
        Self { connector, options, controller: None }
    }

    /// The session controller, if one has been created.
    pub fn session(&self) -> Option<&SessionController> {
        self.controller.as_ref()
    }

    pub fn options(&self) -> &DispatcherOptions {
        &self.options
    }

    fn acquire(&mut self) -> Option<&mut SessionController> {
        if self.controller.is_none() {
            info!("creating session controller ({})", self.connector.describe());
            let mut controller = SessionController::new(Arc::clone(&self.connector));
            if let Err(err) = controller.connect(self.options.visible) {
                error!("failed to connect to HWP: {err}");
                return None;
            }
            info!("connected to HWP");
            self.controller = Some(controller);
        }
        self.controller.as_mut()
    }

    fn with_session<T>(
        &mut self,
        tool: &str,
        failure: &str,
        operation: impl FnOnce(&mut SessionController) -> ControlResult<T>,
        reply: impl FnOnce(T) -> String,
    ) -> String {
        let Some(controller) = self.acquire() else {
            return CONNECTION_FAILED.to_owned();
        };
        match operation(controller) {
            Ok(value) => {
                let text = reply(value);
                info!("{tool} succeeded");
                text
            }
            Err(err) => {
                warn!("{tool} failed: {err}");
                failure_reply(failure, &err)
            }
        }
    }

    pub fn create(&mut self) -> String {
        info!("create called");
        self.with_session(
            "create",
            "Error: Failed to create new document",
            SessionController::create_new_document,
            |()| "New document created successfully".to_owned(),
        )
    }

    pub fn open(&mut self, path: Option<&str>) -> String {
        info!("open called (path: {path:?})");
        let Some(path) = path.filter(|path| !path.trim().is_empty()) else {
            return required("path");
        };
        self.with_session(
            "open",
            "Error: Failed to open document",
            |session| session.open_document(path),
            |()| format!("Document opened: {path}"),
        )
    }

    /// Save to `path`, or to the configured temporary path when none is given.
    pub fn save(&mut self, path: Option<&str>) -> String {
        info!("save called (path: {path:?})");
        let defaulted = is_blank(path);
        let target = match path {
            Some(path) if !defaulted => path.to_owned(),
            _ => self.options.temp_save_path.display().to_string(),
        };
        self.with_session(
            "save",
            "Error: Failed to save document",
            |session| session.save_document(Some(&target)),
            |outcome| match outcome {
                SaveOutcome::SavedAs(path) if defaulted => {
                    format!("Document saved to temporary location: {path}")
                }
                SaveOutcome::SavedAs(path) | SaveOutcome::Saved(path) => {
                    format!("Document saved to: {path}")
                }
                SaveOutcome::Prompted => "Document saved".to_owned(),
            },
        )
    }

    pub fn insert_text(&mut self, text: Option<&str>) -> String {
        info!("insert_text called");
        let Some(text) = text.filter(|text| !text.is_empty()) else {
            return required("text");
        };
        self.with_session(
            "insert_text",
            "Error: Failed to insert text",
            |session| session.insert_text(text),
            |()| "Text inserted successfully".to_owned(),
        )
    }

    /// Missing values fall back to the application's default body font.
    pub fn set_font(
        &mut self,
        name: Option<&str>,
        size: Option<f64>,
        bold: Option<bool>,
        italic: Option<bool>,
    ) -> String {
        info!(
            "set_font called (name: {name:?}, size: {size:?}, bold: {bold:?}, italic: {italic:?})"
        );
        let font = FontSpec {
            name: name.filter(|name| !name.trim().is_empty()).unwrap_or(DEFAULT_FONT_NAME),
            size: size.unwrap_or(DEFAULT_FONT_SIZE),
            bold: bold.unwrap_or(false),
            italic: italic.unwrap_or(false),
        };
        self.with_session(
            "set_font",
            "Error: Failed to set font",
            |session| session.set_font(&font),
            |()| format!("Font set successfully: {} {}pt", font.name, font.size),
        )
    }

    pub fn insert_table(&mut self, rows: Option<i64>, cols: Option<i64>) -> String {
        info!("insert_table called (rows: {rows:?}, cols: {cols:?})");
        let Some(rows) = rows else {
            return required("rows");
        };
        let Some(cols) = cols else {
            return required("cols");
        };
        self.with_session(
            "insert_table",
            "Error: Failed to insert table",
            |session| session.insert_table(rows, cols),
            |()| format!("Table inserted: {rows}x{cols}"),
        )
    }

    pub fn insert_table_with_data(
        &mut self,
        rows: Option<i64>,
        cols: Option<i64>,
        data: Option<&str>,
        has_header: Option<bool>,
    ) -> String {
        info!("insert_table_with_data called (rows: {rows:?}, cols: {cols:?})");
        let Some(rows) = rows else {
            return required("rows");
        };
        let Some(cols) = cols else {
            return required("cols");
        };
        let cells = match data.filter(|data| !data.trim().is_empty()) {
            Some(data) => match parse_table_data(data) {
                Ok(cells) => cells,
                Err(err) => {
                    warn!("insert_table_with_data: invalid data: {err}");
                    return format!("Error: data must be a JSON array of rows: {err}");
                }
            },
            None => Vec::new(),
        };
        let has_header = has_header.unwrap_or(false);
        self.with_session(
            "insert_table_with_data",
            "Error: Failed to insert table with data",
            |session| session.insert_table_with_data(rows, cols, &cells, has_header),
            |()| format!("Table inserted with data: {rows}x{cols}"),
        )
    }

    pub fn table_set_cell_text(
        &mut self,
        row: Option<i64>,
        col: Option<i64>,
        text: Option<&str>,
    ) -> String {
        info!("table_set_cell_text called (row: {row:?}, col: {col:?})");
        let Some(row) = row else {
            return required("row");
        };
        let Some(col) = col else {
            return required("col");
        };
        let Some(text) = text else {
            return required("text");
        };
        self.with_session(
            "table_set_cell_text",
            "Error: Failed to set cell text",
            |session| session.set_table_cell_text(row, col, text),
            |()| format!("Cell ({row}, {col}) text set"),
        )
    }

    pub fn table_merge_cells(
        &mut self,
        start_row: Option<i64>,
        start_col: Option<i64>,
        end_row: Option<i64>,
        end_col: Option<i64>,
    ) -> String {
        info!(
            "table_merge_cells called ({start_row:?}, {start_col:?}) - ({end_row:?}, {end_col:?})"
        );
        let Some(start_row) = start_row else {
            return required("start_row");
        };
        let Some(start_col) = start_col else {
            return required("start_col");
        };
        let Some(end_row) = end_row else {
            return required("end_row");
        };
        let Some(end_col) = end_col else {
            return required("end_col");
        };
        self.with_session(
            "table_merge_cells",
            "Error: Failed to merge cells",
            |session| session.merge_table_cells((start_row, start_col), (end_row, end_col)),
            |()| format!("Cells merged: ({start_row}, {start_col}) - ({end_row}, {end_col})"),
        )
    }

    /// Missing sizes keep the picture's own size.
    pub fn insert_image(
        &mut self,
        path: Option<&str>,
        width: Option<i64>,
        height: Option<i64>,
    ) -> String {
        info!("insert_image called (path: {path:?}, width: {width:?}, height: {height:?})");
        let Some(path) = path.filter(|path| !path.trim().is_empty()) else {
            return required("path");
        };
        self.with_session(
            "insert_image",
            "Error: Failed to insert image",
            |session| session.insert_image(path, width.unwrap_or(0), height.unwrap_or(0)),
            |()| format!("Image inserted: {path}"),
        )
    }

    /// Orientation defaults to portrait and every margin to [`DEFAULT_PAGE_MARGIN`].
    pub fn set_page_setup(
        &mut self,
        orientation: Option<&str>,
        margin_left: Option<i64>,
        margin_right: Option<i64>,
        margin_top: Option<i64>,
        margin_bottom: Option<i64>,
    ) -> String {
        info!("set_page_setup called (orientation: {orientation:?})");
        let orientation = match orientation.filter(|value| !value.trim().is_empty()) {
            None => Orientation::Portrait,
            Some(value) => match Orientation::parse(value) {
                Some(orientation) => orientation,
                None => return "Error: orientation must be portrait or landscape".to_owned(),
            },
        };
        let page = PageSetup {
            orientation,
            margin_left: margin_left.unwrap_or(DEFAULT_PAGE_MARGIN),
            margin_right: margin_right.unwrap_or(DEFAULT_PAGE_MARGIN),
            margin_top: margin_top.unwrap_or(DEFAULT_PAGE_MARGIN),
            margin_bottom: margin_bottom.unwrap_or(DEFAULT_PAGE_MARGIN),
        };
        self.with_session(
            "set_page_setup",
            "Error: Failed to set page setup",
            |session| session.set_page_setup(&page),
            |()| {
                format!(
                    "Page setup applied: {}, margins {}/{}/{}/{} (left/right/top/bottom)",
                    page.orientation,
                    page.margin_left,
                    page.margin_right,
                    page.margin_top,
                    page.margin_bottom
                )
            },
        )
    }

    pub fn insert_paragraph(&mut self) -> String {
        info!("insert_paragraph called");
        self.with_session(
            "insert_paragraph",
            "Error: Failed to insert paragraph",
            SessionController::insert_paragraph,
            |()| "Paragraph inserted successfully".to_owned(),
        )
    }

    pub fn get_text(&mut self) -> String {
        info!("get_text called");
        self.with_session(
            "get_text",
            "Error: Failed to get document text",
            SessionController::get_text,
            |text| text,
        )
    }

    pub fn find_text(&mut self, text: Option<&str>) -> String {
        info!("find_text called");
        let Some(text) = text.filter(|text| !text.is_empty()) else {
            return required("text");
        };
        self.with_session(
            "find_text",
            "Error: Failed to search document",
            |session| session.find_text(text),
            |found| {
                if found {
                    format!("Found: {text}")
                } else {
                    format!("Not found: {text}")
                }
            },
        )
    }

    pub fn replace_text(&mut self, find: Option<&str>, replace: Option<&str>) -> String {
        info!("replace_text called");
        let Some(find) = find.filter(|find| !find.is_empty()) else {
            return required("find");
        };
        let Some(replace) = replace else {
            return required("replace");
        };
        self.with_session(
            "replace_text",
            "Error: Failed to replace text",
            |session| session.replace_text(find, replace),
            |()| format!("Replaced all occurrences of \"{find}\" with \"{replace}\""),
        )
    }

    pub fn undo(&mut self, count: Option<i64>) -> String {
        info!("undo called (count: {count:?})");
        let count = count_arg(count);
        self.with_session(
            "undo",
            "Error: Nothing to undo",
            |session| session.undo(count),
            |applied| step_reply("Undo", applied, count),
        )
    }

    pub fn redo(&mut self, count: Option<i64>) -> String {
        info!("redo called (count: {count:?})");
        let count = count_arg(count);
        self.with_session(
            "redo",
            "Error: Nothing to redo",
            |session| session.redo(count),
            |applied| step_reply("Redo", applied, count),
        )
    }

    /// Disconnect and forget the session. With `save`, the tracked document is saved in
    /// place first; a failed save keeps the session open.
    pub fn close(&mut self, save: Option<bool>) -> String {
        info!("close called (save: {save:?})");
        let Some(controller) = self.controller.as_mut().filter(|c| c.is_running()) else {
            info!("close: no running session");
            return ALREADY_CLOSED.to_owned();
        };

        if save.unwrap_or(false) {
            if controller.current_document_path().is_some() {
                if let Err(err) = controller.save_document(None) {
                    warn!("close: save before close failed: {err}");
                    return failure_reply("Error: Failed to save document before closing", &err);
                }
            } else {
                warn!("close: save requested but no document path is tracked; skipping save");
            }
        }

        match controller.disconnect() {
            Ok(()) => {
                self.controller = None;
                info!("HWP connection closed");
                CLOSED.to_owned()
            }
            Err(err) => {
                warn!("close failed: {err}");
                "Error: Failed to close HWP connection".to_owned()
            }
        }
    }

    /// Health check; never touches the session.
    pub fn ping_pong(&self, message: Option<&str>) -> String {
        let message = message.unwrap_or("핑");
        info!("ping_pong called (message: {message})");
        let response = match message {
            "ping" => "pong".to_owned(),
            "pong" => "ping".to_owned(),
            "핑" => "퐁".to_owned(),
            "퐁" => "핑".to_owned(),
            other => format!("Unknown message: {other} (send ping or pong)"),
        };
        serde_json::json!({
            "response": response,
            "original_message": message,
            "timestamp": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .to_string()
    }

    /// Release the session at process exit.
    pub fn shutdown(&mut self) {
        if let Some(mut controller) = self.controller.take() {
            if controller.is_running() && controller.disconnect().is_ok() {
                info!("released HWP connection at shutdown");
            }
        }
    }
}

/// Missing means 1, negative means 0 (rejected downstream), and anything past `u32::MAX`
/// is clamped to it.
fn count_arg(count: Option<i64>) -> u32 {
    match count {
        None => 1,
        Some(count) if count < 0 => 0,
        Some(count) => u32::try_from(count).unwrap_or(u32::MAX),
    }
}

fn step_reply(label: &str, applied: u32, requested: u32) -> String {
    if applied == requested {
        format!("{label} applied {applied} time(s)")
    } else {
        format!("{label} applied {applied} time(s) (requested {requested})")
    }
}
