// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Session controller: owns the single automation handle and maps document operations onto
//! the application's command surface.
//!
//! Every operation returns a [`ControlResult`]; failures are logged with the operation name
//! and never panic. A failure that indicates the handle is gone (connection/transport loss)
//! also drops the handle, so the next auto-connecting operation starts over with a fresh one.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::automation::{
    Automation, AutomationError, CharShapeParams, Command, Connector, FindReplaceParams,
    InsertPictureParams, InsertTextParams, SaveAsTarget, StagedAction, TableCreationParams,
    TextFormat, MAX_TABLE_COLS, MAX_TABLE_ROWS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The application could not be reached, or the handle died.
    Connection,
    /// Missing session or invalid argument; nothing was sent to the application.
    Precondition,
    /// The application rejected or failed a call.
    Automation,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connection => "connection",
            Self::Precondition => "precondition",
            Self::Automation => "automation",
            Self::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct ControlError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ControlError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    pub fn automation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Automation, message)
    }
}

impl From<AutomationError> for ControlError {
    fn from(err: AutomationError) -> Self {
        let kind = if err.is_connection_loss() {
            ErrorKind::Connection
        } else {
            ErrorKind::Automation
        };
        Self::new(kind, err.to_string())
    }
}

pub type ControlResult<T> = Result<T, ControlError>;

/// Which of the three save paths a save took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Saved to an explicit path in the native format.
    SavedAs(String),
    /// Saved in place to the tracked document path.
    Saved(String),
    /// The application prompted for a destination and the user picked one.
    Prompted,
}

/// Font applied by [`SessionController::set_font`].
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec<'a> {
    pub name: &'a str,
    /// Points.
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Case-insensitive `portrait` or `landscape`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "portrait" => Some(Self::Portrait),
            "landscape" => Some(Self::Landscape),
            _ => None,
        }
    }

    fn code(self) -> i64 {
        match self {
            Self::Portrait => 0,
            Self::Landscape => 1,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        })
    }
}

/// Paper orientation and margins (HWP units) applied by [`SessionController::set_page_setup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    pub orientation: Orientation,
    pub margin_left: i64,
    pub margin_right: i64,
    pub margin_top: i64,
    pub margin_bottom: i64,
}

pub struct SessionController {
    connector: Arc<dyn Connector>,
    connection: Option<Box<dyn Automation>>,
    window_visibility: bool,
    visible: bool,
    current_document_path: Option<String>,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("connector", &self.connector.describe())
            .field("running", &self.is_running())
            .field("window_visibility", &self.window_visibility)
            .field("visible", &self.visible)
            .field("current_document_path", &self.current_document_path)
            .finish()
    }
}

impl SessionController {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            connection: None,
            window_visibility: false,
            visible: true,
            current_document_path: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.connection.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the connected application exposes a window whose visibility we can set.
    pub fn has_window_visibility(&self) -> bool {
        self.window_visibility
    }

    pub fn current_document_path(&self) -> Option<&str> {
        self.current_document_path.as_deref()
    }

    /// Connect and apply the window visibility. Already running is a no-op.
    pub fn connect(&mut self, visible: bool) -> ControlResult<()> {
        self.guarded("connect", |this| {
            if this.is_running() {
                debug!("connect: session already running");
                return Ok(());
            }

            let mut automation = this
                .connector
                .connect()
                .map_err(|err| ControlError::connection(err.to_string()))?;
            let capabilities = automation.capabilities();
            if capabilities.window_visibility {
                automation
                    .set_window_visible(visible)
                    .map_err(|err| ControlError::connection(err.to_string()))?;
            }

            this.connection = Some(automation);
            this.window_visibility = capabilities.window_visibility;
            this.visible = visible;
            info!("connected to {} (visible: {visible})", this.connector.describe());
            Ok(())
        })
    }

    /// Release the handle. Not running is a no-op.
    pub fn disconnect(&mut self) -> ControlResult<()> {
        if self.connection.take().is_some() {
            info!("released automation handle");
        }
        Ok(())
    }

    pub fn create_new_document(&mut self) -> ControlResult<()> {
        self.guarded("create_new_document", |this| {
            this.ensure_connected()?;
            this.current_document_path = None;
            let accepted = this.automation()?.new_document()?;
            ensure(accepted, "the application refused to create a new document")
        })
    }

    pub fn open_document(&mut self, path: &str) -> ControlResult<()> {
        self.guarded("open_document", |this| {
            if path.trim().is_empty() {
                return Err(ControlError::precondition("path must not be empty"));
            }
            this.ensure_connected()?;
            let accepted = this.automation()?.open(path)?;
            ensure(accepted, format!("the application could not open {path}"))?;
            this.current_document_path = Some(path.to_owned());
            Ok(())
        })
    }

    /// Save to `path`, else in place to the tracked path, else through the application's
    /// destination prompt (which blocks until the user answers it).
    pub fn save_document(&mut self, path: Option<&str>) -> ControlResult<SaveOutcome> {
        self.guarded("save_document", |this| {
            let path = path.filter(|path| !path.trim().is_empty());
            let tracked = this.current_document_path.clone();
            let hwp = this.automation()?;

            if let Some(path) = path {
                let accepted = hwp.save_as(Some(&SaveAsTarget::native(path)))?;
                ensure(accepted, format!("the application could not save to {path}"))?;
                this.current_document_path = Some(path.to_owned());
                return Ok(SaveOutcome::SavedAs(path.to_owned()));
            }

            if let Some(tracked) = tracked {
                let accepted = hwp.save()?;
                ensure(accepted, format!("the application could not save {tracked}"))?;
                return Ok(SaveOutcome::Saved(tracked));
            }

            let accepted = hwp.save_as(None)?;
            ensure(accepted, "the save prompt was cancelled")?;
            Ok(SaveOutcome::Prompted)
        })
    }

    /// Insert `text` at the cursor.
    pub fn insert_text(&mut self, text: &str) -> ControlResult<()> {
        self.guarded("insert_text", |this| stage(this.automation()?, &InsertTextParams { text }))
    }

    /// Select the whole document and apply one composite character shape to it.
    pub fn set_font(&mut self, font: &FontSpec<'_>) -> ControlResult<()> {
        self.guarded("set_font", |this| {
            let hwp = this.automation()?;
            if font.name.trim().is_empty() {
                return Err(ControlError::precondition("font name must not be empty"));
            }
            if !font.size.is_finite() || font.size <= 0.0 {
                return Err(ControlError::precondition(format!(
                    "font size must be positive, got {}",
                    font.size
                )));
            }

            run(hwp, &Command::new("SelectAll"))?;
            run(hwp, &char_shape_command(font))
        })
    }

    pub fn insert_table(&mut self, rows: i64, cols: i64) -> ControlResult<()> {
        self.guarded("insert_table", |this| {
            let table = table_params(rows, cols)?;
            stage(this.automation()?, &table)
        })
    }

    /// Insert a table, then fill it row-major from `data` (extra rows/cells are dropped). With
    /// `has_header` the first row is made bold. A failure while filling leaves the table and
    /// whatever was already written in place.
    pub fn insert_table_with_data(
        &mut self,
        rows: i64,
        cols: i64,
        data: &[Vec<String>],
        has_header: bool,
    ) -> ControlResult<()> {
        self.guarded("insert_table_with_data", |this| {
            let table = table_params(rows, cols)?;
            let hwp = this.automation()?;
            stage(hwp, &table)?;

            let rows = table.rows as usize;
            let cols = table.cols as usize;
            let data = &data[..data.len().min(rows)];
            let last_index = data
                .iter()
                .enumerate()
                .filter(|(_, row)| !row.is_empty())
                .map(|(r, row)| r * cols + row.len().min(cols) - 1)
                .max();
            let Some(last_index) = last_index else {
                return Ok(());
            };

            for index in 0..=last_index {
                let (r, c) = (index / cols, index % cols);
                if index > 0 {
                    run(hwp, &Command::new("TableRightCell"))?;
                }
                let Some(value) = data.get(r).and_then(|row| row.get(c)) else {
                    continue;
                };
                if !value.is_empty() {
                    stage(hwp, &InsertTextParams { text: value })?;
                }
                if has_header && r == 0 {
                    run(hwp, &Command::new("TableCellBlock"))?;
                    stage(hwp, &CharShapeParams { bold: true })?;
                    run(hwp, &Command::new("Cancel"))?;
                }
            }
            Ok(())
        })
    }

    /// Replace the text of a cell in the table under the cursor. `row`/`col` are 1-based.
    pub fn set_table_cell_text(&mut self, row: i64, col: i64, text: &str) -> ControlResult<()> {
        self.guarded("set_table_cell_text", |this| {
            let hwp = this.automation()?;
            if row < 1 || col < 1 {
                return Err(ControlError::precondition(format!(
                    "cell ({row}, {col}) is invalid; rows and columns start at 1"
                )));
            }

            goto_cell(hwp, row, col)?;
            run(hwp, &Command::new("SelectAll"))?;
            run(hwp, &Command::new("Delete"))?;
            if text.is_empty() {
                return Ok(());
            }
            stage(hwp, &InsertTextParams { text })
        })
    }

    /// Merge the rectangle of cells from `start` to `end` (inclusive, 1-based `(row, col)`)
    /// in the table under the cursor. The cursor ends up in the merged cell.
    pub fn merge_table_cells(&mut self, start: (i64, i64), end: (i64, i64)) -> ControlResult<()> {
        self.guarded("merge_table_cells", |this| {
            let hwp = this.automation()?;
            let ((start_row, start_col), (end_row, end_col)) = (start, end);
            if start_row < 1 || start_col < 1 {
                return Err(ControlError::precondition(format!(
                    "cell ({start_row}, {start_col}) is invalid; rows and columns start at 1"
                )));
            }
            if end_row < start_row || end_col < start_col {
                return Err(ControlError::precondition(format!(
                    "end cell ({end_row}, {end_col}) lies before start cell \
                     ({start_row}, {start_col})"
                )));
            }
            if start == end {
                return Err(ControlError::precondition("merging needs at least two cells"));
            }

            goto_cell(hwp, start_row, start_col)?;
            run(hwp, &Command::new("TableCellBlock"))?;
            for _ in start_row..end_row {
                let moved = hwp.run(&Command::new("TableLowerCell"))?;
                ensure(moved, format!("row {end_row} is outside the table"))?;
                run(hwp, &Command::new("TableCellBlockExtend"))?;
            }
            for _ in start_col..end_col {
                let moved = hwp.run(&Command::new("TableRightCell"))?;
                ensure(moved, format!("column {end_col} is outside the table"))?;
                run(hwp, &Command::new("TableCellBlockExtend"))?;
            }
            run(hwp, &Command::new("TableMergeCell"))
        })
    }

    /// Insert the picture at `path`, embedded in the document. Zero `width`/`height` keeps
    /// the picture's own size.
    pub fn insert_image(&mut self, path: &str, width: i64, height: i64) -> ControlResult<()> {
        self.guarded("insert_image", |this| {
            let hwp = this.automation()?;
            if path.trim().is_empty() {
                return Err(ControlError::precondition("image path must not be empty"));
            }
            if width < 0 || height < 0 {
                return Err(ControlError::precondition(format!(
                    "image size must not be negative, got {width}x{height}"
                )));
            }
            stage(hwp, &InsertPictureParams { path, width, height })
        })
    }

    pub fn set_page_setup(&mut self, page: &PageSetup) -> ControlResult<()> {
        self.guarded("set_page_setup", |this| {
            let hwp = this.automation()?;
            let margins =
                [page.margin_left, page.margin_right, page.margin_top, page.margin_bottom];
            if margins.iter().any(|margin| *margin < 0) {
                return Err(ControlError::precondition("page margins must not be negative"));
            }
            run(hwp, &page_setup_command(page))
        })
    }

    pub fn insert_paragraph(&mut self) -> ControlResult<()> {
        self.guarded("insert_paragraph", |this| run(this.automation()?, &Command::new("BreakPara")))
    }

    /// Plain-text export of the whole document.
    pub fn get_text(&mut self) -> ControlResult<String> {
        self.guarded("get_text", |this| Ok(this.automation()?.export_text(TextFormat::Text)?))
    }

    /// Search forward from the beginning of the document.
    pub fn find_text(&mut self, text: &str) -> ControlResult<bool> {
        self.guarded("find_text", |this| {
            let hwp = this.automation()?;
            if text.is_empty() {
                return Err(ControlError::precondition("search text must not be empty"));
            }
            run(hwp, &Command::new("MoveDocBegin"))?;
            let params = FindReplaceParams { find: text, replace: None };
            Ok(hwp.execute(FindReplaceParams::FIND, &params.parameters())?)
        })
    }

    /// Replace every occurrence of `find`. Success means the application did not fail the
    /// call; it does not say whether anything matched.
    pub fn replace_text(&mut self, find: &str, replace: &str) -> ControlResult<()> {
        self.guarded("replace_text", |this| {
            let hwp = this.automation()?;
            if find.is_empty() {
                return Err(ControlError::precondition("search text must not be empty"));
            }
            run(hwp, &Command::new("MoveDocBegin"))?;
            let params = FindReplaceParams { find, replace: Some(replace) };
            // AllReplace reports false even when it replaced text.
            hwp.execute(FindReplaceParams::REPLACE_ALL, &params.parameters())?;
            Ok(())
        })
    }

    /// Undo up to `count` steps; returns how many were undone.
    pub fn undo(&mut self, count: u32) -> ControlResult<u32> {
        self.guarded("undo", |this| repeat(this.automation()?, "Undo", count))
    }

    /// Redo up to `count` steps; returns how many were redone.
    pub fn redo(&mut self, count: u32) -> ControlResult<u32> {
        self.guarded("redo", |this| repeat(this.automation()?, "Redo", count))
    }

    fn ensure_connected(&mut self) -> ControlResult<()> {
        if self.is_running() {
            return Ok(());
        }
        let visible = self.visible;
        self.connect(visible)
    }

    fn automation(&mut self) -> ControlResult<&mut Box<dyn Automation>> {
        self.connection
            .as_mut()
            .ok_or_else(|| ControlError::precondition("no running session"))
    }

    fn guarded<T>(
        &mut self,
        operation: &'static str,
        body: impl FnOnce(&mut Self) -> ControlResult<T>,
    ) -> ControlResult<T> {
        let result = body(self);
        if let Err(err) = &result {
            warn!("{operation} failed: {err}");
            if err.kind == ErrorKind::Connection && self.connection.take().is_some() {
                warn!("{operation}: dropped automation handle after connection loss");
            }
        }
        result
    }
}

fn ensure(accepted: bool, message: impl Into<String>) -> ControlResult<()> {
    if accepted {
        Ok(())
    } else {
        Err(ControlError::automation(message))
    }
}

fn run(hwp: &mut Box<dyn Automation>, command: &Command) -> ControlResult<()> {
    let accepted = hwp.run(command)?;
    ensure(accepted, format!("`{}` was not accepted", command.name()))
}

fn stage<A: StagedAction>(hwp: &mut Box<dyn Automation>, action: &A) -> ControlResult<()> {
    let accepted = hwp.execute(A::ACTION, &action.parameters())?;
    ensure(accepted, format!("`{}` was not accepted", A::ACTION))
}

/// Move the cursor to the 1-based cell of the table it is in.
fn goto_cell(hwp: &mut Box<dyn Automation>, row: i64, col: i64) -> ControlResult<()> {
    let in_table = hwp.run(&Command::new("TableCellBlock"))?;
    ensure(in_table, "the cursor is not inside a table")?;
    run(hwp, &Command::new("Cancel"))?;
    run(hwp, &Command::new("TableColBegin"))?;
    run(hwp, &Command::new("TableColPageUp"))?;
    for _ in 1..row {
        let moved = hwp.run(&Command::new("TableLowerCell"))?;
        ensure(moved, format!("row {row} is outside the table"))?;
    }
    for _ in 1..col {
        let moved = hwp.run(&Command::new("TableRightCell"))?;
        ensure(moved, format!("column {col} is outside the table"))?;
    }
    Ok(())
}

fn repeat(hwp: &mut Box<dyn Automation>, name: &str, count: u32) -> ControlResult<u32> {
    if count == 0 {
        return Err(ControlError::precondition("count must be at least 1"));
    }
    let command = Command::new(name);
    let mut applied = 0;
    while applied < count && hwp.run(&command)? {
        applied += 1;
    }
    if applied == 0 {
        return Err(ControlError::automation(format!("nothing to {}", name.to_lowercase())));
    }
    Ok(applied)
}

fn table_params(rows: i64, cols: i64) -> ControlResult<TableCreationParams> {
    let bounded = |value: i64, max: u32| {
        u32::try_from(value).ok().filter(|value| (1..=max).contains(value))
    };
    match (bounded(rows, MAX_TABLE_ROWS), bounded(cols, MAX_TABLE_COLS)) {
        (Some(rows), Some(cols)) => Ok(TableCreationParams { rows, cols }),
        _ => Err(ControlError::precondition(format!(
            "a table needs 1..={MAX_TABLE_ROWS} rows and 1..={MAX_TABLE_COLS} columns, \
             got {rows}x{cols}"
        ))),
    }
}

/// `CharShape "<font>" <size*100> <bold> <italic> 0 0 "" 0 "" 0`; the trailing slots
/// (underline, strikeout, colors, ...) are always off.
fn char_shape_command(font: &FontSpec<'_>) -> Command {
    let size = (font.size * 100.0).round() as i64;
    Command::new("CharShape")
        .str_arg(font.name)
        .int_arg(size)
        .flag_arg(font.bold)
        .flag_arg(font.italic)
        .int_arg(0)
        .int_arg(0)
        .str_arg("")
        .int_arg(0)
        .str_arg("")
        .int_arg(0)
}

/// `PageSetup3 <orientation> <left> <right> <top> <bottom>`.
fn page_setup_command(page: &PageSetup) -> Command {
    Command::new("PageSetup3")
        .int_arg(page.orientation.code())
        .int_arg(page.margin_left)
        .int_arg(page.margin_right)
        .int_arg(page.margin_top)
        .int_arg(page.margin_bottom)
}
