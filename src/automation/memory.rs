// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-process stand-in for the word processor.
//!
//! Backs `--demo` mode and the test suites. It keeps a small document model (paragraphs and
//! tables with a cursor), a set of "files on disk", and a journal of every call made through
//! any handle. The document outlives individual handles, the same way the real application
//! keeps running after a client lets go of it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    Automation, AutomationError, Capabilities, Command, Connector, ParameterSet, SaveAsTarget,
    TextFormat, MAX_TABLE_COLS, MAX_TABLE_ROWS,
};

/// One recorded call against the automation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetWindowVisible(bool),
    NewDocument,
    Open(String),
    Save,
    SaveAs(Option<SaveAsTarget>),
    Run(Command),
    Execute { action: String, params: ParameterSet },
    ExportText(TextFormat),
}

impl Call {
    /// Name used for failure injection: the command or action name for `Run`/`Execute`,
    /// otherwise the variant name.
    pub fn label(&self) -> &str {
        match self {
            Self::SetWindowVisible(_) => "SetWindowVisible",
            Self::NewDocument => "NewDocument",
            Self::Open(_) => "Open",
            Self::Save => "Save",
            Self::SaveAs(_) => "SaveAs",
            Self::Run(command) => command.name(),
            Self::Execute { action, .. } => action,
            Self::ExportText(_) => "ExportText",
        }
    }
}

/// Character shape last applied through the composite `CharShape` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharShape {
    pub font: String,
    /// Hundredths of a point.
    pub size: i64,
    pub bold: bool,
    pub italic: bool,
}

/// Orientation and margins last applied through `PageSetup3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub landscape: bool,
    pub margin_left: i64,
    pub margin_right: i64,
    pub margin_top: i64,
    pub margin_bottom: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub path: String,
    pub width: i64,
    pub height: i64,
}

/// Inclusive `(top, left, bottom, right)` cell rectangle, 0-based.
pub type CellSpan = (usize, usize, usize, usize);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    cols: usize,
    cells: Vec<Vec<String>>,
    bold: BTreeSet<(usize, usize)>,
    merged: Vec<CellSpan>,
}

impl Table {
    fn merge(&mut self, span: CellSpan) -> bool {
        let (top, left, bottom, right) = span;
        let overlaps = self.merged.iter().any(|&(t, l, b, r)| {
            top <= b && t <= bottom && left <= r && l <= right
        });
        if overlaps || (top, left) == (bottom, right) {
            return false;
        }

        let mut parts = Vec::new();
        for row in &mut self.cells[top..=bottom] {
            for cell in &mut row[left..=right] {
                if !cell.is_empty() {
                    parts.push(std::mem::take(cell));
                }
            }
        }
        self.cells[top][left] = parts.join("\n");
        self.merged.push(span);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Paragraph(String),
    Table(Table),
    Picture(Picture),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Cursor {
    #[default]
    Body,
    Cell {
        block: usize,
        row: usize,
        col: usize,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Selection {
    #[default]
    None,
    All,
    /// Table cell block anchored at `(row, col)` and reaching to the cursor cell.
    CellBlock { row: usize, col: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Document {
    blocks: Vec<Block>,
    cursor: Cursor,
    selection: Selection,
    path: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            blocks: vec![Block::Paragraph(String::new())],
            cursor: Cursor::Body,
            selection: Selection::None,
            path: None,
        }
    }
}

impl Document {
    fn from_text(text: &str) -> Self {
        let blocks = text.split('\n').map(|line| Block::Paragraph(line.to_owned())).collect();
        Self { blocks, ..Self::default() }
    }

    fn text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(text) => lines.push(text.clone()),
                Block::Table(table) => {
                    lines.extend(table.cells.iter().map(|row| row.join("\t")));
                }
                Block::Picture(_) => {}
            }
        }
        lines.join("\n")
    }

    fn last_paragraph(&mut self) -> &mut String {
        if !matches!(self.blocks.last(), Some(Block::Paragraph(_))) {
            self.blocks.push(Block::Paragraph(String::new()));
        }
        match self.blocks.last_mut() {
            Some(Block::Paragraph(text)) => text,
            _ => unreachable!("last block is a paragraph"),
        }
    }

    fn cell_mut(&mut self) -> Option<(&mut Table, usize, usize)> {
        let Cursor::Cell { block, row, col } = self.cursor else {
            return None;
        };
        match self.blocks.get_mut(block) {
            Some(Block::Table(table)) => Some((table, row, col)),
            _ => None,
        }
    }

    fn table_dims(&self) -> Option<(usize, usize, usize, usize)> {
        let Cursor::Cell { block, row, col } = self.cursor else {
            return None;
        };
        match self.blocks.get(block) {
            Some(Block::Table(table)) => Some((table.cells.len(), table.cols, row, col)),
            _ => None,
        }
    }

    fn move_to_cell(&mut self, row: usize, col: usize) {
        if let Cursor::Cell { block, .. } = self.cursor {
            self.cursor = Cursor::Cell { block, row, col };
        }
    }

    fn insert_text(&mut self, text: &str) {
        self.selection = Selection::None;
        if let Some((table, row, col)) = self.cell_mut() {
            table.cells[row][col].push_str(text);
            return;
        }
        let normalized = text.replace("\r\n", "\n");
        let mut parts = normalized.split('\n');
        if let Some(first) = parts.next() {
            self.last_paragraph().push_str(first);
        }
        for part in parts {
            self.blocks.push(Block::Paragraph(part.to_owned()));
        }
    }

    fn break_paragraph(&mut self) {
        self.selection = Selection::None;
        if let Some((table, row, col)) = self.cell_mut() {
            table.cells[row][col].push('\n');
            return;
        }
        self.blocks.push(Block::Paragraph(String::new()));
    }

    fn create_table(&mut self, rows: usize, cols: usize) {
        self.selection = Selection::None;
        self.cursor = Cursor::Body;
        if matches!(self.blocks.last(), Some(Block::Paragraph(text)) if text.is_empty()) {
            self.blocks.pop();
        }
        let block = self.blocks.len();
        self.blocks.push(Block::Table(Table {
            cols,
            cells: vec![vec![String::new(); cols]; rows],
            bold: BTreeSet::new(),
            merged: Vec::new(),
        }));
        self.blocks.push(Block::Paragraph(String::new()));
        self.cursor = Cursor::Cell { block, row: 0, col: 0 };
    }

    /// Pictures are placed as their own block in the body, like tables.
    fn insert_picture(&mut self, picture: Picture) {
        self.selection = Selection::None;
        self.cursor = Cursor::Body;
        if matches!(self.blocks.last(), Some(Block::Paragraph(text)) if text.is_empty()) {
            self.blocks.pop();
        }
        self.blocks.push(Block::Picture(picture));
        self.blocks.push(Block::Paragraph(String::new()));
    }

    /// Merge the cell block under the selection into its top-left cell.
    fn merge_cell_block(&mut self) -> bool {
        let Selection::CellBlock { row: anchor_row, col: anchor_col } = self.selection else {
            return false;
        };
        let Cursor::Cell { block, row, col } = self.cursor else {
            return false;
        };
        let Some(Block::Table(table)) = self.blocks.get_mut(block) else {
            return false;
        };
        let (top, bottom) = (anchor_row.min(row), anchor_row.max(row));
        let (left, right) = (anchor_col.min(col), anchor_col.max(col));
        if !table.merge((top, left, bottom, right)) {
            return false;
        }
        self.selection = Selection::None;
        self.cursor = Cursor::Cell { block, row: top, col: left };
        true
    }

    fn delete_selection(&mut self) {
        if self.selection != Selection::All {
            return;
        }
        self.selection = Selection::None;
        if let Some((table, row, col)) = self.cell_mut() {
            table.cells[row][col].clear();
            return;
        }
        self.blocks = vec![Block::Paragraph(String::new())];
        self.cursor = Cursor::Body;
    }

    fn contains(&self, needle: &str) -> bool {
        !needle.is_empty() && self.text().contains(needle)
    }

    fn replace_all(&mut self, find: &str, replace: &str) {
        if find.is_empty() {
            return;
        }
        for block in &mut self.blocks {
            match block {
                Block::Paragraph(text) => *text = text.replace(find, replace),
                Block::Table(table) => {
                    for cell in table.cells.iter_mut().flatten() {
                        *cell = cell.replace(find, replace);
                    }
                }
                Block::Picture(_) => {}
            }
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    journal: Vec<Call>,
    connects: usize,
    document: Document,
    char_shape: Option<CharShape>,
    page_layout: Option<PageLayout>,
    files: BTreeMap<String, Document>,
    pictures: BTreeSet<String>,
    undo: Vec<Document>,
    redo: Vec<Document>,
    failures: BTreeMap<String, AutomationError>,
    connect_failure: Option<AutomationError>,
    save_prompt_answer: Option<String>,
}

impl MemoryState {
    fn record(&mut self, call: Call) -> Result<(), AutomationError> {
        let failure = self.failures.get(call.label()).cloned();
        self.journal.push(call);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn checkpoint(&mut self) {
        self.undo.push(self.document.clone());
        self.redo.clear();
    }

    fn run(&mut self, command: &Command) -> bool {
        let doc = &mut self.document;
        match command.name() {
            "SelectAll" => {
                doc.selection = Selection::All;
                true
            }
            "Cancel" => {
                doc.selection = Selection::None;
                true
            }
            "Delete" => {
                self.checkpoint();
                self.document.delete_selection();
                true
            }
            "BreakPara" => {
                self.checkpoint();
                self.document.break_paragraph();
                true
            }
            "MoveDocBegin" => {
                doc.cursor = Cursor::Body;
                doc.selection = Selection::None;
                true
            }
            "CharShape" => match parse_char_shape(command) {
                Some(shape) => {
                    self.checkpoint();
                    self.char_shape = Some(shape);
                    true
                }
                None => false,
            },
            "TableCellBlock" => match doc.table_dims() {
                Some((_, _, row, col)) => {
                    doc.selection = Selection::CellBlock { row, col };
                    true
                }
                None => false,
            },
            "TableCellBlockExtend" => matches!(doc.selection, Selection::CellBlock { .. }),
            "TableMergeCell" => {
                let snapshot = doc.clone();
                if self.document.merge_cell_block() {
                    self.undo.push(snapshot);
                    self.redo.clear();
                    true
                } else {
                    false
                }
            }
            "PageSetup3" => match parse_page_setup(command) {
                Some(layout) => {
                    self.page_layout = Some(layout);
                    true
                }
                None => false,
            },
            "TableColBegin" => match doc.table_dims() {
                Some((_, _, row, _)) => {
                    doc.move_to_cell(row, 0);
                    true
                }
                None => false,
            },
            "TableColPageUp" => match doc.table_dims() {
                Some((_, _, _, col)) => {
                    doc.move_to_cell(0, col);
                    true
                }
                None => false,
            },
            "TableRightCell" => match doc.table_dims() {
                Some((rows, cols, row, col)) => {
                    let in_block = matches!(doc.selection, Selection::CellBlock { .. });
                    if col + 1 < cols {
                        doc.move_to_cell(row, col + 1);
                        true
                    } else if row + 1 < rows && !in_block {
                        doc.move_to_cell(row + 1, 0);
                        true
                    } else {
                        false
                    }
                }
                None => false,
            },
            "TableLowerCell" => match doc.table_dims() {
                Some((rows, _, row, col)) if row + 1 < rows => {
                    doc.move_to_cell(row + 1, col);
                    true
                }
                _ => false,
            },
            "Undo" => match self.undo.pop() {
                Some(previous) => {
                    let current = std::mem::replace(&mut self.document, previous);
                    self.redo.push(current);
                    true
                }
                None => false,
            },
            "Redo" => match self.redo.pop() {
                Some(next) => {
                    let current = std::mem::replace(&mut self.document, next);
                    self.undo.push(current);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    fn execute(&mut self, action: &str, params: &ParameterSet) -> Result<bool, AutomationError> {
        match action {
            "InsertText" => {
                let text = params
                    .get_str("Text")
                    .ok_or_else(|| AutomationError::rejected(action, "missing Text"))?;
                self.checkpoint();
                self.document.insert_text(text);
                Ok(true)
            }
            "TableCreate" => {
                let rows = params.get_int("Rows").unwrap_or(0);
                let cols = params.get_int("Cols").unwrap_or(0);
                let widths = params.get_int_array("ColWidth").map(<[i64]>::len).unwrap_or(0);
                let in_range = (1..=i64::from(MAX_TABLE_ROWS)).contains(&rows)
                    && (1..=i64::from(MAX_TABLE_COLS)).contains(&cols);
                if !in_range || widths != cols as usize {
                    return Err(AutomationError::rejected(action, "invalid table dimensions"));
                }
                self.checkpoint();
                self.document.create_table(rows as usize, cols as usize);
                Ok(true)
            }
            "InsertPicture" => {
                let path = params
                    .get_str("FileName")
                    .ok_or_else(|| AutomationError::rejected(action, "missing FileName"))?;
                if !self.pictures.contains(path) {
                    return Ok(false);
                }
                let picture = Picture {
                    path: path.to_owned(),
                    width: params.get_int("Width").unwrap_or(0),
                    height: params.get_int("Height").unwrap_or(0),
                };
                self.checkpoint();
                self.document.insert_picture(picture);
                Ok(true)
            }
            "CharShape" => {
                let bold = params.get_int("Bold").unwrap_or(0) != 0;
                self.checkpoint();
                if let Some((table, row, col)) = self.document.cell_mut() {
                    if bold {
                        table.bold.insert((row, col));
                    } else {
                        table.bold.remove(&(row, col));
                    }
                }
                Ok(true)
            }
            "RepeatFind" => {
                let find = params.get_str("FindString").unwrap_or_default();
                Ok(self.document.contains(find))
            }
            "AllReplace" => {
                let find = params.get_str("FindString").unwrap_or_default().to_owned();
                let replace = params.get_str("ReplaceString").unwrap_or_default().to_owned();
                self.checkpoint();
                self.document.replace_all(&find, &replace);
                // The application reports false for AllReplace even when it replaced text.
                Ok(false)
            }
            _ => Err(AutomationError::rejected(action, "unknown action")),
        }
    }
}

fn parse_char_shape(command: &Command) -> Option<CharShape> {
    use super::CommandArg::{Int, Str};

    match command.args() {
        [Str(font), Int(size), Int(bold), Int(italic), ..] => Some(CharShape {
            font: font.clone(),
            size: *size,
            bold: *bold != 0,
            italic: *italic != 0,
        }),
        _ => None,
    }
}

fn parse_page_setup(command: &Command) -> Option<PageLayout> {
    use super::CommandArg::Int;

    match command.args() {
        [Int(orientation), Int(left), Int(right), Int(top), Int(bottom)] => Some(PageLayout {
            landscape: *orientation != 0,
            margin_left: *left,
            margin_right: *right,
            margin_top: *top,
            margin_bottom: *bottom,
        }),
        _ => None,
    }
}

/// Connector for the in-process editor. Clones share the same application state.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    state: Arc<Mutex<MemoryState>>,
    capabilities: Capabilities,
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            capabilities: Capabilities { window_visibility: true },
        }
    }

    /// Handles created by this connector have no window to show or hide.
    pub fn without_window(mut self) -> Self {
        self.capabilities.window_visibility = false;
        self
    }

    /// Seed a file the application can open. Lines become paragraphs.
    pub fn with_file(self, path: impl Into<String>, text: &str) -> Self {
        self.lock().files.insert(path.into(), Document::from_text(text));
        self
    }

    /// Seed a picture file that `InsertPicture` can find.
    pub fn with_picture(self, path: impl Into<String>) -> Self {
        self.lock().pictures.insert(path.into());
        self
    }

    /// Path the user "picks" when an interactive save prompt appears. Without one the prompt
    /// is cancelled.
    pub fn answer_save_prompt(&self, path: impl Into<String>) {
        self.lock().save_prompt_answer = Some(path.into());
    }

    /// Make every call with this label fail until [`Self::clear_failures`].
    pub fn fail_on(&self, label: impl Into<String>, error: AutomationError) {
        self.lock().failures.insert(label.into(), error);
    }

    pub fn fail_connect(&self, error: AutomationError) {
        self.lock().connect_failure = Some(error);
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.failures.clear();
        state.connect_failure = None;
    }

    pub fn journal(&self) -> Vec<Call> {
        self.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    pub fn connect_count(&self) -> usize {
        self.lock().connects
    }

    pub fn document_text(&self) -> String {
        self.lock().document.text()
    }

    pub fn document_path(&self) -> Option<String> {
        self.lock().document.path.clone()
    }

    pub fn char_shape(&self) -> Option<CharShape> {
        self.lock().char_shape.clone()
    }

    pub fn page_layout(&self) -> Option<PageLayout> {
        self.lock().page_layout
    }

    /// Pictures in the current document, in insertion order.
    pub fn pictures(&self) -> Vec<Picture> {
        self.lock()
            .document
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Picture(picture) => Some(picture.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn saved_file(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(Document::text)
    }

    /// Cells of the `index`-th table in the current document.
    pub fn table_cells(&self, index: usize) -> Option<Vec<Vec<String>>> {
        self.table(index, |table| table.cells.clone())
    }

    /// `(row, col)` pairs of bold cells in the `index`-th table, 0-based.
    pub fn bold_cells(&self, index: usize) -> Option<Vec<(usize, usize)>> {
        self.table(index, |table| table.bold.iter().copied().collect())
    }

    /// Merged regions of the `index`-th table.
    pub fn merged_cells(&self, index: usize) -> Option<Vec<CellSpan>> {
        self.table(index, |table| table.merged.clone())
    }

    fn table<T>(&self, index: usize, f: impl FnOnce(&Table) -> T) -> Option<T> {
        let state = self.lock();
        state
            .document
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Table(table) => Some(table),
                Block::Paragraph(_) | Block::Picture(_) => None,
            })
            .nth(index)
            .map(f)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Connector for MemoryConnector {
    fn connect(&self) -> Result<Box<dyn Automation>, AutomationError> {
        let mut state = self.lock();
        if let Some(err) = state.connect_failure.clone() {
            return Err(err);
        }
        state.connects += 1;
        Ok(Box::new(MemoryAutomation {
            state: Arc::clone(&self.state),
            capabilities: self.capabilities,
        }))
    }

    fn describe(&self) -> String {
        "in-memory demo editor".to_owned()
    }
}

#[derive(Debug)]
pub struct MemoryAutomation {
    state: Arc<Mutex<MemoryState>>,
    capabilities: Capabilities,
}

impl Automation for MemoryAutomation {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn set_window_visible(&mut self, visible: bool) -> Result<(), AutomationError> {
        lock_state(&self.state).record(Call::SetWindowVisible(visible))
    }

    fn new_document(&mut self) -> Result<bool, AutomationError> {
        let mut state = lock_state(&self.state);
        state.record(Call::NewDocument)?;
        state.document = Document::default();
        state.undo.clear();
        state.redo.clear();
        Ok(true)
    }

    fn open(&mut self, path: &str) -> Result<bool, AutomationError> {
        let mut state = lock_state(&self.state);
        state.record(Call::Open(path.to_owned()))?;
        let Some(stored) = state.files.get(path).cloned() else {
            return Ok(false);
        };
        state.document = Document { path: Some(path.to_owned()), ..stored };
        state.undo.clear();
        state.redo.clear();
        Ok(true)
    }

    fn save(&mut self) -> Result<bool, AutomationError> {
        let mut state = lock_state(&self.state);
        state.record(Call::Save)?;
        let Some(path) = state.document.path.clone() else {
            return Ok(false);
        };
        let snapshot = state.document.clone();
        state.files.insert(path, snapshot);
        Ok(true)
    }

    fn save_as(&mut self, target: Option<&SaveAsTarget>) -> Result<bool, AutomationError> {
        let mut state = lock_state(&self.state);
        state.record(Call::SaveAs(target.cloned()))?;
        let path = match target {
            Some(target) => target.path.clone(),
            None => match state.save_prompt_answer.clone() {
                Some(path) => path,
                None => return Ok(false),
            },
        };
        state.document.path = Some(path.clone());
        let snapshot = state.document.clone();
        state.files.insert(path, snapshot);
        Ok(true)
    }

    fn run(&mut self, command: &Command) -> Result<bool, AutomationError> {
        let mut state = lock_state(&self.state);
        state.record(Call::Run(command.clone()))?;
        Ok(state.run(command))
    }

    fn execute(&mut self, action: &str, params: &ParameterSet) -> Result<bool, AutomationError> {
        let mut state = lock_state(&self.state);
        state.record(Call::Execute { action: action.to_owned(), params: params.clone() })?;
        state.execute(action, params)
    }

    fn export_text(&mut self, format: TextFormat) -> Result<String, AutomationError> {
        let mut state = lock_state(&self.state);
        state.record(Call::ExportText(format))?;
        Ok(state.document.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::{InsertTextParams, StagedAction, TableCreationParams};

    fn connect(connector: &MemoryConnector) -> Box<dyn Automation> {
        connector.connect().expect("memory connect")
    }

    fn insert(automation: &mut dyn Automation, text: &str) {
        let params = InsertTextParams { text };
        assert!(automation.execute(InsertTextParams::ACTION, &params.parameters()).unwrap());
    }

    #[test]
    fn text_and_paragraph_breaks_round_out_the_document() {
        let connector = MemoryConnector::new();
        let mut hwp = connect(&connector);

        insert(hwp.as_mut(), "first");
        assert!(hwp.run(&Command::new("BreakPara")).unwrap());
        insert(hwp.as_mut(), "second\r\nthird");

        assert_eq!(hwp.export_text(TextFormat::Text).unwrap(), "first\nsecond\nthird");
    }

    #[test]
    fn table_cursor_walks_cells_row_major() {
        let connector = MemoryConnector::new();
        let mut hwp = connect(&connector);
        let table = TableCreationParams { rows: 2, cols: 2 };
        assert!(hwp.execute(TableCreationParams::ACTION, &table.parameters()).unwrap());

        for text in ["a", "b", "c", "d"] {
            insert(hwp.as_mut(), text);
            hwp.run(&Command::new("TableRightCell")).unwrap();
        }

        assert_eq!(
            connector.table_cells(0),
            Some(vec![vec!["a".to_owned(), "b".to_owned()], vec!["c".to_owned(), "d".to_owned()]])
        );
        assert!(!hwp.run(&Command::new("TableRightCell")).unwrap(), "last cell has no right");
    }

    #[test]
    fn undo_and_redo_restore_snapshots() {
        let connector = MemoryConnector::new();
        let mut hwp = connect(&connector);
        insert(hwp.as_mut(), "keep");
        insert(hwp.as_mut(), " me");

        assert!(hwp.run(&Command::new("Undo")).unwrap());
        assert_eq!(connector.document_text(), "keep");
        assert!(hwp.run(&Command::new("Redo")).unwrap());
        assert_eq!(connector.document_text(), "keep me");
        assert!(!hwp.run(&Command::new("Redo")).unwrap());
    }

    #[test]
    fn document_survives_handle_replacement() {
        let connector = MemoryConnector::new();
        let mut first = connect(&connector);
        insert(first.as_mut(), "persisted");
        drop(first);

        let mut second = connect(&connector);
        assert_eq!(second.export_text(TextFormat::Text).unwrap(), "persisted");
        assert_eq!(connector.connect_count(), 2);
    }

    #[test]
    fn open_fails_for_unknown_files_and_loads_seeded_ones() {
        let connector = MemoryConnector::new().with_file("C:\\a.hwp", "hello\nworld");
        let mut hwp = connect(&connector);

        assert!(!hwp.open("C:\\missing.hwp").unwrap());
        assert!(hwp.open("C:\\a.hwp").unwrap());
        assert_eq!(connector.document_text(), "hello\nworld");
        assert_eq!(connector.document_path().as_deref(), Some("C:\\a.hwp"));
    }

    #[test]
    fn interactive_save_prompt_is_cancelled_unless_answered() {
        let connector = MemoryConnector::new();
        let mut hwp = connect(&connector);

        assert!(!hwp.save_as(None).unwrap());
        connector.answer_save_prompt("C:\\picked.hwp");
        assert!(hwp.save_as(None).unwrap());
        assert_eq!(connector.saved_file("C:\\picked.hwp").as_deref(), Some(""));
    }

    #[test]
    fn injected_failures_are_journaled_and_returned() {
        let connector = MemoryConnector::new();
        let mut hwp = connect(&connector);
        connector.fail_on("BreakPara", AutomationError::rejected("BreakPara", "busy"));

        let err = hwp.run(&Command::new("BreakPara")).unwrap_err();
        assert_eq!(err, AutomationError::rejected("BreakPara", "busy"));
        assert_eq!(connector.journal(), vec![Call::Run(Command::new("BreakPara"))]);
    }

    #[test]
    fn page_setup_needs_all_five_arguments() {
        let connector = MemoryConnector::new();
        let mut hwp = connect(&connector);

        assert!(!hwp.run(&Command::new("PageSetup3").int_arg(1)).unwrap());
        assert_eq!(connector.page_layout(), None);
    }

    #[test]
    fn merge_cell_requires_a_cell_block() {
        let connector = MemoryConnector::new();
        let mut hwp = connect(&connector);
        let table = TableCreationParams { rows: 2, cols: 2 };
        assert!(hwp.execute(TableCreationParams::ACTION, &table.parameters()).unwrap());

        assert!(!hwp.run(&Command::new("TableMergeCell")).unwrap(), "no block selected");
        assert!(hwp.run(&Command::new("TableCellBlock")).unwrap());
        assert!(hwp.run(&Command::new("TableRightCell")).unwrap());
        assert!(!hwp.run(&Command::new("TableRightCell")).unwrap(), "blocks do not wrap rows");
        assert!(hwp.run(&Command::new("TableMergeCell")).unwrap());
        assert_eq!(connector.merged_cells(0), Some(vec![(0, 0, 0, 1)]));
    }

    #[test]
    fn char_shape_command_is_parsed_into_the_document_state() {
        let connector = MemoryConnector::new();
        let mut hwp = connect(&connector);
        let command = Command::new("CharShape")
            .str_arg("Batang")
            .int_arg(1200)
            .flag_arg(true)
            .flag_arg(false);
        assert!(hwp.run(&command).unwrap());
        assert_eq!(
            connector.char_shape(),
            Some(CharShape { font: "Batang".to_owned(), size: 1200, bold: true, italic: false })
        );
    }
}
