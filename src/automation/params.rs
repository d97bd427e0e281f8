// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Staged parameter sets for structured actions.
//!
//! The application separates "fill in the parameter set for an action" from "execute the
//! action". Here a parameter set is an immutable value built up front and handed to
//! [`super::Automation::execute`] in one go.

use serde::{Deserialize, Serialize};

/// Full table width in HWP units that column widths are derived from.
pub const NOMINAL_TABLE_WIDTH: i64 = 8000;
/// Absolute row height in HWP units.
pub const TABLE_ROW_HEIGHT: i64 = 1000;
/// Largest table a single create call may ask for.
pub const MAX_TABLE_ROWS: u32 = 1024;
pub const MAX_TABLE_COLS: u32 = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Str(String),
    IntArray(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamItem {
    pub key: String,
    pub value: ParamValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    set_id: String,
    items: Vec<ParamItem>,
}

impl ParameterSet {
    pub fn new(set_id: impl Into<String>) -> Self {
        Self { set_id: set_id.into(), items: Vec::new() }
    }

    pub fn int(self, key: &str, value: i64) -> Self {
        self.with(key, ParamValue::Int(value))
    }

    pub fn str(self, key: &str, value: impl Into<String>) -> Self {
        self.with(key, ParamValue::Str(value.into()))
    }

    /// An item array; the application creates the array with `values.len()` slots and sets
    /// each slot in order.
    pub fn int_array(self, key: &str, values: Vec<i64>) -> Self {
        self.with(key, ParamValue::IntArray(values))
    }

    fn with(mut self, key: &str, value: ParamValue) -> Self {
        match self.items.iter_mut().find(|item| item.key == key) {
            Some(item) => item.value = value,
            None => self.items.push(ParamItem { key: key.to_owned(), value }),
        }
        self
    }

    pub fn set_id(&self) -> &str {
        &self.set_id
    }

    pub fn items(&self) -> &[ParamItem] {
        &self.items
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.items.iter().find(|item| item.key == key).map(|item| &item.value)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            ParamValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            ParamValue::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn get_int_array(&self, key: &str) -> Option<&[i64]> {
        match self.get(key)? {
            ParamValue::IntArray(values) => Some(values.as_slice()),
            _ => None,
        }
    }
}

/// An action that is driven through a staged parameter set.
pub trait StagedAction {
    const ACTION: &'static str;

    fn parameters(&self) -> ParameterSet;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertTextParams<'a> {
    pub text: &'a str,
}

impl StagedAction for InsertTextParams<'_> {
    const ACTION: &'static str = "InsertText";

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new("HInsertText").str("Text", self.text)
    }
}

/// Table creation: width fits the column, rows get an absolute height, and every column
/// gets the same share of [`NOMINAL_TABLE_WIDTH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCreationParams {
    pub rows: u32,
    pub cols: u32,
}

impl TableCreationParams {
    const WIDTH_FIT_TO_COLUMN: i64 = 0;
    const HEIGHT_ABSOLUTE: i64 = 1;

    /// `cols` must be non-zero.
    pub fn column_width(&self) -> i64 {
        NOMINAL_TABLE_WIDTH / i64::from(self.cols)
    }
}

impl StagedAction for TableCreationParams {
    const ACTION: &'static str = "TableCreate";

    fn parameters(&self) -> ParameterSet {
        let widths = vec![self.column_width(); self.cols as usize];
        ParameterSet::new("HTableCreation")
            .int("Rows", i64::from(self.rows))
            .int("Cols", i64::from(self.cols))
            .int("WidthType", Self::WIDTH_FIT_TO_COLUMN)
            .int("HeightType", Self::HEIGHT_ABSOLUTE)
            .int("WidthValue", 0)
            .int("HeightValue", TABLE_ROW_HEIGHT)
            .int_array("ColWidth", widths)
    }
}

/// Shared by `RepeatFind` and `AllReplace`; the action is picked by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindReplaceParams<'a> {
    pub find: &'a str,
    pub replace: Option<&'a str>,
}

impl FindReplaceParams<'_> {
    pub const FIND: &'static str = "RepeatFind";
    pub const REPLACE_ALL: &'static str = "AllReplace";

    pub fn parameters(&self) -> ParameterSet {
        let set = ParameterSet::new("HFindReplace")
            .str("FindString", self.find)
            .int("FindRegExp", 0)
            .int("IgnoreMessage", 1)
            .int("Direction", 0);
        match self.replace {
            Some(replace) => set.str("ReplaceString", replace),
            None => set,
        }
    }
}

/// Picture insertion at the cursor. A zero width or height keeps the picture's own size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPictureParams<'a> {
    pub path: &'a str,
    pub width: i64,
    pub height: i64,
}

impl InsertPictureParams<'_> {
    const EMBED_IN_DOCUMENT: i64 = 1;
}

impl StagedAction for InsertPictureParams<'_> {
    const ACTION: &'static str = "InsertPicture";

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new("HInsertPicture")
            .str("FileName", self.path)
            .int("Width", self.width)
            .int("Height", self.height)
            .int("Embed", Self::EMBED_IN_DOCUMENT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharShapeParams {
    pub bold: bool,
}

impl StagedAction for CharShapeParams {
    const ACTION: &'static str = "CharShape";

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new("HCharShape").int("Bold", i64::from(self.bold))
    }
}
