// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::Deserialize;

// Required parameters are still `Option` so a missing value reaches the dispatcher, which
// answers with a "<param> is required" reply instead of a protocol error.

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct OpenParams {
    /// Path of the document to open (required).
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SaveParams {
    /// Destination path; defaults to a temporary document in the working directory.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct InsertTextParams {
    /// Text to insert at the cursor (required).
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SetFontParams {
    /// Font face name; defaults to 함초롬바탕.
    pub name: Option<String>,
    /// Size in points; defaults to 10.
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct InsertTableParams {
    /// Number of rows (required, > 0).
    pub rows: Option<i64>,
    /// Number of columns (required, > 0).
    pub cols: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct InsertTableWithDataParams {
    pub rows: Option<i64>,
    pub cols: Option<i64>,
    /// JSON array of rows, e.g. `[["Name","Qty"],["Apple","3"]]`.
    pub data: Option<String>,
    /// Render the first row in bold.
    pub has_header: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TableCellTextParams {
    /// 1-based row of the cell.
    pub row: Option<i64>,
    /// 1-based column of the cell.
    pub col: Option<i64>,
    /// New cell content; an empty string clears the cell.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct MergeCellsParams {
    /// 1-based row of the top-left cell.
    pub start_row: Option<i64>,
    /// 1-based column of the top-left cell.
    pub start_col: Option<i64>,
    /// 1-based row of the bottom-right cell.
    pub end_row: Option<i64>,
    /// 1-based column of the bottom-right cell.
    pub end_col: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct InsertImageParams {
    /// Path of the picture file (required).
    pub path: Option<String>,
    /// Width in HWP units; 0 or missing keeps the picture's width.
    pub width: Option<i64>,
    /// Height in HWP units; 0 or missing keeps the picture's height.
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PageSetupParams {
    /// "portrait" (default) or "landscape".
    pub orientation: Option<String>,
    /// Margins in HWP units; each defaults to 1000.
    pub margin_left: Option<i64>,
    pub margin_right: Option<i64>,
    pub margin_top: Option<i64>,
    pub margin_bottom: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FindTextParams {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ReplaceTextParams {
    pub find: Option<String>,
    /// Replacement; may be empty to delete matches.
    pub replace: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct StepParams {
    /// How many steps to apply; defaults to 1.
    pub count: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CloseParams {
    /// Save the open document in place before closing.
    pub save: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PingPongParams {
    /// "ping", "pong", "핑" or "퐁"; defaults to "핑".
    pub message: Option<String>,
}
