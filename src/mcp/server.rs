// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use tokio::sync::Mutex;
use tracing::error;

use crate::dispatch::Dispatcher;

use super::types::*;

#[derive(Clone)]
pub struct HwpMcp {
    dispatcher: Arc<Mutex<Dispatcher>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl HwpMcp {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_shared_dispatcher(Arc::new(Mutex::new(dispatcher)))
    }

    /// Server over a dispatcher the caller keeps a handle to (for shutdown).
    pub fn with_shared_dispatcher(dispatcher: Arc<Mutex<Dispatcher>>) -> Self {
        Self { dispatcher, tool_router: Self::tool_router() }
    }

    pub fn dispatcher(&self) -> Arc<Mutex<Dispatcher>> {
        Arc::clone(&self.dispatcher)
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    /// Start a new, empty document. Connects to HWP first when needed.
    #[tool(name = "hwp_create")]
    async fn hwp_create(&self) -> Result<CallToolResult, ErrorData> {
        Ok(dispatch(&self.dispatcher, Dispatcher::create).await)
    }

    /// Open an existing document by path (`path` required).
    #[tool(name = "hwp_open")]
    async fn hwp_open(&self, params: Parameters<OpenParams>) -> Result<CallToolResult, ErrorData> {
        let OpenParams { path } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.open(path.as_deref())).await)
    }

    /// Save the current document to `path`, or to a temporary document in the server's
    /// working directory when no path is given.
    #[tool(name = "hwp_save")]
    async fn hwp_save(&self, params: Parameters<SaveParams>) -> Result<CallToolResult, ErrorData> {
        let SaveParams { path } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.save(path.as_deref())).await)
    }

    /// Insert text at the current cursor position (`text` required).
    #[tool(name = "hwp_insert_text")]
    async fn hwp_insert_text(
        &self,
        params: Parameters<InsertTextParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let InsertTextParams { text } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.insert_text(text.as_deref())).await)
    }

    /// Change the font of the whole document. Every parameter is optional.
    #[tool(name = "hwp_set_font")]
    async fn hwp_set_font(
        &self,
        params: Parameters<SetFontParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let SetFontParams { name, size, bold, italic } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.set_font(name.as_deref(), size, bold, italic))
            .await)
    }

    /// Insert an empty `rows` x `cols` table at the cursor.
    #[tool(name = "hwp_insert_table")]
    async fn hwp_insert_table(
        &self,
        params: Parameters<InsertTableParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let InsertTableParams { rows, cols } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.insert_table(rows, cols)).await)
    }

    /// Insert a table and fill it row by row from `data`, a JSON array of rows. Extra rows or
    /// columns beyond the table size are ignored; `has_header` bolds the first row.
    #[tool(name = "hwp_insert_table_with_data")]
    async fn hwp_insert_table_with_data(
        &self,
        params: Parameters<InsertTableWithDataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let InsertTableWithDataParams { rows, cols, data, has_header } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| {
            d.insert_table_with_data(rows, cols, data.as_deref(), has_header)
        })
        .await)
    }

    /// Replace the text of one cell (1-based `row`/`col`) in the table holding the cursor.
    #[tool(name = "hwp_table_set_cell_text")]
    async fn hwp_table_set_cell_text(
        &self,
        params: Parameters<TableCellTextParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let TableCellTextParams { row, col, text } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.table_set_cell_text(row, col, text.as_deref()))
            .await)
    }

    /// Merge the rectangle of cells from (`start_row`, `start_col`) to (`end_row`, `end_col`),
    /// 1-based and inclusive, in the table holding the cursor.
    #[tool(name = "hwp_table_merge_cells")]
    async fn hwp_table_merge_cells(
        &self,
        params: Parameters<MergeCellsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let MergeCellsParams { start_row, start_col, end_row, end_col } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| {
            d.table_merge_cells(start_row, start_col, end_row, end_col)
        })
        .await)
    }

    /// Insert a picture file at the cursor, embedded in the document (`path` required).
    #[tool(name = "hwp_insert_image")]
    async fn hwp_insert_image(
        &self,
        params: Parameters<InsertImageParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let InsertImageParams { path, width, height } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.insert_image(path.as_deref(), width, height))
            .await)
    }

    /// Set paper orientation and page margins (HWP units) for the document.
    #[tool(name = "hwp_set_page_setup")]
    async fn hwp_set_page_setup(
        &self,
        params: Parameters<PageSetupParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let PageSetupParams { orientation, margin_left, margin_right, margin_top, margin_bottom } =
            params.0;
        Ok(dispatch(&self.dispatcher, move |d| {
            d.set_page_setup(
                orientation.as_deref(),
                margin_left,
                margin_right,
                margin_top,
                margin_bottom,
            )
        })
        .await)
    }

    /// Start a new paragraph at the cursor.
    #[tool(name = "hwp_insert_paragraph")]
    async fn hwp_insert_paragraph(&self) -> Result<CallToolResult, ErrorData> {
        Ok(dispatch(&self.dispatcher, Dispatcher::insert_paragraph).await)
    }

    /// Return the whole document as plain text.
    #[tool(name = "hwp_get_text")]
    async fn hwp_get_text(&self) -> Result<CallToolResult, ErrorData> {
        Ok(dispatch(&self.dispatcher, Dispatcher::get_text).await)
    }

    /// Search the document from the beginning and report whether `text` occurs.
    #[tool(name = "hwp_find_text")]
    async fn hwp_find_text(
        &self,
        params: Parameters<FindTextParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let FindTextParams { text } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.find_text(text.as_deref())).await)
    }

    /// Replace every occurrence of `find` with `replace`.
    #[tool(name = "hwp_replace_text")]
    async fn hwp_replace_text(
        &self,
        params: Parameters<ReplaceTextParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let ReplaceTextParams { find, replace } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.replace_text(find.as_deref(), replace.as_deref()))
            .await)
    }

    /// Undo the last `count` edits (default 1).
    #[tool(name = "hwp_undo")]
    async fn hwp_undo(&self, params: Parameters<StepParams>) -> Result<CallToolResult, ErrorData> {
        let StepParams { count } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.undo(count)).await)
    }

    /// Redo the last `count` undone edits (default 1).
    #[tool(name = "hwp_redo")]
    async fn hwp_redo(&self, params: Parameters<StepParams>) -> Result<CallToolResult, ErrorData> {
        let StepParams { count } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.redo(count)).await)
    }

    /// Close the HWP connection. With `save`, the open document is saved in place first.
    /// The next tool call starts a fresh session.
    #[tool(name = "hwp_close")]
    async fn hwp_close(
        &self,
        params: Parameters<CloseParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let CloseParams { save } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.close(save)).await)
    }

    /// Connectivity check: answers "pong" to "ping" and "퐁" to "핑" without touching HWP.
    #[tool(name = "hwp_ping_pong")]
    async fn hwp_ping_pong(
        &self,
        params: Parameters<PingPongParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let PingPongParams { message } = params.0;
        Ok(dispatch(&self.dispatcher, move |d| d.ping_pong(message.as_deref())).await)
    }
}

#[tool_handler]
impl ServerHandler for HwpMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "HWP (Hangul word processor) automation server (tools: hwp_create, hwp_open, hwp_save, hwp_insert_text, hwp_set_font, hwp_insert_table, hwp_insert_table_with_data, hwp_table_set_cell_text, hwp_table_merge_cells, hwp_insert_image, hwp_set_page_setup, hwp_insert_paragraph, hwp_get_text, hwp_find_text, hwp_replace_text, hwp_undo, hwp_redo, hwp_close, hwp_ping_pong). Calls run one at a time against a single HWP session that is opened on first use."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// Blocking dispatch and reply helpers for tool handlers.
include!("server/helpers.rs");

#[cfg(test)]
mod e2e;

#[cfg(test)]
mod tests;
