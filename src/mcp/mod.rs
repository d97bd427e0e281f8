// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Model Context Protocol (MCP) server surface.
//!
//! Each tool forwards to the [`crate::dispatch::Dispatcher`] and answers with one text item.

mod server;
mod types;

pub use server::HwpMcp;
pub use types::*;
