// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! hwp-mcp: drive the Hangul word processor (HWP) from MCP clients.
//!
//! Layering, bottom-up:
//! - [`automation`]: the application's command surface as a trait, with an in-process demo
//!   editor and a subprocess bridge backend.
//! - [`session`]: the session controller holding the single live connection.
//! - [`dispatch`]: one method per tool, producing reply text.
//! - [`mcp`]: the rmcp server exposing the tools over stdio or streamable HTTP.

pub mod automation;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod mcp;
pub mod session;
