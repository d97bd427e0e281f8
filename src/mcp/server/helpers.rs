// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

fn text_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

/// Run one dispatcher call off the async executor. Automation calls block (a save prompt
/// can block until the user answers it), so the lock is held on a blocking thread and every
/// call is serialized behind it.
async fn dispatch<F>(dispatcher: &Arc<Mutex<Dispatcher>>, call: F) -> CallToolResult
where
    F: FnOnce(&mut Dispatcher) -> String + Send + 'static,
{
    let mut guard = Arc::clone(dispatcher).lock_owned().await;
    match tokio::task::spawn_blocking(move || call(&mut *guard)).await {
        Ok(text) => text_result(text),
        Err(err) => {
            error!("tool call aborted: {err}");
            text_result(format!("Error: {err}"))
        }
    }
}
