// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;
use crate::automation::memory::{Call, MemoryConnector};
use crate::automation::Unconfigured;
use crate::dispatch::{DispatcherOptions, ALREADY_CLOSED, CONNECTION_FAILED};
use std::collections::BTreeSet;
use std::path::PathBuf;

const DOC: &str = "C:\\doc.hwp";

fn server_with(connector: &MemoryConnector) -> HwpMcp {
    let options =
        DispatcherOptions { visible: true, temp_save_path: PathBuf::from("temp_document.hwp") };
    HwpMcp::new(Dispatcher::new(Arc::new(connector.clone()), options))
}

fn text(result: CallToolResult) -> String {
    assert_ne!(result.is_error, Some(true), "tool reported a protocol-level error");
    assert_eq!(result.content.len(), 1, "expected a single text item");
    result.content[0].as_text().map(|content| content.text.clone()).expect("text content")
}

#[test]
fn tools_advertise_descriptions_and_schemas() {
    let tools = HwpMcp::tool_router().list_all();

    let mut missing_description = Vec::new();
    let mut non_object_input_schema = Vec::new();
    let mut seen_names = BTreeSet::new();

    for tool in tools {
        let name = tool.name.to_string();
        assert!(seen_names.insert(name.clone()), "duplicate tool name: {name}");

        let desc_missing =
            tool.description.as_deref().map(|desc| desc.trim().is_empty()).unwrap_or(true);
        if desc_missing {
            missing_description.push(name.clone());
        }

        if tool.input_schema.get("type").and_then(|v| v.as_str()) != Some("object") {
            non_object_input_schema.push(name.clone());
        }
    }

    assert!(missing_description.is_empty(), "tools missing description: {missing_description:?}");
    assert!(
        non_object_input_schema.is_empty(),
        "tools with non-object input_schema: {non_object_input_schema:?}"
    );

    let expected = [
        "hwp_close",
        "hwp_create",
        "hwp_find_text",
        "hwp_get_text",
        "hwp_insert_image",
        "hwp_insert_paragraph",
        "hwp_insert_table",
        "hwp_insert_table_with_data",
        "hwp_insert_text",
        "hwp_open",
        "hwp_ping_pong",
        "hwp_redo",
        "hwp_replace_text",
        "hwp_save",
        "hwp_set_font",
        "hwp_set_page_setup",
        "hwp_table_merge_cells",
        "hwp_table_set_cell_text",
        "hwp_undo",
    ];
    assert_eq!(seen_names.iter().map(String::as_str).collect::<Vec<_>>(), expected);
}

#[test]
fn instructions_name_every_tool() {
    let server = server_with(&MemoryConnector::new());
    let instructions = server.get_info().instructions.expect("instructions");

    for tool in HwpMcp::tool_router().list_all() {
        assert!(instructions.contains(&*tool.name), "missing {} in instructions", tool.name);
    }
}

#[test]
fn open_schema_declares_path_property() {
    let tools = HwpMcp::tool_router().list_all();
    let open = tools.iter().find(|tool| tool.name == "hwp_open").expect("hwp_open");

    let properties = open.input_schema.get("properties").and_then(|v| v.as_object());
    assert!(properties.is_some_and(|props| props.contains_key("path")));
}

#[test]
fn merge_schema_declares_both_corners() {
    let tools = HwpMcp::tool_router().list_all();
    let merge = tools.iter().find(|tool| tool.name == "hwp_table_merge_cells").expect("merge");

    let properties = merge.input_schema.get("properties").and_then(|v| v.as_object());
    for key in ["start_row", "start_col", "end_row", "end_col"] {
        assert!(properties.is_some_and(|props| props.contains_key(key)), "missing {key}");
    }
}

#[tokio::test]
async fn page_setup_tool_reaches_the_application() {
    let connector = MemoryConnector::new();
    let server = server_with(&connector);

    let params =
        PageSetupParams { orientation: Some("landscape".to_owned()), ..Default::default() };
    let reply = text(server.hwp_set_page_setup(Parameters(params)).await.expect("page setup"));

    assert!(reply.starts_with("Page setup applied: landscape"), "{reply}");
    assert!(connector.page_layout().is_some_and(|layout| layout.landscape));
}

#[tokio::test]
async fn missing_required_parameter_is_a_text_reply() {
    let connector = MemoryConnector::new();
    let server = server_with(&connector);

    let reply = text(server.hwp_open(Parameters(OpenParams::default())).await.expect("hwp_open"));
    assert_eq!(reply, "Error: path is required");

    let reply = text(
        server
            .hwp_insert_table(Parameters(InsertTableParams { rows: Some(2), cols: None }))
            .await
            .expect("hwp_insert_table"),
    );
    assert_eq!(reply, "Error: cols is required");

    assert_eq!(connector.connect_count(), 0);
    assert!(connector.journal().is_empty());
}

#[tokio::test]
async fn unconfigured_backend_reports_connection_failure() {
    let options =
        DispatcherOptions { visible: true, temp_save_path: PathBuf::from("temp_document.hwp") };
    let server = HwpMcp::new(Dispatcher::new(Arc::new(Unconfigured), options));

    let reply = text(server.hwp_create().await.expect("hwp_create"));
    assert_eq!(reply, CONNECTION_FAILED);

    let reply = text(server.hwp_close(Parameters(CloseParams::default())).await.expect("close"));
    assert_eq!(reply, ALREADY_CLOSED);
}

#[tokio::test]
async fn ping_pong_never_connects() {
    let connector = MemoryConnector::new();
    let server = server_with(&connector);

    let reply = text(
        server.hwp_ping_pong(Parameters(PingPongParams::default())).await.expect("ping_pong"),
    );
    let reply: serde_json::Value = serde_json::from_str(&reply).expect("json reply");

    assert_eq!(reply["response"], "퐁");
    assert_eq!(reply["original_message"], "핑");
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn concurrent_calls_share_one_session() {
    let connector = MemoryConnector::new();
    let server = server_with(&connector);

    let calls = (0..8).map(|i| {
        let server = server.clone();
        tokio::spawn(async move {
            let params = InsertTextParams { text: Some(format!("{i}")) };
            server.hwp_insert_text(Parameters(params)).await.expect("hwp_insert_text")
        })
    });
    for call in calls.collect::<Vec<_>>() {
        assert_eq!(text(call.await.expect("join")), "Text inserted successfully");
    }

    assert_eq!(connector.connect_count(), 1);
    let inserts = connector
        .journal()
        .into_iter()
        .filter(|call| matches!(call, Call::Execute { action, .. } if action == "InsertText"))
        .count();
    assert_eq!(inserts, 8);
    assert_eq!(connector.document_text().len(), 8);
}

#[tokio::test]
async fn dispatcher_handle_is_shared_with_the_server() {
    let connector = MemoryConnector::new().with_file(DOC, "hello");
    let server = server_with(&connector);

    let params = OpenParams { path: Some(DOC.to_owned()) };
    text(server.hwp_open(Parameters(params)).await.expect("hwp_open"));

    let dispatcher = server.dispatcher();
    let mut dispatcher = dispatcher.lock().await;
    assert_eq!(dispatcher.session().and_then(|s| s.current_document_path()), Some(DOC));
    dispatcher.shutdown();
    assert!(dispatcher.session().is_none());
}

#[tokio::test]
async fn streamable_http_tools_call_reaches_the_dispatcher() {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use rmcp::transport::{
        streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
        StreamableHttpService,
    };

    let connector = MemoryConnector::new().with_file(DOC, "hello");
    let server = server_with(&connector);

    let config = StreamableHttpServerConfig {
        stateful_mode: false,
        sse_keep_alive: None,
        ..StreamableHttpServerConfig::default()
    };

    let session_manager = Arc::new(LocalSessionManager::default());
    let service = {
        let server = server.clone();
        StreamableHttpService::new(move || Ok(server.clone()), session_manager, config)
    };

    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {
            "name": "hwp_open",
            "arguments": { "path": DOC }
        }
    })
    .to_string();

    let response = service
        .handle(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header(axum::http::header::ACCEPT, "application/json, text/event-stream")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .expect("request"),
        )
        .await;

    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let response_body = Body::new(response.into_body());
    let bytes = tokio::time::timeout(
        std::time::Duration::from_secs(3),
        to_bytes(response_body, usize::MAX),
    )
    .await
    .expect("timeout collecting response body")
    .expect("collect response body");
    let payload = String::from_utf8_lossy(&bytes);
    assert!(payload.contains("Document opened"), "unexpected payload: {payload}");

    assert_eq!(connector.connect_count(), 1);
    assert_eq!(connector.document_path().as_deref(), Some(DOC));
}
