// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;

use crate::automation::memory::{Call, MemoryConnector};
use crate::automation::{ParamValue, SaveAsTarget};
use crate::dispatch::{DispatcherOptions, ALREADY_CLOSED, CLOSED};
use std::path::PathBuf;

const DOC: &str = "C:\\doc.hwp";
const TEMP: &str = "C:\\work\\temp_document.hwp";

fn new_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().expect("tokio runtime")
}

struct Harness {
    runtime: tokio::runtime::Runtime,
    connector: MemoryConnector,
    server: HwpMcp,
}

impl Harness {
    fn new(connector: MemoryConnector) -> Self {
        let options = DispatcherOptions { visible: true, temp_save_path: PathBuf::from(TEMP) };
        let server = HwpMcp::new(Dispatcher::new(Arc::new(connector.clone()), options));
        Self { runtime: new_runtime(), connector, server }
    }

    fn call<F>(&self, call: F) -> String
    where
        F: std::future::Future<Output = Result<CallToolResult, ErrorData>>,
    {
        let result = self.runtime.block_on(call).expect("tool call");
        assert_ne!(result.is_error, Some(true));
        result.content[0].as_text().map(|content| content.text.clone()).expect("text content")
    }
}

#[test]
fn e2e_open_on_fresh_process() {
    let h = Harness::new(MemoryConnector::new().with_file(DOC, "회의록"));

    let reply = h.call(h.server.hwp_open(Parameters(OpenParams { path: Some(DOC.to_owned()) })));

    assert!(reply.contains(DOC), "{reply}");
    assert_eq!(h.connector.connect_count(), 1);
    assert_eq!(h.connector.journal()[0], Call::SetWindowVisible(true));
    assert_eq!(h.connector.document_path().as_deref(), Some(DOC));

    let dispatcher = h.server.dispatcher();
    let path = h.runtime.block_on(async {
        dispatcher.lock().await.session().and_then(|s| s.current_document_path()).map(str::to_owned)
    });
    assert_eq!(path.as_deref(), Some(DOC));
}

#[test]
fn e2e_insert_table_three_by_three() {
    let h = Harness::new(MemoryConnector::new());

    let reply = h.call(
        h.server.hwp_insert_table(Parameters(InsertTableParams { rows: Some(3), cols: Some(3) })),
    );
    assert!(reply.contains("3x3"), "{reply}");

    let executes: Vec<_> = h
        .connector
        .journal()
        .into_iter()
        .filter_map(|call| match call {
            Call::Execute { action, params } => Some((action, params)),
            _ => None,
        })
        .collect();
    assert_eq!(executes.len(), 1);
    let (action, params) = &executes[0];
    assert_eq!(action, "TableCreate");
    assert_eq!(params.get("ColWidth"), Some(&ParamValue::IntArray(vec![8000 / 3; 3])));
    assert_eq!(params.get_int("Rows"), Some(3));
    assert_eq!(params.get_int("Cols"), Some(3));
}

#[test]
fn e2e_close_twice() {
    let h = Harness::new(MemoryConnector::new());
    h.call(h.server.hwp_create());

    let first = h.call(h.server.hwp_close(Parameters(CloseParams::default())));
    let second = h.call(h.server.hwp_close(Parameters(CloseParams::default())));

    assert_eq!(first, CLOSED);
    assert_eq!(second, ALREADY_CLOSED);
}

#[test]
fn e2e_close_then_reopen_starts_fresh() {
    let h = Harness::new(MemoryConnector::new().with_file(DOC, "hello"));
    h.call(h.server.hwp_open(Parameters(OpenParams { path: Some(DOC.to_owned()) })));
    h.call(h.server.hwp_close(Parameters(CloseParams::default())));

    let reply = h.call(h.server.hwp_save(Parameters(SaveParams::default())));

    assert_eq!(reply, format!("Document saved to temporary location: {TEMP}"));
    assert_eq!(h.connector.connect_count(), 2);
    assert!(h.connector.journal().contains(&Call::SaveAs(Some(SaveAsTarget::native(TEMP)))));
}

#[test]
fn e2e_authoring_workflow() {
    let h = Harness::new(MemoryConnector::new());
    let out = "D:\\reports\\weekly.hwp";

    assert_eq!(h.call(h.server.hwp_create()), "New document created successfully");
    let font = SetFontParams {
        name: Some("맑은 고딕".to_owned()),
        size: Some(11.0),
        bold: Some(true),
        italic: None,
    };
    assert!(h.call(h.server.hwp_set_font(Parameters(font))).starts_with("Font set successfully"));
    let title = InsertTextParams { text: Some("주간 보고".to_owned()) };
    assert_eq!(h.call(h.server.hwp_insert_text(Parameters(title))), "Text inserted successfully");
    assert_eq!(h.call(h.server.hwp_insert_paragraph()), "Paragraph inserted successfully");

    let table = InsertTableWithDataParams {
        rows: Some(3),
        cols: Some(2),
        data: Some(r#"[["항목","상태"],["설계","완료"],["구현","진행"]]"#.to_owned()),
        has_header: Some(true),
    };
    assert_eq!(
        h.call(h.server.hwp_insert_table_with_data(Parameters(table))),
        "Table inserted with data: 3x2"
    );
    let cell =
        TableCellTextParams { row: Some(3), col: Some(2), text: Some("완료".to_owned()) };
    assert_eq!(
        h.call(h.server.hwp_table_set_cell_text(Parameters(cell))),
        "Cell (3, 2) text set"
    );

    let text = h.call(h.server.hwp_get_text());
    assert_eq!(text, "주간 보고\n항목\t상태\n설계\t완료\n구현\t완료\n");

    let shape = h.connector.char_shape().expect("char shape");
    assert_eq!((shape.font.as_str(), shape.size, shape.bold), ("맑은 고딕", 1100, true));
    assert_eq!(h.connector.bold_cells(0), Some(vec![(0, 0), (0, 1)]));

    let save = SaveParams { path: Some(out.to_owned()) };
    assert_eq!(h.call(h.server.hwp_save(Parameters(save))), format!("Document saved to: {out}"));
    let close = CloseParams { save: Some(true) };
    assert_eq!(h.call(h.server.hwp_close(Parameters(close))), CLOSED);

    assert_eq!(h.connector.saved_file(out), Some(text));
    assert!(h.connector.journal().contains(&Call::Save));
}

#[test]
fn e2e_find_replace_and_undo() {
    let h = Harness::new(MemoryConnector::new().with_file(DOC, "draft version"));
    h.call(h.server.hwp_open(Parameters(OpenParams { path: Some(DOC.to_owned()) })));

    let find = FindTextParams { text: Some("draft".to_owned()) };
    assert_eq!(h.call(h.server.hwp_find_text(Parameters(find))), "Found: draft");

    let replace =
        ReplaceTextParams { find: Some("draft".to_owned()), replace: Some("final".to_owned()) };
    h.call(h.server.hwp_replace_text(Parameters(replace)));
    assert_eq!(h.call(h.server.hwp_get_text()), "final version");

    assert_eq!(
        h.call(h.server.hwp_undo(Parameters(StepParams::default()))),
        "Undo applied 1 time(s)"
    );
    assert_eq!(h.call(h.server.hwp_get_text()), "draft version");

    h.call(h.server.hwp_redo(Parameters(StepParams { count: Some(1) })));
    assert_eq!(h.call(h.server.hwp_get_text()), "final version");
}

#[test]
fn e2e_oversized_table_is_refused_and_the_server_keeps_answering() {
    let h = Harness::new(MemoryConnector::new());

    let table = InsertTableParams { rows: Some(1), cols: Some(i64::from(u32::MAX)) };
    assert_eq!(
        h.call(h.server.hwp_insert_table(Parameters(table))),
        "Error: Failed to insert table"
    );

    let table = InsertTableParams { rows: Some(2), cols: Some(2) };
    assert_eq!(h.call(h.server.hwp_insert_table(Parameters(table))), "Table inserted: 2x2");
    assert_eq!(h.connector.connect_count(), 1);
}

#[test]
fn e2e_landscape_layout_with_merged_title_and_logo() {
    let logo = "C:\\assets\\logo.png";
    let h = Harness::new(MemoryConnector::new().with_picture(logo));

    let page = PageSetupParams {
        orientation: Some("landscape".to_owned()),
        margin_top: Some(2000),
        ..Default::default()
    };
    assert!(h.call(h.server.hwp_set_page_setup(Parameters(page))).contains("landscape"));

    let image = InsertImageParams { path: Some(logo.to_owned()), width: None, height: None };
    assert_eq!(
        h.call(h.server.hwp_insert_image(Parameters(image))),
        format!("Image inserted: {logo}")
    );

    let table = InsertTableWithDataParams {
        rows: Some(2),
        cols: Some(3),
        data: Some(r#"[["분기 실적"],["1월","2월","3월"]]"#.to_owned()),
        has_header: Some(true),
    };
    h.call(h.server.hwp_insert_table_with_data(Parameters(table)));
    let merge = MergeCellsParams {
        start_row: Some(1),
        start_col: Some(1),
        end_row: Some(1),
        end_col: Some(3),
    };
    assert_eq!(
        h.call(h.server.hwp_table_merge_cells(Parameters(merge))),
        "Cells merged: (1, 1) - (1, 3)"
    );

    let layout = h.connector.page_layout().expect("page layout");
    assert!(layout.landscape);
    assert_eq!((layout.margin_top, layout.margin_left), (2000, 1000));
    assert_eq!(h.connector.pictures().len(), 1);
    assert_eq!(h.connector.merged_cells(0), Some(vec![(0, 0, 0, 2)]));
    assert_eq!(h.call(h.server.hwp_get_text()), "분기 실적\t\t\n1월\t2월\t3월\n");
}
