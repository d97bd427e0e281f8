// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bridge to a helper process that hosts the real application object.
//!
//! The helper (for example a small PowerShell or Python script holding the
//! `HWPFrame.HwpObject` COM instance) is spawned per connection and spoken to over its
//! stdin/stdout, one JSON object per line:
//!
//! ```text
//! -> {"id":1,"method":"hello","params":{}}
//! <- {"id":1,"result":{"capabilities":{"window_visibility":true}}}
//! -> {"id":2,"method":"run","params":{"command":"BreakPara","name":"BreakPara"}}
//! <- {"id":2,"result":true}
//! -> {"id":3,"method":"open","params":{"path":"C:\\missing.hwp"}}
//! <- {"id":3,"error":{"message":"file not found"}}
//! ```
//!
//! Methods: `hello`, `set_window_visible`, `new_document`, `open`, `save`, `save_as`, `run`,
//! `execute` (parameter set items in order; integer arrays map to `CreateItemArray` +
//! `SetItem`), `export_text`. The helper exits when its stdin closes. Output lines that do
//! not parse as replies are ignored, so the helper may print diagnostics to stdout.

use std::cmp::Ordering;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{
    Automation, AutomationError, Capabilities, Command, Connector, ParameterSet, SaveAsTarget,
    TextFormat,
};

/// Program and arguments used to start the helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BridgeCommand {
    /// Split a whitespace-separated command line. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(Self { program, args: parts.collect() })
    }
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct Response {
    id: u64,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RemoteError>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Hello {
    #[serde(default)]
    capabilities: Capabilities,
}

/// Request/response channel over a pair of line-oriented streams.
#[derive(Debug)]
pub struct JsonLineChannel<R, W> {
    reader: R,
    writer: W,
    next_id: u64,
}

impl<R: BufRead, W: Write> JsonLineChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer, next_id: 1 }
    }

    pub fn call(&mut self, method: &str, params: Value) -> Result<Value, AutomationError> {
        let id = self.next_id;
        self.next_id += 1;

        let mut line = serde_json::to_string(&Request { id, method, params })
            .map_err(|err| AutomationError::Protocol(format!("encode {method}: {err}")))?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|err| AutomationError::Transport(format!("write {method}: {err}")))?;

        let response = self.read_reply(method, id)?;
        if let Some(error) = response.error {
            return Err(AutomationError::rejected(method, error.message));
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// Read until the reply for `id` arrives. Lines that are not replies (stray output from
    /// the helper) and late replies to earlier requests are skipped. A reply to a request
    /// that was never sent means the stream cannot be trusted any more.
    fn read_reply(&mut self, method: &str, id: u64) -> Result<Response, AutomationError> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|err| AutomationError::Transport(format!("read {method}: {err}")))?;
            if read == 0 {
                return Err(AutomationError::Transport(format!(
                    "bridge closed its output while waiting for {method}"
                )));
            }

            let response: Response = match serde_json::from_str(line.trim_end()) {
                Ok(response) => response,
                Err(err) => {
                    debug!("skipping non-reply bridge output ({err}): {}", line.trim_end());
                    continue;
                }
            };
            match response.id.cmp(&id) {
                Ordering::Equal => return Ok(response),
                Ordering::Less => {
                    debug!("skipping late reply {} while waiting for {id}", response.id);
                }
                Ordering::Greater => {
                    return Err(AutomationError::Transport(format!(
                        "reply id {} is ahead of request id {id}",
                        response.id
                    )));
                }
            }
        }
    }
}

fn expect_bool(method: &str, value: Value) -> Result<bool, AutomationError> {
    match value {
        Value::Bool(flag) => Ok(flag),
        other => {
            Err(AutomationError::Protocol(format!("{method} returned {other}, expected bool")))
        }
    }
}

/// An automation handle backed by a bridge channel.
#[derive(Debug)]
pub struct BridgeSession<R, W> {
    channel: JsonLineChannel<R, W>,
    capabilities: Capabilities,
    child: Option<Child>,
}

impl<R: BufRead, W: Write> BridgeSession<R, W> {
    /// Greet the helper and learn which optional capabilities it has.
    pub fn handshake(reader: R, writer: W, child: Option<Child>) -> Result<Self, AutomationError> {
        let mut session = Self {
            channel: JsonLineChannel::new(reader, writer),
            capabilities: Capabilities::default(),
            child,
        };
        let hello: Hello = serde_json::from_value(session.channel.call("hello", json!({}))?)
            .map_err(|err| AutomationError::Protocol(format!("decode hello: {err}")))?;
        session.capabilities = hello.capabilities;
        Ok(session)
    }

    fn call_bool(&mut self, method: &str, params: Value) -> Result<bool, AutomationError> {
        let value = self.channel.call(method, params)?;
        expect_bool(method, value)
    }
}

impl<R, W> Drop for BridgeSession<R, W> {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl<R, W> Automation for BridgeSession<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn set_window_visible(&mut self, visible: bool) -> Result<(), AutomationError> {
        self.channel.call("set_window_visible", json!({ "visible": visible }))?;
        Ok(())
    }

    fn new_document(&mut self) -> Result<bool, AutomationError> {
        self.call_bool("new_document", json!({}))
    }

    fn open(&mut self, path: &str) -> Result<bool, AutomationError> {
        self.call_bool("open", json!({ "path": path }))
    }

    fn save(&mut self) -> Result<bool, AutomationError> {
        self.call_bool("save", json!({}))
    }

    fn save_as(&mut self, target: Option<&SaveAsTarget>) -> Result<bool, AutomationError> {
        self.call_bool("save_as", json!({ "target": target }))
    }

    fn run(&mut self, command: &Command) -> Result<bool, AutomationError> {
        let params = json!({ "command": command.to_string(), "name": command.name() });
        self.call_bool("run", params)
    }

    fn execute(&mut self, action: &str, params: &ParameterSet) -> Result<bool, AutomationError> {
        self.call_bool("execute", json!({ "action": action, "params": params }))
    }

    fn export_text(&mut self, format: TextFormat) -> Result<String, AutomationError> {
        match self.channel.call("export_text", json!({ "format": format.as_str() }))? {
            Value::String(text) => Ok(text),
            other => Err(AutomationError::Protocol(format!(
                "export_text returned {other}, expected string"
            ))),
        }
    }
}

/// Spawns one helper process per connection.
#[derive(Debug, Clone)]
pub struct BridgeConnector {
    command: BridgeCommand,
}

impl BridgeConnector {
    pub fn new(command: BridgeCommand) -> Self {
        Self { command }
    }
}

impl Connector for BridgeConnector {
    fn connect(&self) -> Result<Box<dyn Automation>, AutomationError> {
        debug!("spawning bridge {} {:?}", self.command.program, self.command.args);
        let mut child = std::process::Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| {
                AutomationError::Unavailable(format!(
                    "failed to spawn bridge `{}`: {err}",
                    self.command.program
                ))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AutomationError::Unavailable("bridge stdio was not captured".to_owned()));
        };

        let session: BridgeSession<BufReader<ChildStdout>, ChildStdin> =
            BridgeSession::handshake(BufReader::new(stdout), stdin, Some(child)).map_err(|err| {
                AutomationError::Unavailable(format!("bridge handshake failed: {err}"))
            })?;
        info!("bridge connected (window visibility: {})", session.capabilities.window_visibility);
        Ok(Box::new(session))
    }

    fn describe(&self) -> String {
        format!("bridge `{}`", self.command.program)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::automation::{InsertTextParams, StagedAction};

    fn scripted(replies: &[&str]) -> Cursor<Vec<u8>> {
        let mut script = String::new();
        for reply in replies {
            script.push_str(reply);
            script.push('\n');
        }
        Cursor::new(script.into_bytes())
    }

    fn sent_lines(writer: &[u8]) -> Vec<Value> {
        String::from_utf8_lossy(writer)
            .lines()
            .map(|line| serde_json::from_str(line).expect("request json"))
            .collect()
    }

    #[test]
    fn handshake_reads_capabilities() {
        let hello = r#"{"id":1,"result":{"capabilities":{"window_visibility":true}}}"#;
        let reader = scripted(&[hello]);
        let session = BridgeSession::handshake(reader, Vec::new(), None).expect("handshake");
        assert!(session.capabilities().window_visibility);
        assert_eq!(sent_lines(&session.channel.writer)[0]["method"], "hello");
    }

    #[test]
    fn handshake_without_capabilities_defaults_to_none() {
        let reader = scripted(&[r#"{"id":1,"result":{}}"#]);
        let session = BridgeSession::handshake(reader, Vec::new(), None).expect("handshake");
        assert_eq!(session.capabilities(), Capabilities::default());
    }

    #[test]
    fn execute_sends_ordered_parameter_items() {
        let reader = scripted(&[r#"{"id":1,"result":{}}"#, r#"{"id":2,"result":true}"#]);
        let mut session = BridgeSession::handshake(reader, Vec::new(), None).expect("handshake");

        let params = InsertTextParams { text: "hello" }.parameters();
        assert!(session.execute(InsertTextParams::ACTION, &params).expect("execute"));

        let sent = sent_lines(&session.channel.writer);
        assert_eq!(sent[1]["id"], 2);
        assert_eq!(sent[1]["method"], "execute");
        assert_eq!(sent[1]["params"]["action"], "InsertText");
        assert_eq!(sent[1]["params"]["params"]["set_id"], "HInsertText");
        assert_eq!(sent[1]["params"]["params"]["items"][0]["value"], "hello");
    }

    #[test]
    fn run_sends_rendered_command_line() {
        let reader = scripted(&[r#"{"id":1,"result":{}}"#, r#"{"id":2,"result":true}"#]);
        let mut session = BridgeSession::handshake(reader, Vec::new(), None).expect("handshake");

        let command = Command::new("CharShape").str_arg("Batang").int_arg(1000);
        assert!(session.run(&command).expect("run"));
        let sent = sent_lines(&session.channel.writer);
        assert_eq!(sent[1]["params"]["command"], "CharShape \"Batang\" 1000");
        assert_eq!(sent[1]["params"]["name"], "CharShape");
    }

    #[test]
    fn remote_errors_become_rejections() {
        let reader = scripted(&[
            r#"{"id":1,"result":{}}"#,
            r#"{"id":2,"error":{"message":"file not found"}}"#,
        ]);
        let mut session = BridgeSession::handshake(reader, Vec::new(), None).expect("handshake");
        let err = session.open("C:\\missing.hwp").unwrap_err();
        assert_eq!(err, AutomationError::rejected("open", "file not found"));
    }

    #[test]
    fn closed_output_is_a_transport_error() {
        let reader = scripted(&[r#"{"id":1,"result":{}}"#]);
        let mut session = BridgeSession::handshake(reader, Vec::new(), None).expect("handshake");
        let err = session.save().unwrap_err();
        assert!(matches!(err, AutomationError::Transport(_)), "got {err:?}");
        assert!(err.is_connection_loss());
    }

    #[test]
    fn replies_from_the_future_drop_the_connection() {
        let reader = scripted(&[r#"{"id":1,"result":{}}"#, r#"{"id":7,"result":true}"#]);
        let mut session = BridgeSession::handshake(reader, Vec::new(), None).expect("handshake");
        let err = session.new_document().unwrap_err();
        assert!(matches!(err, AutomationError::Transport(_)), "got {err:?}");
        assert!(err.is_connection_loss());
    }

    #[test]
    fn stray_output_between_replies_is_skipped() {
        let reader = scripted(&[
            r#"{"id":1,"result":{}}"#,
            "bridge: warming up",
            r#"{"id":2,"result":true}"#,
            "",
            r#"{"id":3,"result":true}"#,
            r#"{"id":4,"result":"text"}"#,
        ]);
        let mut session = BridgeSession::handshake(reader, Vec::new(), None).expect("handshake");

        assert!(session.new_document().expect("new document"));
        assert!(session.save().expect("save"));
        assert_eq!(session.export_text(TextFormat::Text).expect("export"), "text");
    }

    #[test]
    fn late_replies_to_earlier_requests_are_skipped() {
        let reader = scripted(&[
            r#"{"id":1,"result":{}}"#,
            r#"{"id":1,"result":{}}"#,
            r#"{"id":2,"result":true}"#,
        ]);
        let mut session = BridgeSession::handshake(reader, Vec::new(), None).expect("handshake");

        assert!(session.run(&Command::new("BreakPara")).expect("run"));
    }

    #[test]
    fn non_string_text_export_is_rejected() {
        let reader = scripted(&[r#"{"id":1,"result":{}}"#, r#"{"id":2,"result":42}"#]);
        let mut session = BridgeSession::handshake(reader, Vec::new(), None).expect("handshake");
        let err = session.export_text(TextFormat::Text).unwrap_err();
        assert!(matches!(err, AutomationError::Protocol(_)), "got {err:?}");
    }

    #[test]
    fn bridge_command_splits_on_whitespace() {
        assert_eq!(
            BridgeCommand::parse("  powershell -File bridge.ps1 "),
            Some(BridgeCommand {
                program: "powershell".to_owned(),
                args: vec!["-File".to_owned(), "bridge.ps1".to_owned()],
            })
        );
        assert_eq!(BridgeCommand::parse("   "), None);
    }

    #[test]
    fn missing_bridge_program_is_unavailable() {
        let connector = BridgeConnector::new(BridgeCommand {
            program: "hwp-mcp-bridge-that-does-not-exist".to_owned(),
            args: Vec::new(),
        });
        let err = connector.connect().err().expect("spawn should fail");
        assert!(matches!(err, AutomationError::Unavailable(_)), "got {err:?}");
    }
}
