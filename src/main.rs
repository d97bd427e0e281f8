// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of hwp-mcp and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! hwp-mcp CLI entrypoint.
//!
//! Serves MCP over stdio by default. `--http-port` serves streamable HTTP at
//! `http://127.0.0.1:<port>/mcp` instead.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tokio::sync::Mutex;
use tracing::info;

use hwp_mcp::automation::bridge::BridgeConnector;
use hwp_mcp::automation::memory::MemoryConnector;
use hwp_mcp::automation::{Connector, Unconfigured};
use hwp_mcp::config::{parse_options, Backend, ServerOptions, BRIDGE_ENV};
use hwp_mcp::dispatch::{Dispatcher, DispatcherOptions};
use hwp_mcp::logging::{self, DEFAULT_LOG_FILE};
use hwp_mcp::mcp::HwpMcp;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--bridge <command> [--bridge-arg <arg>]...] [--hidden] [--http-port <port>] [--log-file <path>] [--temp-save-path <path>]\n  {program} --demo [--http-port <port>] [--log-file <path>] [--temp-save-path <path>]\n\nServes MCP over stdio unless --http-port is given (0 = ephemeral).\n\n--bridge starts a helper process that drives HWP over a JSON-lines protocol on its\nstdin/stdout; {BRIDGE_ENV} supplies a default command line.\n--demo uses a built-in in-memory editor instead of HWP.\nWithout either, every document tool reports a connection failure.\n\n--hidden keeps the HWP window hidden. Logs go to stderr and to --log-file\n(default {DEFAULT_LOG_FILE}); RUST_LOG sets the filter."
    );
}

fn connector(backend: &Backend) -> Arc<dyn Connector> {
    match backend {
        Backend::Demo => Arc::new(MemoryConnector::new()),
        Backend::Bridge(command) => Arc::new(BridgeConnector::new(command.clone())),
        Backend::Unconfigured => Arc::new(Unconfigured),
    }
}

fn dispatcher_options(options: &ServerOptions) -> DispatcherOptions {
    let defaults = DispatcherOptions::default();
    DispatcherOptions {
        visible: !options.hidden,
        temp_save_path: options.temp_save_path.clone().unwrap_or(defaults.temp_save_path),
    }
}

async fn serve_http(mcp: HwpMcp, port: u16) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("serving MCP over streamable HTTP at http://{}/mcp", listener.local_addr()?);

    let config =
        StreamableHttpServerConfig { stateful_mode: true, ..StreamableHttpServerConfig::default() };
    let shutdown_token = config.cancellation_token.clone();

    let session_manager = Arc::new(LocalSessionManager::default());
    let mcp_service = StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config);

    let router = Router::new().nest_service("/mcp", mcp_service);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("interrupt received, shutting down");
            shutdown_token.cancel();
        })
        .await?;
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "hwp-mcp".to_owned());

        let options = match parse_options(args, std::env::var(BRIDGE_ENV).ok()) {
            Ok(options) => options,
            Err(err) => {
                eprintln!("{program}: {err}");
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let log_file = options.log_file.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
        logging::init(Some(&log_file));

        let connector = connector(&options.backend);
        info!("starting hwp-mcp (backend: {})", connector.describe());

        let dispatcher =
            Arc::new(Mutex::new(Dispatcher::new(connector, dispatcher_options(&options))));
        let mcp = HwpMcp::with_shared_dispatcher(Arc::clone(&dispatcher));

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        runtime.block_on(async move {
            let served = match options.http_port {
                Some(port) => serve_http(mcp, port).await,
                None => mcp.serve_stdio().await.map_err(Into::into),
            };
            dispatcher.lock().await.shutdown();
            info!("hwp-mcp stopped");
            served
        })
    })();

    if let Err(err) = result {
        eprintln!("hwp-mcp: {err}");
        std::process::exit(1);
    }
}
