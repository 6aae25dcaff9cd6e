//! hydrui-script Language Server - Entry Point
//!
//! This is the main entry point for the LSP server. It sets up the
//! tower-lsp service and runs it over stdio.
//!
//! # Usage
//!
//! The LSP server is typically started by an editor/IDE:
//!
//! ```bash
//! hydrui-script-lsp
//! ```
//!
//! For debugging, you can run with logging:
//!
//! ```bash
//! RUST_LOG=debug hydrui-script-lsp 2>lsp.log
//! ```

use tower_lsp::{LspService, Server};

use hydrui_script::lsp::ScriptLanguageServer;

#[tokio::main]
async fn main() {
    // Logs go to stderr so they don't interfere with LSP
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!(
        "Starting hydrui-script LSP server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(ScriptLanguageServer::new);

    Server::new(stdin, stdout, socket).serve(service).await;
}
