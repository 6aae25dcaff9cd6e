//! Language Server Protocol implementation for hydrui scripts.
//!
//! This module provides an LSP server for editing filter and sort
//! expressions and scripts:
//! - Real-time parse diagnostics
//! - Completion of names and members at the cursor
//!
//! # Architecture
//!
//! The LSP server uses `tower-lsp` and communicates via JSON-RPC over stdio.
//! It keeps the text of open documents; every request re-parses from it.
//!
//! ```text
//! Editor (VSCode, etc.)
//!     ↓ JSON-RPC over stdio
//! ScriptLanguageServer
//!     ↓ Uses
//! hydrui-script (parser, get_suggestions, placeholder_resolver)
//! ```
//!
//! The script core is single-threaded (`Rc` values), so analysis runs in
//! plain functions that finish before the handler awaits anything.
//!
//! A document may hold either a single expression (what the search page
//! runs) or a script. Each request tries the expression form first.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::ast::{Expr, Node, Span, Statement};
use crate::infer::get_suggestions;
use crate::parser::{ParseError, Parser};
use crate::query::placeholder_resolver;

/// State for a single open document.
#[derive(Debug)]
pub struct DocumentState {
    /// The document's content.
    pub content: String,
    /// The document's version (for incremental updates).
    pub version: i32,
}

/// Shared state for the language server.
#[derive(Debug, Default)]
pub struct ServerState {
    /// Open documents indexed by URI.
    pub documents: HashMap<Url, DocumentState>,
}

/// A parsed document.
#[derive(Debug)]
enum Parsed {
    Expr(Expr),
    Script(Statement),
}

impl Parsed {
    fn node(&self) -> Node<'_> {
        match self {
            Parsed::Expr(expr) => Node::Expr(expr),
            Parsed::Script(stmt) => Node::Statement(stmt),
        }
    }
}

/// Parses a document as an expression, or failing that as a script.
///
/// When both fail, the error that got further into the text is reported.
fn parse_document(source: &str, allow_partial: bool) -> std::result::Result<Parsed, ParseError> {
    let expr_err = match Parser::new(source, allow_partial).and_then(|mut p| p.parse_expression()) {
        Ok(expr) => return Ok(Parsed::Expr(expr)),
        Err(err) => err,
    };
    match Parser::new(source, allow_partial).and_then(|mut p| p.parse_script()) {
        Ok(script) => Ok(Parsed::Script(script)),
        Err(script_err) if script_err.span().start >= expr_err.span().start => Err(script_err),
        Err(_) => Err(expr_err),
    }
}

/// Parses strictly and reports the first error.
fn get_diagnostics(source: &str) -> Vec<Diagnostic> {
    match parse_document(source, false) {
        Ok(_) => Vec::new(),
        Err(err) => {
            let span = err.span();
            vec![Diagnostic {
                range: span_to_range(source, span.start, span.end),
                severity: Some(DiagnosticSeverity::ERROR),
                code: None,
                code_description: None,
                source: Some("hydrui-script".to_string()),
                message: err.to_string(),
                related_information: None,
                tags: None,
                data: None,
            }]
        }
    }
}

/// Completions at `position`, inferred against a placeholder `file`.
fn get_completions(source: &str, position: Position) -> Vec<CompletionItem> {
    let Some(offset) = position_to_offset(source, position) else {
        return Vec::new();
    };
    let parsed = match parse_document(source, true) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::debug!("no completions, parse failed: {err}");
            return Vec::new();
        }
    };
    let suggestions = match get_suggestions(placeholder_resolver(), parsed.node(), offset) {
        Ok(Some(suggestions)) => suggestions,
        Ok(None) => return Vec::new(),
        Err(err) => {
            log::debug!("no completions, inference failed: {err}");
            return Vec::new();
        }
    };
    let Span { start, end } = suggestions.replace_span;
    let range = span_to_range(source, start, end);
    suggestions
        .identifiers
        .into_iter()
        .enumerate()
        .map(|(rank, name)| CompletionItem {
            label: name.clone(),
            kind: Some(CompletionItemKind::VARIABLE),
            // Keep the ranker's order; editors sort by this text.
            sort_text: Some(format!("{rank:04}")),
            text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                range,
                new_text: name,
            })),
            ..Default::default()
        })
        .collect()
}

/// The hydrui script language server.
pub struct ScriptLanguageServer {
    /// Client handle for sending notifications.
    client: Client,
    /// Shared server state.
    state: Arc<RwLock<ServerState>>,
}

impl ScriptLanguageServer {
    /// Creates a new language server instance.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(ServerState::default())),
        }
    }

    /// Analyzes a document and publishes diagnostics.
    async fn analyze_document(&self, uri: &Url, content: &str) {
        let diagnostics = get_diagnostics(content);
        self.client
            .publish_diagnostics(uri.clone(), diagnostics, None)
            .await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for ScriptLanguageServer {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Document sync - we want full content on each change
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string()]),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "hydrui-script-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "hydrui-script LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let content = params.text_document.text;
        let version = params.text_document.version;

        {
            let mut state = self.state.write().await;
            state.documents.insert(
                uri.clone(),
                DocumentState {
                    content: content.clone(),
                    version,
                },
            );
        }

        self.analyze_document(&uri, &content).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        // FULL sync: the one change carries the whole text
        if let Some(change) = params.content_changes.into_iter().next() {
            let content = change.text;

            {
                let mut state = self.state.write().await;
                if let Some(doc) = state.documents.get_mut(&uri) {
                    doc.content = content.clone();
                    doc.version = params.text_document.version;
                }
            }

            self.analyze_document(&uri, &content).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        {
            let mut state = self.state.write().await;
            state.documents.remove(&uri);
        }

        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let content = {
            let state = self.state.read().await;
            state.documents.get(uri).map(|d| d.content.clone())
        };

        let Some(content) = content else {
            return Ok(None);
        };
        let items = get_completions(&content, position);
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(CompletionResponse::Array(items)))
    }
}

/// Converts a byte range to an LSP Range.
fn span_to_range(source: &str, start: usize, end: usize) -> Range {
    let start_pos = offset_to_position(source, start);
    let end_pos = offset_to_position(source, end);
    Range {
        start: start_pos,
        end: end_pos,
    }
}

/// Converts a byte offset to an LSP Position (line, UTF-16 character).
fn offset_to_position(source: &str, offset: usize) -> Position {
    let mut line = 0u32;
    let mut character = 0u32;

    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            character = 0;
        } else {
            character += c.len_utf16() as u32;
        }
    }

    Position { line, character }
}

/// Converts an LSP Position to a byte offset.
fn position_to_offset(source: &str, position: Position) -> Option<usize> {
    let mut current_line = 0u32;
    let mut current_char = 0u32;

    for (i, c) in source.char_indices() {
        // A position inside a surrogate pair snaps to the next character.
        if current_line == position.line && current_char >= position.character {
            return Some(i);
        }
        if c == '\n' {
            if current_line == position.line {
                // Position is past end of line
                return Some(i);
            }
            current_line += 1;
            current_char = 0;
        } else {
            current_char += c.len_utf16() as u32;
        }
    }

    // Position might be at the very end
    if current_line == position.line {
        Some(source.len())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "let s = \"x\";\nreturn s.le;\n";

    fn pos(line: u32, character: u32) -> Position {
        Position { line, character }
    }

    #[test]
    fn test_offset_to_position() {
        assert_eq!(offset_to_position(SOURCE, 0), pos(0, 0));
        assert_eq!(offset_to_position(SOURCE, 4), pos(0, 4));
        assert_eq!(offset_to_position(SOURCE, 13), pos(1, 0));
    }

    #[test]
    fn test_position_to_offset() {
        assert_eq!(position_to_offset(SOURCE, pos(0, 0)), Some(0));
        assert_eq!(position_to_offset(SOURCE, pos(0, 4)), Some(4));
        assert_eq!(position_to_offset(SOURCE, pos(1, 0)), Some(13));
        assert_eq!(position_to_offset(SOURCE, pos(5, 0)), None);
    }

    #[test]
    fn test_positions_count_utf16_units() {
        let source = "let s = \"🙂\"; s.le";
        // The emoji is 4 bytes and 2 UTF-16 units.
        assert_eq!(offset_to_position(source, 15), pos(0, 13));
        assert_eq!(position_to_offset(source, pos(0, 13)), Some(15));
        assert_eq!(position_to_offset(source, pos(0, 10)), Some(13));
        let items = get_completions(source, pos(0, 18));
        let Some(CompletionTextEdit::Edit(edit)) = &items[0].text_edit else {
            panic!("expected a text edit");
        };
        assert_eq!(edit.range, Range::new(pos(0, 16), pos(0, 18)));
    }

    #[test]
    fn test_span_to_range() {
        let range = span_to_range(SOURCE, 13, 19);
        assert_eq!(range.start, pos(1, 0));
        assert_eq!(range.end, pos(1, 6));
    }

    #[test]
    fn test_expression_and_script_documents_parse() {
        assert!(matches!(
            parse_document("file.size > 100", false),
            Ok(Parsed::Expr(_))
        ));
        assert!(matches!(parse_document(SOURCE, false), Ok(Parsed::Script(_))));
    }

    #[test]
    fn test_diagnostics_report_the_error() {
        assert!(get_diagnostics("file.size > 100").is_empty());
        let diagnostics = get_diagnostics("1 +");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
    }

    #[test]
    fn test_member_completion_in_script() {
        let items = get_completions(SOURCE, pos(1, 11));
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["length"]);
        let Some(CompletionTextEdit::Edit(edit)) = &items[0].text_edit else {
            panic!("expected a text edit");
        };
        assert_eq!(edit.range, Range::new(pos(1, 9), pos(1, 11)));
    }

    #[test]
    fn test_file_completion_in_expression() {
        let items = get_completions("file.ha", pos(0, 7));
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["hash", "hasLike", "hasDislike"]);
    }
}
