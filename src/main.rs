//! hydrui-script - run and inspect hydrui scripts
//!
//! This is the command-line interface for the hydrui-script library.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Args, Parser as ClapParser, Subcommand};
use serde_json::json;
use thiserror::Error;

use hydrui_script::ast::Node;
use hydrui_script::error::ScriptError;
use hydrui_script::eval::evaluate;
use hydrui_script::infer::get_suggestions;
use hydrui_script::lexer::{LexError, scan_all};
use hydrui_script::parser::{ParseError, Parser};
use hydrui_script::query::{filter_files, sort_files};
use hydrui_script::resolver::{Resolver, StandardResolver};
use hydrui_script::value::{FileLookup, FileMetadata, MemoryFileStore, Value};

/// hydrui-script - run and inspect hydrui scripts
#[derive(ClapParser, Debug)]
#[command(name = "hydrui-script")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tokens of the source
    Tokens {
        #[command(flatten)]
        input: Input,
    },
    /// Parse the source and print it back
    Parse {
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        mode: Mode,
        /// Tolerate incomplete input
        #[arg(long)]
        partial: bool,
        /// Print the syntax tree instead of the source
        #[arg(long)]
        tree: bool,
    },
    /// Evaluate the source and print the result as JSON
    Eval {
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        mode: Mode,
        #[command(flatten)]
        env: Environment,
    },
    /// Print completions for a byte offset in the source
    Suggest {
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        mode: Mode,
        #[command(flatten)]
        env: Environment,
        /// Byte offset of the cursor (default: end of input)
        #[arg(long)]
        offset: Option<usize>,
    },
    /// Print the files for which an expression is true
    Filter {
        /// The filter expression; `file` is the file being tested
        expression: String,
        /// JSON file with file metadata
        #[arg(long, value_name = "FILE")]
        files: PathBuf,
    },
    /// Print the files ordered by the key an expression computes
    Sort {
        /// The sort key expression; `file` is the file being keyed
        expression: String,
        /// JSON file with file metadata
        #[arg(long, value_name = "FILE")]
        files: PathBuf,
    },
}

/// Where the source comes from; standard input if neither is given.
#[derive(Args, Debug)]
struct Input {
    /// Source file
    #[arg(value_name = "FILE", conflicts_with = "expr")]
    file: Option<PathBuf>,

    /// Source text
    #[arg(short = 'e', long = "expr", value_name = "SOURCE")]
    expr: Option<String>,
}

#[derive(Args, Debug)]
struct Mode {
    /// Treat the source as a script rather than a single expression
    #[arg(long)]
    script: bool,
}

#[derive(Args, Debug)]
struct Environment {
    /// Bind a global, e.g. `--bind 'tags=["a","b"]'`
    #[arg(long = "bind", value_name = "NAME=JSON", value_parser = parse_binding)]
    bindings: Vec<(String, serde_json::Value)>,

    /// JSON file with file metadata, used by `File(...)`
    #[arg(long, value_name = "FILE")]
    files: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Error reading '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Error reading standard input: {0}")]
    Stdin(io::Error),

    #[error("Invalid file metadata in '{}': {source}", path.display())]
    Files {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Script(#[from] ScriptError),
}

fn parse_binding(arg: &str) -> Result<(String, serde_json::Value), String> {
    let (name, json) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=JSON, got '{arg}'"))?;
    let value = serde_json::from_str(json).map_err(|e| format!("invalid JSON for {name}: {e}"))?;
    Ok((name.to_string(), value))
}

impl Input {
    fn read(&self) -> Result<String, CliError> {
        if let Some(expr) = &self.expr {
            return Ok(expr.clone());
        }
        match &self.file {
            Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            }),
            None => {
                let mut source = String::new();
                io::stdin()
                    .read_to_string(&mut source)
                    .map_err(CliError::Stdin)?;
                Ok(source)
            }
        }
    }
}

fn load_files(path: &Path) -> Result<MemoryFileStore, CliError> {
    let json = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    MemoryFileStore::from_json(&json).map_err(|source| CliError::Files {
        path: path.to_path_buf(),
        source,
    })
}

impl Environment {
    fn resolver(&self) -> Result<Rc<dyn Resolver>, CliError> {
        let globals: BTreeMap<String, Value> = self
            .bindings
            .iter()
            .map(|(name, json)| (name.clone(), Value::from_json(json)))
            .collect();
        let resolver = StandardResolver::new(globals);
        Ok(match &self.files {
            Some(path) => Rc::new(resolver.with_file_lookup(Rc::new(load_files(path)?))),
            None => Rc::new(resolver),
        })
    }
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

fn print_files(files: &[FileMetadata]) {
    print_json(&serde_json::to_value(files).unwrap_or_default());
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Tokens { input } => {
            let source = input.read()?;
            let tokens: Vec<serde_json::Value> = scan_all(&source)?
                .into_iter()
                .map(|token| {
                    json!({
                        "kind": format!("{:?}", token.kind),
                        "start": token.span.start,
                        "end": token.span.end,
                        "text": token.text,
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(tokens));
        }
        Command::Parse {
            input,
            mode,
            partial,
            tree,
        } => {
            let source = input.read()?;
            let mut parser = Parser::new(&source, partial)?;
            if mode.script {
                let script = parser.parse_script()?;
                if tree {
                    println!("{script:#?}");
                } else {
                    println!("{}", script.script_source());
                }
            } else {
                let expr = parser.parse_expression()?;
                if tree {
                    println!("{expr:#?}");
                } else {
                    println!("{}", expr.source());
                }
            }
        }
        Command::Eval { input, mode, env } => {
            let source = input.read()?;
            let resolver = env.resolver()?;
            let mut parser = Parser::new(&source, false)?;
            let value = if mode.script {
                let script = parser.parse_script()?;
                evaluate(resolver, Node::Statement(&script)).await?
            } else {
                let expr = parser.parse_expression()?;
                evaluate(resolver, Node::Expr(&expr)).await?
            };
            print_json(&value.raw());
        }
        Command::Suggest {
            input,
            mode,
            env,
            offset,
        } => {
            let source = input.read()?;
            let offset = offset.unwrap_or(source.len());
            let resolver = env.resolver()?;
            let mut parser = Parser::new(&source, true)?;
            let suggestions = if mode.script {
                let script = parser.parse_script()?;
                get_suggestions(resolver, Node::Statement(&script), offset)?
            } else {
                let expr = parser.parse_expression()?;
                get_suggestions(resolver, Node::Expr(&expr), offset)?
            };
            match suggestions {
                Some(suggestions) => print_json(&json!({
                    "identifiers": suggestions.identifiers,
                    "replace_span": {
                        "start": suggestions.replace_span.start,
                        "end": suggestions.replace_span.end,
                    },
                })),
                None => print_json(&serde_json::Value::Null),
            }
        }
        Command::Filter { expression, files } => {
            let store = Rc::new(load_files(&files)?);
            let lookup: Rc<dyn FileLookup> = store.clone();
            let kept = filter_files(&expression, store.files(), Some(lookup)).await?;
            print_files(&kept);
        }
        Command::Sort { expression, files } => {
            let store = Rc::new(load_files(&files)?);
            let lookup: Rc<dyn FileLookup> = store.clone();
            let sorted = sort_files(&expression, store.files(), Some(lookup)).await?;
            print_files(&sorted);
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("{cli:?}");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binding() {
        let (name, value) = parse_binding("tags=[\"a\"]").unwrap();
        assert_eq!(name, "tags");
        assert_eq!(value, json!(["a"]));
        assert!(parse_binding("novalue").is_err());
        assert!(parse_binding("x={").is_err());
    }

    #[test]
    fn test_cli_shape() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bindings_become_globals() {
        let env = Environment {
            bindings: vec![("n".to_string(), json!(3))],
            files: None,
        };
        let resolver = env.resolver().unwrap();
        assert_eq!(resolver.resolve("n").unwrap(), Value::Number(3.0));
    }
}
