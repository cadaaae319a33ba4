#![doc = include_str!("../README.md")]
//! Stash CLI tool
//!
//! Disambiguation heuristic:
//!   If arg contains '.' or '/' → file mode
//!   If arg is '-' → stdin (file mode)
//!   Otherwise → subcommand mode
//!
//! Examples:
//!   stash pipeline.conf            - file mode (has '.')
//!   stash ./pipeline               - file mode (has '/')
//!   stash -                        - stdin
//!   stash tree pipeline.conf       - subcommand with file arg

use std::io::{self, Read};

use facet::Facet;
use figue as args;
use stash_tree::{Config, DecodeError, Node, Operation};
use tracing::debug;

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_SYNTAX_ERROR: i32 = 1;
const EXIT_IO_ERROR: i32 = 3;

// ============================================================================
// CLI argument structures
// ============================================================================

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File mode arguments: `stash <file> [options]`
#[derive(Facet, Debug, Default)]
struct FileArgs {
    /// Input file path (or "-" for stdin)
    #[facet(args::positional)]
    input: String,

    /// Output as JSON to file (or "-" for stdout)
    #[facet(args::named, default)]
    json_out: Option<String>,
}

/// Top-level CLI with optional subcommand
#[derive(Facet, Debug)]
struct Args {
    /// Show version
    #[facet(args::named, args::short = 'V', default)]
    version: bool,

    /// Subcommand to run
    #[facet(args::subcommand, default)]
    command: Option<Command>,
}

/// Available subcommands
#[derive(Facet, Debug)]
#[repr(u8)]
enum Command {
    /// Show the decoded tree
    Tree {
        /// Input file
        #[facet(args::positional)]
        file: String,
    },

    /// Decode only; the exit code tells whether the file is valid
    Check {
        /// Input file
        #[facet(args::positional)]
        file: String,
    },
}

// ============================================================================
// Main entry point
// ============================================================================

/// Determines if an argument should be treated as a file path.
///
/// Returns true if the argument:
/// - Contains '.' (e.g., pipeline.conf)
/// - Contains '/' (e.g., ./pipeline, /etc/stash/pipeline)
/// - Is exactly '-' (stdin)
fn is_file_arg(arg: &str) -> bool {
    arg == "-" || arg.contains('.') || arg.contains('/')
}

fn main() {
    init_tracing();

    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    if raw_args.is_empty() {
        print_help();
        std::process::exit(EXIT_SUCCESS);
    }

    if raw_args[0] == "--version" || raw_args[0] == "-V" {
        println!("stash {VERSION}");
        std::process::exit(EXIT_SUCCESS);
    }

    if raw_args[0] == "--help" || raw_args[0] == "-h" {
        print_help();
        std::process::exit(EXIT_SUCCESS);
    }

    let result = if is_file_arg(&raw_args[0]) {
        run_file_mode(&raw_args)
    } else {
        run_subcommand_mode(&raw_args)
    };

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            match &e {
                CliError::Decode {
                    error,
                    source,
                    filename,
                } => {
                    if let Some(parse_error) = error.as_parse_error() {
                        parse_error.write_report(filename, source, io::stderr());
                    } else {
                        eprintln!("error: {e}");
                    }
                }
                _ => eprintln!("error: {e}"),
            }
            std::process::exit(e.exit_code());
        }
    }
}

/// Log to stderr, `warn` and above unless `RUST_LOG` says otherwise.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn print_help() {
    eprintln!("stash {VERSION} - command-line tool for stash pipeline configurations\n");
    eprintln!("USAGE:");
    eprintln!("    stash <file> [options]          Decode a configuration and print its tree");
    eprintln!("    stash <command> [args]          Run a subcommand\n");
    eprintln!("    Files are detected by '.' or '/' in the name, or '-' for stdin.");
    eprintln!("    Bare words (e.g., 'tree', 'check') are subcommands.\n");
    eprintln!("FILE MODE OPTIONS:");
    eprintln!("        --json-out <FILE>           Output as JSON (use '-' for stdout)\n");
    eprintln!("SUBCOMMANDS:");
    eprintln!("    tree <file>                     Show the decoded tree");
    eprintln!("    check <file>                    Decode only, report errors\n");
    eprintln!("EXAMPLES:");
    eprintln!("    stash pipeline.conf             Print the decoded tree");
    eprintln!("    stash pipeline.conf --json-out - Print the tree as JSON");
    eprintln!("    stash check pipeline.conf       Validate a configuration");
}

fn run_file_mode(args: &[String]) -> Result<(), CliError> {
    let args_strs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let opts: FileArgs =
        figue::from_slice(&args_strs).map_err(|e| CliError::Usage(format!("{e:?}")))?;

    let config = load(&opts.input)?;

    match opts.json_out {
        Some(ref json_path) => {
            let json = config_to_json(&config);
            let output = serde_json::to_string_pretty(&json)
                .map_err(|e| CliError::Io(io::Error::other(e)))?;
            write_output(json_path, &format!("{output}\n"))?;
        }
        None => print!("{}", config.dump()),
    }

    Ok(())
}

fn run_subcommand_mode(args: &[String]) -> Result<(), CliError> {
    let args_strs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let parsed: Args =
        figue::from_slice(&args_strs).map_err(|e| CliError::Usage(format!("{e:?}")))?;

    if parsed.version {
        println!("stash {VERSION}");
        return Ok(());
    }

    match parsed.command {
        Some(Command::Tree { file }) => run_tree(&file),
        Some(Command::Check { file }) => run_check(&file),
        None => {
            print_help();
            Ok(())
        }
    }
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Decode {
        error: DecodeError,
        source: String,
        filename: String,
    },
    Usage(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => EXIT_IO_ERROR,
            CliError::Decode {
                error: DecodeError::Io(_),
                ..
            } => EXIT_IO_ERROR,
            CliError::Decode { .. } => EXIT_SYNTAX_ERROR,
            CliError::Usage(_) => EXIT_SYNTAX_ERROR,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e}"),
            CliError::Decode {
                error, filename, ..
            } => write!(f, "{filename}: {error}"),
            CliError::Usage(e) => write!(f, "{e}"),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

// ============================================================================
// Subcommand implementations
// ============================================================================

fn run_tree(file: &str) -> Result<(), CliError> {
    let config = load(file)?;
    print!("{}", config.dump());
    Ok(())
}

fn run_check(file: &str) -> Result<(), CliError> {
    let config = load(file)?;
    let sections: Vec<_> = config
        .sections()
        .filter_map(|node| node.as_section().map(|s| s.name.as_str()))
        .collect();
    eprintln!("{}: ok ({})", display_name(file), sections.join(", "));
    Ok(())
}

// ============================================================================
// I/O helpers
// ============================================================================

fn display_name(file: &str) -> &str {
    if file == "-" { "<stdin>" } else { file }
}

/// Read and decode one configuration.
fn load(file: &str) -> Result<Config, CliError> {
    let source = read_input(Some(file))?;
    let filename = display_name(file);
    debug!(file = filename, bytes = source.len(), "decoding");

    stash_tree::decode_str(&source).map_err(|error| CliError::Decode {
        error,
        source,
        filename: filename.to_string(),
    })
}

fn read_input(file: Option<&str>) -> Result<String, io::Error> {
    match file {
        Some("-") | None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path),
    }
}

fn write_output(path: &str, content: &str) -> Result<(), io::Error> {
    if path == "-" {
        print!("{content}");
        Ok(())
    } else {
        std::fs::write(path, content)
    }
}

// ============================================================================
// JSON conversion
// ============================================================================

fn config_to_json(config: &Config) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    for section in config.sections() {
        if let Some(s) = section.as_section() {
            obj.insert(s.name.as_str().to_string(), children_to_json(section));
        }
    }
    serde_json::Value::Object(obj)
}

fn children_to_json(node: Node<'_>) -> serde_json::Value {
    serde_json::Value::Array(node.children().map(node_to_json).collect())
}

fn node_to_json(node: Node<'_>) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    match node.operation() {
        Operation::Section(section) => {
            obj.insert(
                "section".to_string(),
                serde_json::Value::String(section.name.as_str().to_string()),
            );
            obj.insert("children".to_string(), children_to_json(node));
        }
        Operation::Plugin(plugin) => {
            let settings = plugin
                .settings
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            obj.insert(
                "plugin".to_string(),
                serde_json::Value::String(plugin.name.clone()),
            );
            obj.insert("settings".to_string(), serde_json::Value::Object(settings));
        }
        Operation::Branch(branch) => {
            obj.insert(
                "branch".to_string(),
                serde_json::Value::String(branch.kind.as_str().to_string()),
            );
            obj.insert(
                "expression".to_string(),
                serde_json::Value::String(branch.expression.clone()),
            );
            obj.insert("children".to_string(), children_to_json(node));
        }
    }
    serde_json::Value::Object(obj)
}
