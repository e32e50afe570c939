//! Purpose: `matjson` CLI entry point and command-line surface.
//! Role: Binary crate root; parses args, runs commands, prints to stdout.
//! Invariants: Command output goes to stdout; diagnostics and errors go to
//! Invariants: stderr (human text on a tty, JSON envelope otherwise).
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::aot::Shell;
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use matjson::api::{
    DecodeOptions, EncodeOptions, Error, ErrorKind, ReplacementStyle, Value, decode, encode,
    to_exit_code,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    init_tracing();
    let cli = Cli::parse();
    command_dispatch::dispatch_command(cli.command)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "matjson",
    version,
    about = "MATLAB-compatible JSON codec for N-D arrays, cells, and structs",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    after_help = r#"EXAMPLES
  $ echo '[[1,2],[3,4]]' | matjson inspect
  $ echo '[[1,2],[3,4]]' | matjson normalize --pretty
  $ matjson normalize data.json --replacement-style delete --prefix m_
"#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode JSON and re-encode it through the native value model
    Normalize {
        #[arg(value_hint = ValueHint::FilePath, help = "Input file (stdin when omitted)")]
        file: Option<PathBuf>,
        #[command(flatten)]
        decode_args: DecodeArgs,
        #[arg(long, help = "Indent nested structures by two spaces")]
        pretty: bool,
        #[arg(
            long,
            help = "Write NaN/Infinity/-Infinity literal tokens instead of null"
        )]
        keep_nonfinite: bool,
    },
    /// Decode JSON and report the inferred native kind and shape
    Inspect {
        #[arg(value_hint = ValueHint::FilePath, help = "Input file (stdin when omitted)")]
        file: Option<PathBuf>,
        #[command(flatten)]
        decode_args: DecodeArgs,
        #[arg(long, help = "Emit the report as JSON")]
        json: bool,
    },
    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct DecodeArgs {
    #[arg(long, help = "Keep object keys as-is instead of sanitizing them")]
    no_sanitize_names: bool,
    #[arg(
        long,
        value_enum,
        default_value = "underscore",
        help = "How invalid field-name characters are replaced"
    )]
    replacement_style: StyleArg,
    #[arg(
        long,
        default_value = "x",
        help = "Prefix prepended to field names that need one"
    )]
    prefix: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StyleArg {
    Underscore,
    Delete,
    Hex,
}

impl From<StyleArg> for ReplacementStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Underscore => ReplacementStyle::Underscore,
            StyleArg::Delete => ReplacementStyle::Delete,
            StyleArg::Hex => ReplacementStyle::Hex,
        }
    }
}

impl DecodeArgs {
    fn to_options(&self) -> Result<DecodeOptions, Error> {
        DecodeOptions::new()
            .with_sanitize_names(!self.no_sanitize_names)
            .with_style(self.replacement_style.into())
            .with_prefix(&self.prefix)
    }
}

fn read_input(file: Option<&Path>) -> Result<String, Error> {
    match file {
        Some(path) => fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        }),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(text)
        }
    }
}

#[derive(Serialize)]
struct InspectReport {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dims: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    numel: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<String>>,
}

fn summarize(value: &Value) -> InspectReport {
    let dims = value.dims().map(|dims| dims.as_slice().to_vec());
    let numel = value.dims().map(|dims| dims.numel());
    let fields = match value {
        Value::Struct(record) => Some(record.field_names().map(str::to_string).collect()),
        Value::StructArray(array) => Some(array.field_names().map(str::to_string).collect()),
        _ => None,
    };
    InspectReport {
        kind: value.kind_name(),
        dims,
        numel,
        fields,
    }
}

fn emit_inspect_human(report: &InspectReport) {
    println!("kind: {}", report.kind);
    if let Some(dims) = &report.dims {
        let rendered = dims
            .iter()
            .map(|extent| extent.to_string())
            .collect::<Vec<_>>()
            .join("x");
        println!("dims: {rendered}");
    }
    if let Some(numel) = report.numel {
        println!("numel: {numel}");
    }
    if let Some(fields) = &report.fields {
        println!("fields: {}", fields.join(", "));
    }
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {err}");
        if let Some(hint) = err.hint() {
            eprintln!("hint: {hint}");
        }
        return;
    }
    let value = json!({
        "error": {
            "kind": format!("{:?}", err.kind()),
            "message": err.to_string(),
            "offset": err.offset(),
        }
    });
    let encoded = serde_json::to_string(&value)
        .unwrap_or_else(|_| "{\"error\":{\"kind\":\"Internal\"}}".to_string());
    eprintln!("{encoded}");
}
