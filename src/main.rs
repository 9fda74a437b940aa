//! Purpose: `pickshape` CLI entry point and command-line surface.
//! Role: Binary crate root; parses args, sets up logging, delegates to command dispatch.
//! Invariants: stdout carries projected JSON only; diagnostics go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::ffi::OsString;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod ingest;
mod render;

use ingest::{ErrorPolicy, IngestConfig, IngestMode, ingest};
use pickshape::api::{Error, ErrorKind, Preset, TemplateRef, project, to_exit_code};
use pickshape::notice::{Notice, notice_json};
use render::{RenderStyle, render_json};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command, color_mode)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let replacement = arg.to_str().and_then(|value| match value {
                "---help" => Some("--help"),
                "---version" => Some("--version"),
                _ => None,
            });
            replacement.map(OsString::from).unwrap_or(arg)
        })
        .collect()
}

#[derive(Parser)]
#[command(
    name = "pickshape",
    version,
    about = "Pick, rename and re-nest fields of JSON API responses",
    long_about = None,
    before_help = r#"A template says which fields to keep and where to put them:
  ["key"]                                    copy one value through
  {"out": "in.path"}                         rename / re-nest a value
  {"ids": {"keyName": "issues", "fields": ["id"]}}   collect from every array element
  {"-": {"keyName": "issues", "fields": {...}}}      collect without a wrapping key
"#,
    after_help = r#"EXAMPLES
  $ curl -s "$JIRA/rest/api/2/search?jql=project=OPS" | pickshape project --preset issue-search
  $ pickshape project response.json --template shape.json --pretty
  $ pickshape project --in jsonl -e skip --template-json '["key"]' < issues.jsonl
  $ pickshape check --template shape.json

Set RUST_LOG=pickshape=trace to see how each template entry resolved."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize JSON and diagnostics"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InputMode {
    Json,
    Jsonl,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ErrorPolicyCli {
    Stop,
    Skip,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct TemplateArgs {
    #[arg(
        long,
        short = 't',
        help = "Template file (JSON)",
        value_hint = ValueHint::FilePath
    )]
    template: Option<PathBuf>,
    #[arg(long = "template-json", help = "Template given inline as JSON text")]
    template_json: Option<String>,
    #[arg(long, help = "Built-in template name (see `pickshape presets`)")]
    preset: Option<String>,
}

impl TemplateArgs {
    fn template_ref(&self) -> Result<TemplateRef, Error> {
        if let Some(path) = &self.template {
            return Ok(TemplateRef::path(path));
        }
        if let Some(text) = &self.template_json {
            return Ok(TemplateRef::inline(text.clone()));
        }
        if let Some(name) = &self.preset {
            return TemplateRef::preset(name);
        }
        Err(Error::new(ErrorKind::Usage)
            .with_message("missing template")
            .with_hint("Use --template FILE, --template-json JSON, or --preset NAME."))
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Project JSON documents through a template",
        long_about = r#"Read JSON (one document, or JSON Lines with --in jsonl), project each
document through the template, and write the shaped JSON to stdout.

A document whose projection is empty produces no stdout output; a notice
is written to stderr instead."#
    )]
    Project {
        #[arg(
            help = "Input file, or - for stdin",
            default_value = "-",
            value_hint = ValueHint::FilePath
        )]
        input: String,
        #[command(flatten)]
        template: TemplateArgs,
        #[arg(
            long = "in",
            value_enum,
            default_value = "json",
            help = "Input framing"
        )]
        input_mode: InputMode,
        #[arg(
            long,
            short = 'e',
            value_enum,
            default_value = "stop",
            help = "What to do with undecodable JSON Lines records"
        )]
        errors: ErrorPolicyCli,
        #[arg(long, help = "Pretty-print output even when not a terminal")]
        pretty: bool,
        #[arg(long, help = "Exit with code 3 if any document projects to nothing")]
        fail_on_absent: bool,
    },
    #[command(about = "Validate a template and summarize its shape")]
    Check {
        #[command(flatten)]
        template: TemplateArgs,
        #[arg(long, help = "Emit the summary as JSON")]
        json: bool,
    },
    #[command(about = "List built-in templates")]
    Presets,
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info as JSON")]
    Version,
}

impl From<InputMode> for IngestMode {
    fn from(mode: InputMode) -> Self {
        match mode {
            InputMode::Json => IngestMode::Json,
            InputMode::Jsonl => IngestMode::Jsonl,
        }
    }
}

impl From<ErrorPolicyCli> for ErrorPolicy {
    fn from(policy: ErrorPolicyCli) -> Self {
        match policy {
            ErrorPolicyCli::Stop => ErrorPolicy::Stop,
            ErrorPolicyCli::Skip => ErrorPolicy::Skip,
        }
    }
}

fn open_input(input: &str) -> Result<Box<dyn Read>, Error> {
    if input == "-" {
        return Ok(Box::new(io::stdin()));
    }
    let reader = std::fs::File::open(input).map_err(|err| {
        let kind = if err.kind() == io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        Error::new(kind)
            .with_message("failed to open input")
            .with_path(input)
            .with_source(err)
    })?;
    Ok(Box::new(reader))
}

fn input_label(input: &str) -> String {
    if input == "-" {
        "stdin".to_string()
    } else {
        input.to_string()
    }
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Io || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check that the path exists and is readable.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint("Re-run with RUST_LOG=pickshape=debug and report the output.")
}

fn stdout_style(pretty: bool, color_mode: ColorMode) -> RenderStyle {
    let is_tty = io::stdout().is_terminal();
    RenderStyle::choose(pretty, is_tty, color_mode.use_color(is_tty))
}

fn emit_json(value: &Value, style: RenderStyle) {
    println!("{}", render_json(value, style));
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
    Green,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
        AnsiColor::Green => "32",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {} (input: {})", notice.message, notice.input);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Template => "malformed template".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(pointer) = err.pointer() {
        inner.insert("pointer".to_string(), json!(pointer));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            display_path(path)
        ));
    }
    if let Some(pointer) = err.pointer() {
        lines.push(format!(
            "{} {pointer}",
            colorize_label("at:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn display_path(path: &Path) -> String {
    let Ok(cwd) = std::env::current_dir() else {
        return path.display().to_string();
    };
    match path.strip_prefix(&cwd) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.display().to_string(),
        _ => path.display().to_string(),
    }
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `pickshape --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "pickshape") else {
        return "Try `pickshape --help`.".to_string();
    };

    let parts: Vec<&str> = tokens
        .iter()
        .skip(pos + 1)
        .take_while(|token| {
            !(token.starts_with('-') || token.starts_with('<') || token.starts_with('['))
        })
        .copied()
        .collect();

    if parts.is_empty() {
        return "Try `pickshape --help`.".to_string();
    }
    let missing_template = rendered.contains("required argument")
        && rendered.contains("--template")
        && rendered.contains("--preset");
    if missing_template {
        return format!(
            "Provide a template, for example: `pickshape {} --preset issue-search`.",
            parts.join(" ")
        );
    }

    format!("Try `pickshape {} --help`.", parts.join(" "))
}
