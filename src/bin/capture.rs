//! Capture a web page or saved HTML file into an Obsidian vault.
//!
//! Fetches a URL or reads HTML from a file (or `-` for stdin), runs the
//! capture pipeline and writes the note, or with `--dry` only reports what
//! would be written. Exit codes: 0 success, 2 no qualifying content,
//! 3 timeout, 4 input too large, 6 fetch or read failure, 8 write failure,
//! 9 configuration error.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rs_capture::fetch::{load_html, FetchOptions, DEFAULT_USER_AGENT};
use rs_capture::source::DEFAULT_MAX_SIZE;
use rs_capture::tags::parse_tag_list;
use rs_capture::{
    capture, preview, save, CaptureOutcome, CaptureRequest, CollisionPolicy, Error,
    ExclusionSummary, Options, SourceLocator, Vault, Warning,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "capture")]
#[command(about = "Turn an HTML article into a Markdown note with front matter")]
#[command(version)]
struct Cli {
    /// URL to fetch, HTML file to read, or `-` for standard input
    input: String,

    /// URL a saved page was fetched from (overrides the input as source)
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// Network timeout in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// User-Agent header for URL fetches
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Vault root directory
    #[arg(long, env = "RS_CAPTURE_VAULT", value_name = "DIR")]
    vault: Option<PathBuf>,

    /// YAML config file (default: ~/.rs-capture.yml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Folder below the YYYY-MM directory
    #[arg(long)]
    subfolder: Option<String>,

    /// Replace an existing note instead of adding a numeric suffix
    #[arg(long)]
    overwrite: bool,

    /// CSS selector to remove before extraction (repeatable)
    #[arg(long = "exclude-selector", value_name = "CSS")]
    exclude_selectors: Vec<String>,

    /// Comma-separated tags to add
    #[arg(long, value_name = "TAGS")]
    tags: Option<String>,

    /// Maximum input size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE)]
    max_size: usize,

    /// Resolve everything but do not write
    #[arg(long)]
    dry: bool,

    /// Report and log format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Serialize)]
struct SuccessReport<'a> {
    status: &'static str,
    dry_run: bool,
    path: Option<PathBuf>,
    filename: String,
    selector: &'a str,
    character_count: usize,
    title: Option<&'a str>,
    tags: &'a [String],
    exclusion: &'a ExclusionSummary,
    warnings: &'a [Warning],
    #[serde(skip_serializing_if = "Option::is_none")]
    front_matter: Option<&'a serde_yaml::Mapping>,
}

#[derive(Serialize)]
struct ErrorReport {
    status: &'static str,
    code: &'static str,
    message: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.format);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(code = err.code(), exit_code = err.exit_code(), "capture failed");
            print_error(&err, cli.format);
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}

fn init_logging(format: OutputFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        OutputFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        OutputFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(err) = result {
        eprintln!("tracing setup failed: {err}");
    }
}

fn load_options(cli: &Cli) -> Result<Options, Error> {
    let mut options = match cli.config {
        Some(ref path) => Options::load(path)?,
        None => Options::discover()?,
    };

    if cli.vault.is_some() {
        options.vault.clone_from(&cli.vault);
    }
    if cli.subfolder.is_some() {
        options.subfolder.clone_from(&cli.subfolder);
    }
    options.overwrite |= cli.overwrite;
    options
        .exclusion_selectors
        .extend(cli.exclude_selectors.iter().cloned());

    options.validate()?;
    Ok(options)
}

/// Where the HTML is loaded from, and which locator the note records.
fn source_locators(cli: &Cli) -> Result<(SourceLocator, SourceLocator), Error> {
    let input = SourceLocator::parse(&cli.input);
    let recorded = match cli.source_url {
        Some(ref url) => match SourceLocator::parse(url) {
            locator @ SourceLocator::Url(_) => locator,
            SourceLocator::Path(_) => {
                return Err(Error::Configuration(format!(
                    "--source-url must be an absolute http(s) URL, got {url:?}"
                )))
            }
        },
        None => input.clone(),
    };
    Ok((input, recorded))
}

fn run(cli: &Cli) -> Result<(), Error> {
    let options = load_options(cli)?;
    let (input, locator) = source_locators(cli)?;
    let fetch_options = FetchOptions {
        timeout: Duration::from_secs(cli.timeout),
        max_size: cli.max_size,
        user_agent: cli.user_agent.clone(),
    };
    let html = load_html(&input, &fetch_options)?;

    let request = CaptureRequest {
        html: &html,
        locator,
        cli_tags: cli.tags.as_deref().map(parse_tag_list).unwrap_or_default(),
        captured_at: Utc::now(),
    };
    let outcome = capture(&request, &options)?;

    let vault = options.vault.as_deref().map(Vault::open).transpose()?;

    if cli.dry {
        let (path, filename) = match vault {
            Some(ref vault) => {
                let (path, resolution) = preview(vault, &outcome, &options);
                (Some(path), resolution.filename)
            }
            None => {
                let existing: &[&str] = &[];
                let resolution = outcome
                    .resolve_filename(existing, CollisionPolicy::from_overwrite(options.overwrite));
                (None, resolution.filename)
            }
        };
        print_success(&outcome, path, filename, true, cli.format);
        return Ok(());
    }

    let Some(vault) = vault else {
        return Err(Error::Configuration(
            "no vault configured; pass --vault, set RS_CAPTURE_VAULT or add `vault:` to the config"
                .to_string(),
        ));
    };

    let written = save(&vault, &outcome, &options)?;
    print_success(
        &outcome,
        Some(written.path),
        written.resolution.filename,
        false,
        cli.format,
    );
    Ok(())
}

fn print_success(
    outcome: &CaptureOutcome,
    path: Option<PathBuf>,
    filename: String,
    dry_run: bool,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let report = SuccessReport {
                status: "success",
                dry_run,
                path,
                filename,
                selector: &outcome.extraction.selector,
                character_count: outcome.extraction.character_count,
                title: outcome.metadata.title.as_deref(),
                tags: outcome.tags.as_slice(),
                exclusion: &outcome.extraction.exclusion,
                warnings: &outcome.warnings,
                front_matter: dry_run.then_some(&outcome.front_matter),
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(err) => eprintln!("failed to serialize report: {err}"),
            }
        }
        OutputFormat::Text => {
            let verb = if dry_run { "Would write" } else { "Wrote" };
            match path {
                Some(path) => println!("{verb} {}", path.display()),
                None => println!("{verb} {filename} (no vault configured)"),
            }
            println!(
                "  selector: {} ({} characters)",
                outcome.extraction.selector, outcome.extraction.character_count
            );
            if let Some(ref title) = outcome.metadata.title {
                println!("  title: {title}");
            }
            if !outcome.tags.is_empty() {
                println!("  tags: {}", outcome.tags.as_slice().join(" "));
            }
            let summary = &outcome.extraction.exclusion;
            if summary.selectors_attempted > 0 {
                println!(
                    "  excluded: {} elements via {}/{} selectors",
                    summary.elements_removed, summary.selectors_matched, summary.selectors_attempted
                );
            }
            if !outcome.warnings.is_empty() {
                println!("  warnings: {}", outcome.warnings.len());
            }
            if dry_run {
                match outcome.note_text() {
                    Ok(note) => {
                        let header = note.split("\n\n").next().unwrap_or_default();
                        println!("\n{header}");
                    }
                    Err(err) => eprintln!("{err}"),
                }
            }
        }
    }
}

fn print_error(err: &Error, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let report = ErrorReport {
                status: "error",
                code: err.code(),
                message: err.to_string(),
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("failed to serialize report: {e}"),
            }
        }
        OutputFormat::Text => eprintln!("Error: {err}"),
    }
}
