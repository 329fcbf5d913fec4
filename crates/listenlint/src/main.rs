mod error;
mod files;
mod render;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use rayon::prelude::*;

use listenlint_analyzer::lexer::Lexer;
use listenlint_analyzer::parse_source;
use listenlint_common::{manifest, LintManifest, Severity};

use crate::error::CliError;
use crate::report::FileReport;

/// Environment variable holding a `tracing` filter, e.g. `listenlint=trace`.
const LOG_ENV: &str = "LISTENLINT_LOG";

/// Event listener pairing linter.
///
/// Reports addEventListener calls without a matching removeEventListener,
/// removals with no earlier registration, and inline function handlers.
#[derive(Parser, Debug)]
#[command(
    name = "listenlint",
    version,
    about,
    long_about = "Event listener pairing linter.\n\nEvery addEventListener call must be matched by a removeEventListener call\nwith the same target, event and handler in the same file.\n\nExamples:\n  listenlint src/                 Lint every .js/.mjs/.cjs file under src/\n  listenlint app.js --format json Print findings as JSON\n  listenlint -vv src/             Log analysis progress at debug level"
)]
struct Cli {
    /// Files or directories to lint (default: current directory).
    paths: Vec<PathBuf>,

    /// Configuration file (default: nearest Listenlint.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Pretty)]
    format: Format,

    /// Number of worker threads (default: one per CPU).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Suppress warning output.
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit token stream to stdout (debug).
    #[arg(long = "emit-tokens")]
    emit_tokens: bool,

    /// Emit AST to stdout (debug).
    #[arg(long = "emit-ast")]
    emit_ast: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let manifest = load_manifest(cli.config.as_deref())?;

    let roots = if cli.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.paths.clone()
    };
    let files = files::discover(&roots, &manifest)?;
    if files.is_empty() {
        return Err(CliError::NoInput);
    }

    if cli.emit_tokens || cli.emit_ast {
        emit_debug(cli, &files)?;
        return Ok(ExitCode::SUCCESS);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cli.jobs.unwrap_or(0))
        .build()?;
    tracing::info!(files = files.len(), threads = pool.current_num_threads(), "linting");
    let reports = pool
        .install(|| {
            files
                .par_iter()
                .map(|path| report::lint_file(path, &manifest))
                .collect::<Result<Vec<FileReport>, CliError>>()
        })?;

    let errors: usize = reports.iter().map(|r| r.count(Severity::Error)).sum();
    let warnings: usize = reports.iter().map(|r| r.count(Severity::Warning)).sum();

    match cli.format {
        Format::Pretty => {
            for report in &reports {
                render::print_pretty(report, cli.quiet)?;
            }
            eprintln!("{}", render::summary(reports.len(), errors, warnings));
        }
        Format::Json => {
            let json = serde_json::to_string_pretty(&render::json_files(&reports, cli.quiet))?;
            println!("{}", json);
        }
    }

    Ok(if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Use `--config` when given, else the nearest `Listenlint.toml`, else defaults.
fn load_manifest(explicit: Option<&std::path::Path>) -> Result<LintManifest, CliError> {
    if let Some(path) = explicit {
        tracing::debug!(path = %path.display(), "loading configuration");
        return Ok(manifest::load_config(path)?);
    }
    let cwd = std::env::current_dir().map_err(CliError::WorkingDir)?;
    match manifest::find_config(&cwd) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            Ok(manifest::load_config(&path)?)
        }
        None => {
            tracing::debug!("no configuration file, using defaults");
            Ok(LintManifest::defaults(cwd))
        }
    }
}

/// `--emit-tokens` / `--emit-ast`: dump the front-end output of each file.
fn emit_debug(cli: &Cli, files: &[PathBuf]) -> Result<(), CliError> {
    for path in files {
        let source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        let name = path.display().to_string();
        println!("== {}", name);

        if cli.emit_tokens {
            let (tokens, lex_diags) = Lexer::new(&source, &name).tokenize();
            for token in &tokens {
                println!(
                    "{:>4}:{:<3} {:?} {:?}",
                    token.span.start.line, token.span.start.column, token.kind, token.lexeme,
                );
            }
            for diag in lex_diags.diagnostics() {
                eprintln!("{}", diag);
            }
        }

        if cli.emit_ast {
            match parse_source(&source, &name) {
                Ok(program) => println!("{:#?}", program),
                Err(errors) => {
                    for diag in &errors {
                        eprintln!("{}", diag);
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "listenlint",
            "src",
            "lib/app.js",
            "--format",
            "json",
            "-j",
            "4",
            "-q",
            "-vv",
            "--config",
            "ci/Listenlint.toml",
        ])
        .unwrap();
        assert_eq!(cli.paths, vec![PathBuf::from("src"), PathBuf::from("lib/app.js")]);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.jobs, Some(4));
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("ci/Listenlint.toml")));
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["listenlint"]).unwrap();
        assert!(cli.paths.is_empty());
        assert_eq!(cli.format, Format::Pretty);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.emit_tokens && !cli.emit_ast);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["listenlint", "--format", "xml"]).is_err());
    }

    #[test]
    fn explicit_config_errors_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Listenlint.toml");
        std::fs::write(&path, "[lint]\nseverity = \"loud\"\n").unwrap();
        let err = load_manifest(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("lint.severity"));
    }
}
