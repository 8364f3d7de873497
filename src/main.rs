use clap::Parser;
use shdecl::{json, parse_with_options, Limits, ParseOptions};

use std::io::{self, Read, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shdecl")]
#[command(about = "Convert `declare -p` output into JSON")]
#[command(version)]
struct Cli {
    /// Dump to read; stdin when omitted or `-`
    #[arg()]
    file: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pretty: bool,

    /// Highest indexed-array subscript to materialize
    #[arg(long = "max-array-index", value_name = "N")]
    max_array_index: Option<usize>,

    /// Print skipped lines and array elements to stderr
    #[arg(long = "report")]
    report: bool,

    /// With --report, print the diagnostics as a JSON array
    #[arg(long = "json-report", requires = "report")]
    json_report: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot read stdin: {0}")]
    Stdin(io::Error),
    #[error("cannot write output: {0}")]
    Write(io::Error),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(file: Option<&PathBuf>) -> Result<String, CliError> {
    let mut buf = Vec::new();
    match file {
        Some(path) if path.as_os_str() != "-" => {
            buf = std::fs::read(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            })?;
        }
        _ => {
            io::stdin().read_to_end(&mut buf).map_err(CliError::Stdin)?;
        }
    }
    // Dumps can carry arbitrary bytes; decode lossily rather than refuse.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let input = read_input(cli.file.as_ref())?;

    let mut options = ParseOptions::default();
    if let Some(max) = cli.max_array_index {
        options.limits = Limits {
            max_array_index: max,
        };
    }

    let result = parse_with_options(&input, &options);
    tracing::debug!(
        variables = result.variables.len(),
        skipped = result.skipped.len(),
        "parsed dump"
    );

    let rendered = if cli.pretty {
        json::to_json_pretty(&result.variables)
    } else {
        json::to_json(&result.variables)
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", rendered).map_err(CliError::Write)?;

    if cli.report {
        let mut stderr = io::stderr().lock();
        if cli.json_report {
            writeln!(stderr, "{}", json::skipped_to_json(&result.skipped)).map_err(CliError::Write)?;
        } else {
            for entry in &result.skipped {
                writeln!(stderr, "{}", entry).map_err(CliError::Write)?;
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
