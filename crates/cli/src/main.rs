// matdock - Matera/Dock settlement reconciliation, headless

mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use exit_codes::{EXIT_INGEST, EXIT_MISMATCH, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_USAGE};
use matdock_recon::{Grid, ReconConfig, ReconInput};

#[derive(Parser, Debug)]
#[command(name = "matdock")]
#[command(about = "Reconcile Matera settlement exports against Dock processor exports")]
#[command(version)]
#[command(after_help = "\
Examples:
  matdock --matera extrato_2024-03-01.csv --dock transacoes_2024-03-01.xlsx --depara contas.xlsm
  matdock --matera m1.csv m2.csv --dock d1.xlsx d2.xlsx --depara contas.xlsm --out resultado.xlsx
  matdock --matera m.csv --dock d.xlsx --depara contas.xlsm --config recon.toml --json

Exit codes: 0 ledgers reconcile, 1 discrepancies found, 2 usage,
3 ingestion/config error, 4 output error.")]
struct Cli {
    /// Matera settlement export(s); the document date comes from each filename
    #[arg(long, required = true, num_args = 1.., value_name = "FILE")]
    matera: Vec<PathBuf>,

    /// Dock processor export(s)
    #[arg(long, required = true, num_args = 1.., value_name = "FILE")]
    dock: Vec<PathBuf>,

    /// Account/identity cross-reference workbook
    #[arg(long, value_name = "FILE")]
    depara: PathBuf,

    /// Result workbook path
    #[arg(long, default_value = "resultado.xlsx", value_name = "FILE")]
    out: PathBuf,

    /// Column-contract overrides (TOML); defaults match production exports
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the full result as JSON to stdout
    #[arg(long)]
    json: bool,
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
}

fn ingest_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_INGEST, message: msg.into() }
}

fn load_config(path: Option<&PathBuf>) -> Result<ReconConfig, CliError> {
    match path {
        None => Ok(ReconConfig::default()),
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| ingest_err(format!("cannot read config {}: {e}", path.display())))?;
            ReconConfig::from_toml(&content).map_err(|e| ingest_err(e.to_string()))
        }
    }
}

fn read_grids(paths: &[PathBuf]) -> Result<Vec<Grid>, CliError> {
    paths
        .iter()
        .map(|path| matdock_io::read_grid(path).map_err(ingest_err))
        .collect()
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_ref())?;

    let input = ReconInput {
        matera: read_grids(&cli.matera)?,
        dock: read_grids(&cli.dock)?,
        depara: matdock_io::read_grid(&cli.depara).map_err(ingest_err)?,
    };

    let result = matdock_recon::run(&config, &input).map_err(|e| ingest_err(e.to_string()))?;

    matdock_io::xlsx::write_workbook(&result.tables, &cli.out)
        .map_err(|message| CliError { code: EXIT_OUTPUT, message })?;

    if cli.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| ingest_err(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "recon '{}': {} matera rows, {} dock rows, {} identities — {} overall mismatches, {} date-localized, {} unknown-account rows",
        config.name,
        s.matera_rows,
        s.dock_rows,
        s.identities,
        s.mismatch_overall,
        s.date_localized_only,
        s.unknown_identity_rows,
    );
    eprintln!("wrote {}", cli.out.display());

    if s.mismatch_overall > 0 || s.date_localized_only > 0 {
        return Err(CliError {
            code: EXIT_MISMATCH,
            message: String::new(),
        });
    }

    Ok(())
}

fn main() -> ExitCode {
    // Route clap errors through the registry: --help/--version print
    // to stdout and exit 0, real usage errors exit EXIT_USAGE.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            ExitCode::from(code)
        }
    }
}
