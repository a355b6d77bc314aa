use crate::infra::JsonFileRepository;
use crate::report::{render_preview, render_summary};
use crate::server;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use kpi_tracker::config::AppConfig;
use kpi_tracker::error::AppError;
use kpi_tracker::interchange::SpreadsheetImporter;
use kpi_tracker::scorecard::store::preview;
use kpi_tracker::scorecard::{
    CategoryFilter, Confirmation, RecordDraft, ScorecardError, ScorecardService, SessionContext,
};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "KPI Scorecard",
    about = "Serve, score, and exchange departmental KPI/SKU scorecards",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a record draft (JSON) without storing it
    Score(ScoreArgs),
    /// Write the stored records as a CSV sheet
    Export(ExportArgs),
    /// Replace the stored records with the rows of a CSV sheet
    Import(ImportArgs),
    /// Print the dashboard summary for the stored records
    Summary(SummaryArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured record file
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
    /// Load the record file once and keep changes in memory only
    #[arg(long)]
    pub(crate) in_memory: bool,
}

#[derive(Args, Debug, Default)]
struct StorageArgs {
    /// Override the configured record file
    #[arg(long)]
    data_file: Option<PathBuf>,
}

impl StorageArgs {
    fn repository(self) -> Result<JsonFileRepository, AppError> {
        let path = match self.data_file {
            Some(path) => path,
            None => AppConfig::load()?.storage.data_file,
        };
        Ok(JsonFileRepository::new(path))
    }

    fn service(self) -> Result<ScorecardService<JsonFileRepository>, AppError> {
        Ok(ScorecardService::load(Arc::new(self.repository()?))?)
    }
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Draft JSON file; `-` reads standard input
    draft: PathBuf,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Destination sheet; standard output when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[command(flatten)]
    storage: StorageArgs,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// CSV sheet to import
    sheet: PathBuf,
    /// Confirm that the stored records are replaced
    #[arg(long)]
    yes: bool,
    #[command(flatten)]
    storage: StorageArgs,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// Dashboard tab: all, kpi, or sku
    #[arg(long, default_value = "all")]
    category: CategoryFilter,
    #[command(flatten)]
    storage: StorageArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Export(args) => run_export(args),
        Command::Import(args) => run_import(args),
        Command::Summary(args) => run_summary(args),
    }
}

fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let raw = if args.draft.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        raw
    } else {
        std::fs::read_to_string(&args.draft)?
    };
    let draft: RecordDraft = serde_json::from_str(&raw).map_err(io::Error::from)?;

    print!("{}", render_preview(&preview(draft)));
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let service = args.storage.service()?;
    let sheet = service.export_sheet(&SessionContext::admin())?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, sheet)?;
            println!("Exported {} to {}", record_count(&service), path.display());
        }
        None => io::stdout().write_all(&sheet)?,
    }
    Ok(())
}

fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let service = args.storage.service()?;
    let sheet = BufReader::new(File::open(&args.sheet)?);

    let outcome = match service.import_sheet(
        &SessionContext::admin(),
        &SpreadsheetImporter::standard(),
        sheet,
        Confirmation::from(args.yes),
    ) {
        Err(ScorecardError::ConfirmationRequired(action)) => {
            println!("Import not applied: {action} requires --yes");
            return Ok(());
        }
        other => other?,
    };

    let summary = outcome.data;
    println!("Imported {} records", summary.imported);
    if !summary.degraded_rows.is_empty() {
        let rows: Vec<String> = summary
            .degraded_rows
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("Rows with unreadable details: {}", rows.join(", "));
    }
    if summary.score_mismatches > 0 {
        println!(
            "Rows whose score differs from the sheet: {}",
            summary.score_mismatches
        );
    }
    if !outcome.persisted {
        println!("Warning: records could not be written to storage");
    }
    Ok(())
}

fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let service = args.storage.service()?;
    let summary = service.summary(&SessionContext::admin(), args.category);

    print!("{}", render_summary(&summary, Local::now().naive_local()));
    Ok(())
}

fn record_count(service: &ScorecardService<JsonFileRepository>) -> String {
    match service.snapshot().len() {
        1 => "1 record".to_string(),
        count => format!("{count} records"),
    }
}
