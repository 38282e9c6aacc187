use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use gradebook_transfer::config::Settings;
use gradebook_transfer::model::IdentitySelection;
use gradebook_transfer::transfer;
use gradebook_transfer::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Grades(args) => execute_grades(args),
        Command::Attendance(args) => execute_attendance(args),
        Command::Inspect(args) => execute_inspect(args),
    }
}

fn execute_grades(args: GradesArgs) -> Result<()> {
    require_input(&args.input)?;
    let mut settings = load_settings(args.settings.as_deref())?;
    if args.show_category_averages {
        settings.show_category_averages = true;
    }

    let summary = transfer::grades_to_excel(
        &args.input,
        &args.output,
        &args.identity.selection(),
        &settings,
    )?;
    println!(
        "wrote {} student sheets to {}",
        summary.sheets,
        args.output.display()
    );
    Ok(())
}

fn execute_attendance(args: AttendanceArgs) -> Result<()> {
    require_input(&args.input)?;
    let columns = (!args.columns.is_empty()).then_some(args.columns.as_slice());

    let summary = transfer::attendance_to_excel(
        &args.input,
        &args.output,
        &args.identity.selection(),
        columns,
    )?;
    println!(
        "wrote {} attendance sheets to {}",
        summary.sheets,
        args.output.display()
    );
    Ok(())
}

fn execute_inspect(args: InspectArgs) -> Result<()> {
    require_input(&args.input)?;
    let settings = load_settings(args.settings.as_deref())?;
    let inspection = transfer::inspect(&args.input, &args.identity.selection(), &settings)?;
    println!("{}", serde_json::to_string_pretty(&inspection)?);
    Ok(())
}

fn require_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path),
        None => Ok(Settings::default()),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn a gradebook or attendance export into one report sheet per student."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build per-student grade sheets with category and weighted averages.
    Grades(GradesArgs),
    /// Build per-student attendance sheets.
    Attendance(AttendanceArgs),
    /// Print how a source file would be classified, as JSON.
    Inspect(InspectArgs),
}

#[derive(clap::Args)]
struct IdentityArgs {
    /// Column holding the student ID (defaults to the first column).
    #[arg(long)]
    id_column: Option<String>,

    /// Column holding the first name (defaults to the second column).
    #[arg(long)]
    first_name_column: Option<String>,

    /// Column holding the last name (defaults to the third column).
    #[arg(long)]
    last_name_column: Option<String>,
}

impl IdentityArgs {
    fn selection(&self) -> IdentitySelection {
        IdentitySelection {
            id: self.id_column.clone(),
            first_name: self.first_name_column.clone(),
            last_name: self.last_name_column.clone(),
        }
    }
}

#[derive(clap::Args)]
struct GradesArgs {
    /// Gradebook export (.csv, .xlsx, .xls, .ods).
    #[arg(long)]
    input: PathBuf,

    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,

    /// JSON settings with categories, max points, weights and overrides.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Add the category averages section to every sheet.
    #[arg(long)]
    show_category_averages: bool,

    #[command(flatten)]
    identity: IdentityArgs,
}

#[derive(clap::Args)]
struct AttendanceArgs {
    /// Attendance export (.csv, .xlsx, .xls, .ods).
    #[arg(long)]
    input: PathBuf,

    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,

    /// Attendance column to include (repeatable); defaults to the detected
    /// date columns.
    #[arg(long = "column")]
    columns: Vec<String>,

    #[command(flatten)]
    identity: IdentityArgs,
}

#[derive(clap::Args)]
struct InspectArgs {
    /// Source export to inspect.
    #[arg(long)]
    input: PathBuf,

    /// JSON settings used for category detection.
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(flatten)]
    identity: IdentityArgs,
}
