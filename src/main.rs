use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tc_connector::cli::{self, RunOptions};
use tc_connector::ConnectorResult;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tc-connector")]
#[command(about = "Migrate UFT, Selenium and manual test cases into a test-case object model")]
#[command(long_about = "tc-connector - test case migration
Keyword scripts in, test cases, modules and test sheets out.

COMMANDS:
  uft       - Migrate an extracted UFT archive
  selenium  - Migrate Selenium keyword workbooks
  manual    - Migrate manual test-case workbooks

OUTPUT:
  The created objects are written as YAML, or JSON when the output file
  ends in .json. Every object carries its id, kind and fields.

EXAMPLES:
  tc-connector uft ./ShopArchive -o shop.yaml
  tc-connector selenium checkout.xlsx login.xlsx --keep-going
  tc-connector manual cases.xlsx --definition definition.yaml -o cases.json

LOGGING:
  RUST_LOG=tc_connector=debug shows every created object.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Object model output file (.yaml or .json)
    #[arg(short, long, default_value = "migration.yaml")]
    output: PathBuf,

    /// Definition YAML with destination folders and engine
    #[arg(long, env = "TC_CONNECTOR_DEFINITION")]
    definition: Option<PathBuf>,

    /// Skip files that fail to migrate instead of stopping
    #[arg(short, long)]
    keep_going: bool,

    /// Show verbose output and debug logs
    #[arg(short, long)]
    verbose: bool,
}

impl From<CommonArgs> for RunOptions {
    fn from(args: CommonArgs) -> Self {
        RunOptions {
            output: args.output,
            definition: args.definition,
            keep_going: args.keep_going,
            verbose: args.verbose,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Migrate an extracted UFT archive.

The archive directory must contain:
  Framework/TestCase          keyword workbooks, one test case per worksheet
  Framework/DataSheet         data sheet workbook (first file is used)
  Framework/ObjectRepository  object repository XML files

Values ending in a DT_<name> reference turn the test case into a template
bound to a test sheet built from the data sheet.")]
    /// Migrate an extracted UFT archive
    Uft {
        /// Extracted archive directory
        archive: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    #[command(long_about = "Migrate Selenium keyword workbooks.

Columns: FunctionKeyword, Locator Type, Locator Value, Test Data.
Keywords: enter_URL, close_Window, click_On_Button, select, enter_Text.
A button click closes the current page; the next control starts Page<n+1>.")]
    /// Migrate Selenium keyword workbooks
    Selenium {
        /// Workbook(s) to migrate
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    #[command(long_about = "Migrate manual test-case workbooks.

Columns: TestCase, Action, Input Parameter, Expected Result.
The cell to the right of an Input Parameter holds its value.")]
    /// Migrate manual test-case workbooks
    Manual {
        /// Workbook(s) to migrate
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "tc_connector=debug"
    } else {
        "tc_connector=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> ConnectorResult<bool> {
    let summary = match command {
        Commands::Uft { archive, common } => {
            init_tracing(common.verbose);
            cli::uft(archive, &common.into())?
        }
        Commands::Selenium { files, common } => {
            init_tracing(common.verbose);
            cli::selenium(files, &common.into())?
        }
        Commands::Manual { files, common } => {
            init_tracing(common.verbose);
            cli::manual(files, &common.into())?
        }
    };
    Ok(summary.is_success())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("{} {}", "❌ Migration failed:".bold().red(), e);
            ExitCode::FAILURE
        }
    }
}
