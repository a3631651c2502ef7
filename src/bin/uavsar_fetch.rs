use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use uavsar_fetch::app::{self, DownloadPlan, download_dir_for};
use uavsar_fetch::config::ConfigLoader;
use uavsar_fetch::credentials::{FileCredentialProvider, TerminalPrompt};
use uavsar_fetch::domain::ProductFamily;
use uavsar_fetch::error::FetchError;
use uavsar_fetch::fetcher::Session;
use uavsar_fetch::http::ReqwestTransport;
use uavsar_fetch::output::{ConsoleOutput, JsonOutput, OutputMode};

const POLSAR_HELP: &str = "\
Selections (comma separated, no spaces; separate PARA and CHAN with a space):
  PARA  data paradigm [default: extension of URL]
          all   get it all
          ann   only the annotation file
          mlc   mlc data and annotation file
          stk   compressed Stokes data and annotation file
          grd   grd data and annotation file
          dem   dem and annotation file
          kmz   the kmz file
  CHAN  data channels (used by mlc and grd) [default: ach]
          ach   HHHH, HVHV, VVVV, HHHV, HHVV, HVVV
          copl  co-polarized (HHHH, VVVV, HHVV)
          crpl  cross-polarized (HVHV, HHHV, HVVV)
          powr  power (HHHH, VVVV, HVHV)
          hhhh, hvhv, vvvv, hhhv, hhvv, hvvv  a single channel

Credentials are read from the first line of $HOME/.dathack.d of the form
uavsarhttp:<username>:<password>; missing fields are prompted for.";

const INSAR_HELP: &str = "\
Selections (comma separated, no spaces; do not combine PARA, TYPE and CHAN):
  PARA  data paradigm [default: from URL extension]
          all   get it all
          ann   only the annotation file
          rdr   slant-range data and annotation file
          grd   ground-range data and annotation file
          kmz   kmz files and annotation file
  TYPE  data type [default: igm]
          igm   amp1, amp2, int, unw, cor and hgt
          amp1  amplitude of scene 1
          amp2  amplitude of scene 2
          int   wrapped interferogram
          unw   unwrapped interferogram
          cor   correlation
          hgt   DEM
  CHAN  data channels [default: hh]
          hh, hv, vv, or ach for all three

Example:
  uavsar-fetch insar <url> rdr,grd,kmz int,cor";

#[derive(Parser)]
#[command(name = "uavsar-fetch")]
#[command(about = "Download a UAVSAR product family from the ASF archive, starting from one sample URL")]
#[command(version, author)]
struct Cli {
    /// Print a JSON report instead of progress lines
    #[arg(long, global = true)]
    non_interactive: bool,

    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Directory under which the sample's folder is created [default: current directory]
    #[arg(long, global = true)]
    output_dir: Option<String>,

    /// Resolve and list the targets without downloading
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Download UAVSAR PolSAR products", after_help = POLSAR_HELP)]
    Polsar(PolsarArgs),
    #[command(about = "Download UAVSAR InSAR products", after_help = INSAR_HELP)]
    Insar(InsarArgs),
}

#[derive(Args)]
struct PolsarArgs {
    /// Any single URL from the desired product family
    url: String,

    #[arg(value_name = "PARA|CHAN")]
    selections: Vec<String>,
}

#[derive(Args)]
struct InsarArgs {
    /// Any single URL from the desired product family
    url: String,

    #[arg(value_name = "PARA|TYPE|CHAN")]
    selections: Vec<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<FetchError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &FetchError) -> u8 {
    match error {
        FetchError::InvalidSelection { .. } => 2,
        FetchError::LoginRejected { .. } | FetchError::LoginFormMissing(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let (family, url, selections) = match cli.command {
        Commands::Polsar(args) => (ProductFamily::Polsar, args.url, args.selections),
        Commands::Insar(args) => (ProductFamily::Insar, args.url, args.selections),
    };
    if selections.len() > family.max_selection_args() {
        Cli::command()
            .error(
                ErrorKind::TooManyValues,
                format!(
                    "{family} takes at most {} selection arguments",
                    family.max_selection_args()
                ),
            )
            .exit();
    }

    let settings = ConfigLoader::resolve(cli.config.as_deref())?;
    let plan = DownloadPlan::resolve(family, &url, &selections)?;

    if cli.dry_run {
        let report = plan.planned_report();
        return match output_mode {
            OutputMode::Interactive => {
                ConsoleOutput::print_plan(&report);
                Ok(())
            }
            OutputMode::NonInteractive => JsonOutput::print_report(&report).into_diagnostic(),
        };
    }

    let root = match cli.output_dir {
        Some(dir) => Utf8PathBuf::from(dir),
        None => {
            let cwd = std::env::current_dir().into_diagnostic()?;
            Utf8PathBuf::from_path_buf(cwd)
                .map_err(|_| FetchError::Filesystem("current directory is not UTF-8".to_string()))?
        }
    };
    let folder = plan.sample.local_folder_name(&settings.folder_prefix);
    let download_dir = download_dir_for(&root, &folder);

    let transport = ReqwestTransport::new(&settings.user_agent)?;
    let provider = FileCredentialProvider::new(
        settings.credential_file.clone(),
        settings.credential_tag.clone(),
        TerminalPrompt,
    );
    let mut session = Session::new(transport, provider, download_dir);

    match output_mode {
        OutputMode::Interactive => {
            let report = app::run(&plan, &mut session, &ConsoleOutput)?;
            ConsoleOutput::print_summary(&report);
            Ok(())
        }
        OutputMode::NonInteractive => {
            let report = app::run(&plan, &mut session, &JsonOutput)?;
            JsonOutput::print_report(&report).into_diagnostic()
        }
    }
}
