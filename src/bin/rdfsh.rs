//! Binary entry point for the rdfsh query console.
#![forbid(unsafe_code)]

use std::error::Error;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use rdfsh::{
    config::{ConsoleConfig, CONFIG_ENV},
    console::{CommandStatus, Console, TerminalIo},
    logging::init_logging,
    query::PreviewRepository,
    settings::{SettingValue, Settings, QUERY_PREFIX, WIDTH, WORK_DIR},
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "rdfsh",
    version,
    about = "Query console for RDF repositories"
)]
struct Cli {
    #[arg(
        long,
        env = CONFIG_ENV,
        value_name = "FILE",
        help = "Configuration file (defaults to <config dir>/rdfsh/console.toml)"
    )]
    config: Option<PathBuf>,

    #[arg(long, help = "Console width in characters")]
    width: Option<usize>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory relative INFILE/OUTFILE paths resolve against"
    )]
    workdir: Option<PathBuf>,

    #[arg(long, help = "Do not add repository namespaces to queries")]
    no_query_prefix: bool,

    #[arg(
        long,
        value_name = "FILTER",
        help = "Log filter such as `warn` or `rdfsh=debug` (RUST_LOG wins)"
    )]
    log_level: Option<String>,

    #[arg(long, help = "Disable coloured error output")]
    plain: bool,

    #[arg(
        short = 'e',
        long = "execute",
        value_name = "COMMAND",
        action = ArgAction::Append,
        help = "Run a console command and exit; may be repeated"
    )]
    execute: Vec<String>,
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// Returns whether every command succeeded.
fn run() -> Result<bool, Box<dyn Error>> {
    let cli = Cli::parse();
    let config = ConsoleConfig::load(cli.config.clone())?;
    init_logging(cli.log_level.as_deref().or(config.log_level()))?;

    let settings = build_settings(&cli, &config)?;
    let repository = PreviewRepository::new(config.namespaces());
    info!(
        config = ?config.path(),
        width = settings.console_width(),
        workdir = %settings.work_dir().display(),
        "console ready"
    );
    let mut console =
        Console::new(TerminalIo::new(cli.plain), settings).with_repository(Box::new(repository));

    if cli.execute.is_empty() {
        console.run()?;
        return Ok(true);
    }
    let mut success = true;
    for command in &cli.execute {
        match console.execute(command) {
            CommandStatus::Done => {}
            CommandStatus::Failed => success = false,
            CommandStatus::Exit => break,
        }
    }
    Ok(success)
}

fn build_settings(cli: &Cli, config: &ConsoleConfig) -> Result<Settings, Box<dyn Error>> {
    let mut settings = config.settings()?;
    if let Some(width) = cli.width {
        settings.insert(WIDTH, SettingValue::Int(width))?;
    }
    if let Some(dir) = cli.workdir.as_ref() {
        let dir = if dir.is_absolute() {
            dir.clone()
        } else {
            std::env::current_dir()?.join(dir)
        };
        settings.insert(WORK_DIR, SettingValue::Path(dir))?;
    }
    if cli.no_query_prefix {
        settings.insert(QUERY_PREFIX, SettingValue::Bool(false))?;
    }
    Ok(settings)
}
