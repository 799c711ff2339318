use clap::Parser;
use mimalloc::MiMalloc;
use std::path::PathBuf;
use std::process::ExitCode;
use thingwatch::{PageConfig, run_page};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Load a saved listing or comments page, run the watchers and filters over
/// it and print every thing with its visibility.
#[derive(Parser)]
#[command(name = "thingwatch", version)]
struct Cli {
    /// Saved HTML page.
    html: PathBuf,
    /// Address the page was loaded from.
    #[arg(long)]
    url: Option<String>,
    /// Page configuration (TOML).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => PageConfig::load(path)?,
        None => PageConfig::default(),
    };
    let markup = std::fs::read_to_string(&cli.html)
        .map_err(|err| format!("cannot read {:?}: {err}", cli.html))?;
    let report = run_page(&markup, cli.url.as_deref(), &config)?;
    print!("{report}");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("thingwatch: {err}");
            ExitCode::FAILURE
        }
    }
}
