use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::CommandFactory;
use tracing_subscriber::EnvFilter;

use eolconv::{
    engine,
    options::{self, Cli, Resolution, Settings},
    CancelFlag,
};

fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout may be the conversion output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let resolution = match options::resolve_from(std::env::args_os()) {
        Ok(resolution) => resolution,
        Err(err) => err.exit(),
    };

    match resolution {
        Resolution::Usage => {
            let _ = Cli::command().print_help();
            ExitCode::SUCCESS
        }
        Resolution::Version => {
            print!("{}", options::version_text());
            ExitCode::SUCCESS
        }
        Resolution::Convert {
            settings,
            show_version,
        } => {
            if show_version {
                println!("{}", options::version_text());
            }
            match convert(&settings) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("error-> {err:#}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn convert(settings: &Settings) -> Result<()> {
    let cancel = CancelFlag::new();
    eolconv::signal::install_handler(&cancel).context("unable to install signal handler")?;

    let report = engine::run(settings, &cancel)?;
    if let Some(Err(err)) = &report.overwrite {
        eprintln!("error-> {err}");
    }
    if settings.statistics {
        print!("{}", report.statistics);
    }
    Ok(())
}
