use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::Parser;

use crate::{abs::App, bootstrap::RenderBootstrap, error::Error, settings::Settings};

mod abs;
mod bootstrap;
mod camera;
mod error;
mod host;
mod logging;
mod settings;
mod vertex;

#[derive(Parser)]
#[command(name = "mccln", about = "Draws one triangle with OpenGL 4.6")]
struct Cli {
    /// Settings file (JSON). Defaults to ./mccln.json if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overriding the settings file (off, error, warn, info, debug, trace)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn run(cli: Cli) -> Result<(), Error> {
    let settings = Settings::load(cli.config.as_deref())?;
    let level = match &cli.log_level {
        Some(level) => settings::parse_level(level)?,
        None => settings.level_filter()?,
    };
    logging::init(level)?;

    let mut app = App::new(&settings.window, settings.render.debug_output)?;
    let mut bootstrap = RenderBootstrap::new(Arc::clone(&app.gl), settings.render.clone());

    host::run(&mut app, &mut bootstrap, settings.window.render_frequency)?;

    if let Some(sink) = app.debug_sink() {
        match sink.error_count() {
            0 => log::info!("{} driver messages, no errors", sink.message_count()),
            errors => log::warn!("driver reported {errors} errors"),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("{e}");
            } else {
                eprintln!("error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}
