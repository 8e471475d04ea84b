//! Logger setup.

use log::LevelFilter;

use crate::error::Error;

/// Installs the global logger, writing timestamped lines to stdout.
///
/// Driver debug messages arrive under the `gl` target.
pub fn init(level: LevelFilter) -> Result<(), Error> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()?;

    log::debug!("logging initialized at {level}");
    Ok(())
}
