use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use tracing_error::ErrorLayer;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::ARGUMENTS;

/// Logs go to a file so they never interleave with command output.
pub fn initialize_logging() -> anyhow::Result<()> {
    let log_folder = ARGUMENTS
        .log_location
        .parent()
        .ok_or(anyhow::anyhow!("Could not get log folder location"))?;

    fs::create_dir_all(log_folder)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&ARGUMENTS.log_location)?;

    let file_subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(log_file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(LevelFilter::from_level(ARGUMENTS.log_level));

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}
