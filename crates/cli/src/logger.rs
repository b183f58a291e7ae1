//! Stderr logger for the CLI, optionally mirrored into an append-only log
//! file.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

pub struct CliLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl CliLogger {
    /// Creates a logger writing to stderr and, if given, appending to
    /// `log_file`.
    pub fn new(level: LevelFilter, log_file: Option<&Path>) -> Result<Self> {
        let file = log_file
            .map(|path| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file: {}", path.display()))
            })
            .transpose()?;

        Ok(Self {
            level,
            file: file.map(Mutex::new),
        })
    }

    /// Installs the logger as the global `log` backend.
    pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
        let logger = Self::new(level, log_file)?;
        log::set_boxed_logger(Box::new(logger))
            .map(|()| log::set_max_level(level))
            .map_err(|e| anyhow!("Failed to set logger: {}", e))?;
        Ok(())
    }

    fn format(record: &Record) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        format!(
            "{} {} [{}] {}",
            timestamp,
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = Self::format(record);

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                // A failed log write must not take the run down with it
                let _ = writeln!(file, "{}", message);
            }
        }
        eprintln!("{}", message);
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

/// Parses a level name such as `debug` or `off`.
pub fn parse_level(name: &str) -> Result<LevelFilter> {
    name.parse::<LevelFilter>()
        .map_err(|_| anyhow!("Unknown log level {name:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn parse_level_names() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level("OFF").unwrap(), LevelFilter::Off);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn level_filtering() {
        let logger = CliLogger::new(LevelFilter::Info, None).unwrap();
        let info = Metadata::builder().level(Level::Info).build();
        let trace = Metadata::builder().level(Level::Trace).build();

        assert!(logger.enabled(&info));
        assert!(!logger.enabled(&trace));
    }

    #[test]
    fn writes_to_log_file() {
        let path = std::env::temp_dir().join(format!("blocks-drag-{}.log", std::process::id()));
        let logger = CliLogger::new(LevelFilter::Debug, Some(&path)).unwrap();

        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("drag_surface")
                .args(format_args!("block moved"))
                .build(),
        );
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(contents.contains("DEBUG [drag_surface] block moved"));
    }
}
