use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug)]
struct FileLogger {
    log_path: PathBuf,
    level: Level,
}

static LOGGER: OnceCell<FileLogger> = OnceCell::new();

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = format!(
                "{} - {}: {}\n",
                record.level(),
                record.target(),
                record.args()
            );
            let log_file = self.log_path.join("log.txt");

            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_file) {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

// Default log directory: ~/gw2_render, falling back to the working directory.
pub fn default_log_dir() -> PathBuf {
    dir::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gw2_render")
}

pub fn init(log_path: PathBuf, verbose: bool) -> Result<(), SetLoggerError> {
    // Logging is best effort, an unwritable directory just means no log file.
    let _ = create_dir_all(&log_path);

    let level = if verbose { Level::Debug } else { Level::Info };
    let logger = LOGGER.get_or_init(|| FileLogger { log_path, level });

    log::set_logger(logger).map(|()| {
        log::set_max_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
    })
}
