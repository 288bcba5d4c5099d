use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use spdlog::sink::Sink;
use spdlog::{formatter::Formatter, ErrorHandler, LevelFilter, Record};

use crate::logger::logging_configuration::ScFormatter;

/// Appends formatted records to a single log file.
pub struct ScFileSink {
    file: Mutex<File>,
    formatter: Mutex<Box<dyn Formatter>>,
}

impl ScFileSink {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            formatter: Mutex::new(Box::new(ScFormatter)),
        })
    }
}

impl Sink for ScFileSink {
    fn log(&self, record: &Record) -> spdlog::Result<()> {
        let mut dest = String::new();
        self.formatter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .format(record, &mut dest)?;
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_all(dest.as_bytes())
            .map_err(spdlog::Error::WriteRecord)
    }

    fn flush(&self) -> spdlog::Result<()> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
            .map_err(spdlog::Error::FlushBuffer)
    }

    fn level_filter(&self) -> LevelFilter {
        LevelFilter::All
    }

    fn set_level_filter(&self, _level_filter: LevelFilter) {}

    fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        *self.formatter.lock().unwrap_or_else(PoisonError::into_inner) = formatter;
    }

    fn set_error_handler(&self, _handler: Option<ErrorHandler>) {}
}
