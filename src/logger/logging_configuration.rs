use std::fmt::Write;
use std::sync::Arc;

use chrono::offset::Utc;
use chrono::DateTime;
use spdlog::sink::{Sink, StdStream, StdStreamSink};
use spdlog::{
    formatter::{FmtExtraInfo, Formatter},
    prelude::*,
    ErrorHandler, LevelFilter, Record, StringBuf,
};

use crate::config::{LogLevel, LoggingConfig};
use crate::logger::file_sink::ScFileSink;

#[derive(Clone, Default)]
pub struct ScFormatter;

impl Formatter for ScFormatter {
    fn format(&self, record: &Record, dest: &mut StringBuf) -> spdlog::Result<FmtExtraInfo> {
        let (source_file, module_path) = match record.source_location() {
            None => ("", ""),
            Some(location) => (location.file_name(), location.module_path()),
        };
        let datetime: DateTime<Utc> = record.time().into();
        write!(dest, "{}", datetime.format("%Y-%m-%dT%T%.3fZ"))
            .map_err(spdlog::Error::FormatRecord)?;
        let style_range_begin: usize = dest.len();
        write!(dest, " [{}] ", &record.level().as_str().to_ascii_uppercase())
            .map_err(spdlog::Error::FormatRecord)?;
        let style_range_end: usize = dest.len();
        writeln!(dest, "({}::{}) {}", module_path, source_file, record.payload())
            .map_err(spdlog::Error::FormatRecord)?;
        Ok(FmtExtraInfo::builder()
            .style_range(style_range_begin..style_range_end)
            .build())
    }

    fn clone_box(&self) -> Box<dyn Formatter> {
        Box::new(self.clone())
    }
}

/// Routes the `log` macros to spdlog. Call once per process, before the
/// first record is written.
pub fn log_configure(config: &LoggingConfig) {
    if let Err(e) = spdlog::init_log_crate_proxy() {
        eprintln!("Logging was already initialized: {e}");
        return;
    }
    configure_logging(config.clone())
}

pub fn configure_logging(config: LoggingConfig) {
    let sink = match ScSink::new(config) {
        Some(sink) => Arc::new(sink),
        None => return,
    };
    sink.set_formatter(Box::<ScFormatter>::default());
    let logger: Arc<Logger> = match Logger::builder().sink(sink).build() {
        Ok(logger) => Arc::new(logger),
        Err(error) => {
            eprintln!("Error occurred while creating the logger: {error}");
            return;
        }
    };
    logger.set_level_filter(LevelFilter::All);
    logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Warn));

    let proxy: &'static spdlog::LogCrateProxy = spdlog::log_crate_proxy();
    log::set_max_level(log::LevelFilter::Trace);
    proxy.swap_logger(Some(logger));
}

pub fn flush_logs() {
    log::Log::flush(log::logger());
}

struct ScSink {
    std_sink: StdStreamSink,
    file_sink: Option<ScFileSink>,
    config: LoggingConfig,
}

impl ScSink {
    fn new(config: LoggingConfig) -> Option<ScSink> {
        // Results own stdout, so log records go to stderr
        let std_sink = match StdStreamSink::builder()
            .std_stream(StdStream::Stderr)
            .build()
        {
            Ok(std_sink) => std_sink,
            Err(error) => {
                eprintln!("Error occurred while creating stderr logging sink: {error}");
                return None;
            }
        };
        let file_sink = config.file.as_ref().and_then(|path| match ScFileSink::new(path) {
            Ok(file_sink) => Some(file_sink),
            Err(error) => {
                eprintln!("Could not open log file {}: {error}", path.display());
                None
            }
        });
        Some(Self {
            std_sink,
            file_sink,
            config,
        })
    }

    fn should_log(&self, module: &str, source_file: &str, record_level: Level) -> bool {
        let source_path_with_file = format!("{module}::{source_file}");
        match self
            .config
            .loggers
            .iter()
            .find(|logger| logger.component == module || logger.component == source_path_with_file)
        {
            None => ScSink::compare(record_level, self.config.default_level),
            Some(component_logger) => ScSink::compare(record_level, component_logger.level),
        }
    }

    pub const fn spd_level_to_u16(spd_level: Level) -> u16 {
        match spd_level {
            Level::Critical => 5,
            Level::Error => 4,
            Level::Warn => 3,
            Level::Info => 2,
            Level::Debug => 1,
            Level::Trace => 0,
        }
    }

    // config_level comes from sc_clone settings, level from spdlog
    pub fn compare(level: Level, config_level: LogLevel) -> bool {
        if config_level == LogLevel::None {
            return false;
        }
        let level_num: u16 = ScSink::spd_level_to_u16(level);
        let config_level_num: u16 = config_level as u16;
        config_level_num <= level_num
    }
}

impl Sink for ScSink {
    fn log(&self, record: &Record) -> spdlog::Result<()> {
        let (source_file, module_path) = match record.source_location() {
            None => ("", ""),
            Some(location) => (location.file_name(), location.module_path()),
        };
        if !self.should_log(module_path, source_file, record.level()) {
            return Ok(());
        }
        let std_result = self.std_sink.log(record);
        match &self.file_sink {
            Some(file_sink) => match (std_result, file_sink.log(record)) {
                (Err(_), Err(file_error)) => Err(file_error),
                _ => Ok(()),
            },
            None => std_result,
        }
    }

    fn flush(&self) -> spdlog::Result<()> {
        let std_result = self.std_sink.flush();
        match &self.file_sink {
            Some(file_sink) => match (std_result, file_sink.flush()) {
                (Err(std_error), Err(file_error)) => {
                    eprintln!(
                        "Failed flushing all sinks std_error: {std_error} file_error: {file_error}"
                    );
                    Err(file_error)
                }
                _ => Ok(()),
            },
            None => std_result,
        }
    }

    fn level_filter(&self) -> LevelFilter {
        self.std_sink.level_filter()
    }

    fn set_level_filter(&self, level_filter: LevelFilter) {
        self.std_sink.set_level_filter(level_filter);
    }

    fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        if let Some(file_sink) = &self.file_sink {
            file_sink.set_formatter(formatter.clone_box());
        }
        self.std_sink.set_formatter(formatter);
    }

    fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        self.std_sink.set_error_handler(handler);
    }
}
