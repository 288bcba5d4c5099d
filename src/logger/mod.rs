pub mod file_sink;
pub mod logging_configuration;
