use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;

use crate::cli::{Cli, Command};
use crate::config::{Config, LoggingConfig};
use crate::logger::logging_configuration;
use crate::service_control::dispatcher::{self, Operation};
use crate::service_control::sc_error::ScError;
use crate::service_control::service_registry_trait::ServiceRegistry;
use crate::utils::color;

pub mod cli;
pub mod config;
pub mod logger;
pub mod service_control;
pub mod utils;

/// Runs one `sc_clone` invocation and returns the process exit status.
pub fn run(args: &[String]) -> ExitCode {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let cli = match parse_or_report(args, &mut stdout, &mut stderr) {
        Ok(cli) => cli,
        Err(code) => return ExitCode::from(code),
    };

    let config = load_config(cli.config.as_deref(), &LoggingConfig::default());
    color::set_colors_enabled(config.color && io::stderr().is_terminal());
    log::debug!(
        "sc_clone {} targeting {}, logging: {}",
        env!("CARGO_PKG_VERSION"),
        config.machine.as_deref().unwrap_or("local computer"),
        config.logging
    );

    let registry = platform_registry(&config);
    let code = execute_command(cli.command, &registry, &mut stdout, &mut stderr);
    logging_configuration::flush_logs();
    ExitCode::from(code)
}

/// Starts logging with `startup_logging` so settings problems are reported,
/// then reads the settings and switches logging over to them.
pub fn load_config(path: Option<&Path>, startup_logging: &LoggingConfig) -> Config {
    logging_configuration::log_configure(startup_logging);
    let config = Config::load(path);
    logging_configuration::configure_logging(config.logging.clone());
    config
}

/// Parses the command line. Help and version requests are answered here.
/// `Err` carries the exit code to leave with.
pub fn parse_or_report(
    args: &[String],
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Cli, u8> {
    match Cli::parse_args(args) {
        Ok(cli) => Ok(cli),
        Err(error) if !error.use_stderr() => {
            write!(out, "{error}").ok();
            Err(0)
        }
        Err(error) => {
            write!(err, "{error}").ok();
            Err(ScError::USAGE_EXIT_CODE)
        }
    }
}

/// Decodes `command`, runs it against `registry` and reports the outcome.
/// Returns the exit code.
pub fn execute_command(
    command: Command,
    registry: &impl ServiceRegistry,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> u8 {
    let result = Operation::try_from(command).and_then(|operation| {
        log::info!("Running {:?} on {}", operation, operation.service_name());
        dispatcher::execute(&operation, registry, out)
    });
    match result {
        Ok(()) => 0,
        Err(error) => {
            log::debug!("Command failed: {error:?}");
            writeln!(err, "{error}").ok();
            error.exit_code()
        }
    }
}

#[cfg(windows)]
fn platform_registry(config: &Config) -> impl ServiceRegistry {
    service_control::windows_service_control::WindowsServiceControl::new(config.machine.clone())
}

#[cfg(not(windows))]
fn platform_registry(_config: &Config) -> impl ServiceRegistry {
    service_control::unsupported_platform::UnsupportedPlatform
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_control::service_registry_trait::MockServiceRegistry;
    use crate::service_control::start_type::StartType;
    use mockall::predicate::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn command(values: &[&str]) -> Command {
        let mut out = Vec::new();
        let mut err = Vec::new();
        parse_or_report(&args(values), &mut out, &mut err)
            .expect("arguments should parse")
            .command
    }

    #[test]
    fn missing_service_name_exits_with_usage_code() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = parse_or_report(&args(&["sc_clone", "query"]), &mut out, &mut err);
        assert_eq!(result.err(), Some(1));
        assert!(out.is_empty());
        assert!(!err.is_empty());
    }

    #[test]
    fn create_without_path_never_reaches_the_registry() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = parse_or_report(&args(&["sc_clone", "create", "demo"]), &mut out, &mut err);
        assert_eq!(result.err(), Some(1));
    }

    #[test]
    fn no_arguments_at_all() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = parse_or_report(&args(&["sc_clone"]), &mut out, &mut err);
        assert_eq!(result.err(), Some(1));
    }

    #[test]
    fn help_goes_to_stdout_and_succeeds() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = parse_or_report(&args(&["sc_clone", "--help"]), &mut out, &mut err);
        assert_eq!(result.err(), Some(0));
        let help = String::from_utf8(out).unwrap();
        assert!(help.contains("qdescription"));
        assert!(err.is_empty());
    }

    #[test]
    fn invalid_start_type_makes_no_registry_calls() {
        // Any call on a mock without expectations panics
        let registry = MockServiceRegistry::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = execute_command(
            command(&["sc_clone", "config", "demo", "sometimes"]),
            &registry,
            &mut out,
            &mut err,
        );
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(String::from_utf8(err).unwrap().contains("Invalid start type: sometimes"));
    }

    #[test]
    fn malformed_failure_actions_make_no_registry_calls() {
        let registry = MockServiceRegistry::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = execute_command(
            command(&["sc_clone", "failure", "demo", "actions=30/restart"]),
            &registry,
            &mut out,
            &mut err,
        );
        assert_eq!(code, 1);
        assert!(String::from_utf8(err).unwrap().contains("does not follow any action"));
    }

    #[test]
    fn valid_start_type_changes_only_the_start_type() {
        let mut registry = MockServiceRegistry::new();
        registry
            .expect_change_start_type()
            .with(eq("demo"), eq(StartType::Disabled))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = execute_command(
            command(&["sc_clone", "config", "demo", "disabled"]),
            &registry,
            &mut out,
            &mut err,
        );
        assert_eq!(code, 0);
        assert!(err.is_empty());
    }

    #[test]
    fn operation_failures_exit_with_failure_code() {
        let mut registry = MockServiceRegistry::new();
        registry.expect_delete().times(1).returning(|_| {
            Err(ScError::os(
                service_control::sc_error::ScErrorKind::Operation,
                "DeleteService",
                io::Error::from_raw_os_error(1072),
            ))
        });
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = execute_command(
            command(&["sc_clone", "delete", "demo"]),
            &registry,
            &mut out,
            &mut err,
        );
        assert_eq!(code, ScError::FAILURE_EXIT_CODE);
        assert!(String::from_utf8(err).unwrap().starts_with("DeleteService FAILED 1072: "));
    }

    #[test]
    fn extra_arguments_still_run_the_operation() {
        let mut registry = MockServiceRegistry::new();
        registry
            .expect_start()
            .with(eq("demo"))
            .times(1)
            .returning(|_| Ok(()));
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = execute_command(
            command(&["sc_clone", "start", "demo", "extra"]),
            &registry,
            &mut out,
            &mut err,
        );
        assert_eq!(code, 0);
        assert!(String::from_utf8(out).unwrap().contains("StartService SUCCESS"));
    }

    // The only test that installs the process-wide logger
    #[test]
    fn unreadable_settings_are_logged_as_a_warning() {
        let dir = std::env::temp_dir().join("sc_clone_lib_unreadable_settings");
        std::fs::create_dir_all(&dir).unwrap();
        let settings = dir.join("sc_clone.json");
        let log_file = dir.join("startup.log");
        std::fs::write(&settings, r#"{ "color": tru"#).unwrap();
        std::fs::remove_file(&log_file).ok();

        let startup_logging = LoggingConfig {
            file: Some(log_file.clone()),
            ..LoggingConfig::default()
        };
        let config = load_config(Some(&settings), &startup_logging);
        logging_configuration::flush_logs();

        assert_eq!(config, Config::new());
        let logged = std::fs::read_to_string(&log_file).unwrap();
        assert!(logged.contains("[WARN]"));
        assert!(logged.contains("could not read"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
