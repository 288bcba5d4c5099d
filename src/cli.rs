use crate::service_control::dispatcher::Operation;
use crate::service_control::failure_policy::ServiceFailurePolicy;
use crate::service_control::report::ConfigView;
use crate::service_control::sc_error::ScError;
use crate::service_control::start_type::StartType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sc_clone",
    version,
    about = "Query and control Windows services",
    override_usage = "sc_clone [--config <PATH>] <command> <service_name> [options]"
)]
pub struct Cli {
    /// Settings file, defaults to sc_clone.json next to the executable
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the type and run state of a service
    Query {
        service_name: String,
        #[arg(hide = true)]
        ignored: Vec<String>,
    },
    /// Register an auto-start, own-process service for an executable
    Create {
        service_name: String,
        executable_path: PathBuf,
        #[arg(hide = true)]
        ignored: Vec<String>,
    },
    /// Start a service
    Start {
        service_name: String,
        #[arg(hide = true)]
        ignored: Vec<String>,
    },
    /// Send the stop control to a service
    Stop {
        service_name: String,
        #[arg(hide = true)]
        ignored: Vec<String>,
    },
    /// Mark a service for deletion
    Delete {
        service_name: String,
        #[arg(hide = true)]
        ignored: Vec<String>,
    },
    /// Show the configuration, or set the start type to auto, manual or disabled
    Config {
        service_name: String,
        start_type: Option<String>,
        #[arg(hide = true)]
        ignored: Vec<String>,
    },
    /// Show the display name and main configuration fields
    #[command(name = "qdescription")]
    QDescription {
        service_name: String,
        #[arg(hide = true)]
        ignored: Vec<String>,
    },
    /// Show the failure actions, or set them with
    /// reset=<secs> actions=<kind>/<delay>/... reboot=<msg> command=<cmd>
    Failure {
        service_name: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
}

impl Command {
    /// Arguments past the ones the sub-command reads. They are accepted and
    /// skipped, the way `sc.exe` skips them.
    pub fn ignored_args(&self) -> &[String] {
        match self {
            Command::Query { ignored, .. }
            | Command::Create { ignored, .. }
            | Command::Start { ignored, .. }
            | Command::Stop { ignored, .. }
            | Command::Delete { ignored, .. }
            | Command::Config { ignored, .. }
            | Command::QDescription { ignored, .. } => ignored,
            Command::Failure { .. } => &[],
        }
    }
}

impl Cli {
    pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Cli::try_parse_from(args)
    }
}

impl TryFrom<Command> for Operation {
    type Error = ScError;

    fn try_from(command: Command) -> Result<Self, Self::Error> {
        if !command.ignored_args().is_empty() {
            log::warn!("Ignoring extra arguments: {}", command.ignored_args().join(" "));
        }
        let operation = match command {
            Command::Query { service_name, .. } => Operation::QueryStatus { name: service_name },
            Command::Create {
                service_name,
                executable_path,
                ..
            } => Operation::Create {
                name: service_name,
                executable_path,
            },
            Command::Start { service_name, .. } => Operation::Start { name: service_name },
            Command::Stop { service_name, .. } => Operation::Stop { name: service_name },
            Command::Delete { service_name, .. } => Operation::Delete { name: service_name },
            Command::Config {
                service_name,
                start_type: None,
                ..
            } => Operation::QueryConfig {
                name: service_name,
                view: ConfigView::Configuration,
            },
            Command::Config {
                service_name,
                start_type: Some(token),
                ..
            } => Operation::SetStartType {
                name: service_name,
                start_type: token.parse::<StartType>()?,
            },
            Command::QDescription { service_name, .. } => Operation::QueryConfig {
                name: service_name,
                view: ConfigView::Description,
            },
            Command::Failure {
                service_name,
                options,
            } if options.is_empty() => Operation::QueryFailurePolicy { name: service_name },
            Command::Failure {
                service_name,
                options,
            } => Operation::SetFailurePolicy {
                name: service_name,
                policy: ServiceFailurePolicy::from_args(&options)?,
            },
        };
        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_control::failure_policy::{FailureAction, FailureActionKind};
    use crate::service_control::sc_error::ScErrorKind;
    use clap::error::ErrorKind;

    fn decode(args: &[&str]) -> Result<Operation, ScError> {
        let cli = Cli::parse_args(args).expect("arguments should parse");
        Operation::try_from(cli.command)
    }

    #[test]
    fn query_decodes() {
        assert_eq!(
            decode(&["sc_clone", "query", "Spooler"]).unwrap(),
            Operation::QueryStatus {
                name: "Spooler".to_string()
            }
        );
    }

    #[test]
    fn missing_service_name_is_a_usage_error() {
        let error = Cli::parse_args(["sc_clone", "query"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn create_needs_an_executable_path() {
        assert!(Cli::parse_args(["sc_clone", "create", "demo"]).is_err());
        assert_eq!(
            decode(&["sc_clone", "create", "demo", "C:\\svc\\demo.exe"]).unwrap(),
            Operation::Create {
                name: "demo".to_string(),
                executable_path: PathBuf::from("C:\\svc\\demo.exe"),
            }
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        let error = Cli::parse_args(["sc_clone", "pause", "demo"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn config_modes() {
        assert_eq!(
            decode(&["sc_clone", "config", "demo"]).unwrap(),
            Operation::QueryConfig {
                name: "demo".to_string(),
                view: ConfigView::Configuration,
            }
        );
        assert_eq!(
            decode(&["sc_clone", "config", "demo", "manual"]).unwrap(),
            Operation::SetStartType {
                name: "demo".to_string(),
                start_type: StartType::Manual,
            }
        );
        let error = decode(&["sc_clone", "config", "demo", "sometimes"]).unwrap_err();
        assert_eq!(error.kind, ScErrorKind::MalformedInput);
    }

    #[test]
    fn qdescription_is_the_description_view() {
        assert_eq!(
            decode(&["sc_clone", "qdescription", "demo"]).unwrap(),
            Operation::QueryConfig {
                name: "demo".to_string(),
                view: ConfigView::Description,
            }
        );
    }

    #[test]
    fn failure_modes() {
        assert_eq!(
            decode(&["sc_clone", "failure", "demo"]).unwrap(),
            Operation::QueryFailurePolicy {
                name: "demo".to_string()
            }
        );
        match decode(&["sc_clone", "failure", "demo", "reset=60", "actions=restart/5"]).unwrap() {
            Operation::SetFailurePolicy { name, policy } => {
                assert_eq!(name, "demo");
                assert_eq!(policy.reset_period_seconds, 60);
                assert_eq!(
                    policy.actions,
                    vec![FailureAction::new(FailureActionKind::Restart, 5)]
                );
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn failure_options_may_look_like_flags() {
        match decode(&["sc_clone", "failure", "demo", "command=notify.exe --quiet"]).unwrap() {
            Operation::SetFailurePolicy { policy, .. } => {
                assert_eq!(policy.failure_command.as_deref(), Some("notify.exe --quiet"));
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn config_file_option() {
        let cli =
            Cli::parse_args(["sc_clone", "--config", "C:\\sc.json", "start", "demo"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("C:\\sc.json")));
        assert_eq!(
            cli.command,
            Command::Start {
                service_name: "demo".to_string(),
                ignored: vec![],
            }
        );
    }

    #[test]
    fn extra_arguments_are_skipped() {
        let cli = Cli::parse_args(["sc_clone", "start", "demo", "extra", "more"]).unwrap();
        assert_eq!(cli.command.ignored_args(), ["extra".to_string(), "more".to_string()]);
        assert_eq!(
            Operation::try_from(cli.command).unwrap(),
            Operation::Start {
                name: "demo".to_string()
            }
        );
        assert_eq!(
            decode(&["sc_clone", "config", "demo", "auto", "now"]).unwrap(),
            Operation::SetStartType {
                name: "demo".to_string(),
                start_type: StartType::Automatic,
            }
        );
        assert_eq!(
            decode(&["sc_clone", "create", "demo", "C:\\svc\\demo.exe", "extra"]).unwrap(),
            Operation::Create {
                name: "demo".to_string(),
                executable_path: PathBuf::from("C:\\svc\\demo.exe"),
            }
        );
    }
}
