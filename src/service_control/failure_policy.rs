use crate::service_control::sc_error::ScError;
use std::fmt::{Display, Formatter, Result};

/// Reset period the SCM reports when the failure count never resets.
pub const RESET_NEVER: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureActionKind {
    Restart,
    Reboot,
    RunCommand,
    /// Reported by the registry for actions we have no name for
    Unknown,
}

impl FailureActionKind {
    fn from_keyword(token: &str) -> Option<FailureActionKind> {
        match token {
            "restart" => Some(FailureActionKind::Restart),
            "reboot" => Some(FailureActionKind::Reboot),
            "run" => Some(FailureActionKind::RunCommand),
            _ => None,
        }
    }
}

impl Display for FailureActionKind {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            FailureActionKind::Restart => write!(f, "Restart"),
            FailureActionKind::Reboot => write!(f, "Reboot"),
            FailureActionKind::RunCommand => write!(f, "Run Command"),
            FailureActionKind::Unknown => write!(f, "Unknown action"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureAction {
    pub kind: FailureActionKind,
    pub delay_seconds: u32,
}

impl FailureAction {
    pub fn new(kind: FailureActionKind, delay_seconds: u32) -> Self {
        Self {
            kind,
            delay_seconds,
        }
    }
}

/// Recovery policy the SCM applies after a service terminates unexpectedly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceFailurePolicy {
    pub reset_period_seconds: u32,
    pub actions: Vec<FailureAction>,
    pub reboot_message: Option<String>,
    pub failure_command: Option<String>,
}

impl ServiceFailurePolicy {
    /// True when nothing at all is configured, which is how the registry
    /// answers for a service that never had a policy.
    pub fn is_unset(&self) -> bool {
        self.reset_period_seconds == 0
            && self.actions.is_empty()
            && self.reboot_message.is_none()
            && self.failure_command.is_none()
    }

    pub fn has_restart_action(&self) -> bool {
        self.actions
            .iter()
            .any(|action| action.kind == FailureActionKind::Restart)
    }

    /// Builds a policy from the trailing arguments of the `failure` command.
    ///
    /// Recognised arguments are `reset=<seconds>`, `actions=<kind>/<delay>/...`,
    /// `reboot=<message>` and `command=<command line>`. Anything else is
    /// skipped with a warning. Several `actions=` arguments extend the same
    /// list.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> std::result::Result<Self, ScError> {
        let mut policy = ServiceFailurePolicy::default();
        for arg in args {
            let arg = arg.as_ref();
            if let Some(value) = arg.strip_prefix("reset=") {
                policy.reset_period_seconds = parse_seconds("reset", value)?;
            } else if let Some(value) = arg.strip_prefix("actions=") {
                parse_action_list(value, &mut policy.actions)?;
            } else if let Some(value) = arg.strip_prefix("reboot=") {
                policy.reboot_message = non_empty(value);
            } else if let Some(value) = arg.strip_prefix("command=") {
                policy.failure_command = non_empty(value);
            } else {
                log::warn!("Ignoring unrecognized failure option: {arg}");
            }
        }
        log::debug!("Parsed failure policy: {policy:?}");
        Ok(policy)
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_seconds(field: &str, value: &str) -> std::result::Result<u32, ScError> {
    value.parse::<u32>().map_err(|e| {
        ScError::malformed(format!(
            "Invalid {field} value '{value}': expected a whole number of seconds ({e})"
        ))
    })
}

// A bare number is the delay of the action right before it
fn parse_action_list(
    list: &str,
    actions: &mut Vec<FailureAction>,
) -> std::result::Result<(), ScError> {
    for token in list.split('/').filter(|token| !token.is_empty()) {
        if let Some(kind) = FailureActionKind::from_keyword(token) {
            actions.push(FailureAction::new(kind, 0));
            continue;
        }
        if !token.chars().all(|c| c.is_ascii_digit()) {
            return Err(ScError::malformed(format!(
                "Invalid action '{token}': expected 'restart', 'run', 'reboot' or a delay in seconds"
            )));
        }
        let delay = parse_seconds("delay", token)?;
        match actions.last_mut() {
            Some(action) => action.delay_seconds = delay,
            None => {
                return Err(ScError::malformed(format!(
                    "Delay '{token}' does not follow any action"
                )))
            }
        }
    }
    Ok(())
}
