use crate::service_control::failure_policy::{ServiceFailurePolicy, RESET_NEVER};
use crate::service_control::snapshot::{
    service_type_to_string, ServiceConfigSnapshot, ServiceStatusSnapshot,
};
use std::io::{Result, Write};

const NONE: &str = "(None)";

/// Which labels a configuration query is printed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigView {
    Configuration,
    Description,
}

pub fn write_status(out: &mut dyn Write, name: &str, status: &ServiceStatusSnapshot) -> Result<()> {
    writeln!(out, "SERVICE_NAME: {name}")?;
    writeln!(
        out,
        "        TYPE               : {}",
        service_type_to_string(status.service_type)
    )?;
    writeln!(out, "        STATE              : {}", status.state)
}

pub fn write_config(
    out: &mut dyn Write,
    name: &str,
    config: &ServiceConfigSnapshot,
    view: ConfigView,
) -> Result<()> {
    let binary_path = config.binary_path.as_deref().unwrap_or(NONE);
    match view {
        ConfigView::Configuration => {
            let dependencies = if config.dependencies.is_empty() {
                NONE.to_string()
            } else {
                config.dependencies.join(", ")
            };
            writeln!(out, "Service Configuration for: {name}")?;
            writeln!(out, "        BINARY_PATH_NAME    : {binary_path}")?;
            writeln!(out, "        START_TYPE          : {}", config.start_type)?;
            writeln!(out, "        ERROR_CONTROL       : {}", config.error_control)?;
            writeln!(out, "        SERVICE_DEPENDENCIES: {dependencies}")?;
            writeln!(
                out,
                "        SERVICE_START_NAME  : {}",
                config.account_name.as_deref().unwrap_or(NONE)
            )
        }
        ConfigView::Description => {
            writeln!(out, "SERVICE_NAME: {name}")?;
            writeln!(
                out,
                "        DESCRIPTION       : {}",
                config.display_name.as_deref().unwrap_or(NONE)
            )?;
            writeln!(out, "        SERVICE_TYPE      : {}", config.service_type)?;
            writeln!(out, "        START_TYPE        : {}", config.start_type)?;
            writeln!(out, "        ERROR_CONTROL     : {}", config.error_control)?;
            writeln!(out, "        BINARY_PATH_NAME  : {binary_path}")
        }
    }
}

pub fn write_failure_policy(
    out: &mut dyn Write,
    name: &str,
    policy: Option<&ServiceFailurePolicy>,
) -> Result<()> {
    let policy = match policy {
        Some(policy) => policy,
        None => return writeln!(out, "No existing failure actions found for service: {name}"),
    };
    writeln!(out, "Current failure actions for service: {name}")?;
    if policy.reset_period_seconds == RESET_NEVER {
        writeln!(out, "    Reset period (in seconds): INFINITE")?;
    } else {
        writeln!(out, "    Reset period (in seconds): {}", policy.reset_period_seconds)?;
    }
    if policy.actions.is_empty() {
        writeln!(out, "    No failure actions set.")?;
    }
    for (index, action) in policy.actions.iter().enumerate() {
        writeln!(
            out,
            "    Action {}: {} with delay: {} seconds.",
            index + 1,
            action.kind,
            action.delay_seconds
        )?;
    }
    if let Some(message) = &policy.reboot_message {
        writeln!(out, "    Reboot message: {message}")?;
    }
    if let Some(command) = &policy.failure_command {
        writeln!(out, "    Command line: {command}")?;
    }
    Ok(())
}
