use crate::service_control::failure_policy::ServiceFailurePolicy;
use crate::service_control::report::{self, ConfigView};
use crate::service_control::sc_error::ScError;
use crate::service_control::service_registry_trait::ServiceRegistry;
use crate::service_control::start_type::StartType;
use std::io::Write;
use std::path::PathBuf;

/// A fully decoded command. Everything that can be rejected without asking
/// the service control manager has already been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    QueryStatus { name: String },
    Create { name: String, executable_path: PathBuf },
    Start { name: String },
    Stop { name: String },
    Delete { name: String },
    QueryConfig { name: String, view: ConfigView },
    SetStartType { name: String, start_type: StartType },
    QueryFailurePolicy { name: String },
    SetFailurePolicy { name: String, policy: ServiceFailurePolicy },
}

impl Operation {
    pub fn service_name(&self) -> &str {
        match self {
            Operation::QueryStatus { name }
            | Operation::Create { name, .. }
            | Operation::Start { name }
            | Operation::Stop { name }
            | Operation::Delete { name }
            | Operation::QueryConfig { name, .. }
            | Operation::SetStartType { name, .. }
            | Operation::QueryFailurePolicy { name }
            | Operation::SetFailurePolicy { name, .. } => name,
        }
    }
}

/// Runs one operation against `registry` and writes the result to `out`.
pub fn execute(
    operation: &Operation,
    registry: &impl ServiceRegistry,
    out: &mut dyn Write,
) -> Result<(), ScError> {
    log::debug!("Executing {operation:?}");
    match operation {
        Operation::QueryStatus { name } => {
            let status = registry.query_status(name)?;
            report::write_status(out, name, &status)?;
        }
        Operation::Create {
            name,
            executable_path,
        } => {
            registry.create(name, executable_path)?;
            writeln!(out, "CreateService SUCCESS")?;
            writeln!(out, "Service {name} created successfully.")?;
        }
        Operation::Start { name } => {
            registry.start(name)?;
            writeln!(out, "StartService SUCCESS")?;
        }
        Operation::Stop { name } => {
            let status = registry.stop(name)?;
            writeln!(out, "ControlService SUCCESS")?;
            report::write_status(out, name, &status)?;
        }
        Operation::Delete { name } => {
            registry.delete(name)?;
            writeln!(out, "DeleteService SUCCESS")?;
        }
        Operation::QueryConfig { name, view } => {
            let config = registry.query_config(name)?;
            report::write_config(out, name, &config, *view)?;
        }
        Operation::SetStartType { name, start_type } => {
            writeln!(out, "Updating service start type to: {start_type}")?;
            registry.change_start_type(name, *start_type)?;
            writeln!(out, "Service start type successfully changed to: {start_type}")?;
        }
        Operation::QueryFailurePolicy { name } => {
            let policy = registry.query_failure_policy(name)?;
            report::write_failure_policy(out, name, policy.as_ref())?;
        }
        Operation::SetFailurePolicy { name, policy } => {
            registry.change_failure_policy(name, policy)?;
            writeln!(out, "Service failure actions configured for: {name}")?;
        }
    }
    Ok(())
}
