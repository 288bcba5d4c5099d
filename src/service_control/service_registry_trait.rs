use crate::service_control::failure_policy::ServiceFailurePolicy;
use crate::service_control::sc_error::ScError;
use crate::service_control::snapshot::{ServiceConfigSnapshot, ServiceStatusSnapshot};
use crate::service_control::start_type::StartType;
use std::path::Path;

use mockall::automock;

/// One method per request the tool makes to the service control manager.
/// Every call opens and releases its own handles.
#[automock]
pub trait ServiceRegistry {
    fn query_status(&self, name: &str) -> Result<ServiceStatusSnapshot, ScError>;
    fn create(&self, name: &str, executable_path: &Path) -> Result<(), ScError>;
    fn start(&self, name: &str) -> Result<(), ScError>;
    /// Returns the status reported right after the stop control was sent.
    fn stop(&self, name: &str) -> Result<ServiceStatusSnapshot, ScError>;
    fn delete(&self, name: &str) -> Result<(), ScError>;
    fn query_config(&self, name: &str) -> Result<ServiceConfigSnapshot, ScError>;
    /// Changes the start type and nothing else.
    fn change_start_type(&self, name: &str, start_type: StartType) -> Result<(), ScError>;
    /// `Ok(None)` when the service has no failure policy configured.
    fn query_failure_policy(&self, name: &str) -> Result<Option<ServiceFailurePolicy>, ScError>;
    fn change_failure_policy(
        &self,
        name: &str,
        policy: &ServiceFailurePolicy,
    ) -> Result<(), ScError>;
}
