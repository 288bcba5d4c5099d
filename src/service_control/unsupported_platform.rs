use crate::service_control::failure_policy::ServiceFailurePolicy;
use crate::service_control::sc_error::ScError;
use crate::service_control::service_registry_trait::ServiceRegistry;
use crate::service_control::snapshot::{ServiceConfigSnapshot, ServiceStatusSnapshot};
use crate::service_control::start_type::StartType;
use std::path::Path;

/// Stands in for the service control manager where there is none. Every
/// request fails after the command line has been validated.
pub struct UnsupportedPlatform;

impl UnsupportedPlatform {
    fn unavailable<T>(call: &str) -> Result<T, ScError> {
        log::debug!("{call} requested on {}", std::env::consts::OS);
        Err(ScError::operation(
            call,
            format!(
                "the Windows service control manager is not available on {}",
                std::env::consts::OS
            ),
        ))
    }
}

impl ServiceRegistry for UnsupportedPlatform {
    fn query_status(&self, _name: &str) -> Result<ServiceStatusSnapshot, ScError> {
        Self::unavailable("QueryServiceStatus")
    }

    fn create(&self, _name: &str, _executable_path: &Path) -> Result<(), ScError> {
        Self::unavailable("CreateService")
    }

    fn start(&self, _name: &str) -> Result<(), ScError> {
        Self::unavailable("StartService")
    }

    fn stop(&self, _name: &str) -> Result<ServiceStatusSnapshot, ScError> {
        Self::unavailable("ControlService")
    }

    fn delete(&self, _name: &str) -> Result<(), ScError> {
        Self::unavailable("DeleteService")
    }

    fn query_config(&self, _name: &str) -> Result<ServiceConfigSnapshot, ScError> {
        Self::unavailable("QueryServiceConfig")
    }

    fn change_start_type(&self, _name: &str, _start_type: StartType) -> Result<(), ScError> {
        Self::unavailable("ChangeServiceConfig")
    }

    fn query_failure_policy(&self, _name: &str) -> Result<Option<ServiceFailurePolicy>, ScError> {
        Self::unavailable("QueryServiceConfig2")
    }

    fn change_failure_policy(
        &self,
        _name: &str,
        _policy: &ServiceFailurePolicy,
    ) -> Result<(), ScError> {
        Self::unavailable("ChangeServiceConfig2")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_control::sc_error::ScErrorKind;

    #[test]
    fn every_request_fails_as_an_operation_error() {
        let error = UnsupportedPlatform.start("demo").unwrap_err();
        assert_eq!(error.kind, ScErrorKind::Operation);
        assert_eq!(error.call.as_deref(), Some("StartService"));
        assert_eq!(error.exit_code(), ScError::FAILURE_EXIT_CODE);
    }
}
