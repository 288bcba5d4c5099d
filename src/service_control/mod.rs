pub mod dispatcher;
pub mod failure_policy;
pub mod report;
pub mod sc_error;
#[cfg(windows)]
mod sc_handle;
pub mod service_registry_trait;
pub mod snapshot;
pub mod start_type;
#[cfg(windows)]
pub mod windows_service_control;
#[cfg(not(windows))]
pub mod unsupported_platform;
