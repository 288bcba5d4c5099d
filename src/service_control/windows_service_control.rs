use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::ptr;
use std::time::Duration;

use windows_service::service::{
    Service, ServiceAccess, ServiceAction, ServiceActionType, ServiceConfig, ServiceDependency,
    ServiceErrorControl, ServiceFailureActions, ServiceFailureResetPeriod, ServiceInfo,
    ServiceStartType, ServiceState, ServiceStatus, ServiceType,
};
use windows_service::service_manager::{ServiceManager, ServiceManagerAccess};
use windows_sys::Win32::System::Services::{
    ChangeServiceConfigW, SC_MANAGER_CONNECT, SERVICE_CHANGE_CONFIG, SERVICE_NO_CHANGE,
};

use crate::service_control::failure_policy::{
    FailureAction, FailureActionKind, ServiceFailurePolicy, RESET_NEVER,
};
use crate::service_control::sc_error::{ScError, ScErrorKind};
use crate::service_control::sc_handle::ScHandle;
use crate::service_control::service_registry_trait::ServiceRegistry;
use crate::service_control::snapshot::{RunState, ServiceConfigSnapshot, ServiceStatusSnapshot};
use crate::service_control::start_type::StartType;

/// `ServiceRegistry` backed by the Windows service control manager.
pub struct WindowsServiceControl {
    machine: Option<String>,
}

impl WindowsServiceControl {
    /// `machine` selects a remote computer, `None` the local one.
    pub fn new(machine: Option<String>) -> Self {
        Self { machine }
    }

    fn open_manager(&self, access: ServiceManagerAccess) -> Result<ServiceManager, ScError> {
        log::debug!("Opening service manager on {}", self.machine_label());
        let manager = match &self.machine {
            Some(machine) => ServiceManager::remote_computer(machine, None::<&str>, access),
            None => ServiceManager::local_computer(None::<&str>, access),
        };
        manager.map_err(|e| to_sc_error(ScErrorKind::RegistryAccess, "OpenSCManager", e))
    }

    // Opens manager and service, runs `action`, and drops both handles on
    // every path out of here.
    fn with_service<T>(
        &self,
        name: &str,
        service_access: ServiceAccess,
        call: &str,
        action: impl FnOnce(&Service) -> windows_service::Result<T>,
    ) -> Result<T, ScError> {
        let manager = self.open_manager(ServiceManagerAccess::CONNECT)?;
        log::debug!("Opening service {name} with {service_access:?}");
        let service = manager
            .open_service(name, service_access)
            .map_err(|e| to_sc_error(ScErrorKind::RegistryAccess, "OpenService", e))?;
        let result = action(&service).map_err(|e| to_sc_error(ScErrorKind::Operation, call, e));
        log::trace!("{call} on {name} finished, releasing handles");
        result
    }

    fn machine_label(&self) -> &str {
        self.machine.as_deref().unwrap_or("local computer")
    }
}

impl ServiceRegistry for WindowsServiceControl {
    fn query_status(&self, name: &str) -> Result<ServiceStatusSnapshot, ScError> {
        self.with_service(name, ServiceAccess::QUERY_STATUS, "QueryServiceStatus", |service| {
            service.query_status()
        })
        .map(status_snapshot)
    }

    fn create(&self, name: &str, executable_path: &Path) -> Result<(), ScError> {
        let manager = self
            .open_manager(ServiceManagerAccess::CONNECT | ServiceManagerAccess::CREATE_SERVICE)?;
        let service_info = ServiceInfo {
            name: OsString::from(name),
            display_name: OsString::from(name),
            service_type: ServiceType::OWN_PROCESS,
            start_type: ServiceStartType::AutoStart,
            error_control: ServiceErrorControl::Normal,
            executable_path: executable_path.to_path_buf(),
            launch_arguments: vec![],
            dependencies: vec![],
            account_name: None,
            account_password: None,
        };
        log::info!("Creating service {name} for {}", executable_path.display());
        // The returned handle is dropped straight away
        manager
            .create_service(&service_info, ServiceAccess::QUERY_STATUS)
            .map(|_| ())
            .map_err(|e| to_sc_error(ScErrorKind::Operation, "CreateService", e))
    }

    fn start(&self, name: &str) -> Result<(), ScError> {
        self.with_service(name, ServiceAccess::START, "StartService", |service| {
            service.start(&[] as &[&OsStr])
        })
    }

    fn stop(&self, name: &str) -> Result<ServiceStatusSnapshot, ScError> {
        self.with_service(name, ServiceAccess::STOP, "ControlService", |service| service.stop())
            .map(status_snapshot)
    }

    fn delete(&self, name: &str) -> Result<(), ScError> {
        self.with_service(name, ServiceAccess::DELETE, "DeleteService", |service| service.delete())
    }

    fn query_config(&self, name: &str) -> Result<ServiceConfigSnapshot, ScError> {
        self.with_service(name, ServiceAccess::QUERY_CONFIG, "QueryServiceConfig", |service| {
            service.query_config()
        })
        .map(config_snapshot)
    }

    fn change_start_type(&self, name: &str, start_type: StartType) -> Result<(), ScError> {
        // windows-service only changes the whole configuration at once, so
        // this call goes straight to ChangeServiceConfigW with SERVICE_NO_CHANGE
        let manager = ScHandle::open_manager(self.machine.as_deref(), SC_MANAGER_CONNECT)
            .map_err(|e| ScError::os(ScErrorKind::RegistryAccess, "OpenSCManager", e))?;
        let service = manager
            .open_service(name, SERVICE_CHANGE_CONFIG)
            .map_err(|e| ScError::os(ScErrorKind::RegistryAccess, "OpenService", e))?;
        log::info!("Setting start type of {name} to {start_type} ({})", start_type.code());
        let changed = unsafe {
            ChangeServiceConfigW(
                service.raw_handle(),
                SERVICE_NO_CHANGE,
                start_type.code(),
                SERVICE_NO_CHANGE,
                ptr::null(),
                ptr::null(),
                ptr::null_mut(),
                ptr::null(),
                ptr::null(),
                ptr::null(),
                ptr::null(),
            )
        };
        if changed == 0 {
            return Err(ScError::os(
                ScErrorKind::Operation,
                "ChangeServiceConfig",
                std::io::Error::last_os_error(),
            ));
        }
        Ok(())
    }

    fn query_failure_policy(&self, name: &str) -> Result<Option<ServiceFailurePolicy>, ScError> {
        let actions = self.with_service(
            name,
            ServiceAccess::QUERY_CONFIG,
            "QueryServiceConfig2",
            |service| service.get_failure_actions(),
        )?;
        let policy = failure_policy_from(actions);
        if policy.is_unset() {
            Ok(None)
        } else {
            Ok(Some(policy))
        }
    }

    fn change_failure_policy(
        &self,
        name: &str,
        policy: &ServiceFailurePolicy,
    ) -> Result<(), ScError> {
        // Restart actions are refused unless the handle may also start the service
        let access = if policy.has_restart_action() {
            ServiceAccess::CHANGE_CONFIG | ServiceAccess::START
        } else {
            ServiceAccess::CHANGE_CONFIG
        };
        let update = failure_actions_from(policy);
        self.with_service(name, access, "ChangeServiceConfig2", |service| {
            service.update_failure_actions(update)
        })
    }
}

fn to_sc_error(kind: ScErrorKind, call: &str, error: windows_service::Error) -> ScError {
    match error {
        windows_service::Error::Winapi(io_error) => ScError::os(kind, call, io_error),
        other => {
            let mut sc_error = ScError::operation(call, other.to_string());
            sc_error.kind = kind;
            sc_error
        }
    }
}

fn status_snapshot(status: ServiceStatus) -> ServiceStatusSnapshot {
    let state = match status.current_state {
        ServiceState::Running => RunState::Running,
        ServiceState::Stopped => RunState::Stopped,
        ServiceState::Paused => RunState::Paused,
        _ => RunState::Other,
    };
    ServiceStatusSnapshot {
        service_type: status.service_type.bits(),
        state,
    }
}

fn config_snapshot(config: ServiceConfig) -> ServiceConfigSnapshot {
    let binary_path = config.executable_path.to_string_lossy().to_string();
    let display_name = config.display_name.to_string_lossy().to_string();
    ServiceConfigSnapshot {
        service_type: config.service_type.bits(),
        start_type: config.start_type as u32,
        error_control: config.error_control as u32,
        binary_path: Some(binary_path).filter(|path| !path.is_empty()),
        dependencies: config.dependencies.iter().map(dependency_name).collect(),
        account_name: config
            .account_name
            .map(|account| account.to_string_lossy().to_string()),
        display_name: Some(display_name).filter(|name| !name.is_empty()),
    }
}

// Groups carry the SCM group prefix
fn dependency_name(dependency: &ServiceDependency) -> String {
    match dependency {
        ServiceDependency::Service(name) => name.to_string_lossy().to_string(),
        ServiceDependency::Group(name) => format!("+{}", name.to_string_lossy()),
    }
}

fn failure_policy_from(failure_actions: ServiceFailureActions) -> ServiceFailurePolicy {
    let reset_period_seconds = match failure_actions.reset_period {
        ServiceFailureResetPeriod::Never => RESET_NEVER,
        ServiceFailureResetPeriod::After(period) => seconds(period),
    };
    let actions = failure_actions
        .actions
        .unwrap_or_default()
        .iter()
        .map(|action| {
            let kind = match action.action_type {
                ServiceActionType::Restart => FailureActionKind::Restart,
                ServiceActionType::Reboot => FailureActionKind::Reboot,
                ServiceActionType::RunCommand => FailureActionKind::RunCommand,
                _ => FailureActionKind::Unknown,
            };
            FailureAction::new(kind, seconds(action.delay))
        })
        .collect();
    ServiceFailurePolicy {
        reset_period_seconds,
        actions,
        reboot_message: failure_actions
            .reboot_msg
            .map(|message| message.to_string_lossy().to_string())
            .filter(|message| !message.is_empty()),
        failure_command: failure_actions
            .command
            .map(|command| command.to_string_lossy().to_string())
            .filter(|command| !command.is_empty()),
    }
}

fn failure_actions_from(policy: &ServiceFailurePolicy) -> ServiceFailureActions {
    let actions = policy
        .actions
        .iter()
        .map(|action| ServiceAction {
            action_type: match action.kind {
                FailureActionKind::Restart => ServiceActionType::Restart,
                FailureActionKind::Reboot => ServiceActionType::Reboot,
                FailureActionKind::RunCommand => ServiceActionType::RunCommand,
                FailureActionKind::Unknown => ServiceActionType::None,
            },
            delay: Duration::from_secs(u64::from(action.delay_seconds)),
        })
        .collect::<Vec<_>>();
    let reset_period = if policy.reset_period_seconds == RESET_NEVER {
        ServiceFailureResetPeriod::Never
    } else {
        ServiceFailureResetPeriod::After(Duration::from_secs(u64::from(
            policy.reset_period_seconds,
        )))
    };
    ServiceFailureActions {
        reset_period,
        reboot_msg: policy.reboot_message.as_ref().map(OsString::from),
        command: policy.failure_command.as_ref().map(OsString::from),
        // An empty list leaves the configured actions untouched
        actions: if actions.is_empty() { None } else { Some(actions) },
    }
}

// Other tools may store sub-second delays, round to the nearest second
fn seconds(duration: Duration) -> u32 {
    let rounded = (duration.as_millis() + 500) / 1000;
    u32::try_from(rounded).unwrap_or(RESET_NEVER)
}
