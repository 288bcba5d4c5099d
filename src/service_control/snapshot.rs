use std::fmt::{Display, Formatter, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
    Paused,
    /// Any pending transition
    Other,
}

impl Display for RunState {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            RunState::Running => write!(f, "RUNNING"),
            RunState::Stopped => write!(f, "STOPPED"),
            RunState::Paused => write!(f, "PAUSED"),
            RunState::Other => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStatusSnapshot {
    pub service_type: u32,
    pub state: RunState,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceConfigSnapshot {
    pub service_type: u32,
    pub start_type: u32,
    pub error_control: u32,
    pub binary_path: Option<String>,
    pub dependencies: Vec<String>,
    pub account_name: Option<String>,
    pub display_name: Option<String>,
}

// (flag, name) in the order they are printed
const SERVICE_TYPE_FLAGS: [(u32, &str); 10] = [
    (0x10, "SERVICE_WIN32_OWN_PROCESS"),
    (0x20, "SERVICE_WIN32_SHARE_PROCESS"),
    (0x1, "SERVICE_KERNEL_DRIVER"),
    (0x2, "SERVICE_FILE_SYSTEM_DRIVER"),
    (0x8, "SERVICE_RECOGNIZER_DRIVER"),
    (0x30, "SERVICE_WIN32"),
    (0x4, "SERVICE_ADAPTER"),
    (0xB, "SERVICE_DRIVER"),
    (0x40, "SERVICE_USER_SERVICE"),
    (0x100, "SERVICE_INTERACTIVE_PROCESS"),
];

/// Names every known flag fully contained in `service_type`, or the raw
/// value when none is.
pub fn service_type_to_string(service_type: u32) -> String {
    let names = SERVICE_TYPE_FLAGS
        .iter()
        .filter(|(flag, _)| service_type & flag == *flag)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>();
    if names.is_empty() {
        service_type.to_string()
    } else {
        names.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_process() {
        assert_eq!(service_type_to_string(0x10), "SERVICE_WIN32_OWN_PROCESS");
    }

    #[test]
    fn share_process_interactive() {
        assert_eq!(
            service_type_to_string(0x120),
            "SERVICE_WIN32_SHARE_PROCESS | SERVICE_INTERACTIVE_PROCESS"
        );
    }

    #[test]
    fn composite_flags_need_every_bit() {
        assert_eq!(
            service_type_to_string(0x30),
            "SERVICE_WIN32_OWN_PROCESS | SERVICE_WIN32_SHARE_PROCESS | SERVICE_WIN32"
        );
        assert_eq!(
            service_type_to_string(0x50),
            "SERVICE_WIN32_OWN_PROCESS | SERVICE_USER_SERVICE"
        );
    }

    #[test]
    fn unknown_value_falls_back_to_number() {
        assert_eq!(service_type_to_string(0), "0");
        assert_eq!(service_type_to_string(0x200), "512");
    }

    #[test]
    fn state_labels() {
        assert_eq!(RunState::Running.to_string(), "RUNNING");
        assert_eq!(RunState::Other.to_string(), "UNKNOWN");
    }
}
