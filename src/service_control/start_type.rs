use crate::service_control::sc_error::ScError;
use std::fmt::{Display, Formatter, Result};
use std::str::FromStr;

/// When the service control manager launches a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartType {
    Automatic,
    Manual,
    Disabled,
}

impl StartType {
    /// Raw `dwStartType` value understood by the SCM.
    pub const fn code(self) -> u32 {
        match self {
            StartType::Automatic => 2,
            StartType::Manual => 3,
            StartType::Disabled => 4,
        }
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            StartType::Automatic => "auto",
            StartType::Manual => "manual",
            StartType::Disabled => "disabled",
        }
    }
}

impl FromStr for StartType {
    type Err = ScError;

    fn from_str(token: &str) -> std::result::Result<Self, Self::Err> {
        match token {
            "auto" => Ok(StartType::Automatic),
            "manual" => Ok(StartType::Manual),
            "disabled" => Ok(StartType::Disabled),
            _ => Err(ScError::malformed(format!(
                "Invalid start type: {token}. Use 'auto', 'manual', or 'disabled'."
            ))),
        }
    }
}

impl Display for StartType {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}", self.keyword())
    }
}
