use crate::utils::color::Coloralex;
use std::fmt;
use std::io;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ScErrorKind {
    /// Arguments were present but could not be decoded
    MalformedInput,
    /// Opening the service manager or the service entry failed
    RegistryAccess,
    /// The service call itself failed
    Operation,
}

#[derive(Clone)]
pub struct ScError {
    pub kind: ScErrorKind,
    pub call: Option<String>,
    pub code: Option<i32>,
    pub message: String,
}

impl ScError {
    pub const USAGE_EXIT_CODE: u8 = 1;
    pub const FAILURE_EXIT_CODE: u8 = 2;

    pub fn malformed(message: String) -> ScError {
        ScError {
            kind: ScErrorKind::MalformedInput,
            call: None,
            code: None,
            message,
        }
    }

    // The OS error carries both the numeric code and its localized text
    pub fn os(kind: ScErrorKind, call: &str, error: io::Error) -> ScError {
        ScError {
            kind,
            call: Some(call.to_string()),
            code: error.raw_os_error(),
            message: error.to_string(),
        }
    }

    pub fn operation(call: &str, message: String) -> ScError {
        ScError {
            kind: ScErrorKind::Operation,
            call: Some(call.to_string()),
            code: None,
            message,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind {
            ScErrorKind::MalformedInput => Self::USAGE_EXIT_CODE,
            ScErrorKind::RegistryAccess | ScErrorKind::Operation => Self::FAILURE_EXIT_CODE,
        }
    }

    fn plain(&self) -> String {
        match (&self.call, self.code) {
            (Some(call), Some(code)) => {
                format!("{call} FAILED {code}: {}", self.message.trim_end())
            }
            (Some(call), None) => format!("{call} FAILED: {}", self.message),
            (None, _) => self.message.clone(),
        }
    }
}

impl fmt::Display for ScError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.plain().as_str().red(true))
    }
}

impl fmt::Debug for ScError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ScError")
            .field("kind", &self.kind)
            .field("call", &self.call)
            .field("code", &self.code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for ScError {}

// Only raised while writing results to stdout
impl From<io::Error> for ScError {
    fn from(error: io::Error) -> ScError {
        ScError::os(ScErrorKind::Operation, "WriteOutput", error)
    }
}
