//! Process exit codes
//!
//! Scripts can rely on these values; changing one is a breaking change.

use gsu_core::Error;

/// How the process ends. Every failure is non-zero; the value tells
/// scripts which kind of failure it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Anything not covered below
    GeneralError = 1,

    /// Bad arguments, bad configuration, or a local path of the wrong kind
    UsageError = 2,

    /// The service could not be reached or answered with an error
    NetworkError = 3,

    /// Credentials were rejected or lack permission
    AuthError = 4,

    /// Local path, bucket or object does not exist
    NotFound = 5,
}

impl ExitCode {
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err.exit_code() {
            0 => Self::Success,
            2 => Self::UsageError,
            3 => Self::NetworkError,
            4 => Self::AuthError,
            5 => Self::NotFound,
            _ => Self::GeneralError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}
