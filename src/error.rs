use thiserror::Error;

/// Fatal registry errors.
///
/// Each variant carries the diagnostic text recorded for it (`"message"` or
/// `"message: key"`). Once a registry returns one of these, every further
/// registration or acquisition call returns the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum CfgError {
    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cfgreg::init)))]
    Uninitialized(String),

    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cfgreg::memory)))]
    OutOfMemory(String),

    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cfgreg::input)))]
    InvalidInput(String),

    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cfgreg::exist)))]
    Duplicate(String),

    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cfgreg::value)))]
    InvalidValue(String),

    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cfgreg::parse)))]
    Parse(String),

    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cfgreg::dtype)))]
    InvalidDataType(String),

    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cfgreg::cmd)))]
    CommandSyntax(String),

    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cfgreg::file)))]
    File(String),

    #[error("{0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cfgreg::unknown)))]
    Unknown(String),
}

impl CfgError {
    /// Numeric error code. All codes are negative and distinct.
    pub fn code(&self) -> i32 {
        match self {
            CfgError::Uninitialized(_) => -1,
            CfgError::OutOfMemory(_) => -2,
            CfgError::InvalidInput(_) => -3,
            CfgError::Duplicate(_) => -4,
            CfgError::InvalidValue(_) => -5,
            CfgError::Parse(_) => -6,
            CfgError::InvalidDataType(_) => -7,
            CfgError::CommandSyntax(_) => -8,
            CfgError::File(_) => -9,
            CfgError::Unknown(_) => -99,
        }
    }

    /// The recorded diagnostic text.
    pub fn message(&self) -> &str {
        match self {
            CfgError::Uninitialized(m)
            | CfgError::OutOfMemory(m)
            | CfgError::InvalidInput(m)
            | CfgError::Duplicate(m)
            | CfgError::InvalidValue(m)
            | CfgError::Parse(m)
            | CfgError::InvalidDataType(m)
            | CfgError::CommandSyntax(m)
            | CfgError::File(m)
            | CfgError::Unknown(m) => m,
        }
    }
}

/// Why a raw token could not be turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum CoerceError {
    /// Malformed syntax: empty token, open quote, trailing garbage, bad array.
    #[error("invalid value")]
    Value,
    /// The token is well-formed but not a literal of the declared type.
    #[error("failed to parse the value")]
    Parse,
}

/// Join a message with an optional key the way every diagnostic is written.
pub(crate) fn compose(msg: &str, key: Option<&str>) -> String {
    match key {
        Some(k) if !k.is_empty() => format!("{msg}: {k}"),
        _ => msg.to_string(),
    }
}
