use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum CoreReason {
    #[error("validation error")]
    Validation,
    #[error("result shape error")]
    Shape,
    #[error("window function error")]
    WindowFn,
    #[error("evaluation cancelled")]
    Cancelled,
    #[error("data format error")]
    DataFormat,
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for CoreReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::Validation => 1001,
            Self::Shape => 1002,
            Self::WindowFn => 1003,
            Self::Cancelled => 1004,
            Self::DataFormat => 1005,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type CoreError = StructError<CoreReason>;
pub type CoreResult<T> = Result<T, CoreError>;
