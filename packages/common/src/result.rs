use crate::error::IntegrityError;

/// Common Result type alias
pub type CommonResult<T> = Result<T, IntegrityError>;
