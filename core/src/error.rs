//! Error types for module loading and export invocation

use thiserror::Error;

pub type LoadResult<T> = Result<T, LoadError>;
pub type InvokeResult<T> = Result<T, InvokeError>;
pub type ObserveResult<T> = Result<T, ObserveError>;

/// Errors raised while resolving or evaluating a module unit
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot resolve module '{specifier}': {message}")]
    Resolution { specifier: String, message: String },

    #[error("Cannot load module '{name}': {message}")]
    Evaluation { name: String, message: String },
}

/// Errors raised while reading or calling an export of a loaded unit
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Module '{unit}' has no export named '{name}'")]
    MissingExport { unit: String, name: String },

    #[error("Export '{name}' of module '{unit}' is not callable")]
    NotCallable { unit: String, name: String },

    #[error("Export '{name}' of module '{unit}' threw: {message}")]
    Threw {
        unit: String,
        name: String,
        message: String,
    },
}

/// Any error the binding observer can surface. Unrecovered: the first
/// failure aborts the remaining observation sequence.
#[derive(Error, Debug)]
pub enum ObserveError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Invoke(#[from] InvokeError),
}
