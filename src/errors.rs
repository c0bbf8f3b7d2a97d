use std::num::TryFromIntError;

use thiserror::Error;

use crate::vector::{OGRFieldType, OGRwkbGeometryType};

pub type Result<T> = std::result::Result<T, OgrError>;

#[derive(Debug, Error)]
pub enum OgrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    IntConversionError(#[from] TryFromIntError),
    #[error("CPL error class: '{class:?}', error number: '{number}', error msg: '{msg}'")]
    CplError {
        class: CplErrType,
        number: i32,
        msg: String,
    },
    #[error("OGR method '{method_name}' returned error: '{err:?}'")]
    OgrError {
        err: OGRErr,
        method_name: &'static str,
    },
    #[error("Unhandled type '{field_type:?}' on OGR method {method_name}")]
    UnhandledFieldType {
        field_type: OGRFieldType,
        method_name: &'static str,
    },
    #[error("Invalid field name '{field_name}' used on method {method_name}")]
    InvalidFieldName {
        field_name: String,
        method_name: &'static str,
    },
    #[error("Invalid field index {index} used on method {method_name}")]
    InvalidFieldIndex {
        index: usize,
        method_name: &'static str,
    },
    #[error("Invalid geometry field index {index} used on method {method_name}")]
    InvalidGeomFieldIndex {
        index: usize,
        method_name: &'static str,
    },
    #[error("Geometry of type '{geometry_type:?}' cannot be written to a {target} shapefile")]
    UnsupportedGeometryType {
        geometry_type: OGRwkbGeometryType,
        target: &'static str,
    },
    #[error("Feature definition '{name}' is referenced elsewhere and cannot be modified")]
    SchemaInUse { name: String },
    #[error("Layer '{name}' was not opened in update mode, {method_name} not permitted")]
    NotWritable {
        name: String,
        method_name: &'static str,
    },
    #[error("Corrupt file '{path}': {msg}")]
    CorruptFile { path: String, msg: String },
    #[error("Bad argument: {0}")]
    BadArgument(String),
}

/// Classic OGR return codes, carried by [`OgrError::OgrError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OGRErr {
    NotEnoughData,
    NotEnoughMemory,
    UnsupportedGeometryType,
    UnsupportedOperation,
    CorruptData,
    Failure,
    UnsupportedSrs,
    InvalidHandle,
    NonExistingFeature,
}

/// Severity class of a message sent through [`crate::config::cpl_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CplErrType {
    None = 0,
    Debug = 1,
    Warning = 2,
    Failure = 3,
    Fatal = 4,
}

/// Error numbers attached to channel messages.
pub mod cple {
    pub const NONE: i32 = 0;
    pub const APP_DEFINED: i32 = 1;
    pub const OUT_OF_MEMORY: i32 = 2;
    pub const FILE_IO: i32 = 3;
    pub const OPEN_FAILED: i32 = 4;
    pub const ILLEGAL_ARG: i32 = 5;
    pub const NOT_SUPPORTED: i32 = 6;
}

impl OgrError {
    pub(crate) fn failure(method_name: &'static str) -> Self {
        OgrError::OgrError {
            err: OGRErr::Failure,
            method_name,
        }
    }
}
