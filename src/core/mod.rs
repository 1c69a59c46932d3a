//! Ambient pieces shared by the library and the binary: the error taxonomy
//! and data-context loading.

pub mod data;
pub mod error;

pub use data::DataFormat;
pub use error::{Error, Result};
