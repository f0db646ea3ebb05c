pub mod defaults;
pub mod error;
pub mod git;
pub mod invoke;
pub mod ops;
pub mod params;
pub mod parse;
pub mod tool;

pub use error::{Error, ErrorCode, Result};
