//! Return alignment and blending engine for comparing an ETF against its
//! reference index.
//!
//! Daily closes are normalised ([`series`]), reduced to month-end closes
//! ([`resample`]), turned into monthly returns ([`returns`]), aligned on
//! common months ([`alignment`]), blended ([`blend`]), compounded
//! ([`compounding`]) and summarised ([`stats`]). [`comparison::compare`] runs
//! the whole pipeline.

pub mod alignment;
pub mod blend;
pub mod comparison;
pub mod compounding;
pub mod config;
pub mod error;
pub mod resample;
pub mod returns;
pub mod series;
pub mod source;
pub mod stats;
pub mod types;

pub use config::BlendConfig;
pub use error::CompareError;
pub use types::*;

/// Standard result type for all comparison operations
pub type CompareResult<T> = Result<T, CompareError>;
