//! volcar - Typed Tabular Extraction and Dumping in Pure Rust
//!
//! Turns a slice of plain Rust structs into a named, typed, columnar view
//! and renders it as delimited text, aligned text, or R vectors. Columns
//! are described by dotted access paths — nested fields, `Option`/`Box`
//! indirections, and zero-argument accessors that may fail — compiled and
//! type-checked once per column, then walked per row.
//!
//! # Design Principles
//!
//! 1. **Compile once, extract many** - every specification is validated
//!    against the record's shape up front; per-row extraction follows a
//!    fixed recipe with no name lookup
//! 2. **Absence is data** - a nil pointer or failed accessor yields an
//!    absent cell for that row, never an error
//! 3. **Pure computation** - no I/O in the core; adapters own the writers
//!
//! # Quick Start
//!
//! ```
//! use volcar::{CsvDumper, Dumper, Extractor, Format};
//!
//! volcar::record! {
//!     #[derive(Debug, Clone)]
//!     pub struct Reading {
//!         pub sensor: String,
//!         pub celsius: f64,
//!         pub calibrated: Option<f64>,
//!     }
//! }
//!
//! # fn main() -> volcar::Result<()> {
//! let data = vec![
//!     Reading { sensor: "a1".into(), celsius: 21.5, calibrated: Some(21.4) },
//!     Reading { sensor: "b2".into(), celsius: -3.0, calibrated: None },
//! ];
//!
//! let extractor = Extractor::new(&data, &["sensor", "celsius", "calibrated"])?;
//! let mut out = Vec::new();
//! let mut dumper = CsvDumper::new(&mut out);
//! dumper.dump(&extractor, &Format::default())?;
//! drop(dumper);
//!
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "sensor,celsius,calibrated\na1,21.5,21.4\nb2,-3,\n",
//! );
//! # Ok(()) }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::unreadable_literal,
        clippy::too_many_lines
    )
)]
// Allow some pedantic lints for cleaner code
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

pub mod dump;
pub mod error;
pub mod extract;
pub mod format;
mod path;
mod record;
pub mod shape;
pub mod value;

// Re-exports for convenience
pub use dump::{AlignedDumper, CsvDumper, Dumper, RVecDumper};
pub use error::{Error, Result};
pub use extract::{Column, Extractor};
pub use format::{DisplayZone, DurationStyle, Format};
pub use shape::{classify, Shape, Shaped};
pub use value::{Kind, Value};

// Re-export the payload types extracted values are built from.
pub use chrono::{DateTime, Utc};
pub use num_complex::Complex64;
