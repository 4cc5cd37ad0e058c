//! Types and traits for recording training metrics.
//!
//! * [`Record`] - a container of key-value pairs of various data types
//! * [`RecordValue`] - the values that can be stored in a [`Record`]
//! * [`Recorder`] - an output destination of records
//! * [`BufferedRecorder`] - keeps records in memory
//! * [`CsvRecorder`] - writes selected columns of records to a CSV file,
//!   used for learning curves
//! * [`NullRecorder`] - discards all records
//!
//! ```rust
//! use dqn_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(1.0));
//! record.insert("score", RecordValue::Scalar(-21.0));
//! assert_eq!(record.get_scalar("score").unwrap(), -21.0);
//! ```
mod base;
mod buffered_recorder;
mod csv_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use csv_recorder::CsvRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
