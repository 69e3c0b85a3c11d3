//! Result persistence.
//!
//! The pipeline never writes anything itself; a finished run hands its
//! identifiers and insights to a [`persistence::ResultSink`].

pub mod persistence;

pub use persistence::{JsonFileSink, MemorySink, ResultSink};
