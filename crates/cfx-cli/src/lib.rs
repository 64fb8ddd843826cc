//! Pipeline orchestration for the country FX lakehouse.
//!
//! The `cfx-etl` binary is a thin shell over [`pipeline::Pipeline`]; the
//! pieces live here so they can be driven from tests with in-memory
//! extractors.

pub mod config;
pub mod logging;
pub mod pipeline;
