//! Per-course training adherence reporting: enrollment import, count
//! aggregation, completion percentages, rendering and dispatch.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
