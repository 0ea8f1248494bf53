//! Integration test modules.

mod editing_pipeline_test;
mod round_trip_test;
