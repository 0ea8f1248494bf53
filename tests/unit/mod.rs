//! Unit test modules.

mod krd_json_test;
mod tcx_reader_test;
mod validation_test;
