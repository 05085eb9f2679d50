//! Integration tests for n64z acceptance testing.

mod common;
mod engine_test;
mod frequency_test;
mod schedule_test;
mod soak_test;
