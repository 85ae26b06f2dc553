//! Scenario tests for the retrieval pipeline.

mod fakes;
