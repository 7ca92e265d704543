//! Integration tests for Listing-Sweep
//!
//! These tests drive the pipeline against a scripted renderer and wiremock
//! servers standing in for detail pages.

mod detail_tests;
mod pipeline_tests;
