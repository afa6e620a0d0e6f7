//! Integration tests for Tracebound
//!
//! These tests use wiremock to stand up mock sites and run the whole
//! crawl-and-scan pipeline over real HTTP.

mod crawl_tests;
mod output_tests;
