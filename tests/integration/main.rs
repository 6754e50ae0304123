//! Integration test suite entry point.

mod controller_tests;
mod mock_hw;
mod router_tests;
