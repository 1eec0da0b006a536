//! API Surface Tests

mod auth_tests;
mod gateway_tests;
mod resource_tests;
