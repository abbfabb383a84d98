// Library target shared by the terminal binary, integration tests and benches.

pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod session;
