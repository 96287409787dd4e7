// Library exports for the binary, benchmarks and integration tests

pub mod admin_api;
pub mod config;
pub mod fixture;
pub mod history;
pub mod metrics;
pub mod server;

pub use config::{Config, ConfigOverrides};
pub use server::{Mocklab, RunningMocklab};
