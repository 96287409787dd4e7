//! Admin API endpoint handlers.

pub mod history;
pub mod overlay;
pub mod system;
