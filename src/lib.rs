// Public API for integration tests and potential library usage

pub mod catalog;
pub mod config;
pub mod error;
pub mod gate;
pub mod lookup;
pub mod normalize;
pub mod protocol;
pub mod scoring;
pub mod state;
pub mod types;
pub mod ws;
