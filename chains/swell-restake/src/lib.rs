pub mod batch;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod exchange;
pub mod task;
pub mod utils;
