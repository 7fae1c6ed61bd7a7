//! Configuration module

pub mod config;

pub use config::Config;
