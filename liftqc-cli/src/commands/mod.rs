//! Command implementations for the liftqc CLI

pub mod children;
pub mod config;
pub mod frame;
pub mod stats;
