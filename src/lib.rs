pub mod adapters;
pub mod cache;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod tasks;

#[cfg(test)]
pub mod test_helpers;
