//! Client for an ESP32 relay board's HTTP API.
//!
//! Polls relay and connectivity state, applies user toggles optimistically
//! and reconciles them against the device, and handles the one-way factory
//! reset that ends a session.

pub mod commands;
pub mod config;
pub mod controller;
pub mod device_client;
pub mod presenter;
pub mod reset;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;
