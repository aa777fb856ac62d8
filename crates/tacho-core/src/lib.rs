//! Hardware-independent core library for the tacho wheel-speed data logger.
//!
//! This crate contains all platform-agnostic logic for the tacho vehicle
//! telemetry logger: the rotation edge timer, the rolling speed estimator,
//! log-file sequence discovery, and CSV row logging over an abstract
//! storage volume.
//!
//! It is `#![no_std]` and allocation-free so it compiles on both embedded
//! targets (ESP32-S3) and desktop hosts (for the simulator and tests).

#![no_std]

pub mod config;
pub mod speed;
pub mod storage;
