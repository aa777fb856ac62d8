//! ESP32-S3 specific modules for the tacho wheel-speed data logger.
//!
//! Everything here is hardware wiring around `tacho-core`: pin and
//! tuning constants, and the uptime-based FAT timestamp source.

#![no_std]

pub mod config;
pub mod time_source;
