//! gopsmon - Go runtime metrics forwarder library.
//!
//! Samples `gops memstats` and `gops stats` from a running Go process and
//! writes the values to InfluxDB. Used by the `gopsmond` daemon.
//!
//! Provides:
//! - `schema` — fixed field-to-metric registries
//! - `collector` — value parsers, line extraction, point assembly, gops access
//! - `model` — observations and points
//! - `sink` — InfluxDB, log and in-memory point writers
//! - `daemon` — the poll loop and its stop/failure policy
//! - `config` — validated startup settings
//! - `util` — helper utilities

pub mod collector;
pub mod config;
pub mod daemon;
pub mod model;
pub mod schema;
pub mod sink;
pub mod util;
