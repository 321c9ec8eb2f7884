//! Fences - borderless desktop containers backed by a persistent,
//! self-healing fence state engine.
//!
//! The library owns the fence document, migrates it on load, drives one
//! window controller per fence through host collaborator traits, and
//! serialises every change through a single property update pipeline. The
//! binary is a CLI over the same engine running on the headless host.

// Core modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;
pub mod schema;

// Feature modules
pub mod modules;
