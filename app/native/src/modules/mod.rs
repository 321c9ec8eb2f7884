//! Application feature modules for Fences.
//!
//! - [`fences`] - The fence state engine: records, migration, windows, and
//!   the manager that ties them together

pub mod fences;
