// dmesg-recent - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library, regex, tracing.
// Must NOT depend on: platform, app, or the filesystem.

pub mod filter;
pub mod model;
pub mod parser;
