// dmesg-recent - platform/mod.rs
//
// Platform abstraction layer: everything that touches the filesystem.
// Dependencies: standard library, directories, serde/toml.
// Must NOT depend on: app.

pub mod config;
pub mod stamp;
