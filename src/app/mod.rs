// dmesg-recent - app/mod.rs
//
// Application layer: orchestration of a single run.
// Dependencies: core and platform layers.

pub mod run;
