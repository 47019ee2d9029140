// dmesg-recent - util/mod.rs
//
// Utility modules: error types, named constants, logging setup.
// Depends on core::model only for the `Status` severity of errors.
// No dependencies on app or platform layers.

pub mod constants;
pub mod error;
pub mod logging;
