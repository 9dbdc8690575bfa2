//! Application layer - Wiring of the admission components.
//!
//! Call sites receive the components by `Arc` from an [`AdmissionServices`]
//! built once at process start.

mod services;

pub use services::{global, install_global, reset_global, AdmissionServices};
