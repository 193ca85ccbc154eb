//! # DAPI Gateway Test Suite
//!
//! Unified test crate exercising the gateway end to end against mock
//! backend collaborators.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── mocks.rs          # Mock ports with call counters
//! └── integration/
//!     ├── dispatch.rs   # Registry dispatch + validation scenarios
//!     ├── profiles.rs   # Deployment profile gating
//!     └── broadcast.rs  # State transition broadcast scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dapi-tests
//! cargo test -p dapi-tests integration::dispatch
//! ```

pub mod mocks;

#[cfg(test)]
mod integration;
