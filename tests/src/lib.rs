//! # Ad Mediation Test Suite
//!
//! Cross-crate tests driving `MediationBridge` against `SimulatedSdk`.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs      # Bridge + simulated SDK fixtures
//!     ├── flows.rs        # Host-visible scenarios (init, load, show, re-init)
//!     ├── generations.rs  # Behaviour per SDK generation
//!     └── teardown.rs     # Shutdown, late callbacks, vendor threads
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p mediation-tests
//!
//! # By category
//! cargo test -p mediation-tests integration::flows::
//! cargo test -p mediation-tests integration::generations::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]
