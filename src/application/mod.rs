//! Application layer orchestrating the wallet, the detection model and the user.
//!
//! `UiController` owns every port and the transient session state. It is the
//! single entry point used by the binary and the integration tests.

pub mod controller;
