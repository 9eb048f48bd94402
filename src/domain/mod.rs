//! Domain types and the ports through which the controller reaches the wallet,
//! the detection model, the camera and the user.

pub mod detection;
pub mod input;
pub mod payment;
pub mod ports;
pub mod session;
