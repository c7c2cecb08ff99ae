//! kiosk-hw — Hardware helpers for the kiosk.
//!
//! Enumerates V4L2 capture devices so the operator can pick a camera.

pub mod camera;

pub use camera::{list_camera_names, list_devices, DeviceInfo};
