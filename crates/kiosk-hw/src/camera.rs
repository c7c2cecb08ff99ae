//! Video capture device discovery via the `v4l` crate.

use std::path::Path;
use v4l::capability::Flags;
use v4l::prelude::*;

/// Highest `/dev/videoN` index probed.
const MAX_VIDEO_NODES: usize = 64;

/// Info about a discovered capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub path: String,
    /// Card name as reported by the driver.
    pub name: String,
    pub driver: String,
    pub bus: String,
}

/// A device node paired with the capability flags it reported.
struct ProbedDevice {
    info: DeviceInfo,
    flags: Flags,
}

/// Cameras only: capture capability, and not a memory-to-memory codec node.
fn is_camera(flags: Flags) -> bool {
    flags.contains(Flags::VIDEO_CAPTURE)
        && !flags.intersects(Flags::VIDEO_M2M | Flags::VIDEO_M2M_MPLANE)
}

/// Keep camera nodes and sort them by card name, then path.
fn select_cameras(probed: Vec<ProbedDevice>) -> Vec<DeviceInfo> {
    let mut devices: Vec<DeviceInfo> = probed
        .into_iter()
        .filter(|d| {
            let keep = is_camera(d.flags);
            if !keep {
                tracing::trace!(path = %d.info.path, flags = ?d.flags, "skipping non-capture node");
            }
            keep
        })
        .map(|d| d.info)
        .collect();
    devices.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    devices
}

/// List available V4L2 capture devices, sorted by name.
pub fn list_devices() -> Vec<DeviceInfo> {
    let mut probed = Vec::new();

    for i in 0..MAX_VIDEO_NODES {
        let path = format!("/dev/video{i}");
        if !Path::new(&path).exists() {
            continue;
        }
        let Ok(dev) = Device::with_path(&path) else {
            continue;
        };
        let Ok(caps) = dev.query_caps() else {
            continue;
        };
        probed.push(ProbedDevice {
            info: DeviceInfo {
                path,
                name: caps.card.clone(),
                driver: caps.driver.clone(),
                bus: caps.bus.clone(),
            },
            flags: caps.capabilities,
        });
    }

    let devices = select_cameras(probed);
    tracing::debug!(count = devices.len(), "enumerated capture devices");
    devices
}

/// Names of available cameras, sorted.
pub fn list_camera_names() -> Vec<String> {
    list_devices().into_iter().map(|d| d.name).collect()
}
