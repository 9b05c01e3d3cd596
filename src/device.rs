//! # Input Device Discovery
//!
//! Scans `/dev/input/event*` for devices of a given class using the Linux
//! evdev interface.
//!
//! Devices are visited in sorted path order so the same hardware always
//! resolves to the same slot. Devices that cannot be opened (usually
//! permission denied) are skipped.

use evdev::Device;
use std::path::Path;
use tracing::debug;

use crate::error::{InputError, Result};

/// Directory holding evdev character devices.
pub const INPUT_DIR: &str = "/dev/input";

/// Polls between rescans of [`INPUT_DIR`] while a backend has no device open.
pub const RESCAN_INTERVAL_POLLS: u32 = 120;

/// An opened evdev device and the path it was opened from.
pub struct OpenedDevice {
    pub device: Device,
    pub path: String,
}

impl std::fmt::Debug for OpenedDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedDevice")
            .field("path", &self.path)
            .field("name", &self.device.name())
            .finish_non_exhaustive()
    }
}

/// Opens every event device under `dir` accepted by `accept`.
///
/// # Errors
///
/// - `Device`: `dir` is missing or cannot be listed
pub fn scan_devices<F>(dir: &Path, accept: F) -> Result<Vec<OpenedDevice>>
where
    F: Fn(&Device) -> bool,
{
    if !dir.exists() {
        return Err(InputError::Device(format!(
            "{} directory not found",
            dir.display()
        )));
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| InputError::Device(format!("Failed to read {}: {}", dir.display(), e)))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| InputError::Device(format!("Failed to read directory entry: {}", e)))?;

    entries.sort_by_key(|entry| entry.path());

    let mut found = Vec::new();
    for entry in entries {
        let path = entry.path();

        let is_event_node = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with("event"));
        if !is_event_node {
            continue;
        }

        match Device::open(&path) {
            Ok(device) => {
                debug!(
                    "Found input device: {} ({})",
                    path.display(),
                    device.name().unwrap_or("unnamed")
                );
                if accept(&device) {
                    found.push(OpenedDevice {
                        device,
                        path: path.to_string_lossy().to_string(),
                    });
                }
            }
            Err(e) => {
                debug!("Could not open {}: {}", path.display(), e);
            }
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_is_an_error() {
        let result = scan_devices(Path::new("/definitely/not/here"), |_| true);
        assert!(matches!(result, Err(InputError::Device(_))));
    }

    #[test]
    fn test_non_event_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("js0"), b"").unwrap();
        std::fs::write(dir.path().join("mouse0"), b"").unwrap();

        let found = scan_devices(dir.path(), |_| true).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_unopenable_event_nodes_are_skipped() {
        // Regular files named like event nodes fail the evdev ioctls.
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("event0"), b"not a device").unwrap();

        let found = scan_devices(dir.path(), |_| true).unwrap();
        assert!(found.is_empty());
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_scan_real_input_dir() {
        let found = scan_devices(Path::new(INPUT_DIR), |_| true).unwrap();
        assert!(!found.is_empty(), "Expected at least one readable input device");
    }
}
