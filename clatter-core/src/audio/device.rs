//! Audio output device enumeration.

use serde::{Deserialize, Serialize};

/// Metadata about an audio output device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Human-readable device name reported by the OS.
    pub name: String,
    /// Whether this is the system default output device.
    pub is_default: bool,
}

/// Whether a device `name` satisfies a user-supplied `preferred` name.
///
/// Exact matches win; otherwise a case-insensitive match on the trimmed
/// names is accepted so `--device "usb audio"` finds `USB Audio`.
pub fn matches_device_name(name: &str, preferred: &str) -> bool {
    name == preferred || name.trim().eq_ignore_ascii_case(preferred.trim())
}

/// List all available audio output devices on the system, default first.
///
/// Returns an empty `Vec` if cpal is not available or no devices exist.
#[cfg(feature = "audio-cpal")]
pub fn list_output_devices() -> Vec<DeviceInfo> {
    use cpal::traits::{DeviceTrait, HostTrait};

    let host = cpal::default_host();
    let default_name = host.default_output_device().and_then(|d| d.name().ok());

    match host.output_devices() {
        Ok(devices) => {
            let mut list = devices
                .enumerate()
                .map(|(idx, device)| {
                    let name = device
                        .name()
                        .unwrap_or_else(|_| format!("Output Device {}", idx + 1));
                    let is_default = default_name.as_deref() == Some(name.as_str());
                    DeviceInfo { name, is_default }
                })
                .collect::<Vec<_>>();

            list.sort_by_key(|d| (!d.is_default, d.name.to_ascii_lowercase()));
            list
        }
        Err(e) => {
            tracing::warn!("failed to enumerate output devices: {e}");
            default_name
                .map(|name| {
                    vec![DeviceInfo {
                        name,
                        is_default: true,
                    }]
                })
                .unwrap_or_default()
        }
    }
}

#[cfg(not(feature = "audio-cpal"))]
pub fn list_output_devices() -> Vec<DeviceInfo> {
    vec![]
}

#[cfg(test)]
mod tests {
    use super::matches_device_name;

    #[test]
    fn matches_exact_and_case_insensitive_names() {
        assert!(matches_device_name("USB Audio", "USB Audio"));
        assert!(matches_device_name("USB Audio", " usb audio "));
        assert!(!matches_device_name("USB Audio", "usb"));
        assert!(!matches_device_name("Speakers (Realtek)", "Headphones"));
    }
}
