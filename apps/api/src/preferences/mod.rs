//! Device-local preferences: colour theme and the uploaded timetable image.

use serde::{Deserialize, Serialize};

use crate::persistence::device::{device_key, DeviceStore, DeviceStoreError};

pub mod handlers;

const THEME_SLOT: &str = "theme";
const TIMETABLE_SLOT: &str = "timetable";
const IMAGE_DATA_URL_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";
/// Room for the JSON envelope around the stored data URL.
const TIMETABLE_ENVELOPE_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

pub async fn load_theme(
    device: &dyn DeviceStore,
    username_key: &str,
) -> Result<Theme, DeviceStoreError> {
    Ok(device
        .get_json(&device_key(username_key, THEME_SLOT))
        .await?
        .unwrap_or_default())
}

pub async fn save_theme(
    device: &dyn DeviceStore,
    username_key: &str,
    theme: Theme,
) -> Result<(), DeviceStoreError> {
    device
        .set_json(&device_key(username_key, THEME_SLOT), &theme, None)
        .await
}

/// Request body limit for timetable uploads. Anything the device store would
/// accept must get past the body limit so oversize images reach the quota check.
pub fn timetable_body_limit(device_value_max_bytes: usize) -> usize {
    device_value_max_bytes.saturating_add(TIMETABLE_ENVELOPE_BYTES)
}

/// Accepts `data:image/<type>;base64,<payload>` with a non-empty payload.
pub fn is_image_data_url(value: &str) -> bool {
    let Some(rest) = value.strip_prefix(IMAGE_DATA_URL_PREFIX) else {
        return false;
    };
    match rest.split_once(BASE64_MARKER) {
        Some((mime, payload)) => {
            !mime.is_empty()
                && !payload.is_empty()
                && payload
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
        }
        None => false,
    }
}

pub fn timetable_key(username_key: &str) -> String {
    device_key(username_key, TIMETABLE_SLOT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::memory::MemoryDeviceStore;

    #[test]
    fn test_data_url_validation() {
        assert!(is_image_data_url("data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_image_data_url("data:image/png;base64,"));
        assert!(!is_image_data_url("data:text/plain;base64,aGk="));
        assert!(!is_image_data_url("https://example.com/a.png"));
        assert!(!is_image_data_url("data:image/png;base64,not base64!"));
    }

    #[test]
    fn test_theme_wire_format() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        assert_eq!(Theme::default(), Theme::System);
    }

    #[tokio::test]
    async fn test_theme_defaults_to_system_then_persists() {
        let device = MemoryDeviceStore::default();
        assert_eq!(load_theme(&device, "bob").await.unwrap(), Theme::System);
        save_theme(&device, "bob", Theme::Light).await.unwrap();
        assert_eq!(load_theme(&device, "bob").await.unwrap(), Theme::Light);
    }
}
