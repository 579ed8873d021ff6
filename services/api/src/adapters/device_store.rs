//! services/api/src/adapters/device_store.rs
//!
//! The in-memory device catalog. Seeded once at startup and read-mostly
//! afterwards; implements the `DeviceCatalog` port.

use async_trait::async_trait;
use responsive_core::{
    ports::{DeviceCatalog, PortError, PortResult},
    Device, DeviceType, NewDevice, ScreenSize,
};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// Seed Data
//=========================================================================================

struct Seed {
    id: &'static str,
    name: &'static str,
    device_type: DeviceType,
    manufacturer: &'static str,
    portrait: (u32, u32),
    os_versions: &'static [&'static str],
}

const SEED: &[Seed] = &[
    Seed { id: "iphone-14", name: "iPhone 14", device_type: DeviceType::Phone, manufacturer: "Apple", portrait: (390, 844), os_versions: &["iOS 16", "iOS 17"] },
    Seed { id: "iphone-se", name: "iPhone SE", device_type: DeviceType::Phone, manufacturer: "Apple", portrait: (375, 667), os_versions: &["iOS 15", "iOS 16"] },
    Seed { id: "pixel-7", name: "Pixel 7", device_type: DeviceType::Phone, manufacturer: "Google", portrait: (412, 915), os_versions: &["Android 13", "Android 14"] },
    Seed { id: "galaxy-s23", name: "Galaxy S23", device_type: DeviceType::Phone, manufacturer: "Samsung", portrait: (360, 780), os_versions: &["Android 13"] },
    Seed { id: "ipad-air", name: "iPad Air", device_type: DeviceType::Tablet, manufacturer: "Apple", portrait: (820, 1180), os_versions: &["iPadOS 16", "iPadOS 17"] },
    Seed { id: "ipad-mini", name: "iPad Mini", device_type: DeviceType::Tablet, manufacturer: "Apple", portrait: (768, 1024), os_versions: &["iPadOS 16"] },
    Seed { id: "galaxy-tab-s8", name: "Galaxy Tab S8", device_type: DeviceType::Tablet, manufacturer: "Samsung", portrait: (800, 1280), os_versions: &["Android 12", "Android 13"] },
    Seed { id: "macbook-air", name: "MacBook Air", device_type: DeviceType::Laptop, manufacturer: "Apple", portrait: (1440, 900), os_versions: &["macOS 13", "macOS 14"] },
    Seed { id: "dell-xps-13", name: "Dell XPS 13", device_type: DeviceType::Laptop, manufacturer: "Dell", portrait: (1280, 800), os_versions: &["Windows 11"] },
    Seed { id: "generic-laptop", name: "Generic Laptop", device_type: DeviceType::Laptop, manufacturer: "Generic", portrait: (1366, 768), os_versions: &["Windows 10", "Windows 11"] },
];

impl Seed {
    fn to_device(&self) -> Device {
        let (width, height) = self.portrait;
        let mut screen_sizes = vec![ScreenSize::new(width, height)];
        // Handheld devices also rotate.
        if self.device_type != DeviceType::Laptop {
            screen_sizes.push(ScreenSize::new(height, width));
        }
        Device {
            id: self.id.to_string(),
            name: self.name.to_string(),
            device_type: self.device_type,
            manufacturer: self.manufacturer.to_string(),
            screen_sizes,
            os_versions: self.os_versions.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Lowercases `name` and joins its alphanumeric runs with `-`.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn validate(device: &NewDevice) -> PortResult<()> {
    if device.name.trim().is_empty() {
        return Err(PortError::invalid_field("name", "name must not be empty"));
    }
    if device.manufacturer.trim().is_empty() {
        return Err(PortError::invalid_field("manufacturer", "manufacturer must not be empty"));
    }
    if device.screen_sizes.is_empty() || device.screen_sizes.len() > 2 {
        return Err(PortError::invalid_field(
            "screenSizes",
            "a device needs one or two screen sizes (portrait, then landscape)",
        ));
    }
    if device.screen_sizes.iter().any(|s| s.width == 0 || s.height == 0) {
        return Err(PortError::invalid_field(
            "screenSizes",
            "screen dimensions must be greater than zero",
        ));
    }
    Ok(())
}

//=========================================================================================
// The Adapter
//=========================================================================================

pub struct InMemoryDeviceCatalog {
    devices: RwLock<Vec<Device>>,
}

impl InMemoryDeviceCatalog {
    /// Creates a catalog holding the built-in device profiles.
    pub fn seeded() -> Self {
        let devices: Vec<Device> = SEED.iter().map(Seed::to_device).collect();
        info!("Device catalog seeded with {} profiles", devices.len());
        Self::with_devices(devices)
    }

    pub fn with_devices(devices: Vec<Device>) -> Self {
        Self {
            devices: RwLock::new(devices),
        }
    }
}

#[async_trait]
impl DeviceCatalog for InMemoryDeviceCatalog {
    async fn list(&self, device_type: Option<DeviceType>) -> PortResult<Vec<Device>> {
        let devices = self.devices.read().await;
        Ok(devices
            .iter()
            .filter(|d| device_type.map_or(true, |t| d.device_type == t))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> PortResult<Device> {
        self.devices
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Device '{}' not found", id)))
    }

    async fn insert(&self, device: NewDevice) -> PortResult<Device> {
        validate(&device)?;
        let id = match device.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => slugify(id),
            _ => slugify(&device.name),
        };
        let id = if id.is_empty() {
            format!("device-{}", Uuid::new_v4().simple())
        } else {
            id
        };

        let mut devices = self.devices.write().await;
        if devices.iter().any(|d| d.id == id) {
            return Err(PortError::invalid_field(
                "id",
                format!("a device with id '{}' already exists", id),
            ));
        }
        let created = Device {
            id,
            name: device.name.trim().to_string(),
            device_type: device.device_type,
            manufacturer: device.manufacturer.trim().to_string(),
            screen_sizes: device.screen_sizes,
            os_versions: device.os_versions,
        };
        devices.push(created.clone());
        info!("Added device '{}' to the catalog", created.id);
        Ok(created)
    }

    async fn count(&self) -> usize {
        self.devices.read().await.len()
    }
}
