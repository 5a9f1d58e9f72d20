// src/context/mod.rs

use crate::config::{DEFAULT_MAX_STEPS, EngineConfig};
use crate::model::{DeviceRegistry, RegistryError, RoomRegistry};
use std::io::ErrorKind;
use tracing::warn;

/// Read-only house configuration shared by every planning and navigation call.
#[derive(Clone, Debug)]
pub struct HouseContext {
    pub rooms: RoomRegistry,
    pub devices: DeviceRegistry,
    /// Step horizon reported to the vision navigator.
    pub max_steps: u32,
}

impl HouseContext {
    pub fn new(rooms: RoomRegistry, devices: DeviceRegistry) -> Result<Self, RegistryError> {
        devices.check_rooms(&rooms)?;
        Ok(Self {
            rooms,
            devices,
            max_steps: DEFAULT_MAX_STEPS,
        })
    }

    /// Built-in four-room house with no devices.
    pub fn default_house() -> Self {
        Self {
            rooms: RoomRegistry::default_house(),
            devices: DeviceRegistry::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Load registries from the configured paths. A missing rooms file means the
    /// built-in house; a missing devices file means no devices.
    pub fn load(config: &EngineConfig) -> Result<Self, RegistryError> {
        let rooms = match RoomRegistry::load(&config.rooms_path) {
            Ok(rooms) => rooms,
            Err(RegistryError::Io { path, source }) if source.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "rooms file not found, using built-in house");
                RoomRegistry::default_house()
            }
            Err(e) => return Err(e),
        };

        let devices = match DeviceRegistry::load(&config.devices_path) {
            Ok(devices) => devices,
            Err(RegistryError::Io { path, source }) if source.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "devices file not found, continuing without devices");
                DeviceRegistry::default()
            }
            Err(e) => return Err(e),
        };

        Ok(Self::new(rooms, devices)?.with_max_steps(config.max_steps))
    }
}

impl Default for HouseContext {
    fn default() -> Self {
        Self::default_house()
    }
}
