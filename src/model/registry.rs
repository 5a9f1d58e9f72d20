// src/model/registry.rs

use crate::model::Point;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("registry is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid entry '{name}': {reason}")]
    InvalidEntry { name: String, reason: String },
    #[error("room registry must contain at least one room")]
    EmptyRooms,
    #[error("duplicate key '{0}'")]
    Duplicate(String),
    #[error("device '{device}' references unknown room '{room}'")]
    UnknownDeviceRoom { device: String, room: String },
}

/// Axis-aligned room extent, serialized as `[[minx, maxx], [miny, maxy]]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

impl From<[[f64; 2]; 2]> for Bounds {
    fn from([[min_x, max_x], [min_y, max_y]]: [[f64; 2]; 2]) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

impl From<Bounds> for [[f64; 2]; 2] {
    fn from(b: Bounds) -> Self {
        [[b.min_x, b.max_x], [b.min_y, b.max_y]]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    pub name: String,
    pub center: Option<Point>,
    pub bounds: Option<Bounds>,
}

impl Room {
    pub fn new(name: &str, x: f64, y: f64) -> Self {
        Self {
            name: name.to_string(),
            center: Some(Point::new(x, y)),
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Rooms without a configured center resolve to the origin.
    pub fn center_or_origin(&self) -> Point {
        self.center.unwrap_or(Point::ORIGIN)
    }
}

// On-disk shape of one room entry, keyed by name in the enclosing map.
#[derive(Clone, Copy, Serialize, Deserialize)]
struct RoomSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    center: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bounds: Option<Bounds>,
}

/// Known rooms in configuration order. Construction guarantees at least one room.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct RoomRegistry {
    rooms: Vec<Room>,
}

impl RoomRegistry {
    pub fn new(rooms: Vec<Room>) -> Result<Self, RegistryError> {
        if rooms.is_empty() {
            return Err(RegistryError::EmptyRooms);
        }
        for (i, room) in rooms.iter().enumerate() {
            if rooms[..i].iter().any(|r| r.name == room.name) {
                return Err(RegistryError::Duplicate(room.name.clone()));
            }
        }
        Ok(Self { rooms })
    }

    /// Layout used when no rooms file is configured.
    pub fn default_house() -> Self {
        Self {
            rooms: vec![
                Room::new("Kitchen", 3.0, -1.0),
                Room::new("LivingRoom", -2.0, 1.5),
                Room::new("Bedroom", -3.0, -2.0),
                Room::new("Bathroom", 1.0, 3.0),
            ],
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, RegistryError> {
        let map: Map<String, Value> = serde_json::from_str(raw)?;
        Self::try_from(map)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        Self::from_json_str(&read(path.as_ref())?)
    }

    pub fn get(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// First room in configuration order.
    pub fn first(&self) -> &Room {
        &self.rooms[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for RoomRegistry {
    type Error = RegistryError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let rooms = map
            .into_iter()
            .map(|(name, value)| {
                let spec: RoomSpec =
                    serde_json::from_value(value).map_err(|e| RegistryError::InvalidEntry {
                        name: name.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(Room {
                    name,
                    center: spec.center,
                    bounds: spec.bounds,
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Self::new(rooms)
    }
}

impl Serialize for RoomRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.rooms.iter().map(|r| {
            (
                &r.name,
                RoomSpec {
                    center: r.center,
                    bounds: r.bounds,
                },
            )
        }))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Device {
    pub id: String,
    pub kind: String,
    pub room: String,
    pub on: bool,
    /// Any further attributes the simulator attaches; passed through to prompts.
    pub extra: Map<String, Value>,
}

impl Device {
    pub fn new(id: &str, kind: &str, room: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            room: room.to_string(),
            on: false,
            extra: Map::new(),
        }
    }

    pub fn switched_on(mut self) -> Self {
        self.on = true;
        self
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct DeviceSpec {
    #[serde(rename = "type", default)]
    kind: String,
    room: String,
    #[serde(default)]
    on: bool,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Known devices in configuration order. May be empty.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    pub fn new(devices: Vec<Device>) -> Result<Self, RegistryError> {
        for (i, device) in devices.iter().enumerate() {
            if devices[..i].iter().any(|d| d.id == device.id) {
                return Err(RegistryError::Duplicate(device.id.clone()));
            }
        }
        Ok(Self { devices })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, RegistryError> {
        let map: Map<String, Value> = serde_json::from_str(raw)?;
        Self::try_from(map)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        Self::from_json_str(&read(path.as_ref())?)
    }

    /// Every device must sit in a room the room registry knows.
    pub fn check_rooms(&self, rooms: &RoomRegistry) -> Result<(), RegistryError> {
        match self.devices.iter().find(|d| !rooms.contains(&d.room)) {
            Some(device) => Err(RegistryError::UnknownDeviceRoom {
                device: device.id.clone(),
                room: device.room.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn in_room<'a>(&'a self, room: &'a str) -> impl Iterator<Item = &'a Device> + 'a {
        self.devices.iter().filter(move |d| d.room == room)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for DeviceRegistry {
    type Error = RegistryError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let devices = map
            .into_iter()
            .map(|(id, value)| {
                let spec: DeviceSpec =
                    serde_json::from_value(value).map_err(|e| RegistryError::InvalidEntry {
                        name: id.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(Device {
                    id,
                    kind: spec.kind,
                    room: spec.room,
                    on: spec.on,
                    extra: spec.extra,
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Self::new(devices)
    }
}

impl Serialize for DeviceRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.devices.iter().map(|d| {
            (
                &d.id,
                DeviceSpec {
                    kind: d.kind.clone(),
                    room: d.room.clone(),
                    on: d.on,
                    extra: d.extra.clone(),
                },
            )
        }))
    }
}

fn read(path: &Path) -> Result<String, RegistryError> {
    std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rooms_keep_file_order() {
        let rooms = RoomRegistry::from_json_str(
            r#"{"Kitchen": {"center": [3, -1]}, "Bathroom": {"center": [1, 3]}, "Attic": {}}"#,
        )
        .unwrap();

        let names: Vec<_> = rooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Kitchen", "Bathroom", "Attic"]);
        assert_eq!(rooms.first().name, "Kitchen");
        assert_eq!(rooms.get("Attic").unwrap().center_or_origin(), Point::ORIGIN);
    }

    #[test]
    fn bounds_parse_from_nested_pairs() {
        let rooms = RoomRegistry::from_json_str(
            r#"{"Kitchen": {"center": [3, -1], "bounds": [[1, 5], [-3, 1]]}}"#,
        )
        .unwrap();
        let expected = Room::new("Kitchen", 3.0, -1.0).with_bounds(Bounds {
            min_x: 1.0,
            max_x: 5.0,
            min_y: -3.0,
            max_y: 1.0,
        });
        assert_eq!(rooms.first(), &expected);

        let bounds = rooms.first().bounds.unwrap();
        assert!(bounds.contains(Point::new(3.0, -1.0)));
        assert!(!bounds.contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn empty_room_registry_is_rejected() {
        assert!(matches!(
            RoomRegistry::from_json_str("{}"),
            Err(RegistryError::EmptyRooms)
        ));
    }

    #[test]
    fn devices_must_reference_known_rooms() {
        let rooms = RoomRegistry::default_house();
        let devices = DeviceRegistry::from_json_str(
            r#"{"garage_door": {"type": "door", "room": "Garage", "on": false}}"#,
        )
        .unwrap();

        match devices.check_rooms(&rooms) {
            Err(RegistryError::UnknownDeviceRoom { device, room }) => {
                assert_eq!(device, "garage_door");
                assert_eq!(room, "Garage");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn device_extra_fields_survive_round_trip() {
        let devices = DeviceRegistry::from_json_str(
            r#"{"living_light_1": {"type": "light", "room": "LivingRoom", "on": true, "brightness": 80}}"#,
        )
        .unwrap();
        let light = devices.get("living_light_1").unwrap();
        assert!(light.on);
        assert_eq!(light.extra["brightness"], 80);

        let value = serde_json::to_value(&devices).unwrap();
        assert_eq!(value["living_light_1"]["type"], "light");
        assert_eq!(value["living_light_1"]["brightness"], 80);
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Kitchen": {{"center": [3.0, -1.0]}}}}"#).unwrap();

        let rooms = RoomRegistry::load(file.path()).unwrap();
        assert_eq!(rooms.len(), 1);

        let missing = RoomRegistry::load("/nonexistent/rooms.json");
        assert!(matches!(missing, Err(RegistryError::Io { .. })));
    }
}
