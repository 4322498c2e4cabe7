//! Device identity and alias resolution.
//!
//! Devices are created the first time a report or milestone references them.
//! After creation only the alias list may grow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical device name used as the grouping key everywhere in the engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A tracked medical device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub name: DeviceId,
    /// Search terms matched against brand/generic names in raw reports
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
}

impl Device {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: DeviceId::new(name),
            aliases: Vec::new(),
            manufacturer: None,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for alias in aliases {
            self.push_alias(alias.into());
        }
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    fn push_alias(&mut self, alias: String) -> bool {
        let alias = alias.trim().to_string();
        if alias.is_empty() || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(&alias)) {
            return false;
        }
        self.aliases.push(alias);
        true
    }

    /// Exact (case-insensitive) match on the canonical name or any alias.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        self.name.as_str().eq_ignore_ascii_case(identifier)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(identifier))
    }

    /// Containment match of any search term inside free text such as a brand name.
    pub fn matches_text(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        std::iter::once(self.name.as_str())
            .chain(self.aliases.iter().map(String::as_str))
            .filter(|term| !term.is_empty())
            .any(|term| haystack.contains(&term.to_lowercase()))
    }
}

/// Registry of known devices keyed by canonical name.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<DeviceId, Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let mut registry = Self::new();
        for device in devices {
            registry.register(device);
        }
        registry
    }

    /// Register a device. A second registration of the same name only merges aliases.
    pub fn register(&mut self, device: Device) -> &Device {
        let id = device.name.clone();
        let entry = self.devices.entry(id).or_insert_with(|| Device {
            name: device.name.clone(),
            aliases: Vec::new(),
            manufacturer: device.manufacturer.clone(),
        });
        for alias in device.aliases {
            entry.push_alias(alias);
        }
        entry
    }

    /// Return the device for `name`, creating it on first reference.
    pub fn get_or_create(&mut self, name: &str) -> DeviceId {
        if let Some(existing) = self.resolve_identifier(name) {
            return existing;
        }
        self.register(Device::new(name)).name.clone()
    }

    /// Returns true if the alias was new.
    pub fn add_alias(&mut self, device: &DeviceId, alias: impl Into<String>) -> bool {
        self.devices
            .get_mut(device)
            .map(|d| d.push_alias(alias.into()))
            .unwrap_or(false)
    }

    pub fn get(&self, device: &DeviceId) -> Option<&Device> {
        self.devices.get(device)
    }

    pub fn resolve_identifier(&self, identifier: &str) -> Option<DeviceId> {
        self.devices
            .values()
            .find(|d| d.matches_identifier(identifier))
            .map(|d| d.name.clone())
    }

    pub fn resolve_text(&self, text: &str) -> Option<DeviceId> {
        self.devices
            .values()
            .find(|d| d.matches_text(text))
            .map(|d| d.name.clone())
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
