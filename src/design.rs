// src/design.rs

use crate::common_parts::expand_lib_id;
use crate::error::Result;
use glam::DVec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pin name -> pin number for one component.
pub type PinMap = IndexMap<String, String>;

/// Reference designator -> component, in the order the caller supplied them.
pub type Components = IndexMap<String, ComponentSpec>;

fn default_lib_id() -> String {
    "Device:R".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    #[serde(default = "default_lib_id")]
    pub lib_id: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub pins: PinMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<DVec2>,
}

impl ComponentSpec {
    pub fn new(lib_id: impl Into<String>, value: impl Into<String>) -> Self {
        ComponentSpec {
            lib_id: lib_id.into(),
            value: value.into(),
            pins: PinMap::new(),
            footprint: None,
            position: None,
        }
    }

    pub fn with_pins<I, K, V>(mut self, pins: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.pins
            .extend(pins.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_footprint(mut self, footprint: impl Into<String>) -> Self {
        self.footprint = Some(footprint.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(DVec2::new(x, y));
        self
    }

    /// Part name without the library prefix, e.g. `Teensy4.1` for
    /// `MCU_Module:Teensy4.1`.
    pub fn part_name(&self) -> &str {
        part_name(&self.lib_id)
    }
}

pub fn part_name(lib_id: &str) -> &str {
    lib_id.rsplit(':').next().unwrap_or(lib_id)
}

/// A point-to-point wire between two `"Ref.Pin"` references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Connection {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for Connection {
    fn from((from, to): (A, B)) -> Self {
        Connection::new(from, to)
    }
}

/// Pins that all share one named net (VCC, GND, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerNet {
    pub pins: Vec<String>,
    pub net: String,
}

impl PowerNet {
    pub fn new<I, S>(pins: I, net: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PowerNet {
            pins: pins.into_iter().map(Into::into).collect(),
            net: net.into(),
        }
    }
}

/// Everything needed for one schematic build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Design {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub components: Components,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub power_nets: Vec<PowerNet>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn component(mut self, reference: impl Into<String>, spec: ComponentSpec) -> Self {
        self.components.insert(reference.into(), spec);
        self
    }

    pub fn connect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.connections.push(Connection::new(from, to));
        self
    }

    pub fn power_net<I, S>(mut self, pins: I, net: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.power_nets.push(PowerNet::new(pins, net));
        self
    }

    /// Parses a design from JSON, expanding library aliases like `"resistor"`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut design: Design = serde_json::from_str(json)?;
        for spec in design.components.values_mut() {
            spec.lib_id = expand_lib_id(&spec.lib_id);
        }
        Ok(design)
    }

    /// Reads and parses a JSON design file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
