// src/mcu.rs

use crate::design::{ComponentSpec, Connection, Design, PinMap, PowerNet, part_name};
use std::collections::HashSet;

pub const DEFAULT_MCU_FILENAME: &str = "mcu_connection.kicad_sch";
pub const DEFAULT_PULLUP_VALUE: &str = "4.7k";
pub const PULLUP_LIB_ID: &str = "Device:R";
/// Net the far side of every pull-up is tied to.
pub const PULLUP_SUPPLY_NET: &str = "VCC";

/// One of the two controllers in an [`McuPair`].
#[derive(Debug, Clone)]
pub struct Mcu {
    pub reference: String,
    pub lib_id: String,
    pub pins: PinMap,
}

impl Mcu {
    pub fn new<I, K, V>(reference: impl Into<String>, lib_id: impl Into<String>, pins: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Mcu {
            reference: reference.into(),
            lib_id: lib_id.into(),
            pins: pins.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    fn to_spec(&self) -> ComponentSpec {
        ComponentSpec::new(self.lib_id.clone(), part_name(&self.lib_id)).with_pins(self.pins.clone())
    }
}

/// Two controllers wired pin-to-pin, with pull-ups on open-drain bus lines.
#[derive(Debug, Clone)]
pub struct McuPair {
    pub first: Mcu,
    pub second: Mcu,
    /// `(first pin name, second pin name)` pairs.
    pub connections: Vec<(String, String)>,
    /// Pin names (e.g. SDA, SCL) that get a pull-up resistor.
    pub pullup_pins: Vec<String>,
    pub pullup_value: String,
    pub title: Option<String>,
}

impl McuPair {
    pub fn new(first: Mcu, second: Mcu) -> Self {
        McuPair {
            first,
            second,
            connections: Vec::new(),
            pullup_pins: Vec::new(),
            pullup_value: DEFAULT_PULLUP_VALUE.to_string(),
            title: None,
        }
    }

    pub fn connect(mut self, first_pin: impl Into<String>, second_pin: impl Into<String>) -> Self {
        self.connections.push((first_pin.into(), second_pin.into()));
        self
    }

    pub fn pull_up<I, S>(mut self, pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pullup_pins.extend(pins.into_iter().map(Into::into));
        self
    }

    pub fn pullup_value(mut self, value: impl Into<String>) -> Self {
        self.pullup_value = value.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Expands the pair into a full [`Design`]. Each bus signal gets at most
    /// one pull-up (`R1`, `R2`, ...), hung off the first controller's pin;
    /// every pull-up's second terminal joins one shared supply net.
    pub fn to_design(&self) -> Design {
        let first = &self.first.reference;
        let second = &self.second.reference;

        let mut design = Design {
            title: self.title.clone(),
            ..Design::default()
        };
        design.components.insert(first.clone(), self.first.to_spec());
        design.components.insert(second.clone(), self.second.to_spec());

        let mut pulled_up: HashSet<&str> = HashSet::new();
        let mut supply_pins = Vec::new();

        for (first_pin, second_pin) in &self.connections {
            design
                .connections
                .push(Connection::new(format!("{first}.{first_pin}"), format!("{second}.{second_pin}")));

            let bus_signal = [first_pin, second_pin]
                .into_iter()
                .find(|pin| self.pullup_pins.contains(pin));
            let Some(signal) = bus_signal else {
                continue;
            };
            if !pulled_up.insert(signal.as_str()) {
                continue;
            }

            let r_ref = format!("R{}", pulled_up.len());
            design.components.insert(
                r_ref.clone(),
                ComponentSpec::new(PULLUP_LIB_ID, self.pullup_value.clone()),
            );
            design
                .connections
                .push(Connection::new(format!("{first}.{first_pin}"), format!("{r_ref}.1")));
            supply_pins.push(format!("{r_ref}.2"));
        }

        if !supply_pins.is_empty() {
            design
                .power_nets
                .push(PowerNet::new(supply_pins, PULLUP_SUPPLY_NET));
        }
        design
    }
}
