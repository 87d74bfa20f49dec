// src/pin_ref.rs

use crate::design::{Components, PinMap};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;

pub const PIN_SEPARATOR: char = '.';

/// Pin maps for every component in a design, keyed by reference.
pub type PinMaps = HashMap<String, PinMap>;

/// A pin reference after symbolic names have been mapped to pin numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPin {
    pub reference: String,
    pub number: String,
}

impl fmt::Display for ResolvedPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.reference, PIN_SEPARATOR, self.number)
    }
}

/// Splits `"U1.TX1"` into `("U1", "TX1")`.
pub fn split_pin_ref(pin_ref: &str) -> Result<(&str, &str)> {
    let mut parts = pin_ref.split(PIN_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(reference), Some(pin), None) if !reference.is_empty() && !pin.is_empty() => {
            Ok((reference, pin))
        }
        _ => Err(Error::InvalidPinRef(pin_ref.to_string())),
    }
}

/// Resolves a pin reference against the per-component pin maps. Tokens
/// without a mapping are taken to be pin numbers already.
pub fn resolve_pin_ref(pin_ref: &str, pin_maps: &PinMaps) -> Result<ResolvedPin> {
    let (reference, token) = split_pin_ref(pin_ref)?;
    let number = pin_maps
        .get(reference)
        .and_then(|pins| pins.get(token))
        .map(String::as_str)
        .unwrap_or(token);

    Ok(ResolvedPin {
        reference: reference.to_string(),
        number: number.to_string(),
    })
}

pub fn build_pin_maps(components: &Components) -> PinMaps {
    components
        .iter()
        .map(|(reference, spec)| (reference.clone(), spec.pins.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps() -> PinMaps {
        let mut maps = PinMaps::new();
        let mut u1 = PinMap::new();
        u1.insert("TX1".into(), "1".into());
        u1.insert("SDA".into(), "18".into());
        maps.insert("U1".into(), u1);
        let mut u2 = PinMap::new();
        u2.insert("SDA".into(), "4".into());
        maps.insert("U2".into(), u2);
        maps.insert("R1".into(), PinMap::new());
        maps
    }

    #[test]
    fn maps_symbolic_names_per_component() {
        let maps = maps();
        assert_eq!(resolve_pin_ref("U1.SDA", &maps).unwrap().number, "18");
        assert_eq!(resolve_pin_ref("U2.SDA", &maps).unwrap().number, "4");
        assert_eq!(resolve_pin_ref("U1.TX1", &maps).unwrap().to_string(), "U1.1");
    }

    #[test]
    fn unmapped_tokens_pass_through() {
        let maps = maps();
        let pin = resolve_pin_ref("R1.2", &maps).unwrap();
        assert_eq!(pin.reference, "R1");
        assert_eq!(pin.number, "2");
        // Unknown component, still passes through.
        assert_eq!(resolve_pin_ref("J9.GND", &maps).unwrap().number, "GND");
    }

    #[test]
    fn rejects_wrong_separator_count() {
        let maps = maps();
        for bad in ["U1", "U1.3.3V", "U1..2", "", ".", "U1.", ".2"] {
            assert!(
                matches!(resolve_pin_ref(bad, &maps), Err(Error::InvalidPinRef(_))),
                "expected format error for {bad:?}"
            );
        }
    }

    #[test]
    fn resolution_is_order_independent() {
        let maps = maps();
        let a = resolve_pin_ref("U1.SDA", &maps).unwrap();
        let _ = resolve_pin_ref("U2.SDA", &maps).unwrap();
        assert_eq!(a, resolve_pin_ref("U1.SDA", &maps).unwrap());
    }
}
