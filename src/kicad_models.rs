// src/kicad_models.rs

use crate::design::part_name;
use crate::layout::GRID_SPACING;
use glam::DVec2;
use std::collections::HashSet;
use std::fmt::{self, Write};
use uuid::Uuid;

const FONT: &str = "(effects (font (size 1.27 1.27)))";
const FONT_HIDDEN: &str = "(effects (font (size 1.27 1.27)) hide)";

/// Half-width of a synthesized box symbol body.
const BOX_HALF_WIDTH: f64 = 7.62;

/// Pin names that are drawn as power inputs on synthesized symbols.
const POWER_PIN_NAMES: [&str; 8] = ["GND", "VCC", "VDD", "VIN", "3V3", "5V", "VBAT", "VSS"];

// --- Library symbol ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiPinType {
    Bidirectional,
    PowerIn,
    Passive,
}

impl KiPinType {
    fn as_str(self) -> &'static str {
        match self {
            KiPinType::Bidirectional => "bidirectional",
            KiPinType::PowerIn => "power_in",
            KiPinType::Passive => "passive",
        }
    }
}

#[derive(Debug, Clone)]
pub struct KiSymbolPin {
    pub name: String,
    pub number: String,
    pub pin_type: KiPinType,
    pub length: f64,
    /// Pin tip in symbol coordinates (+Y up).
    pub pos: DVec2,
    pub rotation: i32,
}

#[derive(Debug, Clone)]
pub struct KiSymbolRect {
    pub start: DVec2,
    pub end: DVec2,
}

/// A symbol definition embedded in the schematic's `lib_symbols` block.
#[derive(Debug, Clone)]
pub struct KiSymbol {
    pub lib_id: String,
    pub reference: String,
    pub pins: Vec<KiSymbolPin>,
    pub rectangles: Vec<KiSymbolRect>,
}

fn passive_pin(number: &str, pos: DVec2, rotation: i32, length: f64) -> KiSymbolPin {
    KiSymbolPin {
        name: "~".to_string(),
        number: number.to_string(),
        pin_type: KiPinType::Passive,
        length,
        pos,
        rotation,
    }
}

impl KiSymbol {
    /// Geometry for the common two-terminal parts; `None` for anything else.
    pub fn builtin(lib_id: &str) -> Option<KiSymbol> {
        let (reference, vertical, body) = match lib_id {
            "Device:R" => ("R", true, DVec2::new(1.016, 2.54)),
            "Device:C" | "Device:C_Polarized" | "Device:CP" => ("C", true, DVec2::new(2.032, 0.762)),
            "Device:L" => ("L", true, DVec2::new(1.016, 2.54)),
            "Device:D" | "Device:LED" => ("D", false, DVec2::new(1.27, 1.27)),
            _ => return None,
        };

        let pins = if vertical {
            vec![
                passive_pin("1", DVec2::new(0.0, 3.81), 270, 3.81 - body.y),
                passive_pin("2", DVec2::new(0.0, -3.81), 90, 3.81 - body.y),
            ]
        } else {
            vec![
                passive_pin("1", DVec2::new(-3.81, 0.0), 0, 3.81 - body.x),
                passive_pin("2", DVec2::new(3.81, 0.0), 180, 3.81 - body.x),
            ]
        };

        Some(KiSymbol {
            lib_id: lib_id.to_string(),
            reference: reference.to_string(),
            pins,
            rectangles: vec![KiSymbolRect {
                start: -body,
                end: body,
            }],
        })
    }

    /// Builds a box symbol from `(name, number)` pairs: first half of the
    /// unique pin numbers on the left edge, the rest on the right, on the
    /// 2.54 grid.
    pub fn synthesize<I, N, M>(lib_id: &str, pins: I) -> KiSymbol
    where
        I: IntoIterator<Item = (N, M)>,
        N: AsRef<str>,
        M: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<(String, String)> = pins
            .into_iter()
            .map(|(name, number)| (name.as_ref().to_string(), number.as_ref().to_string()))
            .filter(|(_, number)| seen.insert(number.clone()))
            .collect();

        let left_count = unique.len().div_ceil(2);
        let rows = left_count.max(1) as i64;
        let top = ((rows - 1) / 2) as f64 * GRID_SPACING;
        let pin_x = BOX_HALF_WIDTH + GRID_SPACING;

        let ki_pins = unique
            .iter()
            .enumerate()
            .map(|(i, (name, number))| {
                let (side, row) = if i < left_count {
                    (-1.0, i)
                } else {
                    (1.0, i - left_count)
                };
                let pin_type = if POWER_PIN_NAMES.contains(&name.to_uppercase().as_str()) {
                    KiPinType::PowerIn
                } else {
                    KiPinType::Bidirectional
                };
                KiSymbolPin {
                    name: name.clone(),
                    number: number.clone(),
                    pin_type,
                    length: GRID_SPACING,
                    pos: DVec2::new(side * pin_x, top - row as f64 * GRID_SPACING),
                    rotation: if side < 0.0 { 0 } else { 180 },
                }
            })
            .collect();

        let bottom = top - (rows - 1) as f64 * GRID_SPACING;
        KiSymbol {
            lib_id: lib_id.to_string(),
            reference: "U".to_string(),
            pins: ki_pins,
            rectangles: vec![KiSymbolRect {
                start: DVec2::new(-BOX_HALF_WIDTH, top + GRID_SPACING),
                end: DVec2::new(BOX_HALF_WIDTH, bottom - GRID_SPACING),
            }],
        }
    }

    pub fn pin(&self, number: &str) -> Option<&KiSymbolPin> {
        self.pins.iter().find(|p| p.number == number)
    }

    /// Bounding box of the drawn body in symbol coordinates, `(min, max)`.
    pub fn body(&self) -> Option<(DVec2, DVec2)> {
        self.rectangles.iter().fold(None, |acc, r| {
            let (min, max) = (r.start.min(r.end), r.start.max(r.end));
            Some(match acc {
                Some((a, b)) => (min.min(a), max.max(b)),
                None => (min, max),
            })
        })
    }

    pub fn write_lib_entry(&self, out: &mut String) -> fmt::Result {
        let unit = part_name(&self.lib_id);
        writeln!(
            out,
            "    (symbol {} (in_bom yes) (on_board yes)",
            quoted(&self.lib_id)
        )?;

        // --- Properties ---
        writeln!(
            out,
            "      (property \"Reference\" {} (at 0 0 0) {})",
            quoted(&self.reference),
            FONT
        )?;
        writeln!(
            out,
            "      (property \"Value\" {} (at 0 0 0) {})",
            quoted(unit),
            FONT
        )?;
        writeln!(out, "      (property \"Footprint\" \"\" (at 0 0 0) {})", FONT_HIDDEN)?;
        writeln!(out, "      (property \"Datasheet\" \"~\" (at 0 0 0) {})", FONT_HIDDEN)?;

        // --- Symbol graphics ---
        writeln!(out, "      (symbol {}", quoted(&format!("{unit}_1_1")))?;
        for rect in &self.rectangles {
            writeln!(
                out,
                "        (rectangle (start {} {}) (end {} {}) (stroke (width 0.254) (type default)) (fill (type background)))",
                mm(rect.start.x),
                mm(rect.start.y),
                mm(rect.end.x),
                mm(rect.end.y)
            )?;
        }

        for pin in &self.pins {
            // "~RE" is an overbar name in KiCad notation.
            let pin_name = match pin.name.strip_prefix('~') {
                Some(rest) if !rest.is_empty() => format!("~{{{rest}}}"),
                _ => pin.name.clone(),
            };
            writeln!(
                out,
                "        (pin {} line (at {} {} {}) (length {})\n          (name {} {})\n          (number {} {})\n        )",
                pin.pin_type.as_str(),
                mm(pin.pos.x),
                mm(pin.pos.y),
                pin.rotation,
                mm(pin.length),
                quoted(&pin_name),
                FONT,
                quoted(&pin.number),
                FONT
            )?;
        }

        writeln!(out, "      )\n    )")
    }
}

// --- Sheet items ---

#[derive(Debug, Clone)]
pub struct SchSymbol {
    pub lib_id: String,
    pub reference: String,
    pub value: String,
    pub footprint: Option<String>,
    pub position: DVec2,
    pub uuid: Uuid,
}

impl SchSymbol {
    pub fn write_entry(&self, out: &mut String, project: &str, sheet: Uuid) -> fmt::Result {
        let (x, y) = (self.position.x, self.position.y);
        writeln!(
            out,
            "  (symbol (lib_id {}) (at {} {} 0) (unit 1) (in_bom yes) (on_board yes) (dnp no)",
            quoted(&self.lib_id),
            mm(x),
            mm(y)
        )?;
        writeln!(out, "    (uuid {})", self.uuid)?;
        writeln!(
            out,
            "    (property \"Reference\" {} (at {} {} 0) {})",
            quoted(&self.reference),
            mm(x),
            mm(y - 5.08),
            FONT
        )?;
        writeln!(
            out,
            "    (property \"Value\" {} (at {} {} 0) {})",
            quoted(&self.value),
            mm(x),
            mm(y + 5.08),
            FONT
        )?;
        writeln!(
            out,
            "    (property \"Footprint\" {} (at {} {} 0) {})",
            quoted(self.footprint.as_deref().unwrap_or("")),
            mm(x),
            mm(y + 7.62),
            FONT_HIDDEN
        )?;
        writeln!(
            out,
            "    (instances (project {} (path {} (reference {}) (unit 1))))",
            quoted(project),
            quoted(&format!("/{sheet}")),
            quoted(&self.reference)
        )?;
        writeln!(out, "  )")
    }
}

/// One straight wire segment.
#[derive(Debug, Clone)]
pub struct SchWire {
    pub start: DVec2,
    pub end: DVec2,
    pub uuid: Uuid,
}

impl SchWire {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        SchWire {
            start,
            end,
            uuid: Uuid::new_v4(),
        }
    }

    pub fn write_entry(&self, out: &mut String) -> fmt::Result {
        writeln!(
            out,
            "  (wire (pts (xy {} {}) (xy {} {})) (stroke (width 0) (type default)) (uuid {}))",
            mm(self.start.x),
            mm(self.start.y),
            mm(self.end.x),
            mm(self.end.y),
            self.uuid
        )
    }
}

/// A local net label.
#[derive(Debug, Clone)]
pub struct SchLabel {
    pub text: String,
    pub position: DVec2,
    pub uuid: Uuid,
}

impl SchLabel {
    pub fn write_entry(&self, out: &mut String) -> fmt::Result {
        writeln!(
            out,
            "  (label {} (at {} {} 0) (effects (font (size 1.27 1.27)) (justify left bottom)) (uuid {}))",
            quoted(&self.text),
            mm(self.position.x),
            mm(self.position.y),
            self.uuid
        )
    }
}

/// Formats a coordinate with at most four decimals and no trailing zeros.
pub fn mm(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Quotes a string for an S-expression.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::PinMap;

    #[test]
    fn formats_coordinates() {
        assert_eq!(mm(50.8), "50.8");
        assert_eq!(mm(2.54 * 21.0), "53.34");
        assert_eq!(mm(100.0), "100");
        assert_eq!(mm(-0.00001), "0");
    }

    #[test]
    fn quotes_and_escapes() {
        assert_eq!(quoted("Teensy \"4.1\""), "\"Teensy \\\"4.1\\\"\"");
    }

    #[test]
    fn resistor_pins_are_vertical() {
        let r = KiSymbol::builtin("Device:R").unwrap();
        assert_eq!(r.pin("1").unwrap().pos, DVec2::new(0.0, 3.81));
        assert_eq!(r.pin("2").unwrap().pos, DVec2::new(0.0, -3.81));
        assert!(KiSymbol::builtin("MCU_Module:Teensy4.1").is_none());
    }

    #[test]
    fn synthesized_box_dedupes_numbers_and_stays_on_grid() {
        let mut pins = PinMap::new();
        for (name, number) in [("TX1", "1"), ("RX1", "0"), ("SDA", "18"), ("SCL", "19"), ("GND", "GND"), ("AGND", "GND")] {
            pins.insert(name.into(), number.into());
        }
        let sym = KiSymbol::synthesize("MCU_Module:Teensy4.1", &pins);
        assert_eq!(sym.pins.len(), 5);
        for pin in &sym.pins {
            let k = pin.pos.y / GRID_SPACING;
            assert!((k - k.round()).abs() < 1e-9, "pin {} off grid", pin.number);
        }
        assert!(sym.pin("0").unwrap().pos.x < 0.0);
        assert!(sym.pin("GND").unwrap().pos.x > 0.0);
        assert_eq!(sym.pin("GND").unwrap().pin_type, KiPinType::PowerIn);
    }

    #[test]
    fn lib_entry_uses_part_name_for_units() {
        let mut out = String::new();
        KiSymbol::builtin("Device:R").unwrap().write_lib_entry(&mut out).unwrap();
        assert!(out.contains("(symbol \"Device:R\""));
        assert!(out.contains("(symbol \"R_1_1\""));
        assert!(out.contains("(pin passive line (at 0 3.81 270)"));
    }
}
