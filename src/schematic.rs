// src/schematic.rs

use crate::editor::{NewComponent, RoutingMode, SchematicEditor};
use crate::error::{Error, Result};
use crate::kicad_models::{KiSymbol, SchLabel, SchSymbol, SchWire, quoted};
use crate::pin_ref::ResolvedPin;
use crate::routing::{Rect, manhattan_route};
use glam::DVec2;
use indexmap::IndexMap;
use std::fmt::Write;
use std::fs;
use std::path::Path;
use uuid::Uuid;

const KICAD_SCH_VERSION: &str = "20231120";
const GENERATOR: &str = "kicad_schgen_rs";

/// Contents of one sheet being built.
#[derive(Debug)]
struct Sheet {
    title: String,
    uuid: Uuid,
    lib_symbols: IndexMap<String, KiSymbol>,
    /// `(name, number)` pins gathered for each synthesized lib id.
    box_pins: IndexMap<String, Vec<(String, String)>>,
    symbols: IndexMap<String, SchSymbol>,
    wires: Vec<SchWire>,
    labels: Vec<SchLabel>,
}

/// Writes KiCad `.kicad_sch` files directly. Library symbols are embedded:
/// common passives use built-in geometry, everything else is drawn as a
/// box carrying every pin that any component of that lib id maps or is
/// wired to. Adding a component can grow its box, so place everything
/// before routing.
#[derive(Debug, Default)]
pub struct KicadSchematic {
    sheet: Option<Sheet>,
}

impl KicadSchematic {
    pub fn new() -> Self {
        Self::default()
    }

    fn sheet(&self) -> Result<&Sheet> {
        self.sheet.as_ref().ok_or(Error::NoSchematic)
    }

    fn sheet_mut(&mut self) -> Result<&mut Sheet> {
        self.sheet.as_mut().ok_or(Error::NoSchematic)
    }

    pub fn component_count(&self) -> usize {
        self.sheet.as_ref().map_or(0, |s| s.symbols.len())
    }

    pub fn wire_count(&self) -> usize {
        self.sheet.as_ref().map_or(0, |s| s.wires.len())
    }

    pub fn label_count(&self) -> usize {
        self.sheet.as_ref().map_or(0, |s| s.labels.len())
    }

    /// Symbol bodies in sheet coordinates.
    fn obstacles(sheet: &Sheet) -> Vec<Rect> {
        sheet
            .symbols
            .values()
            .filter_map(|sym| {
                let (min, max) = sheet.lib_symbols.get(&sym.lib_id)?.body()?;
                // Symbol +Y is up, sheet +Y is down.
                Some(Rect::new(
                    DVec2::new(sym.position.x + min.x, sym.position.y - max.y),
                    DVec2::new(sym.position.x + max.x, sym.position.y - min.y),
                ))
            })
            .collect()
    }

    /// Serializes the current sheet as an S-expression document.
    pub fn to_kicad_sch(&self, project: &str) -> Result<String> {
        let sheet = self.sheet()?;
        let mut out = String::new();

        writeln!(out, "(kicad_sch (version {KICAD_SCH_VERSION}) (generator {})", quoted(GENERATOR))?;
        writeln!(out, "  (uuid {})", sheet.uuid)?;
        writeln!(out, "  (paper \"A4\")")?;
        writeln!(out, "  (title_block (title {}))", quoted(&sheet.title))?;

        writeln!(out, "  (lib_symbols")?;
        for symbol in sheet.lib_symbols.values() {
            symbol.write_lib_entry(&mut out)?;
        }
        writeln!(out, "  )")?;

        for wire in &sheet.wires {
            wire.write_entry(&mut out)?;
        }
        for label in &sheet.labels {
            label.write_entry(&mut out)?;
        }
        for symbol in sheet.symbols.values() {
            symbol.write_entry(&mut out, project, sheet.uuid)?;
        }

        writeln!(out, "  (sheet_instances (path \"/\" (page \"1\")))")?;
        writeln!(out, ")")?;
        Ok(out)
    }
}

impl SchematicEditor for KicadSchematic {
    fn create(&mut self, title: &str) -> Result<()> {
        self.sheet = Some(Sheet {
            title: title.to_string(),
            uuid: Uuid::new_v4(),
            lib_symbols: IndexMap::new(),
            box_pins: IndexMap::new(),
            symbols: IndexMap::new(),
            wires: Vec::new(),
            labels: Vec::new(),
        });
        Ok(())
    }

    fn add_component(&mut self, component: &NewComponent<'_>) -> Result<()> {
        let sheet = self.sheet_mut()?;
        if sheet.symbols.contains_key(component.reference) {
            return Err(Error::DuplicateReference(component.reference.to_string()));
        }

        if let Some(builtin) = KiSymbol::builtin(component.lib_id) {
            sheet
                .lib_symbols
                .entry(component.lib_id.to_string())
                .or_insert(builtin);
        } else {
            let pins = sheet
                .box_pins
                .entry(component.lib_id.to_string())
                .or_default();
            let known = pins.len();
            let raw = component.pins_used.iter().map(|number| (number, number));
            for (name, number) in component.pins.iter().chain(raw) {
                if !pins.iter().any(|(_, n)| n == number) {
                    pins.push((name.clone(), number.clone()));
                }
            }
            if pins.len() != known || !sheet.lib_symbols.contains_key(component.lib_id) {
                let symbol = KiSymbol::synthesize(
                    component.lib_id,
                    pins.iter().map(|(name, number)| (name, number)),
                );
                sheet.lib_symbols.insert(component.lib_id.to_string(), symbol);
            }
        }

        sheet.symbols.insert(
            component.reference.to_string(),
            SchSymbol {
                lib_id: component.lib_id.to_string(),
                reference: component.reference.to_string(),
                value: component.value.to_string(),
                footprint: component.footprint.map(str::to_string),
                position: component.position,
                uuid: Uuid::new_v4(),
            },
        );
        Ok(())
    }

    fn pin_position(&self, reference: &str, pin: &str) -> Result<DVec2> {
        let sheet = self.sheet()?;
        let symbol = sheet
            .symbols
            .get(reference)
            .ok_or_else(|| Error::ComponentNotFound(reference.to_string()))?;
        let lib_pin = sheet
            .lib_symbols
            .get(&symbol.lib_id)
            .and_then(|lib| lib.pin(pin))
            .ok_or_else(|| Error::PinNotFound {
                reference: reference.to_string(),
                pin: pin.to_string(),
            })?;
        Ok(DVec2::new(
            symbol.position.x + lib_pin.pos.x,
            symbol.position.y - lib_pin.pos.y,
        ))
    }

    fn route_pins(
        &mut self,
        from: &ResolvedPin,
        to: &ResolvedPin,
        mode: RoutingMode,
        avoid_components: bool,
    ) -> Result<()> {
        let start = self.pin_position(&from.reference, &from.number)?;
        let end = self.pin_position(&to.reference, &to.number)?;

        let path = match mode {
            RoutingMode::Direct => vec![start, end],
            RoutingMode::Manhattan => {
                let obstacles = Self::obstacles(self.sheet()?);
                manhattan_route(start, end, &obstacles, avoid_components).ok_or_else(|| {
                    Error::RouteBlocked {
                        from: from.to_string(),
                        to: to.to_string(),
                    }
                })?
            }
        };

        let sheet = self.sheet_mut()?;
        sheet
            .wires
            .extend(path.windows(2).map(|seg| SchWire::new(seg[0], seg[1])));
        Ok(())
    }

    fn wire_pins(&mut self, from: &ResolvedPin, to: &ResolvedPin) -> Result<()> {
        self.route_pins(from, to, RoutingMode::Direct, false)
    }

    fn add_label(&mut self, text: &str, position: DVec2) -> Result<()> {
        self.sheet_mut()?.labels.push(SchLabel {
            text: text.to_string(),
            position,
            uuid: Uuid::new_v4(),
        });
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        let project = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("project");
        let content = self.to_kicad_sch(project)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::PinMap;

    fn place(sch: &mut KicadSchematic, reference: &str, lib_id: &str, x: f64, y: f64, pins: &PinMap) -> Result<()> {
        sch.add_component(&NewComponent {
            lib_id,
            reference,
            value: "",
            position: DVec2::new(x, y),
            footprint: None,
            pins,
            pins_used: &[],
        })
    }

    fn pin(reference: &str, number: &str) -> ResolvedPin {
        ResolvedPin {
            reference: reference.into(),
            number: number.into(),
        }
    }

    #[test]
    fn requires_create_first() {
        let sch = KicadSchematic::new();
        assert!(matches!(sch.pin_position("R1", "1"), Err(Error::NoSchematic)));
    }

    #[test]
    fn pin_positions_flip_y() {
        let mut sch = KicadSchematic::new();
        sch.create("t").unwrap();
        place(&mut sch, "R1", "Device:R", 50.8, 50.8, &PinMap::new()).unwrap();
        assert_eq!(sch.pin_position("R1", "1").unwrap(), DVec2::new(50.8, 50.8 - 3.81));
        assert!(matches!(sch.pin_position("R1", "9"), Err(Error::PinNotFound { .. })));
        assert!(matches!(sch.pin_position("R2", "1"), Err(Error::ComponentNotFound(_))));
    }

    #[test]
    fn rejects_duplicate_reference() {
        let mut sch = KicadSchematic::new();
        sch.create("t").unwrap();
        place(&mut sch, "R1", "Device:R", 0.0, 0.0, &PinMap::new()).unwrap();
        let err = place(&mut sch, "R1", "Device:C", 10.16, 0.0, &PinMap::new()).unwrap_err();
        assert!(matches!(err, Error::DuplicateReference(_)));
        assert_eq!(sch.component_count(), 1);
    }

    #[test]
    fn routes_and_serializes() {
        let mut sch = KicadSchematic::new();
        sch.create("Divider").unwrap();
        place(&mut sch, "R1", "Device:R", 50.8, 50.8, &PinMap::new()).unwrap();
        place(&mut sch, "R2", "Device:R", 71.12, 50.8, &PinMap::new()).unwrap();
        sch.route_pins(&pin("R1", "2"), &pin("R2", "1"), RoutingMode::Manhattan, true)
            .unwrap();
        assert!(sch.wire_count() >= 1);
        sch.add_label("VCC", DVec2::new(53.34, 46.99)).unwrap();

        let text = sch.to_kicad_sch("divider").unwrap();
        assert!(text.starts_with("(kicad_sch (version 20231120)"));
        assert!(text.contains("(title_block (title \"Divider\"))"));
        assert_eq!(text.matches("(symbol \"Device:R\"").count(), 1);
        assert_eq!(text.matches("(lib_id \"Device:R\")").count(), 2);
        assert!(text.contains("(label \"VCC\""));
        assert_eq!(text.matches('(').count(), text.matches(')').count());
    }

    #[test]
    fn box_symbols_collect_pins_from_every_instance() {
        let mut sch = KicadSchematic::new();
        sch.create("t").unwrap();

        let mut u1_pins = PinMap::new();
        u1_pins.insert("TX1".into(), "1".into());
        let mut u2_pins = PinMap::new();
        u2_pins.insert("RX2".into(), "7".into());
        place(&mut sch, "U1", "MCU_Module:Teensy4.1", 50.8, 50.8, &u1_pins).unwrap();
        place(&mut sch, "U2", "MCU_Module:Teensy4.1", 132.08, 50.8, &u2_pins).unwrap();

        let raw = ["1".to_string(), "4".to_string()];
        sch.add_component(&NewComponent {
            lib_id: "Connector_Generic:Conn_01x04",
            reference: "J1",
            value: "I2C",
            position: DVec2::new(50.8, 101.6),
            footprint: None,
            pins: &PinMap::new(),
            pins_used: &raw,
        })
        .unwrap();

        assert!(sch.pin_position("U1", "7").is_ok());
        assert!(sch.pin_position("U2", "1").is_ok());
        assert!(sch.pin_position("J1", "4").is_ok());
        assert!(matches!(sch.pin_position("J1", "2"), Err(Error::PinNotFound { .. })));

        let text = sch.to_kicad_sch("t").unwrap();
        assert_eq!(text.matches("(symbol \"MCU_Module:Teensy4.1\"").count(), 1);
    }
}
