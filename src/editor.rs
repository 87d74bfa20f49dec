// src/editor.rs

use crate::design::PinMap;
use crate::error::Result;
use crate::pin_ref::ResolvedPin;
use glam::DVec2;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMode {
    /// Orthogonal segments only.
    Manhattan,
    /// A single straight segment.
    Direct,
}

/// A component to be placed on the sheet.
#[derive(Debug, Clone, Copy)]
pub struct NewComponent<'a> {
    pub lib_id: &'a str,
    pub reference: &'a str,
    pub value: &'a str,
    pub position: DVec2,
    pub footprint: Option<&'a str>,
    /// Symbolic pin names, used by editors that have to draw the symbol
    /// themselves.
    pub pins: &'a PinMap,
    /// Resolved pin numbers the design wires to on this component, mapped
    /// or not.
    pub pins_used: &'a [String],
}

/// The schematic-editing operations a build needs. Every call may fail;
/// the builder decides which failures are fatal.
pub trait SchematicEditor {
    /// Fails with [`crate::error::Error::MissingDependency`] when the
    /// backend cannot work at all.
    fn check_available(&self) -> Result<()> {
        Ok(())
    }

    /// Starts a new, empty schematic, discarding any previous one.
    fn create(&mut self, title: &str) -> Result<()>;

    fn add_component(&mut self, component: &NewComponent<'_>) -> Result<()>;

    /// Position of a pin tip in sheet coordinates.
    fn pin_position(&self, reference: &str, pin: &str) -> Result<DVec2>;

    fn route_pins(
        &mut self,
        from: &ResolvedPin,
        to: &ResolvedPin,
        mode: RoutingMode,
        avoid_components: bool,
    ) -> Result<()>;

    /// Straight wire between two pins.
    fn wire_pins(&mut self, from: &ResolvedPin, to: &ResolvedPin) -> Result<()>;

    fn add_label(&mut self, text: &str, position: DVec2) -> Result<()>;

    fn save(&self, path: &Path) -> Result<()>;
}
