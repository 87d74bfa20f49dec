// src/report.rs

use crate::design::Design;
use crate::file_writer::OutputPaths;
use crate::layout::Category;
use crate::signal::SignalClassifier;
use std::fmt::{self, Write};

/// Development boards that are controllers even without an MCU marker.
const BOARD_MARKERS: [&str; 4] = ["Teensy", "Arduino", "Pico", "ESP"];

pub fn is_controller_like(lib_id: &str) -> bool {
    Category::of(lib_id) == Category::Controller || BOARD_MARKERS.iter().any(|m| lib_id.contains(m))
}

/// Renders the markdown summary: components, connections with inferred
/// signal types, power nets and notes.
pub fn connection_report(
    design: &Design,
    title: Option<&str>,
    paths: &OutputPaths,
    classifier: &SignalClassifier,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let stem = paths.stem();

    writeln!(out, "# {}\n", title.unwrap_or(&stem))?;

    writeln!(out, "## Components\n")?;
    writeln!(out, "| Reference | Type | Value |")?;
    writeln!(out, "|-----------|------|-------|")?;
    for (reference, spec) in &design.components {
        writeln!(out, "| {} | {} | {} |", reference, spec.part_name(), spec.value)?;
    }
    writeln!(out)?;

    writeln!(out, "## Connections\n")?;
    writeln!(out, "| From | To | Net/Notes |")?;
    writeln!(out, "|------|-----|-----------|")?;
    for conn in &design.connections {
        let signal = classifier.classify(&conn.from, &conn.to);
        writeln!(out, "| {} | {} | {} |", conn.from, conn.to, signal)?;
    }
    writeln!(out)?;

    if !design.power_nets.is_empty() {
        writeln!(out, "## Power Nets\n")?;
        writeln!(out, "| Net | Connected Pins |")?;
        writeln!(out, "|-----|----------------|")?;
        for net in &design.power_nets {
            writeln!(out, "| {} | {} |", net.net, net.pins.join(", "))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "## Notes\n")?;
    let schematic_name = paths
        .schematic
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let svg_name = paths
        .svg
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{stem}.svg"));
    writeln!(out, "- Schematic file: `{schematic_name}`")?;
    writeln!(out, "- SVG render: `{svg_name}`")?;

    let controllers = design
        .components
        .values()
        .filter(|spec| is_controller_like(&spec.lib_id))
        .count();
    if controllers >= 2 {
        writeln!(out, "- Check voltage levels between MCUs (3.3V vs 5V logic)")?;
        writeln!(out, "- Add level shifters if needed for voltage compatibility")?;
    }

    Ok(out)
}
