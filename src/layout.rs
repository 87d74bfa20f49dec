// src/layout.rs

use crate::design::Components;
use glam::DVec2;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

/// KiCad schematic grid (mm).
pub const GRID_SPACING: f64 = 2.54;
/// Horizontal spacing between components.
pub const COMPONENT_SPACING_X: f64 = 40.0;
/// Vertical spacing between rows.
pub const COMPONENT_SPACING_Y: f64 = 10.0;
pub const LAYOUT_ORIGIN: DVec2 = DVec2::new(50.0, 50.0);
pub const PASSIVE_COLUMNS: usize = 4;
/// Used when auto-layout is off and the component has no explicit position.
pub const DEFAULT_POSITION: DVec2 = DVec2::new(100.0, 100.0);

const CONTROLLER_MARKERS: [&str; 3] = ["MCU", "Module", "IC"];

static PASSIVE_LIB_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Device:[RCL]").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Microcontrollers, modules and ICs.
    Controller,
    /// Resistors, capacitors and inductors.
    Passive,
    Other,
}

impl Category {
    pub fn of(lib_id: &str) -> Category {
        if CONTROLLER_MARKERS.iter().any(|m| lib_id.contains(m)) {
            Category::Controller
        } else if PASSIVE_LIB_ID.is_match(lib_id) {
            Category::Passive
        } else {
            Category::Other
        }
    }
}

pub fn snap_to_grid(value: f64) -> f64 {
    (value / GRID_SPACING).round() * GRID_SPACING
}

pub fn snap_point(point: DVec2) -> DVec2 {
    (point / GRID_SPACING).round() * GRID_SPACING
}

/// Assigns grid-snapped positions grouped by category:
/// controllers in a row on the left, passives in a 4-wide grid to their
/// right, everything else in a column further right. Connectivity is not
/// considered.
pub fn auto_layout(components: &Components) -> IndexMap<String, DVec2> {
    let mut controllers = Vec::new();
    let mut passives = Vec::new();
    let mut others = Vec::new();

    for (reference, spec) in components {
        match Category::of(&spec.lib_id) {
            Category::Controller => controllers.push(reference),
            Category::Passive => passives.push(reference),
            Category::Other => others.push(reference),
        }
    }

    let mut positions = IndexMap::with_capacity(components.len());
    let y_offset = LAYOUT_ORIGIN.y;

    for (i, reference) in controllers.iter().enumerate() {
        let x = LAYOUT_ORIGIN.x + i as f64 * COMPONENT_SPACING_X * 2.0;
        positions.insert((*reference).clone(), DVec2::new(x, y_offset));
    }

    let passive_x =
        LAYOUT_ORIGIN.x + controllers.len() as f64 * COMPONENT_SPACING_X * 2.0 + COMPONENT_SPACING_X;
    for (i, reference) in passives.iter().enumerate() {
        let row = (i / PASSIVE_COLUMNS) as f64;
        let col = (i % PASSIVE_COLUMNS) as f64;
        let x = passive_x + col * COMPONENT_SPACING_X / 2.0;
        let y = y_offset + row * COMPONENT_SPACING_Y;
        positions.insert((*reference).clone(), DVec2::new(x, y));
    }

    let other_x = passive_x + COMPONENT_SPACING_X * 2.0;
    for (i, reference) in others.iter().enumerate() {
        let y = y_offset + i as f64 * COMPONENT_SPACING_Y;
        positions.insert((*reference).clone(), DVec2::new(other_x, y));
    }

    for pos in positions.values_mut() {
        *pos = snap_point(*pos);
    }
    positions
}

/// Final placement for every component: explicit position first, then the
/// auto-layout result, then [`DEFAULT_POSITION`]. Always snapped.
pub fn resolve_positions(components: &Components, auto: bool) -> IndexMap<String, DVec2> {
    let computed = if auto {
        auto_layout(components)
    } else {
        IndexMap::new()
    };

    components
        .iter()
        .map(|(reference, spec)| {
            let pos = spec
                .position
                .or_else(|| computed.get(reference).copied())
                .unwrap_or(DEFAULT_POSITION);
            (reference.clone(), snap_point(pos))
        })
        .collect()
}
