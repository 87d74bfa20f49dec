// src/lib.rs

pub mod builder;
pub mod common_parts;
pub mod design;
pub mod editor;
pub mod error;
pub mod file_writer;
pub mod kicad_models;
pub mod layout;
pub mod mcu;
pub mod pin_ref;
pub mod render;
pub mod report;
pub mod routing;
pub mod schematic;
pub mod signal;

pub use builder::{BuildOptions, BuildOutput, BuildWarning, SchematicBuilder, Stage};
pub use design::{ComponentSpec, Connection, Design, PowerNet};
pub use error::{Error, Result};
pub use mcu::{Mcu, McuPair};
pub use signal::infer_signal_type;

use std::path::Path;

/// Builds `design` with the native KiCad writer and the default renderer.
pub async fn create_schematic(
    design: &Design,
    filename: impl AsRef<Path>,
    options: &BuildOptions,
) -> Result<BuildOutput> {
    SchematicBuilder::new()
        .build(design, filename, options)
        .await
}

/// Wires two controllers together, adding one pull-up per bus signal.
pub async fn draw_mcu_connection(
    pair: &McuPair,
    filename: impl AsRef<Path>,
    options: &BuildOptions,
) -> Result<BuildOutput> {
    let design = pair.to_design();
    create_schematic(&design, filename, options).await
}
