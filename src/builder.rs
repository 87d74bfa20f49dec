// src/builder.rs

use crate::design::{Design, PowerNet};
use crate::editor::{NewComponent, RoutingMode, SchematicEditor};
use crate::error::{Error, Result};
use crate::file_writer::{OutputPaths, resolve_output_path, write_report};
use crate::layout::{DEFAULT_POSITION, GRID_SPACING, resolve_positions};
use crate::pin_ref::{PinMaps, build_pin_maps, resolve_pin_ref};
use crate::render::{DEFAULT_RENDER_TIMEOUT, KicadCli};
use crate::report::connection_report;
use crate::schematic::KicadSchematic;
use crate::signal::SignalClassifier;
use glam::DVec2;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TITLE: &str = "Schematic";

/// Resolved pin numbers each reference is wired to by connections and
/// power nets. Unparseable references are skipped here and reported when
/// they are wired.
fn pins_in_use(design: &Design, pin_maps: &PinMaps) -> HashMap<String, Vec<String>> {
    let refs = design
        .connections
        .iter()
        .flat_map(|conn| [&conn.from, &conn.to])
        .chain(design.power_nets.iter().flat_map(|net| &net.pins));

    let mut used: HashMap<String, Vec<String>> = HashMap::new();
    for pin in refs.filter_map(|r| resolve_pin_ref(r, pin_maps).ok()) {
        let numbers = used.entry(pin.reference).or_default();
        if !numbers.contains(&pin.number) {
            numbers.push(pin.number);
        }
    }
    used
}

/// Knobs for one build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Schematic title; the report falls back to the file stem.
    pub title: Option<String>,
    /// Export an SVG with kicad-cli after saving.
    pub render: bool,
    pub auto_layout: bool,
    /// Directory for bare filenames (default `./KiCad`).
    pub output_dir: Option<PathBuf>,
    pub render_timeout: Duration,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            title: None,
            render: true,
            auto_layout: true,
            output_dir: None,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Placement,
    Connection,
    Label,
    PowerNet,
    Render,
    Report,
}

/// A non-fatal failure of one item during a build.
#[derive(Debug)]
pub struct BuildWarning {
    pub stage: Stage,
    /// What was being worked on, e.g. `"U1.TX1 -> U2.RX"`.
    pub subject: String,
    pub error: Error,
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}: {}", self.stage, self.subject, self.error)
    }
}

#[derive(Debug)]
pub struct BuildOutput {
    pub schematic: PathBuf,
    pub svg: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
    pub warnings: Vec<BuildWarning>,
}

impl BuildOutput {
    pub fn warnings_for(&self, stage: Stage) -> impl Iterator<Item = &BuildWarning> {
        self.warnings.iter().filter(move |w| w.stage == stage)
    }
}

/// Drives a [`SchematicEditor`] through a whole build. Per-item failures are
/// collected as [`BuildWarning`]s instead of aborting.
pub struct SchematicBuilder<E = KicadSchematic> {
    editor: E,
    renderer: KicadCli,
    classifier: SignalClassifier,
    warnings: Vec<BuildWarning>,
}

impl SchematicBuilder<KicadSchematic> {
    pub fn new() -> Self {
        Self::with_editor(KicadSchematic::new())
    }
}

impl Default for SchematicBuilder<KicadSchematic> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SchematicEditor> SchematicBuilder<E> {
    pub fn with_editor(editor: E) -> Self {
        SchematicBuilder {
            editor,
            renderer: KicadCli::new(),
            classifier: SignalClassifier::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_renderer(mut self, renderer: KicadCli) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_classifier(mut self, classifier: SignalClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn into_editor(self) -> E {
        self.editor
    }

    fn warn(&mut self, stage: Stage, subject: impl Into<String>, error: Error) {
        self.warnings.push(BuildWarning {
            stage,
            subject: subject.into(),
            error,
        });
    }

    /// Builds the schematic, optional SVG and markdown report for `design`.
    ///
    /// Fails only when nothing useful can be produced: the editor is
    /// unavailable, the output directory cannot be created, or the
    /// schematic cannot be created or saved.
    pub async fn build(
        &mut self,
        design: &Design,
        filename: impl AsRef<Path>,
        options: &BuildOptions,
    ) -> Result<BuildOutput> {
        self.editor.check_available()?;
        self.warnings.clear();

        let schematic_path = resolve_output_path(filename.as_ref(), options.output_dir.as_deref())?;
        let paths = OutputPaths::for_schematic(&schematic_path);

        let title = options
            .title
            .as_deref()
            .or(design.title.as_deref())
            .unwrap_or(DEFAULT_TITLE);
        self.editor.create(title)?;

        let pin_maps = build_pin_maps(&design.components);
        let pins_used = pins_in_use(design, &pin_maps);
        self.place_components(design, options.auto_layout, &pins_used);

        for conn in &design.connections {
            self.connect(&conn.from, &conn.to, &pin_maps);
        }
        for net in &design.power_nets {
            self.add_power_net(net, &pin_maps);
        }

        self.editor.save(&schematic_path)?;
        info!("Saved: {}", schematic_path.display());

        let svg = if options.render {
            self.render(&schematic_path, options.render_timeout).await
        } else {
            None
        };

        let report_paths = match &svg {
            Some(rendered) => OutputPaths {
                svg: rendered.clone(),
                ..paths
            },
            None => paths,
        };
        let markdown = self.write_markdown(design, options, &report_paths);

        let warnings = std::mem::take(&mut self.warnings);
        for w in &warnings {
            warn!("{w}");
        }

        Ok(BuildOutput {
            schematic: schematic_path,
            svg,
            markdown,
            warnings,
        })
    }

    fn place_components(
        &mut self,
        design: &Design,
        auto_layout: bool,
        pins_used: &HashMap<String, Vec<String>>,
    ) {
        let positions = resolve_positions(&design.components, auto_layout);
        for (reference, spec) in &design.components {
            let position = positions
                .get(reference)
                .copied()
                .unwrap_or(DEFAULT_POSITION);
            let component = NewComponent {
                lib_id: &spec.lib_id,
                reference,
                value: &spec.value,
                position,
                footprint: spec.footprint.as_deref(),
                pins: &spec.pins,
                pins_used: pins_used.get(reference).map(Vec::as_slice).unwrap_or_default(),
            };
            if let Err(e) = self.editor.add_component(&component) {
                self.warn(
                    Stage::Placement,
                    format!("{} ({})", reference, spec.lib_id),
                    e,
                );
            }
        }
    }

    /// Routes one connection: Manhattan with obstacle avoidance first, a
    /// straight wire if that fails.
    fn connect(&mut self, src: &str, dst: &str, pin_maps: &PinMaps) {
        let subject = format!("{src} -> {dst}");
        let (from, to) = match (resolve_pin_ref(src, pin_maps), resolve_pin_ref(dst, pin_maps)) {
            (Ok(from), Ok(to)) => (from, to),
            (Err(e), _) | (_, Err(e)) => {
                self.warn(Stage::Connection, subject, e);
                return;
            }
        };

        if let Err(e) = self
            .editor
            .route_pins(&from, &to, RoutingMode::Manhattan, true)
        {
            debug!("Routing {subject} failed ({e}), falling back to a direct wire");
            if let Err(e) = self.editor.wire_pins(&from, &to) {
                self.warn(Stage::Connection, subject, e);
            }
        }
    }

    /// One label at the first pin, then a wire between each adjacent pair.
    fn add_power_net(&mut self, net: &PowerNet, pin_maps: &PinMaps) {
        let Some(first) = net.pins.first() else {
            return;
        };

        let label = resolve_pin_ref(first, pin_maps).and_then(|pin| {
            let pos = self.editor.pin_position(&pin.reference, &pin.number)?;
            self.editor
                .add_label(&net.net, pos + DVec2::new(GRID_SPACING, 0.0))
        });
        if let Err(e) = label {
            self.warn(Stage::Label, format!("{} at {}", net.net, first), e);
        }

        for pair in net.pins.windows(2) {
            let (src, dst) = (&pair[0], &pair[1]);
            let joined = resolve_pin_ref(src, pin_maps)
                .and_then(|from| Ok((from, resolve_pin_ref(dst, pin_maps)?)))
                .and_then(|(from, to)| self.editor.wire_pins(&from, &to));
            if let Err(e) = joined {
                self.warn(Stage::PowerNet, format!("{}: {src} -> {dst}", net.net), e);
            }
        }
    }

    async fn render(&mut self, schematic: &Path, timeout: Duration) -> Option<PathBuf> {
        let renderer = self.renderer.clone().with_timeout(timeout);
        match renderer.export_svg(schematic).await {
            Ok(svg) => {
                info!("Rendered: {}", svg.display());
                Some(svg)
            }
            Err(e) => {
                self.warn(Stage::Render, schematic.display().to_string(), e);
                None
            }
        }
    }

    fn write_markdown(
        &mut self,
        design: &Design,
        options: &BuildOptions,
        paths: &OutputPaths,
    ) -> Option<PathBuf> {
        let title = options.title.as_deref().or(design.title.as_deref());
        let written = connection_report(design, title, paths, &self.classifier)
            .map_err(Error::from)
            .and_then(|content| write_report(paths, &content));
        match written {
            Ok(path) => {
                info!("Documentation: {}", path.display());
                Some(path)
            }
            Err(e) => {
                self.warn(Stage::Report, paths.markdown.display().to_string(), e);
                None
            }
        }
    }
}
