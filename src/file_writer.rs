use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Output directory used for bare filenames, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "KiCad";

/// The sibling files one build can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub schematic: PathBuf,
    pub svg: PathBuf,
    pub markdown: PathBuf,
}

impl OutputPaths {
    pub fn for_schematic(schematic: &Path) -> Self {
        OutputPaths {
            schematic: schematic.to_path_buf(),
            svg: schematic.with_extension("svg"),
            markdown: schematic.with_extension("md"),
        }
    }

    /// Directory the schematic lives in (`.` for a bare relative name).
    pub fn dir(&self) -> &Path {
        match self.schematic.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    pub fn stem(&self) -> String {
        self.schematic
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Puts a bare filename under `output_dir` (or [`DEFAULT_OUTPUT_DIR`]);
/// filenames that already carry a directory are used as-is. Creates the
/// parent directory when it is missing.
pub fn resolve_output_path(filename: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let has_dir = filename
        .parent()
        .is_some_and(|p| !p.as_os_str().is_empty());

    let output_path = if has_dir {
        filename.to_path_buf()
    } else {
        output_dir
            .unwrap_or(Path::new(DEFAULT_OUTPUT_DIR))
            .join(filename)
    };

    if let Some(dir) = output_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
            info!("Created directory: {}", dir.display());
        }
    }

    Ok(output_path)
}

/// Writes the markdown report next to the schematic.
pub fn write_report(paths: &OutputPaths, content: &str) -> Result<PathBuf> {
    fs::write(&paths.markdown, content)?;
    Ok(paths.markdown.clone())
}

/// Finds the SVG the renderer wrote. Some kicad-cli versions treat the
/// `-o` argument as a directory to create and nest `<stem>.svg/<stem>.svg`
/// inside it; that file is moved up to `<dir>/<stem>.svg`.
pub fn settle_render_output(paths: &OutputPaths) -> Result<PathBuf> {
    let stem = paths.stem();
    let nested = paths.svg.join(format!("{stem}.svg"));

    if nested.is_file() {
        let staged = paths.dir().join(format!("{stem}.svg.part"));
        fs::rename(&nested, &staged)?;
        if let Err(e) = fs::remove_dir(&paths.svg) {
            // Something else lives in the directory; leave it and keep the staged file.
            warn!(
                "Could not remove {} ({}), render left at {}",
                paths.svg.display(),
                e,
                staged.display()
            );
            return Ok(staged);
        }
        fs::rename(&staged, &paths.svg)?;
        debug!("Moved nested render output to {}", paths.svg.display());
    }

    if paths.svg.is_file() {
        Ok(paths.svg.clone())
    } else {
        Err(Error::MissingRenderOutput(paths.svg.clone()))
    }
}
