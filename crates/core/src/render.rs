use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::config::RenderOptions;
use crate::document::SvgDocument;
use crate::error::{Error, LayoutError, Result};
use crate::layout::LayoutEngine;
use crate::model::DrawableModel;
use crate::svg;

/// Lays out a styled model and turns it into an [`SvgDocument`].
///
/// The SVG passes through a uniquely named temporary file that is removed
/// when the render returns, whether it succeeded or not.
#[derive(Clone)]
pub struct PlanarRenderer {
    engine: Arc<dyn LayoutEngine + Send + Sync>,
    options: RenderOptions,
}

impl PlanarRenderer {
    pub fn new(engine: Arc<dyn LayoutEngine + Send + Sync>, options: RenderOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn render(&self, model: &DrawableModel) -> Result<SvgDocument> {
        let mut artifact = temp_artifact(self.options.temp_dir.as_deref())?;
        log::debug!("rendering {} residues via {}", model.len(), artifact.path().display());

        let positions = self.engine.compute_layout(&model.pairs(), model.nicks())?;
        if positions.len() != model.len() {
            return Err(LayoutError::PositionCount {
                expected: model.len(),
                got: positions.len(),
            }
            .into());
        }

        let path = artifact.path().to_path_buf();
        let file = artifact.as_file_mut();
        svg::write_model(&mut *file, model, &positions, &self.options)
            .and_then(|()| file.flush())
            .map_err(|e| write_error(e, &path))?;

        SvgDocument::from_file(artifact.path())
        // `artifact` drops here and unlinks the file
    }
}

fn temp_artifact(dir: Option<&Path>) -> Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("ssviz-").suffix(".svg");
    let created = match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    };
    created.map_err(|e| {
        let dir = dir.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        write_error(e, &dir)
    })
}

fn write_error(e: io::Error, path: &Path) -> Error {
    match e.kind() {
        io::ErrorKind::PermissionDenied => Error::WriteForbidden {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    }
}
