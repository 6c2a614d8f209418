//! Shape files: one [`Shape`] per JSON document.

use std::{fs::File, io::{BufReader, BufWriter, Write}, path::Path};

use anyhow::{Context, Result};
use curvegeom::Shape;

/// Read a shape from a JSON file.
pub fn read_shape(path: &Path) -> Result<Shape> {
    let file = File::open(path)
        .with_context(|| format!("[io::json] Failed to open shape file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("[io::json] Failed to parse shape from {}", path.display()))
}

/// Write a shape to a JSON file (pretty-printed).
pub fn write_shape(path: &Path, shape: &Shape) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::json] Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, shape)
        .with_context(|| format!("[io::json] Failed to write shape to {}", path.display()))?;
    writeln!(writer)?;
    writer.flush().with_context(|| format!("[io::json] Failed to flush {}", path.display()))
}
