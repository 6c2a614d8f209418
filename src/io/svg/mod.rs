//! SVG export for inspecting results.

mod writer;

use std::path::Path;

use anyhow::Result;
use curvegeom::Shape;

pub use writer::SvgOptions;
use writer::{write_shape_svg, SvgStringWriter, SvgWriter};

/// Render `shape` to an SVG file.
pub fn write_svg(path: &Path, shape: &Shape, options: SvgOptions) -> Result<()> {
    let mut writer = SvgWriter::new(path)?;
    write_shape_svg(&mut writer, shape, options)?;
    writer.finish()
}

/// Render `shape` to an SVG document in memory.
pub fn svg_string(shape: &Shape, options: SvgOptions) -> Result<String> {
    let mut writer = SvgStringWriter::new();
    write_shape_svg(&mut writer, shape, options)?;
    writer.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_contains_flipped_path() {
        let svg = svg_string(&Shape::rectangle(0.0, 0.0, 2.0, 1.0), SvgOptions { scale: 10.0, margin: 5.0 })
            .expect("render");
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"width="30" height="20""#));
        assert!(svg.contains("scale(10 -10)"));
        assert!(svg.contains(r#"d="M 0 0 L 2 0 L 2 1 L 0 1 L 0 0 Z""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn empty_shape_renders_blank_page() {
        let svg = svg_string(&Shape::empty(), SvgOptions::default()).expect("render");
        assert!(!svg.contains("<path"));
    }
}
