//! SVG writing operations.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};
use curvegeom::{Rect, Shape};

/// Page layout for a rendered shape.
#[derive(Clone, Copy, Debug)]
pub struct SvgOptions {
    /// Pixels per shape unit.
    pub scale:  f64,
    /// Blank border around the shape, in pixels.
    pub margin: f64,
}

impl Default for SvgOptions {
    fn default() -> Self { Self { scale: 100.0, margin: 10.0 } }
}

pub(crate) struct SvgWriter {
    writer: BufWriter<File>
}

/// String-based SVG writer for in-memory output
pub(crate) struct SvgStringWriter {
    buffer: Vec<u8>
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl Write for SvgWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.writer.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.writer.flush() }
}

impl Write for SvgStringWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
}

impl SvgStringWriter {
    pub(crate) fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub(crate) fn into_string(self) -> Result<String> {
        String::from_utf8(self.buffer)
            .context("[io::svg] SVG output is not valid UTF-8")
    }
}

impl SvgWriter {
    /// Create a new SVG writer to a file path
    pub(crate) fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("[io::svg] Failed to create {}", path.display()))?;

        Ok(Self { writer: BufWriter::new(file) })
    }

    pub(crate) fn finish(mut self) -> Result<()> {
        self.writer.flush().context("[io::svg] Failed to flush SVG output")
    }
}

/// Write a complete SVG document showing `shape` filled under the nonzero
/// rule.  Shape space is y-up, so the drawing is flipped vertically.
pub(crate) fn write_shape_svg<W: Write>(writer: &mut W, shape: &Shape, options: SvgOptions) -> Result<()> {
    let bounds = shape.bounds().unwrap_or_else(|| Rect::new((0.0, 0.0), (0.0, 0.0)));
    let SvgOptions { scale, margin } = options;
    let width = bounds.width() * scale + 2.0 * margin;
    let height = bounds.height() * scale + 2.0 * margin;

    write_svg_header(writer, width, height, &bounds)?;
    write_svg_styles(writer)?;
    writeln!(
        writer,
        r##"<g transform="translate({tx} {ty}) scale({scale} {neg_scale})">"##,
        tx = margin - bounds.min().x * scale,
        ty = margin + bounds.max().y * scale,
        neg_scale = -scale,
    )?;
    if !shape.is_empty() {
        writeln!(writer, r##"<path class="shape" d="{}"/>"##, shape.to_svg_path_data())?;
    }
    writeln!(writer, "</g>")?;
    write_svg_footer(writer)
}

fn write_svg_header<W: Write>(writer: &mut W, width: f64, height: f64, bounds: &Rect<f64>) -> Result<()> {
    writeln!(writer, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(writer, r##"<svg xmlns="http://www.w3.org/2000/svg"
        width="{width}" height="{height}"
        viewBox="0 0 {width} {height}"
        data-x-min="{x_min}" data-x-max="{x_max}"
        data-y-min="{y_min}" data-y-max="{y_max}">"##,
        x_min = bounds.min().x,
        x_max = bounds.max().x,
        y_min = bounds.min().y,
        y_max = bounds.max().y,
    )?;
    writeln!(writer, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    Ok(())
}

fn write_svg_styles<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, r##"<defs>
<style>
    .shape {{ fill: #e5e7eb; fill-rule: nonzero; stroke: #111827; stroke-width: 1; vector-effect: non-scaling-stroke; }}
</style>
</defs>"##)?;
    Ok(())
}

fn write_svg_footer<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "</svg>")?;
    Ok(())
}
