pub(crate) mod clip;
pub(crate) mod combine;

use std::path::Path;

use anyhow::Result;
use cagraph::{read_shape, write_shape, write_svg, Shape, SvgOptions};

use crate::cli::{Cli, OutputArgs};

pub(crate) fn read_inputs(cli: &Cli, stage: &str, paths: &[impl AsRef<Path>]) -> Result<Vec<Shape>> {
    paths.iter()
        .map(|path| {
            let path = path.as_ref();
            if cli.verbose > 1 { eprintln!("[{stage}] reading {}", path.display()); }
            read_shape(path)
        })
        .collect()
}

pub(crate) fn write_output(cli: &Cli, stage: &str, output: &OutputArgs, shape: &Shape) -> Result<()> {
    if cli.verbose > 0 {
        eprintln!(
            "[{stage}] {} subpath(s), area {:.6} -> {}",
            shape.subpaths.len(),
            shape.signed_area(),
            output.output.display()
        );
    }
    if output.svg {
        write_svg(&output.output, shape, SvgOptions::default())
    } else {
        write_shape(&output.output, shape)
    }
}
