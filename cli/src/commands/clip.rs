use anyhow::Result;
use cagraph::{clip_shape, ClipOptions};

use crate::cli::{ClipArgs, Cli};
use crate::commands::{read_inputs, write_output};

pub fn run(cli: &Cli, args: &ClipArgs) -> Result<()> {
    let shapes = read_inputs(cli, "clip", &[&args.clip, &args.input])?;
    let options = ClipOptions {
        include_exterior: args.include_exterior,
        include_boundary: !args.exclude_boundary,
        include_interior: !args.exclude_interior,
    };
    if cli.verbose > 0 { eprintln!("[clip] {options:?}"); }

    write_output(cli, "clip", &args.output, &clip_shape(&shapes[0], &shapes[1], options))
}
