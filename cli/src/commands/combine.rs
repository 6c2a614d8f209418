use anyhow::Result;
use cagraph::{intersection_non_zero, simplify_non_zero, union_non_zero, xor_non_zero, BinaryOp};

use crate::cli::{Cli, CombineArgs, DifferenceArgs, SimplifyArgs};
use crate::commands::{read_inputs, write_output};

pub fn union(cli: &Cli, args: &CombineArgs) -> Result<()> {
    let shapes = read_inputs(cli, "union", &args.inputs)?;
    write_output(cli, "union", &args.output, &union_non_zero(&shapes))
}

pub fn intersection(cli: &Cli, args: &CombineArgs) -> Result<()> {
    let shapes = read_inputs(cli, "intersection", &args.inputs)?;
    write_output(cli, "intersection", &args.output, &intersection_non_zero(&shapes))
}

pub fn xor(cli: &Cli, args: &CombineArgs) -> Result<()> {
    let shapes = read_inputs(cli, "xor", &args.inputs)?;
    write_output(cli, "xor", &args.output, &xor_non_zero(&shapes))
}

pub fn difference(cli: &Cli, args: &DifferenceArgs) -> Result<()> {
    let shapes = read_inputs(cli, "difference", &[&args.minuend, &args.subtrahend])?;
    let result = BinaryOp::Difference.apply(&shapes[0], &shapes[1]);
    write_output(cli, "difference", &args.output, &result)
}

pub fn simplify(cli: &Cli, args: &SimplifyArgs) -> Result<()> {
    let shapes = read_inputs(cli, "simplify", std::slice::from_ref(&args.input))?;
    write_output(cli, "simplify", &args.output, &simplify_non_zero(&shapes[0]))
}
