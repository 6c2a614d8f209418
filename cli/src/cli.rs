use std::path::PathBuf;

/// Boolean operations on shape files
#[derive(clap::Parser, Debug)]
#[command(name = "cagraph", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Area covered by any input
    Union(CombineArgs),

    /// Area covered by every input
    Intersection(CombineArgs),

    /// Area of the first input not covered by the second
    Difference(DifferenceArgs),

    /// Area covered by an odd number of inputs
    Xor(CombineArgs),

    /// Resolve overlaps and self-intersections of one shape (nonzero rule)
    Simplify(SimplifyArgs),

    /// Cut a shape's outline against a clip region
    Clip(ClipArgs),
}

#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Output file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// Write SVG instead of shape JSON
    #[arg(long)]
    pub svg: bool,
}

#[derive(clap::Args, Debug)]
pub struct CombineArgs {
    /// Input shape JSON files
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug)]
pub struct DifferenceArgs {
    /// Shape to subtract from
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub minuend: PathBuf,

    /// Shape to subtract
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub subtrahend: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug)]
pub struct SimplifyArgs {
    /// Input shape JSON file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug)]
pub struct ClipArgs {
    /// Clip region (filled, nonzero rule)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub clip: PathBuf,

    /// Shape whose outline is clipped
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Keep the parts outside the clip region
    #[arg(long)]
    pub include_exterior: bool,

    /// Drop the parts running along the clip region's boundary
    #[arg(long)]
    pub exclude_boundary: bool,

    /// Drop the parts inside the clip region
    #[arg(long)]
    pub exclude_interior: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}
