mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{clip, combine};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    match &cli.command {
        Commands::Union(args) => combine::union(&cli, args),
        Commands::Intersection(args) => combine::intersection(&cli, args),
        Commands::Difference(args) => combine::difference(&cli, args),
        Commands::Xor(args) => combine::xor(&cli, args),
        Commands::Simplify(args) => combine::simplify(&cli, args),
        Commands::Clip(args) => clip::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
