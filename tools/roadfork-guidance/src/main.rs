use anyhow::Result;
use clap::Parser;

use roadfork_guidance::cli::{run, Cli};

fn main() -> Result<()> {
    env_logger::init();
    run(Cli::parse())
}
