mod cli;
mod editor;
mod paths;
mod run;
mod store;

use anyhow::Result;

fn main() -> Result<()> {
    let args = cli::parse();
    run::run(args)
}
