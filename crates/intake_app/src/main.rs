mod app;
mod cli;
mod config;
mod effects;
mod render;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    let loaded = config::load(&args.config)?;
    intake_logging::initialize(args.log.into(), loaded.config.level()?);
    for note in &loaded.notes {
        note.log();
    }

    app::run_app(&args, &loaded.config)
}
