use anyhow::Context;
use aq_dataset::cli::{run, Cli};
use aq_dataset::settings::Settings;
use aq_dataset::utils::init_logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    init_logging(&settings.log_level, cli.verbose);

    run(cli, settings).context("data preparation failed")
}
