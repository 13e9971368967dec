use anyhow::Result;
use clap::Parser;
use console::style;
use log::{error, info};
use vdjedit_creator::cli::Cli;
use vdjedit_creator::component::VdjEditCreator;
use vdjedit_creator::config::Config;
use vdjedit_creator::init;
use vdjedit_creator::signal::setup_shutdown_signal;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init::init(cli.verbose);
    let shutdown_signal = setup_shutdown_signal()?;

    let mut config = Config::new()?;
    cli.apply_to(&mut config.settings);
    let options = cli.run_options()?;

    let creator = VdjEditCreator::new(config, options, shutdown_signal);
    match creator.run() {
        Ok(summary) => info!("結束: {summary:?}"),
        Err(e) => {
            error!("執行失敗: {e:#}");
            eprintln!("{} {e:#}", style("Error:").red().bold());
        }
    }

    Ok(())
}
