//! culler CLI entry point.

mod cli;
mod ec2;
mod logging;
mod output;

use std::sync::Arc;

use clap::Parser;

use culler_core::app::PostProcessorBuilder;

use crate::cli::{Cli, CliError};
use crate::ec2::Ec2CatalogFactory;
use crate::output::StdoutProgress;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref(), cli.log_format);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.resolve_config()?;

    let processor = PostProcessorBuilder::from_config(&config)
        .factory(Arc::new(Ec2CatalogFactory))
        .progress(Arc::new(StdoutProgress))
        .dry_run(cli.dry_run)
        .build()?;

    // スタンドアロン実行では後処理する artifact がない
    let processed = processor
        .post_process(())
        .await
        .map_err(|failure| failure.error)?;
    output::print_report(&processed.report, cli.output)?;
    Ok(())
}
