use self::{
    args::{ToolArgs, ToolSubcommand},
    util::from_eyre,
};
use clap::Parser;
use dossier_config::Configuration;

mod args;
mod request;
mod sign;
mod util;
mod verify;

async fn load_configuration(args: &ToolArgs) -> miette::Result<Configuration> {
    let config = match args.config {
        Some(ref path) => Configuration::load(path).await,
        None => Configuration::from_env(),
    };

    config.map_err(from_eyre)
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    miette::set_panic_hook();
    dotenvy::dotenv().ok();

    let args = ToolArgs::parse();
    let config = load_configuration(&args).await?;
    dossier_observability::initialise_logging(&config.logging).map_err(from_eyre)?;

    match args.subcommand {
        ToolSubcommand::Sign(args) => sign::do_it(&config.api, args),
        ToolSubcommand::Verify(args) => verify::do_it(&config.api, args),
        ToolSubcommand::Request(args) => request::do_it(&config.api, args).await,
    }
}
