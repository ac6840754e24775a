mod commands;
mod report;
mod terminal;

use commands::{CommandLine, Commands, me, network, services, web};
use selfcheck_common::config::Config;
use selfcheck_common::warn;
use terminal::{print, spinner};

/// Conventional exit status after SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg: Config = commands.config();

    spinner::init_logging();
    print::banner(cfg.no_banner, cfg.quiet);

    tokio::select! {
        outcome = dispatch(commands.command, &cfg) => {
            outcome?;
            if cfg.quiet == 0 {
                print::end_of_program();
            }
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Stopped by user");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    }
}

async fn dispatch(command: Commands, cfg: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Me => me::me(cfg).await,
        Commands::Network => network::network(cfg).await,
        Commands::Services => services::services(cfg).await,
        Commands::Web { host } => web::web(host, cfg).await,
        Commands::All => {
            me::me(cfg).await?;
            network::network(cfg).await?;
            services::services(cfg).await
        }
    }
}
