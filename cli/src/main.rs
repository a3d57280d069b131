mod commands;
mod terminal;

use commands::{CommandLine, Commands, connect, discover, interfaces};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);
    let cfg = commands.config()?;
    print::banner(cfg.quiet);

    match commands.command {
        Commands::Discover => {
            print::header("getting ready for discovery", cfg.quiet);
            discover::discover(cfg).await
        }
        Commands::Connect { address } => connect::connect(address, cfg).await,
        Commands::Interfaces => interfaces::interfaces(&cfg),
    }
}
