mod commands;
mod terminal;

use commands::{CommandLine, Commands, dns, full, ports, subs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();

    terminal::logging::init(cli.verbose);

    match cli.command {
        Commands::Dns { domain } => dns::run(&domain).await,
        Commands::Ports {
            address,
            ports,
            timeout_ms,
        } => ports::run(address, ports, timeout_ms).await,
        Commands::Subs { domain, wordlist } => subs::run(&domain, wordlist).await,
        Commands::Full {
            domain,
            wordlist,
            output,
        } => full::run(&domain, wordlist, output).await,
    }
}
