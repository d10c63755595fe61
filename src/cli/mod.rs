pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "portfolio-api")]
#[command(about = "Portfolio CMS backend API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on; overrides PORTFOLIO_API_PORT/PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,

    #[command(about = "Insert the core user and role permissions if missing")]
    SeedPermissions,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Migrate => commands::database::migrate().await,
        Commands::SeedPermissions => commands::database::seed_permissions().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["portfolio-api"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_accepts_port() {
        let cli = Cli::try_parse_from(["portfolio-api", "serve", "--port", "8081"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(8081) })));
    }

    #[test]
    fn seed_permissions_is_kebab_case() {
        let cli = Cli::try_parse_from(["portfolio-api", "seed-permissions"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::SeedPermissions)));
    }
}
