use clap::{Parser, Subcommand};
use colored::Colorize;

use shortgate::config::{StaticConfig, get_config, init_config};
use shortgate::runtime;
use shortgate::system::init_logging;

#[derive(Parser)]
#[command(name = "shortgate", version, about = "Short links with gates and analytics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Print a sample config.toml and exit
    GenerateConfig,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::GenerateConfig => {
            println!("{}", StaticConfig::generate_sample_config());
            Ok(())
        }
        Commands::Serve => {
            init_config();
            let config = get_config();

            // guard 必须存活到进程结束，否则日志丢失
            let _guard = init_logging(&config.logging);

            eprintln!(
                "{} {}",
                "shortgate".cyan().bold(),
                env!("CARGO_PKG_VERSION")
            );

            runtime::run_server().await
        }
    }
}
