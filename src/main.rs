use clap::Parser;

use feedloop::commands::{self, Cli};
use feedloop::{App, Config};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    feedloop::logging::init("info");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("expected a config file like: {{\"db_url\": \"sqlite://feedloop.db\"}}");
            std::process::exit(1);
        }
    };

    let mut app = match App::new(config).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = commands::dispatch(&mut app, cli.command).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
