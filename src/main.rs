//! Despensa CLI — recipes in, shopping lists out.

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "despensa",
    version,
    about = "Recipe and meal-event planner — aggregated shopping lists from scaled recipes"
)]
struct Cli {
    #[command(subcommand)]
    command: despensa::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> despensa::error::Result<()> {
    let settings = despensa::config::Settings::load()?;

    let filter = EnvFilter::try_new(&settings.logging_level)
        .unwrap_or_else(|_| EnvFilter::new(despensa::config::DEFAULT_LOGGING_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut conn = despensa::store::open(&settings)?;
    despensa::store::schema::create_tables(&conn)?;
    despensa::cli::dispatch(cli.command, &mut conn)
}
