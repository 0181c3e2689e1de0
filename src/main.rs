use std::time::Duration;

use clap::Parser;

use ant_colony::opt::aco::AcoConfig;
use ant_colony::server::server::start_server;

#[derive(Parser, Debug)]
#[command(author, version, about = "Live ant colony optimization over user placed cities", long_about = None)]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    #[arg(long, default_value_t = 10)]
    num_ants: usize,

    #[arg(long, default_value_t = 0.5)]
    evaporation_rate: f64,

    /// Milliseconds between iterations
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,

    #[arg(long)]
    seed: Option<u64>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let params = AcoConfig {
        num_ants: args.num_ants,
        evaporation_rate: args.evaporation_rate,
        seed: args.seed,
        ..AcoConfig::default()
    };

    start_server(
        &args.host,
        args.port,
        params,
        Duration::from_millis(args.tick_ms),
    )
    .await
}
