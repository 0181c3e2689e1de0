use std::time::Instant;

use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};

use ant_colony::layers::{city::City, error::Error};
use ant_colony::opt::{aco::AcoConfig, simulation::Simulation};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the ant colony headless", long_about = None)]
struct Args {
    /// JSON file with a list of {"x": .., "y": ..} cities
    #[arg(long, conflicts_with = "random")]
    cities_path: Option<String>,

    /// Generate this many cities uniformly on the canvas instead
    #[arg(long)]
    random: Option<usize>,

    #[arg(long, default_value_t = 600.0)]
    width: f64,

    #[arg(long, default_value_t = 400.0)]
    height: f64,

    #[arg(long, default_value_t = 100)]
    iterations: usize,

    #[arg(long, default_value_t = 10)]
    num_ants: usize,

    #[arg(long, default_value_t = 0.5)]
    evaporation_rate: f64,

    #[arg(long)]
    seed: Option<u64>,

    /// Write the final snapshot as JSON
    #[arg(long)]
    output_path: Option<String>,
}

fn load_cities(args: &Args) -> Result<Vec<City>, Error> {
    if let Some(path) = &args.cities_path {
        log::info!("Reading cities from path: {}", path);
        let file = std::fs::File::open(path)?;
        let cities: Vec<City> = serde_json::from_reader(std::io::BufReader::new(file))?;
        return Ok(cities);
    }

    if !(args.width > 0.0 && args.height > 0.0) {
        return Err(Error::InvalidConfig(format!(
            "canvas must be non-empty, got {}x{}",
            args.width, args.height
        )));
    }
    let count = args.random.unwrap_or(20);
    log::info!(
        "Generating {} cities on a {}x{} canvas",
        count,
        args.width,
        args.height
    );
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..count)
        .map(|_| City::new(rng.gen_range(0.0..args.width), rng.gen_range(0.0..args.height)))
        .collect()
}

fn run(args: Args) -> Result<(), Error> {
    let params = AcoConfig {
        num_ants: args.num_ants,
        evaporation_rate: args.evaporation_rate,
        seed: args.seed,
        ..AcoConfig::default()
    };
    params.print_stats();

    let cities = load_cities(&args)?;
    City::print_stats(&cities);

    let mut sim = Simulation::new(params)?;
    for city in cities {
        sim.add_city(city)?;
    }
    sim.start()?;

    log::info!("Running ACO for {} iterations", args.iterations);
    let start = Instant::now();
    let mut best = f64::INFINITY;
    let mut last = sim.snapshot();
    for _ in 0..args.iterations {
        let Some(snapshot) = sim.step() else {
            break;
        };
        if let Some(tour) = &snapshot.best_tour {
            if tour.distance < best {
                best = tour.distance;
                log::info!(
                    "Iteration {}: new best {:.3}",
                    snapshot.iteration,
                    tour.distance
                );
            }
        }
        last = snapshot;
    }
    log::info!(
        "Finished {} iterations in {}ms",
        last.iteration,
        start.elapsed().as_millis()
    );

    match &last.best_tour {
        Some(tour) => {
            // 1-based, like the canvas labels
            let labels: Vec<String> = tour.tour.iter().map(|i| (i + 1).to_string()).collect();
            println!("Best tour: {}", labels.join(" -> "));
            println!("Best distance: {:.3}", tour.distance);
        }
        None => println!("No tour found"),
    }

    if let Some(path) = &args.output_path {
        log::info!("Writing snapshot to {}", path);
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &last)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
