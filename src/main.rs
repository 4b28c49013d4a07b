//! Genetic Wheels CLI - run the optimizer from a JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use genetic_wheels::{
    evolve::GenerationLoop,
    metrics::{JsonlMetrics, LogMetrics, MetricsSink},
    physics::RapierWorld,
    schema::Config,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [generations] [metrics.jsonl]", args[0]);
        eprintln!();
        eprintln!("Evolve polygon wheels rolling down an inclined plane.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json    Path to run configuration file");
        eprintln!("  generations    Stop after this many generations (default: run until Ctrl-C)");
        eprintln!("  metrics.jsonl  Write per-generation scalars to this file instead of the log");
        eprintln!();
        eprintln!("An example configuration is printed with --example.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let generations: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(u64::MAX);

    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: Config = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    }

    let mut metrics: Box<dyn MetricsSink> = match args.get(3) {
        Some(path) => Box::new(JsonlMetrics::create(path).unwrap_or_else(|e| {
            eprintln!("Error creating metrics file: {}", e);
            std::process::exit(1);
        })),
        None => Box::new(LogMetrics),
    };

    println!("Genetic Wheels");
    println!("==============");
    println!("Population: {} wheels", config.optimizer.n_wheels);
    println!("Episode cap: {} steps", config.optimizer.n_max_iterations);
    println!(
        "Mutation: p={} rho={}",
        config.optimizer.mutation_probability, config.optimizer.mutation_rate
    );
    println!();

    let world = RapierWorld::new(
        (config.env.gravity.x, config.env.gravity.y),
        config.sim.time_step,
    );

    let mut driver = GenerationLoop::new(world, &config).unwrap_or_else(|e| {
        eprintln!("Error building simulation: {}", e);
        std::process::exit(1);
    });

    // Ctrl-C finishes the in-progress generation, then stops; a second
    // Ctrl-C aborts the process the usual way.
    let cancel = driver.cancel_handle();
    ctrlc::set_handler(move || {
        if cancel.swap(true, Ordering::Relaxed) {
            std::process::exit(130);
        }
        eprintln!("stopping after the current generation (Ctrl-C again to abort)");
    })
    .unwrap_or_else(|e| {
        eprintln!("Error installing signal handler: {}", e);
        std::process::exit(1);
    });

    match driver.run_generations(&mut metrics, generations) {
        Ok(completed) => println!("Done: {} generations completed", completed),
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_example_config() {
    let config = Config::default();
    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
