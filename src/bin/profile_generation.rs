//! Profiling tool: times full runs and individual iterations at growing grid sizes

use std::error::Error;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use diamond_square::engine::DiamondSquare;
use diamond_square::params::DiamondSquareParams;

const SEED: u64 = 1337;
const MAX_PROFILED_ITERATIONS: u32 = 12;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("=== Diamond-Square Profiling ===");
    println!();

    for iterations in 4..=MAX_PROFILED_ITERATIONS {
        let params = DiamondSquareParams::builder().iteration_count(iterations).build();
        let mut engine = DiamondSquare::new(params, SEED)?;
        let cells = engine.resolution() * engine.resolution();

        // Step through so each iteration gets its own timing
        let mut per_iteration: Vec<Duration> = Vec::new();
        let total_start = Instant::now();
        loop {
            let start = Instant::now();
            if !engine.advance() {
                break;
            }
            per_iteration.push(start.elapsed());
            if !engine.is_in_progress() {
                break;
            }
        }
        let generate_time = total_start.elapsed();

        let start = Instant::now();
        let heights = engine.heights();
        let normalize_time = start.elapsed();

        println!(
            "n={:>2}  {:>5}x{:<5} ({:>9} cells)  generate {:>10.2?}  normalize {:>10.2?}",
            iterations,
            engine.resolution(),
            engine.resolution(),
            cells,
            generate_time,
            normalize_time,
        );

        if let Some(slowest) = per_iteration.last() {
            let share = 100.0 * slowest.as_secs_f64() / generate_time.as_secs_f64().max(f64::EPSILON);
            println!("       last iteration {:>10.2?} ({:.1}% of run)", slowest, share);
        }

        debug_assert_eq!(heights.width, engine.resolution());
    }

    Ok(())
}
