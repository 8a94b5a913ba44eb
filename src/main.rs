use std::error::Error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use diamond_square::engine::DiamondSquare;
use diamond_square::export;
use diamond_square::params::{DiamondSquareParams, DiamondSquareParamsBuilder, TerrainPreset};
use diamond_square::tilemap::Tilemap;

#[derive(Parser, Debug)]
#[command(name = "diamond_square")]
#[command(about = "Generate fractal heightmaps with the diamond-square algorithm")]
struct Args {
    /// Terrain preset used for any parameter not given explicitly
    #[arg(long, value_enum, default_value_t = TerrainPreset::Rolling)]
    preset: TerrainPreset,

    /// Number of subdivision iterations (grid side = 2^n + 1)
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Corner elevations: top-left,top-right,bottom-left,bottom-right
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    seeds: Option<Vec<f32>>,

    /// Initial random offset amplitude
    #[arg(long)]
    variation: Option<f32>,

    /// Variation decays by 2^-smoothness each iteration
    #[arg(long)]
    smoothness: Option<f32>,

    /// Elevation assumed beyond the map edges
    #[arg(long, allow_negative_numbers = true)]
    outside_height: Option<f32>,

    /// Multiplier applied to the normalized output
    #[arg(long)]
    height_scaling: Option<f32>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the final heightmap to this PNG
    #[arg(short, long)]
    output: Option<String>,

    /// Use a spectral colormap instead of grayscale
    #[arg(long)]
    spectral: bool,

    /// Write one PNG per iteration as `<prefix>_<iteration>.png`
    #[arg(long)]
    progressive: Option<String>,

    /// Print an ASCII preview of the result
    #[arg(long)]
    ascii: bool,

    /// Maximum columns for the ASCII preview
    #[arg(long, default_value = "96")]
    ascii_width: usize,
}

impl Args {
    fn params(&self) -> DiamondSquareParams {
        let mut builder = DiamondSquareParamsBuilder::from_preset(self.preset);
        if let Some(n) = self.iterations {
            builder = builder.iteration_count(n);
        }
        if let Some(ref seeds) = self.seeds {
            builder = builder.seeds(seeds.clone());
        }
        if let Some(v) = self.variation {
            builder = builder.variation(v);
        }
        if let Some(s) = self.smoothness {
            builder = builder.smoothness(s);
        }
        if let Some(h) = self.outside_height {
            builder = builder.outside_height(h);
        }
        if let Some(k) = self.height_scaling {
            builder = builder.height_scaling(k);
        }
        builder.build()
    }
}

fn write_png(map: &Tilemap<f32>, scale: f32, spectral: bool, path: &str) -> Result<(), image::ImageError> {
    if spectral {
        export::export_heightmap_spectral(map, scale, path)
    } else {
        export::export_heightmap(map, scale, path)
    }
}

fn print_stats(label: &str, map: &Tilemap<f32>) {
    let stats = map.stats();
    println!(
        "{}: {}x{}  min {:.3}  max {:.3}  mean {:.3}",
        label, map.width, map.height, stats.min, stats.max, stats.mean
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let params = args.params();

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Generating heightmap with seed: {}", seed);
    println!("Preset: {} ({})", args.preset, args.preset.description());

    let mut engine = DiamondSquare::new(params, seed)?;
    let scale = engine.params().height_scaling;
    println!(
        "Resolution: {}x{} ({} iterations)",
        engine.resolution(),
        engine.resolution(),
        engine.params().iteration_count
    );

    if let Some(ref prefix) = args.progressive {
        // Drive the engine one iteration at a time and snapshot each level
        while engine.advance() {
            let preview = engine.intermediate_heights();
            let label = format!("Iteration {}", engine.current_iteration());
            print_stats(&label, &preview);

            let path = format!("{}_{}.png", prefix, engine.current_iteration());
            write_png(&preview, scale, args.spectral, &path)?;
            tracing::info!(path = %path, "Wrote intermediate heightmap");

            if !engine.is_in_progress() {
                break;
            }
        }
    } else {
        engine.generate();
    }

    let heights = engine.heights();
    print_stats("Final", &heights);
    let range = engine.height_range();
    if range.is_degenerate() {
        println!("Raw range is flat; output is all zero");
    } else {
        println!("Raw range: {:.3} to {:.3}", range.min, range.max);
    }

    if let Some(ref path) = args.output {
        write_png(&heights, scale, args.spectral, path)?;
        println!("Exported heightmap to: {}", path);
    }

    if args.ascii {
        print!("{}", export::render_ascii(&heights, scale, args.ascii_width));
        print!("{}", export::height_legend());
    }

    Ok(())
}
