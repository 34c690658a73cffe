//! LSB Steganalysis CLI
//!
//! Command-line interface for demonstrating the detectors and the oracle
//! attack on synthetic images. Decoding image files is left to other tools.

use clap::{Args, Parser, Subcommand, ValueEnum};
use lsb_steganalysis::{
    attack::OracleAttack,
    config::{AnalysisConfig, ConfigError},
    image::{ImageSource, RgbImage, SyntheticConfig, SyntheticSource},
    metrics::MetricsRegistry,
    pov::{SampleMode, Sweep},
    report::{AnalysisReport, AttackSummary},
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write a TOML report to this path.
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Print Prometheus metrics after the run.
    #[arg(long, global = true, default_value_t = false)]
    metrics: bool,

    #[command(flatten)]
    image: ImageArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ImageArgs {
    /// Synthetic image width.
    #[arg(long, global = true, default_value_t = 256)]
    width: usize,
    /// Synthetic image height.
    #[arg(long, global = true, default_value_t = 256)]
    height: usize,
    /// Fraction of samples whose LSB is replaced.
    #[arg(long, global = true, default_value_t = 0.0)]
    embed_rate: f64,
    /// Seed for the synthetic image.
    #[arg(long, global = true, default_value_t = 1)]
    seed: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Chi-square pairs-of-values sweep.
    ChiSquare {
        #[arg(long, value_enum)]
        mode: Option<Mode>,
    },
    /// RS analysis verdict.
    Rs,
    /// Oracle attack against the RS detector.
    Attack {
        #[arg(long)]
        budget: Option<usize>,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum Mode {
    Values,
    Lsb,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalysisConfig, ConfigError> {
    match path {
        Some(path) => AnalysisConfig::from_file(path),
        None => Ok(AnalysisConfig::default()),
    }
}

fn load_image(args: &ImageArgs) -> Result<RgbImage, Box<dyn std::error::Error>> {
    let mut source = SyntheticSource::new(SyntheticConfig {
        width: args.width,
        height: args.height,
        embed_rate: args.embed_rate,
        seed: args.seed,
        ..Default::default()
    })?;
    Ok(source.next_image()?)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    info!("LSB Steganalysis v{}", lsb_steganalysis::VERSION);

    let mut config = load_config(cli.config.as_ref())?;
    let metrics = MetricsRegistry::new()?;
    let image = load_image(&cli.image)?;
    let mut report = AnalysisReport::new(image.width(), image.height());

    match cli.command {
        Commands::ChiSquare { mode } => {
            if let Some(mode) = mode {
                config.chi_square.mode = match mode {
                    Mode::Values => SampleMode::Values,
                    Mode::Lsb => SampleMode::LsbPlane,
                };
            }
            let cs = &config.chi_square;
            let sweep = Sweep::new(cs.test()?, cs.mode, cs.strategy())?;

            for curve in sweep.run_image(&image)? {
                metrics.record_curve(&curve);
                let verdict = match curve.points.last() {
                    Some(full) if full.result.p_value > cs.significance => {
                        "pairs equalized, consistent with LSB replacement"
                    }
                    Some(_) => "pairs unbalanced, no full-capacity embedding",
                    None => "inconclusive",
                };
                println!(
                    "{:>5}: {} points, {} skipped, {}",
                    curve.channel,
                    curve.points.len(),
                    curve.skipped,
                    verdict
                );
                for (fraction, p) in curve.p_values() {
                    println!("       {:>5.1}%  p = {:.6}", fraction * 100.0, p);
                }
                report.chi_square.push(curve);
            }
        }
        Commands::Rs => {
            let mask = config.rs.mask()?;
            let detector = config.rs.detector(mask.clone())?;
            let detection = detector.inspect(&image)?;
            metrics.record_detection(&detection);

            for cs in &detection.signatures {
                let s = cs.signature;
                println!(
                    "{:>5}: Rm={:.6} R-m={:.6} Sm={:.6} S-m={:.6}",
                    cs.channel, s.rm, s.r_neg_m, s.sm, s.s_neg_m
                );
            }
            match &detection.trigger {
                Some(divergence) => println!("Likely stego: {}", divergence),
                None => println!("Looks like an unmodified image"),
            }

            report.mask = mask.to_string().lines().map(String::from).collect();
            report.rs = Some(detection);
        }
        Commands::Attack { budget } => {
            let budget = budget.unwrap_or(config.attack.budget);
            let mask = config.rs.mask()?;
            let detector = config.rs.detector(mask.clone())?;
            let attack = OracleAttack::new(&detector, budget);
            let result = attack.run(&image)?;
            metrics.record_attack(&result);

            if result.is_success() {
                println!(
                    "Attack succeeded: undetected after {} modifications",
                    result.modifications
                );
            } else {
                warn!(outcome = %result.outcome, "Image still detected");
                println!(
                    "Attack failed ({}): still detected after {} modifications",
                    result.outcome, result.modifications
                );
            }

            report.mask = mask.to_string().lines().map(String::from).collect();
            report.attack = Some(AttackSummary::from(&result));
        }
    }

    if let Some(path) = &cli.report {
        std::fs::write(path, report.to_toml()?)?;
        info!(path = %path.display(), "Report written");
    }

    if cli.metrics {
        print!("{}", metrics.encode()?);
    }

    Ok(())
}
