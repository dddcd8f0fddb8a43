use batched_bloom_rs::{
    BatchedBloomFilter, BloomFilterStats, FilterConfigBuilder, common::bytes2hr,
};
use clap::Parser;
use rand::{Rng, distr::Alphanumeric};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fill a filter, then compare its empirical false positive rate with theory
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Expected (and inserted) number of keys
    #[arg(short = 'n', long, default_value = "1000000")]
    items: usize,

    /// Target false positive rate (between 0 and 1)
    #[arg(short, long, default_value = "0.001")]
    fpr: f64,

    /// Unseen keys to probe
    #[arg(short, long, default_value = "1000000")]
    trials: usize,

    /// Insert queue capacity
    #[arg(long, default_value = "10000")]
    queue_capacity: usize,

    /// Keys per committed batch
    #[arg(long, default_value = "100")]
    batch_size: usize,

    /// Flush interval in milliseconds
    #[arg(long, default_value = "100")]
    flush_ms: u64,

    /// Bits shown in the heatmap
    #[arg(long, default_value = "1000")]
    heatmap_bits: usize,

    /// Heatmap row width
    #[arg(long, default_value = "100")]
    heatmap_columns: usize,
}

fn random_suffix<R: Rng>(rng: &mut R) -> String {
    let len = rng.random_range(1..=25);
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = FilterConfigBuilder::default()
        .capacity(cli.items)
        .false_positive_rate(cli.fpr)
        .queue_capacity(cli.queue_capacity)
        .batch_size(cli.batch_size)
        .flush_interval(Duration::from_millis(cli.flush_ms))
        .build()?;
    let filter = BatchedBloomFilter::new(config)?;

    let mut rng = rand::rng();
    let started = Instant::now();
    for i in 0..cli.items {
        let key = format!("data_{i}{}", random_suffix(&mut rng));
        filter.insert(key.as_bytes());
    }
    filter.close();
    info!(elapsed = ?started.elapsed(), "inserts committed");

    let mut false_positives = 0usize;
    for i in 0..cli.trials {
        let key = format!("unseen_{i}{}", random_suffix(&mut rng));
        if filter.might_contain(key.as_bytes()) {
            false_positives += 1;
        }
    }

    let stats = filter.stats();
    let empirical = if cli.trials == 0 {
        0.0
    } else {
        false_positives as f64 / cli.trials as f64 * 100.0
    };

    println!("Hash functions:      {}", filter.num_hashes());
    println!("Array size:          {} bits", filter.bit_vector_size());
    println!("Memory:              {}", bytes2hr(stats.byte_size));
    println!("Committed keys:      {}", stats.element_count);
    println!("Dropped keys:        {}", stats.dropped_count);
    println!("Bit saturation:      {:.4}%", stats.saturation);
    println!("Bit distribution:    {:.6}", stats.distribution_variance);
    println!(
        "False positive rate: {:.4}% (expected ~{:.4}%)",
        empirical, stats.estimated_fpr
    );

    if cli.heatmap_bits > 0 && cli.heatmap_columns > 0 {
        let heatmap = filter.heatmap(cli.heatmap_bits, cli.heatmap_columns)?;
        println!(
            "\nHeatmap (bits {} to {}):",
            heatmap.start_bit(),
            heatmap.end_bit().saturating_sub(1)
        );
        print!("{heatmap}");
    }

    Ok(())
}
