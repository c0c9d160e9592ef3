use anyhow::anyhow;
use clap::{Parser, Subcommand};
use rand::RngCore;
use skytale::config::Config;
use skytale::logging;
use skytale::obfuscation::{Obfuscator, SkytaleScrambler};
use skytale::packet::{Opcode, PacketHeader};
use std::path::PathBuf;
use std::time::Instant;

/// Skytale packet scrambler harness
#[derive(Parser)]
#[command(name = "skytale")]
#[command(about = "Packet bit-scrambling harness for tunnel traffic obfuscation")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config/skytale.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scramble and descramble a random buffer and verify the round trip
    Selftest {
        /// Buffer size in bytes
        #[arg(long, default_value = "64")]
        size: usize,
    },
    /// Measure scramble throughput
    Bench {
        /// Packet size in bytes
        #[arg(long, default_value = "1500")]
        size: usize,

        /// Number of scramble calls to time
        #[arg(long, default_value = "10000")]
        iterations: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config).await?;

    // Initialize logging
    logging::init_logging(
        &config.log_level,
        &config.log_theme_path,
        config.log_to_file,
        config.log_file_path.as_deref(),
    )
    .await?;

    let scrambler = SkytaleScrambler::new(config.obfuscation.scramble);
    if !scrambler.is_enabled() {
        tracing::warn!("Scrambling is disabled in the configuration; payloads pass through");
    }

    match cli.command {
        Commands::Selftest { size } => selftest(&scrambler, size),
        Commands::Bench { size, iterations } => bench(&scrambler, size, iterations),
    }
}

/// Run one scramble/descramble round trip over a random buffer and print
/// each stage, the way the original self-test did.
fn selftest(scrambler: &SkytaleScrambler, size: usize) -> anyhow::Result<()> {
    let header = PacketHeader::new(Opcode::Data, 0);

    let mut original = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut original);
    println!("input:       {}", hex_dump(&original));

    let mut buf = original.clone();
    scrambler.scramble(&mut buf, &header);
    println!("scrambled:   {}", hex_dump(&buf));

    scrambler.descramble(&mut buf, &header);
    println!("descrambled: {}", hex_dump(&buf));

    if buf != original {
        return Err(anyhow!(
            "round trip failed: descrambled output differs from input"
        ));
    }

    tracing::info!("selftest passed for {} byte buffer", size);
    Ok(())
}

/// Time repeated scramble calls and report per-packet cost and throughput.
fn bench(scrambler: &SkytaleScrambler, size: usize, iterations: u32) -> anyhow::Result<()> {
    if size == 0 || iterations == 0 {
        return Err(anyhow!("packet size and iteration count must be nonzero"));
    }

    let header = PacketHeader::new(Opcode::Data, 0);
    let mut buf = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut buf);

    let start = Instant::now();
    for _ in 0..iterations {
        scrambler.scramble(&mut buf, &header);
    }
    let elapsed = start.elapsed();

    let per_packet_ms = elapsed.as_secs_f64() * 1000.0 / f64::from(iterations);
    let mbps = (size as f64 * 8.0 * f64::from(iterations)) / elapsed.as_secs_f64() / 1_000_000.0;
    println!(
        "Skytale {} bytes: {:.6} ms / packet, rate {:.2} Mbps",
        size, per_packet_ms, mbps
    );
    Ok(())
}

fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
