//! farsight-calibrate: locate `ComponentToWorld` on the local player's mesh
//!
//! Attach to the target named by a build profile, follow the configured
//! pointer chain to the local pawn's mesh and print every offset holding a
//! plausible transform.

use anyhow::{bail, Context, Result};
use clap::Parser;
use farsight::config::parse_offset;
use farsight::memory::field_address;
use farsight::offset_finder::{OffsetFinder, ScanOptions};
use farsight::{OffsetConfig, Session, World};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "farsight-calibrate", version, about)]
struct Args {
    /// Offset config file
    #[arg(short, long, default_value = "configs/offsets.json", env = "FARSIGHT_CONFIG")]
    config: PathBuf,

    /// Build identifier inside the config
    #[arg(short, long)]
    build: String,

    /// Scan this component instead of the local pawn's mesh
    #[arg(long, value_parser = parse_address)]
    mesh: Option<usize>,

    /// First offset to try
    #[arg(long, value_parser = parse_address, default_value = "150")]
    start: usize,

    /// One past the last offset to try
    #[arg(long, value_parser = parse_address, default_value = "800")]
    end: usize,

    /// Exclusive lower bound for translation components
    #[arg(long, default_value_t = 0.0)]
    min: f64,

    /// Exclusive upper bound for translation components
    #[arg(long, default_value_t = 20.0)]
    max: f64,
}

fn parse_address(text: &str) -> Result<usize, String> {
    parse_offset(text).map_err(|e| format!("{:?}: {}", text, e))
}

fn main() -> Result<()> {
    farsight::init_logging();
    let args = Args::parse();

    let config = OffsetConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let profile = config.for_build(&args.build)?;

    let session = Session::attach(
        &profile.process_name,
        &profile.module_name,
        profile.offsets.clone(),
    )?;

    let mesh = match args.mesh {
        Some(mesh) => mesh,
        None => {
            let Some(world) = World::locate(&session) else {
                bail!("UWorld is null; is a level loaded?");
            };

            let pawn = world.local_pawn(&session);
            if pawn == 0 {
                bail!("No local pawn; spawn in first");
            }

            session.read_ptr(field_address(pawn, profile.offsets.mesh))
        }
    };

    if mesh == 0 {
        bail!("Mesh pointer is null");
    }

    let options = ScanOptions {
        start: args.start,
        end: args.end,
        min: args.min,
        max: args.max,
    };

    let hits = OffsetFinder::new(&session).component_to_world(mesh, &options);

    if hits.is_empty() {
        println!("No candidates in {:#x}..{:#x} of mesh {:#x}", options.start, options.end, mesh);
        return Ok(());
    }

    println!("Mesh {:#x}", mesh);
    for hit in hits {
        let t = hit.translation;
        println!("  {:#06x}  ({:.3}, {:.3}, {:.3})", hit.offset, t.x, t.y, t.z);
    }

    Ok(())
}
