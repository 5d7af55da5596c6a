use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;

use pcd_processor::{Accumulation, AssetsWriter, XRayAssetsPipelineBuilder};
use pcd_trajectory::{read_trajectory, LaserScanAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AccumulationArg {
    MaxIntensity,
    XRay,
}

impl From<AccumulationArg> for Accumulation {
    fn from(arg: AccumulationArg) -> Self {
        match arg {
            AccumulationArg::MaxIntensity => Accumulation::MaxIntensity,
            AccumulationArg::XRay => Accumulation::XRay,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "Assets Writer",
    about = "Writes a PLY point cloud and x-ray projections from an optimized trajectory",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    #[arg(short, long, required = true, value_name = "FILE")]
    trajectory: PathBuf,

    #[arg(short, long, required = true, value_name = "STEM")]
    output_stem: PathBuf,

    #[arg(long, default_value_t = 0.05, value_name = "METRES")]
    voxel_size: f32,

    #[arg(long, value_enum, default_value_t = AccumulationArg::MaxIntensity)]
    accumulation: AccumulationArg,

    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Cli::parse();

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(
            None,
            if args.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        )
        .init();

    log::info!("trajectory: {:?}", args.trajectory);
    log::info!("output stem: {:?}", args.output_stem);
    log::info!("voxel size: {}", args.voxel_size);
    log::info!("accumulation: {:?}", args.accumulation);

    let start = std::time::Instant::now();

    log::info!("start reading trajectory...");
    let nodes = match read_trajectory(&args.trajectory) {
        Ok(nodes) => nodes,
        Err(e) => {
            log::error!("Failed to read trajectory: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("read {} nodes in {:?}", nodes.len(), start.elapsed());

    let builder = XRayAssetsPipelineBuilder::new(args.voxel_size, args.output_stem)
        .with_accumulation(args.accumulation.into());
    let writer = AssetsWriter::new(Box::new(builder));

    match writer.write(&nodes, &LaserScanAdapter) {
        Ok(summary) => {
            for output in &summary.outputs {
                log::info!("wrote {:?}", output);
            }
            log::info!(
                "{} points from {} nodes",
                summary.points,
                summary.nodes
            );
        }
        Err(e) => {
            log::error!("Failed to write assets: {}", e);
            std::process::exit(1);
        }
    }

    log::info!("Elapsed: {:?}", start.elapsed());
    log::info!("Finish processing");
}
