//! CLI commands for roadfork-guidance

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::formats::MapBundle;
use crate::geojson::GeojsonSink;
use crate::graph::{NodeId, SPECIAL_EDGE};
use crate::intersection::Intersection;

#[derive(Parser)]
#[command(name = "roadfork-guidance")]
#[command(about = "Intersection model inspector for road-network preprocessing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the intersection model for one arrival edge
    Inspect {
        /// Map bundle JSON file
        #[arg(short, long)]
        map: PathBuf,

        /// Node the arrival edge starts at
        #[arg(long)]
        from: NodeId,

        /// Node the arrival edge leads to
        #[arg(long)]
        via_to: NodeId,

        /// Show the raw connected roads, without merge and adjustment
        #[arg(long)]
        raw: bool,
    },

    /// Compute every intersection and write merge snapshots as geojson
    DumpGeojson {
        /// Map bundle JSON file
        #[arg(short, long)]
        map: PathBuf,

        /// Output file, one feature collection per merged intersection
        #[arg(short, long)]
        out: PathBuf,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Inspect {
            map,
            from,
            via_to,
            raw,
        } => {
            let bundle = MapBundle::load(&map)
                .with_context(|| format!("loading map bundle {}", map.display()))?;
            let via_edge = bundle.graph.find_edge(from, via_to);
            if via_edge == SPECIAL_EDGE {
                bail!("no edge from node {from} to node {via_to}");
            }

            let builder = bundle.builder();
            let intersection = if raw {
                builder.connected_roads(from, via_edge)
            } else {
                builder.intersection(from, via_edge)
            };
            print_intersection(&bundle, from, via_to, &intersection);
            Ok(())
        }
        Commands::DumpGeojson { map, out } => {
            let bundle = MapBundle::load(&map)
                .with_context(|| format!("loading map bundle {}", map.display()))?;
            let sink = GeojsonSink::create(&out)
                .with_context(|| format!("creating {}", out.display()))?;
            let builder = bundle.builder().with_debug_sink(&sink);

            let mut computed = 0usize;
            for node in 0..bundle.graph.node_count() {
                for edge in bundle.graph.adjacent_edges(node) {
                    builder.intersection(node, edge);
                    computed += 1;
                }
            }
            info!(
                "computed {computed} intersections, snapshots written to {}",
                out.display()
            );
            Ok(())
        }
    }
}

fn print_intersection(
    bundle: &MapBundle,
    from: NodeId,
    via_to: NodeId,
    intersection: &Intersection,
) {
    println!("intersection at node {via_to}, arriving from node {from}");
    println!(
        "{:>4} {:>6} {:>6} {:>8} {:>8} {:>6}",
        "slot", "edge", "to", "angle", "bearing", "entry"
    );
    for (slot, road) in intersection.iter().enumerate() {
        let name = bundle
            .names
            .get(bundle.graph.edge_data(road.turn.eid).name_id)
            .unwrap_or("-");
        println!(
            "{:>4} {:>6} {:>6} {:>8.1} {:>8.1} {:>6}  {}",
            slot,
            road.turn.eid,
            bundle.graph.target(road.turn.eid),
            road.turn.angle,
            road.turn.bearing,
            road.entry_allowed,
            name
        );
    }
}
