mod analysis;
mod dataset;
mod graph;
mod render;
mod util;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{info, warn};

use crate::analysis::{attributes, clustering, direct, modification, quadrants};
use crate::dataset::Dataset;
use crate::graph::Property;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// CSV export of the measurement spreadsheet.
    #[arg(long, default_value = "DATASET 1.csv")]
    dataset: PathBuf,
    /// Directory the artifacts are written under.
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,
    #[command(subcommand)]
    analysis: Analysis,
}

#[derive(Debug, Subcommand)]
enum Analysis {
    /// Value-pair graph with log10-based distances for one property.
    Direct {
        #[arg(long, value_enum, default_value_t = PropertyArg::Modulus)]
        property: PropertyArg,
    },
    /// Raw-distance value-pair graphs split into sign quadrants.
    Quadrants {
        #[arg(long, value_enum, default_value_t = PropertyArg::Modulus)]
        property: PropertyArg,
    },
    /// Center-node improvement graphs split by clay modification.
    Modification,
    /// Categorical co-occurrence graph with exports and a report.
    Attributes,
    /// Modulus-regime clustering with centrality reports.
    Clustering,
    /// Every analysis, every property.
    All,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PropertyArg {
    Modulus,
    Strength,
    Strain,
}

impl From<PropertyArg> for Property {
    fn from(property: PropertyArg) -> Self {
        match property {
            PropertyArg::Modulus => Property::Modulus,
            PropertyArg::Strength => Property::Strength,
            PropertyArg::Strain => Property::Strain,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let dataset = Dataset::load(&args.dataset)?;
    info!("{} rows loaded from {}", dataset.len(), args.dataset.display());
    if dataset.is_empty() {
        warn!("dataset contains no rows; artifacts will be empty");
    }

    match args.analysis {
        Analysis::Direct { property } => direct::run(&dataset, property.into(), &args.out_dir)?,
        Analysis::Quadrants { property } => {
            quadrants::run(&dataset, property.into(), &args.out_dir)?
        }
        Analysis::Modification => modification::run(&dataset, &args.out_dir)?,
        Analysis::Attributes => attributes::run(&dataset, &args.out_dir)?,
        Analysis::Clustering => clustering::run(&dataset, &args.out_dir)?,
        Analysis::All => {
            for property in [Property::Modulus, Property::Strength, Property::Strain] {
                direct::run(&dataset, property, &args.out_dir)?;
                quadrants::run(&dataset, property, &args.out_dir)?;
            }
            modification::run(&dataset, &args.out_dir)?;
            attributes::run(&dataset, &args.out_dir)?;
            clustering::run(&dataset, &args.out_dir)?;
        }
    }

    Ok(())
}
