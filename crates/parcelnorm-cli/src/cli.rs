use clap::{Parser, Subcommand, ValueEnum};
use parcelnorm_core::config::ProcessingOrder;
use std::path::PathBuf;

/// parcelnorm - Polygon normalization and conflict resolution
#[derive(Parser, Debug)]
#[command(name = "parcelnorm")]
#[command(about = "Clean, validate and de-overlap raw parcel boundaries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline over a JSON file of raw records
    Run(RunArgs),

    /// Show the effective configuration and where each value comes from
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// JSON array of raw parcel records
    pub input: PathBuf,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the full resolution report (JSON) to this file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write accepted and modified parcels as a GeoJSON FeatureCollection
    #[arg(long, value_name = "FILE")]
    pub geojson: Option<PathBuf>,

    /// Minimum parcel area in acres
    #[arg(long, value_name = "ACRES")]
    pub min_area_acres: Option<f64>,

    /// Overlap share (0-1) of a parcel's own area that may be clipped away
    #[arg(long, value_name = "FRACTION")]
    pub negligible_overlap: Option<f64>,

    /// Overlap area in acres at or below which parcels do not conflict
    #[arg(long, value_name = "ACRES")]
    pub overlap_tolerance_acres: Option<f64>,

    /// Order in which parcels claim their area
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Processing order selection
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrderArg {
    /// Input order (first record wins)
    Input,
    /// Largest parcel first
    Area,
}

impl From<OrderArg> for ProcessingOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Input => ProcessingOrder::InputOrder,
            OrderArg::Area => ProcessingOrder::AreaDescending,
        }
    }
}
