use anyhow::{anyhow, Error as AnyError};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, str::FromStr};
use terrain::{geo::geometry::Coord, Method, DEFAULT_TEMPLATE};

/// Sample elevation profiles from a directory of GeoTIFF DEM tiles.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Directory containing GeoTIFF tiles.
    #[arg(short, long)]
    pub tile_dir: PathBuf,

    /// Tile file name, `{x}` and `{y}` are replaced by the tile index.
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Memory map tiles instead of reading them.
    #[arg(long, default_value_t = false)]
    pub memmap: bool,

    /// Start "x,y" (or "x;y") in the input CRS.
    #[arg(long)]
    pub start: Point,

    /// End "x,y" (or "x;y") in the input CRS.
    #[arg(long)]
    pub end: Point,

    /// Distance between samples, in meters. Overrides
    /// `--num-samples`.
    #[arg(long)]
    pub spacing: Option<f64>,

    /// Number of samples per tile.
    #[arg(short, long, default_value_t = 800)]
    pub num_samples: usize,

    /// Interpolation method: nearest or bilinear.
    #[arg(short, long, default_value = "bilinear")]
    pub method: Method,

    /// CRS of `start` and `end`.
    #[arg(long, default_value = "EPSG:4326")]
    pub input_crs: String,

    /// CRS of the tile grid.
    #[arg(long, default_value = "EPSG:25832")]
    pub reference_crs: String,

    /// Tile edge length, in km.
    #[arg(long, default_value_t = 1.0)]
    pub tile_km: f64,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Clone, Debug, Copy, PartialEq)]
pub struct Point(pub Coord<f64>);

impl FromStr for Point {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let (x_str, y_str) = s
            .split_once(|c| c == ',' || c == ';')
            .ok_or_else(|| anyhow!("not a valid x,y pair"))?;
        let x = f64::from_str(x_str.trim())?;
        let y = f64::from_str(y_str.trim())?;
        Ok(Self(Coord { x, y }))
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print samples to screen.
    Display,

    /// Print "distance,elevation" rows to stdout.
    Csv,

    /// Print a JSON array of [distance, elevation] pairs to stdout.
    Json,

    /// Plot to terminal.
    Plot,
}
