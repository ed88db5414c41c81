mod options;

use anyhow::Error as AnyError;
use clap::Parser;
use log::info;
use options::{Cli, Command as CliCmd};
use serde::Serialize;
use std::io::Write;
use terrain::{Crs, Profile, TileDir, TileMode};
use textplots::{Chart, Plot, Shape};

fn main() -> Result<(), AnyError> {
    let Cli {
        tile_dir,
        template,
        memmap,
        start,
        end,
        spacing,
        num_samples,
        method,
        input_crs,
        reference_crs,
        tile_km,
        cmd,
    } = Cli::parse();

    env_logger::init();

    let input_crs: Crs = input_crs.parse()?;
    let reference_crs: Crs = reference_crs.parse()?;
    let tile_mode = if memmap {
        TileMode::MemMap
    } else {
        TileMode::InMem
    };
    let tiles = TileDir::new(tile_dir, tile_mode)?.template(template);

    let mut builder = Profile::builder()
        .input_crs(input_crs)
        .reference_crs(reference_crs)
        .tile_edge_km(tile_km)
        .start(start.0)
        .end(end.0)
        .num_samples(num_samples)
        .method(method);
    if let Some(spacing) = spacing {
        builder = builder.spacing(spacing);
    }
    let profile = builder.build(&tiles)?;

    if !profile.skipped.is_empty() {
        info!("skipped {} tile(s): {:?}", profile.skipped.len(), profile.skipped);
    }

    match cmd {
        CliCmd::Display => display(&profile)?,
        CliCmd::Csv => print_csv(&profile)?,
        CliCmd::Json => print_json(&profile)?,
        CliCmd::Plot => plot_ascii(&profile),
    };
    Ok(())
}

fn display(profile: &Profile) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    for (i, sample) in profile.samples.iter().enumerate() {
        writeln!(
            stdout,
            "{i:4}: {:10.2} m {:8.2} m",
            sample.distance_m, sample.elevation_m
        )?;
    }
    Ok(())
}

/// # Example with gnuplot
///
/// ```sh
/// cargo run -- --tile-dir=data/dgm1 --start=7.0921,51.1402 --end=7.1012,51.1455 --spacing=10 csv | tr ',' ' ' > ~/.tmp/plot && gnuplot -p -e "plot '~/.tmp/plot' using 1:2 with lines"
/// ```
fn print_csv(profile: &Profile) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Distance,Elevation")?;
    for sample in &profile.samples {
        writeln!(stdout, "{},{}", sample.distance_m, sample.elevation_m)?;
    }
    Ok(())
}

fn print_json(profile: &Profile) -> Result<(), AnyError> {
    let json = serde_json::to_string(&pairs(profile))?;
    println!("{json}");
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn plot_ascii(profile: &Profile) {
    let plot_data: Vec<(f32, f32)> = profile
        .samples
        .iter()
        .map(|s| (s.distance_m as f32, s.elevation_m as f32))
        .collect();
    let x_max = plot_data.iter().map(|(d, _)| *d).fold(0.0_f32, f32::max);
    Chart::new(300, 150, 0.0, x_max.max(1.0))
        .lineplot(&Shape::Lines(&plot_data))
        .display();
}

/// Serialized as a `[distance, elevation]` array.
#[derive(Serialize)]
struct JsonEntry(f64, f64);

fn pairs(profile: &Profile) -> Vec<JsonEntry> {
    profile
        .samples
        .iter()
        .map(|s| JsonEntry(s.distance_m, s.elevation_m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::pairs;
    use terrain::{ElevationSample, Profile, TileId};

    #[test]
    fn test_json_shape() {
        let profile = Profile {
            samples: vec![
                ElevationSample {
                    distance_m: 0.0,
                    elevation_m: 101.5,
                },
                ElevationSample {
                    distance_m: 10.0,
                    elevation_m: 102.25,
                },
            ],
            skipped: vec![TileId::new(1, 2)],
        };
        let json = serde_json::to_string(&pairs(&profile)).unwrap();
        assert_eq!(json, "[[0.0,101.5],[10.0,102.25]]");
    }
}
