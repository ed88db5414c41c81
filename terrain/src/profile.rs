use crate::{
    distance::accumulate,
    locator::locate,
    planner::{plan, points, SampleMode},
    sampler::{Method, Raster},
    Crs, Position, TerrainError, TileId, TileStore, C,
};
use geo::geometry::Coord;
use geotile::TileCrs;
use log::{debug, warn};
use std::{collections::HashMap, time::Instant};

/// Reference grid the tiles are named after.
pub const DEFAULT_REFERENCE_EPSG: u32 = 25832;

/// Edge length of a reference grid tile.
pub const DEFAULT_TILE_EDGE_KM: C = 1.0;

/// One point of a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationSample {
    /// Distance from the start of the path, measured in the CRS of
    /// the tile this sample came from.
    pub distance_m: C,

    pub elevation_m: C,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Samples in tile processing order.
    ///
    /// Distances are non-decreasing within a tile's run of samples,
    /// but not necessarily across tiles.
    pub samples: Vec<ElevationSample>,

    /// Tiles which were located but could not be opened or sampled.
    pub skipped: Vec<TileId>,
}

impl Profile {
    pub fn builder() -> ProfileBuilder {
        ProfileBuilder {
            start: None,
            end: None,
            input_crs: None,
            reference_crs: None,
            tile_edge_km: DEFAULT_TILE_EDGE_KM,
            spacing_m: None,
            num_samples: None,
            method: Method::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn distances_m(&self) -> impl Iterator<Item = C> + '_ {
        self.samples.iter().map(|s| s.distance_m)
    }

    pub fn elevations_m(&self) -> impl Iterator<Item = C> + '_ {
        self.samples.iter().map(|s| s.elevation_m)
    }
}

pub struct ProfileBuilder {
    start: Option<Coord<C>>,

    end: Option<Coord<C>>,

    /// CRS of `start` and `end`, WGS84 when unset.
    input_crs: Option<Crs>,

    /// CRS of the tile grid, EPSG:25832 when unset.
    reference_crs: Option<Crs>,

    tile_edge_km: C,

    /// Distance between samples, takes precedence over `num_samples`.
    spacing_m: Option<C>,

    /// Number of samples per tile.
    num_samples: Option<usize>,

    method: Method,
}

impl ProfileBuilder {
    #[must_use]
    pub fn start(mut self, coord: Coord<C>) -> Self {
        self.start = Some(coord);
        self
    }

    #[must_use]
    pub fn end(mut self, coord: Coord<C>) -> Self {
        self.end = Some(coord);
        self
    }

    #[must_use]
    pub fn input_crs(mut self, crs: Crs) -> Self {
        self.input_crs = Some(crs);
        self
    }

    #[must_use]
    pub fn reference_crs(mut self, crs: Crs) -> Self {
        self.reference_crs = Some(crs);
        self
    }

    #[must_use]
    pub fn tile_edge_km(mut self, km: C) -> Self {
        self.tile_edge_km = km;
        self
    }

    #[must_use]
    pub fn spacing(mut self, meters: C) -> Self {
        self.spacing_m = Some(meters);
        self
    }

    #[must_use]
    pub fn num_samples(mut self, n: usize) -> Self {
        self.num_samples = Some(n);
        self
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Samples every tile of `tiles` on the path from `start` to
    /// `end`.
    ///
    /// Invalid requests fail before any tile is opened. Tiles which
    /// fail afterwards are logged and listed in
    /// [Profile::skipped].
    pub fn build<S>(&self, tiles: &S) -> Result<Profile, TerrainError>
    where
        S: TileStore + ?Sized,
    {
        let now = Instant::now();
        let request = self.validate()?;
        let ids = locate(
            &request.start,
            &request.end,
            &request.reference_crs,
            self.tile_edge_km,
        )?;

        let mut samples = Vec::new();
        let mut skipped = Vec::new();
        let mut crs_cache = HashMap::new();
        for &id in &ids {
            match request.sample_tile(tiles, id, &mut crs_cache) {
                Ok(tile_samples) => samples.extend(tile_samples),
                Err(e) => {
                    let err = TerrainError::TileUnavailable {
                        tile: id,
                        source: Box::new(e),
                    };
                    warn!("{err}");
                    skipped.push(id);
                }
            }
        }

        debug!(
            "profile; len: {}, tiles: {}, skipped: {}, exec: {:?}",
            samples.len(),
            ids.len(),
            skipped.len(),
            now.elapsed()
        );

        Ok(Profile { samples, skipped })
    }
}

/// Private API
impl ProfileBuilder {
    fn validate(&self) -> Result<Request, TerrainError> {
        // A sample count is checked even when spacing overrides it.
        if let Some(n) = self.num_samples {
            SampleMode::Count(n).validate()?;
        }
        let mode = match (self.spacing_m, self.num_samples) {
            (Some(spacing), _) => SampleMode::Spacing(spacing),
            (None, Some(n)) => SampleMode::Count(n),
            (None, None) => {
                return Err(TerrainError::InvalidParameter(
                    "either spacing or num_samples is required".to_string(),
                ))
            }
        }
        .validate()?;

        let input_crs = match &self.input_crs {
            Some(crs) => crs.clone(),
            None => Crs::wgs84()?,
        };
        let reference_crs = match &self.reference_crs {
            Some(crs) => crs.clone(),
            None => Crs::from_epsg(DEFAULT_REFERENCE_EPSG)?,
        };

        let missing = |what: &str| TerrainError::InvalidParameter(format!("missing {what}"));
        let start = Position::new(self.start.ok_or_else(|| missing("start"))?, input_crs.clone())?;
        let end = Position::new(self.end.ok_or_else(|| missing("end"))?, input_crs)?;

        Ok(Request {
            start,
            end,
            reference_crs,
            mode,
            method: self.method,
        })
    }
}

/// A validated profile request.
struct Request {
    start: Position,
    end: Position,
    reference_crs: Crs,
    mode: SampleMode,
    method: Method,
}

impl Request {
    /// Samples the path through a single tile, dropping no-data.
    fn sample_tile<S>(
        &self,
        tiles: &S,
        id: TileId,
        crs_cache: &mut HashMap<TileCrs, Crs>,
    ) -> Result<Vec<ElevationSample>, TerrainError>
    where
        S: TileStore + ?Sized,
    {
        let tile = tiles.open(id)?;

        let crs = match crs_cache.get(&tile.crs()) {
            Some(crs) => crs.clone(),
            None => {
                let crs = match tile.crs() {
                    // Tiles without CRS keys are WGS84.
                    TileCrs::Absent => Crs::wgs84()?,
                    TileCrs::Epsg(code) => Crs::from_epsg(u32::from(code))?,
                    TileCrs::UserDefined => {
                        return Err(TerrainError::InvalidCrs(
                            "tile declares a user-defined CRS".to_string(),
                        ))
                    }
                };
                crs_cache.insert(tile.crs(), crs.clone());
                crs
            }
        };

        let p0 = self.start.to_crs(&crs)?.coord();
        let p1 = self.end.to_crs(&crs)?.coord();
        let n = plan(p0, p1, &crs, self.mode)?;
        let path = points(p0, p1, n);

        let raster = Raster::from_tile(&tile, 1)?;
        let elevations = raster.sample(tile.inverse_transform(), &path, self.method);
        let distances = accumulate(&path, &crs)?;

        let samples: Vec<ElevationSample> = distances
            .into_iter()
            .zip(elevations)
            .filter(|(_, elevation)| !elevation.is_nan())
            .map(|(distance_m, elevation_m)| ElevationSample {
                distance_m,
                elevation_m,
            })
            .collect();

        debug!("tile {id}; crs: {crs}, points: {n}, kept: {}", samples.len());
        Ok(samples)
    }
}
