//! Coordinate reference systems and reprojection.
//!
//! Definitions are resolved once into a [Crs] and shared by cheap
//! clones. Geographic CRSs use (lon, lat) axis order in degrees.

use crate::{TerrainError, C};
use geo::geometry::Coord;
use proj4rs::{proj::Proj, transform::transform};
use std::{fmt, str::FromStr, sync::Arc};

pub const WGS84: u32 = 4326;

#[derive(Clone)]
pub struct Crs {
    /// EPSG code this CRS was resolved from, if any.
    epsg: Option<u32>,

    /// PROJ.4 definition string.
    definition: Arc<str>,

    proj: Arc<Proj>,

    projected: bool,
}

impl Crs {
    /// Resolves `code` against the built-in EPSG definitions.
    pub fn from_epsg(code: u32) -> Result<Self, TerrainError> {
        let definition =
            epsg_definition(code).ok_or_else(|| TerrainError::InvalidCrs(format!("EPSG:{code}")))?;
        Self::new(Some(code), &definition)
    }

    /// Returns a CRS built from a raw `+proj=...` definition.
    pub fn from_proj_string(definition: &str) -> Result<Self, TerrainError> {
        Self::new(None, definition)
    }

    pub fn wgs84() -> Result<Self, TerrainError> {
        Self::from_epsg(WGS84)
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Returns `true` for CRSs with planar coordinates in meters.
    pub fn is_projected(&self) -> bool {
        self.projected
    }

    /// Reprojects `coord` from this CRS into `to`.
    ///
    /// Identical CRSs return `coord` untouched.
    pub fn transform(&self, coord: Coord<C>, to: &Crs) -> Result<Coord<C>, TerrainError> {
        if self == to {
            return Ok(coord);
        }
        let mut point = if self.projected {
            (coord.x, coord.y, 0.0)
        } else {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        };
        let failed = || TerrainError::Transform {
            coord,
            from: self.to_string(),
            to: to.to_string(),
        };
        transform(&self.proj, &to.proj, &mut point).map_err(|_| failed())?;
        let out = if to.projected {
            Coord {
                x: point.0,
                y: point.1,
            }
        } else {
            Coord {
                x: point.0.to_degrees(),
                y: point.1.to_degrees(),
            }
        };
        if out.x.is_finite() && out.y.is_finite() {
            Ok(out)
        } else {
            Err(failed())
        }
    }

    /// Reprojects every coordinate in `coords` into `to`.
    pub fn transform_all(
        &self,
        coords: &[Coord<C>],
        to: &Crs,
    ) -> Result<Vec<Coord<C>>, TerrainError> {
        if self == to {
            return Ok(coords.to_vec());
        }
        coords
            .iter()
            .map(|&coord| self.transform(coord, to))
            .collect()
    }
}

/// Private API
impl Crs {
    fn new(epsg: Option<u32>, definition: &str) -> Result<Self, TerrainError> {
        let definition = definition.trim();
        let proj = Proj::from_proj_string(definition)
            .map_err(|e| TerrainError::InvalidCrs(format!("{definition} ({e:?})")))?;
        Ok(Self {
            epsg,
            definition: Arc::from(definition),
            proj: Arc::new(proj),
            projected: !is_geographic(definition),
        })
    }
}

/// Returns `true` if `definition` names one of PROJ's lat/long
/// pseudo projections.
fn is_geographic(definition: &str) -> bool {
    definition
        .split_whitespace()
        .filter_map(|param| param.strip_prefix("+proj="))
        .any(|name| matches!(name, "longlat" | "latlong" | "lonlat" | "latlon"))
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crs")
            .field("epsg", &self.epsg)
            .field("definition", &self.definition)
            .field("projected", &self.projected)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.epsg {
            Some(code) => write!(f, "EPSG:{code}"),
            None => f.write_str(&self.definition),
        }
    }
}

/// Accepts `EPSG:<code>`, a bare `<code>`, or a `+proj=` definition.
impl FromStr for Crs {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("+proj=") {
            return Self::from_proj_string(s);
        }
        let code = match s.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("epsg:") => &s[5..],
            _ => s,
        };
        code.trim()
            .parse::<u32>()
            .map_err(|_| TerrainError::InvalidCrs(s.to_string()))
            .and_then(Self::from_epsg)
    }
}

/// A coordinate tagged with the CRS it is expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    coord: Coord<C>,
    crs: Crs,
}

impl Position {
    /// Returns a new position, rejecting non-finite components.
    pub fn new(coord: Coord<C>, crs: Crs) -> Result<Self, TerrainError> {
        if coord.x.is_finite() && coord.y.is_finite() {
            Ok(Self { coord, crs })
        } else {
            Err(TerrainError::InvalidParameter(format!(
                "coordinate ({}, {}) is not finite",
                coord.x, coord.y
            )))
        }
    }

    pub fn coord(&self) -> Coord<C> {
        self.coord
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Returns this position expressed in `to`.
    pub fn to_crs(&self, to: &Crs) -> Result<Position, TerrainError> {
        if &self.crs == to {
            return Ok(self.clone());
        }
        Ok(Self {
            coord: self.crs.transform(self.coord, to)?,
            crs: to.clone(),
        })
    }
}

const WGS84_UTM: &str = "+datum=WGS84 +units=m +no_defs";
const ETRS89: &str = "+ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";
const DHDN: &str =
    "+ellps=bessel +towgs84=598.1,73.7,418.2,0.202,0.045,-2.455,6.7 +units=m +no_defs";

/// Returns the PROJ.4 definition of a supported EPSG code.
fn epsg_definition(code: u32) -> Option<String> {
    Some(match code {
        4326 => "+proj=longlat +datum=WGS84 +no_defs".to_string(),
        4258 => "+proj=longlat +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +no_defs".to_string(),
        3857 => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs".to_string(),
        3035 => format!("+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 {ETRS89}"),
        32601..=32660 => format!("+proj=utm +zone={} {WGS84_UTM}", code - 32600),
        32701..=32760 => format!("+proj=utm +zone={} +south {WGS84_UTM}", code - 32700),
        25828..=25838 => format!("+proj=utm +zone={} {ETRS89}", code - 25800),
        31466..=31469 => {
            // Gauss-Krüger zones 2 to 5.
            let zone = code - 31464;
            format!(
                "+proj=tmerc +lat_0=0 +lon_0={} +k=1 +x_0={}500000 +y_0=0 {DHDN}",
                zone * 3,
                zone
            )
        }
        _ => return None,
    })
}
