use crate::Affine;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoTileError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("GeoTIFF has neither a model transformation nor a tiepoint and pixel scale")]
    Georeference,

    #[error("pixel transform {0:?} is not invertible")]
    SingularTransform(Affine),

    #[error("band {index} out of range, tile has {count} band(s)")]
    Band { index: usize, count: usize },

    #[error("expected {expected} samples, found {actual}")]
    Size { expected: usize, actual: usize },
}
