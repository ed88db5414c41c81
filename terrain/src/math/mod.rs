mod geodesic;
mod linspace;

pub(crate) use {
    geodesic::{geodesic_distance, planar_distance},
    linspace::linspace,
};
