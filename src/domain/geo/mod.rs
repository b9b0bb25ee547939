//! Geographic primitives - coordinates and the gazetteer

mod coordinates;
mod gazetteer;

pub use coordinates::Coordinates;
pub use gazetteer::{county_centroid, Gazetteer, GazetteerEntry, COUNTY_CENTROIDS};
