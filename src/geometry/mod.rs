//! Geometry contract consumed by the spatial filters.
//!
//! The filters only ever ask one boolean question: is this coordinate inside
//! the area? Anything answering that question (a bounding box, a polygon
//! test, a tile mask) plugs in via [`Area`]. The same `Area` instance is the
//! single containment oracle for both the membership pass and the derived
//! extra-inclusion logic, so boundary tie-breaks stay consistent by
//! construction.

/// Boolean containment test over (lat, lon) coordinates.
pub trait Area {
    /// True if the coordinate lies inside the area.
    fn contains(&self, lat: f64, lon: f64) -> bool;
}

impl<A: Area + ?Sized> Area for &A {
    #[inline]
    fn contains(&self, lat: f64, lon: f64) -> bool {
        (**self).contains(lat, lon)
    }
}

impl<A: Area + ?Sized> Area for Box<A> {
    #[inline]
    fn contains(&self, lat: f64, lon: f64) -> bool {
        (**self).contains(lat, lon)
    }
}

/// An axis-aligned bounding box with **half-open** semantics: the minimum
/// edge is inclusive, the maximum edge exclusive. Adjacent tiles that share
/// an edge therefore never double-count a point sitting exactly on it.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    /// Inclusive minimum latitude.
    pub min_lat: f64,
    /// Exclusive maximum latitude.
    pub max_lat: f64,
    /// Inclusive minimum longitude.
    pub min_lon: f64,
    /// Exclusive maximum longitude.
    pub max_lon: f64,
}

impl BoundingBox {
    /// Creates a box from its corner coordinates.
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }
}

impl Area for BoundingBox {
    #[inline]
    fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat < self.max_lat && lon >= self.min_lon && lon < self.max_lon
    }
}
