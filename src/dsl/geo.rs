//! Geometry operands for `$geoIntersects`, `$geoWithin`, `$near`, and
//! `$nearSphere`.

use serde::ser::{ Serialize, Serializer, SerializeMap };

/// A `[longitude, latitude]` pair, as GeoJSON and the legacy coordinate
/// shapes below both expect.
pub type Point = [f64; 2];

/// A GeoJSON geometry object, serialized as `{type: "...", coordinates: ...}`.
/// Used as the operand of `$geoIntersects`, `$geoWithin`, `$near`, and
/// `$nearSphere` (always under a `$geometry` key).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// A single point.
    Point(Point),
    /// An open or closed sequence of points.
    LineString(Vec<Point>),
    /// A sequence of linear rings: the first is the exterior, the rest holes.
    Polygon(Vec<Vec<Point>>),
    /// Several points.
    MultiPoint(Vec<Point>),
    /// Several line strings.
    MultiLineString(Vec<Vec<Point>>),
    /// Several polygons.
    MultiPolygon(Vec<Vec<Vec<Point>>>),
}

/// The legacy coordinate-pair shapes accepted by `$geoWithin` alongside
/// GeoJSON geometries. Each serializes to a single-key document naming its
/// own operator, e.g. `{"$box": [[0,0],[1,1]]}`.
#[derive(Debug, Clone, PartialEq)]
pub enum WithinShape {
    /// An axis-aligned rectangle given by its two opposite corners.
    Box([Point; 2]),
    /// A flat-plane circle given by its center and radius.
    Center {
        /// The circle's center.
        center: Point,
        /// The circle's radius, in the same units as the coordinates.
        radius: f64,
    },
    /// A spherical-surface circle given by its center and radius (radians).
    CenterSphere {
        /// The circle's center.
        center: Point,
        /// The circle's radius, in radians.
        radius: f64,
    },
    /// An arbitrary (flat-plane) polygon given by its vertices.
    Polygon(Vec<Point>),
}

impl Serialize for WithinShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;

        match self {
            WithinShape::Box(corners) => map.serialize_entry("$box", corners)?,
            WithinShape::Center { center, radius } => map.serialize_entry("$center", &(center, radius))?,
            WithinShape::CenterSphere { center, radius } => map.serialize_entry("$centerSphere", &(center, radius))?,
            WithinShape::Polygon(points) => map.serialize_entry("$polygon", points)?,
        }

        map.end()
    }
}
