//! Road network: immutable segments plus their endpoint adjacency
//!
//! The network is built once from the road file and only read afterwards,
//! so it can be shared between threads without locking.

use geo_types::{LineString, MultiLineString};
use log::debug;
use ordered_float::OrderedFloat;
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;
use thiserror::Error;

use super::crs::Crs;
use super::geometry::{distance, metric_length, Track};
use super::types::{Position, SegmentId};

/// Errors raised while setting up a road network
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("segment {segment:?} has a line with {vertices} vertices, at least 2 are required")]
    InvalidGeometry { segment: SegmentId, vertices: usize },

    #[error("unsupported coordinate reference system: {0}")]
    UnsupportedCrs(String),
}

/// Source geometry of one road feature
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentGeometry {
    /// A single polyline
    Simple(LineString<f64>),
    /// Several polylines forming one logical road
    Composite(MultiLineString<f64>),
}

impl SegmentGeometry {
    /// The simple lines making up this geometry
    pub fn lines(&self) -> &[LineString<f64>] {
        match self {
            SegmentGeometry::Simple(line) => std::slice::from_ref(line),
            SegmentGeometry::Composite(multi) => &multi.0,
        }
    }
}

impl From<LineString<f64>> for SegmentGeometry {
    fn from(line: LineString<f64>) -> Self {
        SegmentGeometry::Simple(line)
    }
}

impl From<MultiLineString<f64>> for SegmentGeometry {
    fn from(multi: MultiLineString<f64>) -> Self {
        SegmentGeometry::Composite(multi)
    }
}

/// Native and metric extent of one non-degenerate track edge
#[derive(Debug, Clone, Copy)]
struct EdgeScale {
    native_start: f64,
    native_length: f64,
    metric_start: f64,
    metric_length: f64,
}

impl EdgeScale {
    fn to_meters(&self, native: f64) -> f64 {
        self.metric_start + (native - self.native_start) * self.metric_length / self.native_length
    }

    fn to_native(&self, meters: f64) -> f64 {
        self.native_start + (meters - self.metric_start) * self.native_length / self.metric_length
    }
}

/// Measure every edge of `track` in both native units and meters
fn edge_scales(track: &Track, crs: Crs) -> Vec<EdgeScale> {
    let mut native_start = 0.0;
    let mut metric_start = 0.0;

    track
        .edges()
        .map(|edge| {
            let native_length = distance(edge.start, edge.end);
            let metric_length = distance(crs.to_metric(edge.start), crs.to_metric(edge.end));
            let scale = EdgeScale {
                native_start,
                native_length,
                metric_start,
                metric_length,
            };
            native_start += native_length;
            metric_start += metric_length;
            scale
        })
        .collect()
}

/// One road of the network
///
/// Arc-lengths handed out by [`Segment::project`] and accepted by
/// [`Segment::interpolate`] are in meters. Each edge converts between its
/// native length and its reprojected length on its own, so a geographic
/// segment turning from east to north still moves the right number of
/// meters on every edge.
#[derive(Debug, Clone)]
pub struct Segment {
    pub id: SegmentId,
    geometry: SegmentGeometry,
    track: Track,
    scales: Vec<EdgeScale>,
    metric_length: f64,
}

impl Segment {
    fn new(id: SegmentId, geometry: SegmentGeometry, crs: Crs) -> Result<Self, NetworkError> {
        let lines = geometry.lines();
        if lines.is_empty() {
            return Err(NetworkError::InvalidGeometry {
                segment: id,
                vertices: 0,
            });
        }
        if let Some(line) = lines.iter().find(|l| l.0.len() < 2) {
            return Err(NetworkError::InvalidGeometry {
                segment: id,
                vertices: line.0.len(),
            });
        }

        let track = match &geometry {
            SegmentGeometry::Simple(line) => Track::new(vec![line.clone()]),
            SegmentGeometry::Composite(multi) => Track::merged(&multi.0),
        };
        let scales = edge_scales(&track, crs);
        let metric_length = metric_length(lines, crs);

        Ok(Self {
            id,
            geometry,
            track,
            scales,
            metric_length,
        })
    }

    pub fn geometry(&self) -> &SegmentGeometry {
        &self.geometry
    }

    /// The geometry used for arc-length work, with connecting parts merged
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Length in meters
    pub fn metric_length(&self) -> f64 {
        self.metric_length
    }

    /// Distance in meters from the start of the segment to the point on it
    /// closest to `position`
    pub fn project(&self, position: Position) -> f64 {
        let native = self.track.project(position);
        let scale = self
            .scales
            .iter()
            .find(|s| native <= s.native_start + s.native_length)
            .or(self.scales.last());

        match scale {
            Some(scale) => scale.to_meters(native),
            None => 0.0,
        }
    }

    /// Point at `meters` along the segment, extrapolated when out of range
    pub fn interpolate(&self, meters: f64) -> Position {
        // Edges squashed to nothing by the latitude clamp cannot be inverted
        let mut scale = None;
        for s in self.scales.iter().filter(|s| s.metric_length > 0.0) {
            scale = Some(s);
            if meters <= s.metric_start + s.metric_length {
                break;
            }
        }

        let native = match scale {
            Some(scale) => scale.to_native(meters),
            None => 0.0,
        };
        self.track.interpolate(native)
    }

    /// Whether `position` is within `tolerance` native units of the segment
    pub fn within_tolerance(&self, position: Position, tolerance: f64) -> bool {
        self.track.within_tolerance(position, tolerance)
    }

    /// Native distance from `position` to the segment
    pub fn distance_to(&self, position: Position) -> f64 {
        self.track.distance_to(position)
    }
}

type EndpointKey = (OrderedFloat<f64>, OrderedFloat<f64>);

fn endpoint_key(position: Position) -> EndpointKey {
    (OrderedFloat(position.x), OrderedFloat(position.y))
}

/// Road network with segment adjacency
#[derive(Debug)]
pub struct SimRoadNetwork {
    crs: Crs,

    /// Segments in construction order
    segments: Vec<Segment>,

    /// Undirected graph with one node per segment and an edge between
    /// segments that share an endpoint
    graph: UnGraph<SegmentId, ()>,

    /// Neighbours of each segment sorted by id
    adjacency: Vec<Vec<SegmentId>>,
}

impl SimRoadNetwork {
    /// Build the network, measuring every segment and linking shared endpoints
    pub fn build<I>(geometries: I, crs: Crs) -> Result<Self, NetworkError>
    where
        I: IntoIterator,
        I::Item: Into<SegmentGeometry>,
    {
        let segments = geometries
            .into_iter()
            .enumerate()
            .map(|(index, geometry)| Segment::new(SegmentId(index), geometry.into(), crs))
            .collect::<Result<Vec<_>, _>>()?;

        let mut graph = UnGraph::with_capacity(segments.len(), segments.len());
        for segment in &segments {
            graph.add_node(segment.id);
        }

        // Segments touching each endpoint coordinate
        let mut endpoints: HashMap<EndpointKey, Vec<SegmentId>> = HashMap::new();
        for segment in &segments {
            for line in segment.geometry.lines() {
                for position in [line.0[0], line.0[line.0.len() - 1]] {
                    let touching = endpoints.entry(endpoint_key(position)).or_default();
                    if !touching.contains(&segment.id) {
                        touching.push(segment.id);
                    }
                }
            }
        }

        for touching in endpoints.values() {
            for (i, a) in touching.iter().enumerate() {
                for b in &touching[i + 1..] {
                    graph.update_edge(NodeIndex::new(a.0), NodeIndex::new(b.0), ());
                }
            }
        }

        let adjacency = segments
            .iter()
            .map(|segment| {
                let mut neighbours: Vec<SegmentId> = graph
                    .neighbors(NodeIndex::new(segment.id.0))
                    .map(|node| graph[node])
                    .collect();
                neighbours.sort();
                neighbours
            })
            .collect();

        debug!(
            "Built road network: {} segments, {} junction links, {} connected groups",
            segments.len(),
            graph.edge_count(),
            connected_components(&graph)
        );

        Ok(Self {
            crs,
            segments,
            graph,
            adjacency,
        })
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Gets a segment by ID
    pub fn get_segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0)
    }

    /// Get number of segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of distinct segment pairs sharing an endpoint
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Segments sharing an endpoint with `id`, sorted by id
    pub fn adjacent(&self, id: SegmentId) -> &[SegmentId] {
        self.adjacency.get(id.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First segment, in construction order, whose buffer contains `position`
    pub fn containing(&self, position: Position, tolerance: f64) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|segment| segment.within_tolerance(position, tolerance))
    }

    /// The segment adjacent to `id` closest to `position`
    ///
    /// Exact distance ties go to the lowest segment id.
    pub fn nearest_adjacent(&self, id: SegmentId, position: Position) -> Option<&Segment> {
        let mut closest: Option<(&Segment, f64)> = None;

        for neighbour in self.adjacent(id) {
            let Some(segment) = self.get_segment(*neighbour) else {
                continue;
            };
            let distance = segment.distance_to(position);
            let closer = match closest {
                Some((_, best)) => distance < best,
                None => true,
            };
            if closer {
                closest = Some((segment, distance));
            }
        }

        closest.map(|(segment, _)| segment)
    }
}
