//! Polyline geometry: arc-length projection, interpolation and length
//!
//! All functions here work in whatever units the coordinates are in.
//! Conversion into meters is layered on top by [`super::road_network::Segment`].

#[allow(deprecated)]
use geo::{EuclideanDistance, EuclideanLength};
use geo::{Line, LineLocatePoint, LineString, Point};

use super::crs::Crs;
use super::types::Position;

/// Euclidean distance between two coordinates
#[allow(deprecated)]
pub fn distance(a: Position, b: Position) -> f64 {
    Point::from(a).euclidean_distance(&Point::from(b))
}

/// Length of a single polyline
#[allow(deprecated)]
pub fn line_length(line: &LineString<f64>) -> f64 {
    line.euclidean_length()
}

/// Length of a set of polylines after reprojecting into the metric CRS
///
/// Each part is measured independently, so gaps between disconnected parts
/// never contribute.
pub fn metric_length(parts: &[LineString<f64>], source_crs: Crs) -> f64 {
    parts
        .iter()
        .map(|part| {
            let metric: LineString<f64> = part.coords().map(|c| source_crs.to_metric(*c)).collect();
            line_length(&metric)
        })
        .sum()
}

/// Chain polylines that meet end to end into as few polylines as possible
///
/// Two parts are only joined through an endpoint that exactly two part ends
/// share; where three or more parts meet, every branch keeps its own
/// polyline. Parts are reversed where needed so that they join up. Parts
/// that touch nothing are returned unchanged, in their original relative
/// order.
pub fn merge_parts(parts: &[LineString<f64>]) -> Vec<LineString<f64>> {
    let mut pending: Vec<Vec<Position>> = parts
        .iter()
        .filter(|p| !p.0.is_empty())
        .map(|p| p.0.clone())
        .collect();

    let ends: Vec<Position> = pending
        .iter()
        .flat_map(|c| [c[0], c[c.len() - 1]])
        .collect();
    let joinable = |position: Position| ends.iter().filter(|e| **e == position).count() == 2;

    let mut merged = Vec::new();

    while !pending.is_empty() {
        let mut chain = pending.remove(0);

        loop {
            let head = chain[0];
            let tail = chain[chain.len() - 1];
            let join_tail = joinable(tail);
            let join_head = joinable(head);

            let Some(index) = pending.iter().position(|c| {
                let (first, last) = (c[0], c[c.len() - 1]);
                (join_tail && (first == tail || last == tail))
                    || (join_head && (first == head || last == head))
            }) else {
                break;
            };

            let mut next = pending.remove(index);
            let (first, last) = (next[0], next[next.len() - 1]);

            if join_tail && first == tail {
                chain.extend(next.into_iter().skip(1));
            } else if join_tail && last == tail {
                next.reverse();
                chain.extend(next.into_iter().skip(1));
            } else {
                if first == head {
                    next.reverse();
                }
                // `next` now ends where `chain` starts
                next.pop();
                next.extend(chain);
                chain = next;
            }
        }

        merged.push(LineString::from(chain));
    }

    merged
}

/// A polyline, or several disconnected polylines, parameterized by arc-length
///
/// Arc-length runs through the parts in order; the gaps between parts are
/// not counted.
#[derive(Debug, Clone)]
pub struct Track {
    parts: Vec<LineString<f64>>,
    length: f64,
}

impl Track {
    pub fn new(parts: Vec<LineString<f64>>) -> Self {
        let length = parts.iter().map(line_length).sum();
        Self { parts, length }
    }

    /// Build a track from parts, merging the ones that connect end to end
    pub fn merged(parts: &[LineString<f64>]) -> Self {
        Self::new(merge_parts(parts))
    }

    pub fn parts(&self) -> &[LineString<f64>] {
        &self.parts
    }

    /// Total arc-length
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Arc-length from the start of the track to the point closest to `point`
    ///
    /// On an exact distance tie the earliest position along the track wins.
    #[allow(deprecated)]
    pub fn project(&self, point: Position) -> f64 {
        let point = Point::from(point);
        let mut best: Option<(f64, f64)> = None;
        let mut offset = 0.0;

        for line in self.parts.iter().flat_map(|p| p.lines()) {
            let edge_length = line.euclidean_length();
            let fraction = line
                .line_locate_point(&point)
                .filter(|f| f.is_finite())
                .unwrap_or(0.0);
            let dist = line.euclidean_distance(&point);

            let closer = match best {
                Some((_, best_dist)) => dist < best_dist,
                None => true,
            };
            if closer {
                best = Some((offset + fraction * edge_length, dist));
            }
            offset += edge_length;
        }

        best.map(|(arc, _)| arc).unwrap_or(0.0)
    }

    /// Point at the given arc-length
    ///
    /// Distances before the start or past the end are extrapolated along the
    /// first or last non-degenerate edge, so the result leaves the track.
    pub fn interpolate(&self, arc: f64) -> Position {
        let Some(first_edge) = self.edges().next() else {
            // Every vertex coincides: the track is a single point
            return self
                .parts
                .iter()
                .find_map(|p| p.0.first().copied())
                .unwrap_or(Position { x: 0.0, y: 0.0 });
        };

        if arc < 0.0 {
            return along(first_edge, arc);
        }

        let mut travelled = 0.0;
        let mut last_edge = first_edge;
        for edge in self.edges() {
            let edge_length = distance(edge.start, edge.end);
            if arc <= travelled + edge_length {
                return along(edge, arc - travelled);
            }
            travelled += edge_length;
            last_edge = edge;
        }

        along(last_edge, arc - travelled + distance(last_edge.start, last_edge.end))
    }

    /// Non-degenerate edges of every part, in arc-length order
    ///
    /// Degenerate edges have no length, so summing the lengths of the edges
    /// before one gives its arc-length offset.
    pub fn edges(&self) -> impl Iterator<Item = Line<f64>> + '_ {
        self.parts
            .iter()
            .flat_map(|p| p.lines())
            .filter(|l| l.start != l.end)
    }

    /// Shortest distance from `point` to any part of the track
    #[allow(deprecated)]
    pub fn distance_to(&self, point: Position) -> f64 {
        let point = Point::from(point);
        self.parts
            .iter()
            .map(|part| part.euclidean_distance(&point))
            .fold(f64::INFINITY, f64::min)
    }

    /// Whether `point` lies inside the track buffered by `tolerance`
    pub fn within_tolerance(&self, point: Position, tolerance: f64) -> bool {
        self.distance_to(point) <= tolerance
    }
}

/// Point `offset` units from the start of `edge` along its direction
///
/// Offsets outside `[0, edge length]` land on the edge's extension.
fn along(edge: Line<f64>, offset: f64) -> Position {
    let length = distance(edge.start, edge.end);
    if length == 0.0 {
        return edge.start;
    }
    edge.start + edge.delta() * (offset / length)
}
