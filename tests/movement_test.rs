//! Movement engine tests
//!
//! Networks use Web Mercator coordinates so native units are meters,
//! except the geographic corner, which checks the metric distance covered.

use geo_types::{line_string, Coord, MultiLineString};
use gps_sim::simulation::{
    CarId, CarUpdateResult, Crs, SegmentGeometry, SegmentId, SimCar, SimRoadNetwork, SpeedModel,
    BUFFER_TOLERANCE,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn straight_road() -> SimRoadNetwork {
    SimRoadNetwork::build(
        vec![line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)]],
        Crs::WebMercator,
    )
    .unwrap()
}

/// A runs east to (100, 0), B runs north from there
fn corner_roads() -> SimRoadNetwork {
    SimRoadNetwork::build(
        vec![
            line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)],
            line_string![(x: 100.0, y: 0.0), (x: 100.0, y: 100.0)],
        ],
        Crs::WebMercator,
    )
    .unwrap()
}

fn car_at(x: f64, y: f64, speed: f64, forward: bool) -> SimCar {
    SimCar::new(CarId(1), "Tesla", Coord { x, y }, speed, forward)
}

#[test]
fn test_forward_move_along_straight_road() {
    let network = straight_road();
    let mut rng = StdRng::seed_from_u64(42);
    let mut car = car_at(20.0, 0.0, 36.0, true);

    let result = car.update(5.0, &network, &SpeedModel::default(), &mut rng);

    assert_eq!(result, CarUpdateResult::Moved(SegmentId(0)));
    assert!((car.position.x - 70.0).abs() < 1e-9);
    assert!(car.position.y.abs() < 1e-9);
    assert!(car.forward);
    // 30 m of 100 m left: free drift of at most 10 km/h either way
    assert!((26.0..=46.0).contains(&car.speed), "speed {}", car.speed);
}

#[test]
fn test_backward_move_along_straight_road() {
    let network = straight_road();
    let mut rng = StdRng::seed_from_u64(7);
    let mut car = car_at(80.0, 0.0, 36.0, false);

    let result = car.update(5.0, &network, &SpeedModel::default(), &mut rng);

    assert_eq!(result, CarUpdateResult::Moved(SegmentId(0)));
    assert!((car.position.x - 30.0).abs() < 1e-9);
    assert!(!car.forward);
}

#[test]
fn test_zero_elapsed_time_keeps_position() {
    let network = corner_roads();
    let mut rng = StdRng::seed_from_u64(1);

    for (x, y, forward) in [(0.0, 0.0, true), (55.5, 0.0, false), (100.0, 40.0, true)] {
        let mut car = car_at(x, y, 30.0, forward);
        let result = car.update(0.0, &network, &SpeedModel::default(), &mut rng);

        assert!(matches!(result, CarUpdateResult::Moved(_)));
        assert!((car.position.x - x).abs() < 1e-9);
        assert!((car.position.y - y).abs() < 1e-9);
        assert_eq!(car.forward, forward);
    }
}

#[test]
fn test_dead_end_stalls_and_turns_once() {
    let network = straight_road();
    let mut rng = StdRng::seed_from_u64(3);
    let mut car = car_at(100.0, 0.0, 36.0, true);

    let result = car.update(1.0, &network, &SpeedModel::default(), &mut rng);

    assert_eq!(result, CarUpdateResult::Stalled(SegmentId(0)));
    assert_eq!(car.speed, 0.0);
    assert!(!car.forward);
    assert_eq!(car.position, Coord { x: 100.0, y: 0.0 });

    // Stationary on the next tick, facing the same way
    let result = car.update(1.0, &network, &SpeedModel::default(), &mut rng);
    assert_eq!(result, CarUpdateResult::Moved(SegmentId(0)));
    assert_eq!(car.position, Coord { x: 100.0, y: 0.0 });
    assert!(!car.forward);
}

#[test]
fn test_overshoot_moves_car_to_connected_segment() {
    let network = corner_roads();
    let mut rng = StdRng::seed_from_u64(9);
    let mut car = car_at(90.0, 0.0, 36.0, true);

    let result = car.update(5.0, &network, &SpeedModel::default(), &mut rng);

    assert_eq!(
        result,
        CarUpdateResult::Transferred {
            from: SegmentId(0),
            to: SegmentId(1)
        }
    );
    let b = network.get_segment(SegmentId(1)).unwrap();
    assert!(b.within_tolerance(car.position, BUFFER_TOLERANCE));
    assert_eq!(car.position, Coord { x: 100.0, y: 0.0 });
    assert!(!car.forward);
    // Speed is left alone on a transfer
    assert_eq!(car.speed, 36.0);
}

#[test]
fn test_backward_overshoot_past_start() {
    let network = corner_roads();
    let mut rng = StdRng::seed_from_u64(11);
    // On B heading back toward the junction
    let mut car = car_at(100.0, 5.0, 36.0, false);

    let result = car.update(1.0, &network, &SpeedModel::default(), &mut rng);

    assert_eq!(
        result,
        CarUpdateResult::Transferred {
            from: SegmentId(1),
            to: SegmentId(0)
        }
    );
    // Snapped onto A at the point closest to where it was
    assert_eq!(car.position, Coord { x: 100.0, y: 0.0 });
    assert!(car.forward);
}

#[test]
fn test_off_network_car_is_left_alone() {
    let network = straight_road();
    let mut rng = StdRng::seed_from_u64(5);
    let mut car = car_at(50.0, 50.0, 40.0, true);
    let before = car.clone();

    let result = car.update(10.0, &network, &SpeedModel::default(), &mut rng);

    assert_eq!(result, CarUpdateResult::OffNetwork);
    assert_eq!(car, before);
}

#[test]
fn test_fast_car_slows_near_segment_end() {
    let network = straight_road();
    let mut rng = StdRng::seed_from_u64(21);

    for _ in 0..50 {
        let mut car = car_at(85.0, 0.0, 50.0, true);
        car.update(0.0, &network, &SpeedModel::default(), &mut rng);
        assert!((40.0..=50.0).contains(&car.speed), "speed {}", car.speed);
    }
}

#[test]
fn test_slow_car_speeds_up_near_segment_end() {
    let network = straight_road();
    let mut rng = StdRng::seed_from_u64(22);

    for _ in 0..50 {
        let mut car = car_at(85.0, 0.0, 5.0, true);
        car.update(0.0, &network, &SpeedModel::default(), &mut rng);
        assert!((5.0..=15.0).contains(&car.speed), "speed {}", car.speed);
    }
}

#[test]
fn test_car_follows_merged_composite_segment() {
    let network = SimRoadNetwork::build(
        vec![SegmentGeometry::Composite(MultiLineString(vec![
            line_string![(x: 50.0, y: 0.0), (x: 100.0, y: 0.0)],
            line_string![(x: 0.0, y: 0.0), (x: 50.0, y: 0.0)],
        ]))],
        Crs::WebMercator,
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(8);
    let mut car = car_at(40.0, 0.0, 36.0, true);

    let result = car.update(2.0, &network, &SpeedModel::default(), &mut rng);

    assert_eq!(result, CarUpdateResult::Moved(SegmentId(0)));
    assert!((car.position.x - 60.0).abs() < 1e-9);
}

#[test]
fn test_car_is_evaluated_against_first_containing_segment() {
    let network = corner_roads();
    let mut rng = StdRng::seed_from_u64(4);
    // At the junction, which A claims first; heading backwards along A
    let mut car = car_at(100.0, 0.0, 36.0, false);

    let result = car.update(1.0, &network, &SpeedModel::default(), &mut rng);

    assert_eq!(result, CarUpdateResult::Moved(SegmentId(0)));
    assert!((car.position.x - 90.0).abs() < 1e-9);
}

/// Geographic L: east along 50°N, then north. A degree of latitude is much
/// longer in Web Mercator meters than a degree of longitude here.
fn geographic_corner() -> SimRoadNetwork {
    SimRoadNetwork::build(
        vec![line_string![(x: 0.0, y: 50.0), (x: 0.001, y: 50.0), (x: 0.001, y: 50.001)]],
        Crs::Wgs84,
    )
    .unwrap()
}

fn mercator_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let (a, b) = (Crs::Wgs84.to_metric(a), Crs::Wgs84.to_metric(b));
    (b.x - a.x).hypot(b.y - a.y)
}

#[test]
fn test_geographic_move_covers_metric_distance() {
    let network = geographic_corner();
    let mut rng = StdRng::seed_from_u64(12);
    let start = Coord { x: 0.0, y: 50.0 };
    let mut car = car_at(start.x, start.y, 36.0, true);

    // 36 km/h for 10 s, still on the first edge
    let result = car.update(10.0, &network, &SpeedModel::default(), &mut rng);

    assert_eq!(result, CarUpdateResult::Moved(SegmentId(0)));
    assert!((car.position.y - 50.0).abs() < 1e-12);
    let moved = mercator_distance(start, car.position);
    assert!((moved - 100.0).abs() < 1e-6, "moved {} m", moved);
}

#[test]
fn test_geographic_move_around_corner_covers_metric_distance() {
    let network = geographic_corner();
    let segment = &network.segments()[0];
    let mut rng = StdRng::seed_from_u64(13);
    let start = Coord { x: 0.0, y: 50.0 };
    let corner = Coord { x: 0.001, y: 50.0 };
    let mut car = car_at(start.x, start.y, 36.0, true);

    // 200 m: past the corner and onto the northbound edge
    let result = car.update(20.0, &network, &SpeedModel::default(), &mut rng);

    assert_eq!(result, CarUpdateResult::Moved(SegmentId(0)));
    assert!(segment.within_tolerance(car.position, BUFFER_TOLERANCE));
    assert!((car.position.x - 0.001).abs() < 1e-12);
    assert!(car.position.y > 50.0);

    let moved = mercator_distance(start, corner) + mercator_distance(corner, car.position);
    assert!((moved - 200.0).abs() < 1e-2, "moved {} m", moved);
    assert!((segment.project(car.position) - 200.0).abs() < 1e-6);
}
