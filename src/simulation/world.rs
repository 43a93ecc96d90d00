//! Main simulation world that ties everything together
//!
//! The world owns the road network, the cars and the random source. Every
//! call to [`SimWorld::tick`] moves each car once and reports where it went.

use anyhow::{bail, Result};
use log::info;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand::SeedableRng;

use super::car::{CarUpdateResult, SimCar};
use super::config::SimConfig;
use super::road_network::SimRoadNetwork;
use super::speed::SpeedModel;
use super::types::{CarId, Position, CAR_MAKES};

/// Where one car ended up after a tick
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub car_id: CarId,
    pub position: Position,
    /// Speed in km/h after the tick
    pub speed: f64,
    /// Simulated seconds since the start of the run
    pub time: f64,
    pub outcome: CarUpdateResult,
}

/// Outcome counts for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub moved: usize,
    pub transferred: usize,
    pub stalled: usize,
    pub off_network: usize,
}

impl TickSummary {
    fn record(&mut self, outcome: CarUpdateResult) {
        match outcome {
            CarUpdateResult::Moved(_) => self.moved += 1,
            CarUpdateResult::Transferred { .. } => self.transferred += 1,
            CarUpdateResult::Stalled(_) => self.stalled += 1,
            CarUpdateResult::OffNetwork => self.off_network += 1,
        }
    }
}

/// The main simulation world
pub struct SimWorld {
    /// Road network cars drive on
    pub road_network: SimRoadNetwork,

    /// All cars, in id order
    pub cars: Vec<SimCar>,

    pub speed_model: SpeedModel,

    /// Simulation time in seconds
    pub time: f64,

    /// Outcome counts of the latest tick
    pub last_summary: TickSummary,

    rng: StdRng,
}

impl SimWorld {
    fn new_internal(road_network: SimRoadNetwork, speed_model: SpeedModel, rng: StdRng) -> Self {
        Self {
            road_network,
            cars: Vec::new(),
            speed_model,
            time: 0.0,
            last_summary: TickSummary::default(),
            rng,
        }
    }

    /// Create an empty world with an entropy-seeded RNG
    pub fn new(road_network: SimRoadNetwork) -> Self {
        Self::new_internal(road_network, SpeedModel::default(), StdRng::from_os_rng())
    }

    /// Create an empty world with a seeded RNG for reproducible simulations
    pub fn new_with_seed(road_network: SimRoadNetwork, seed: u64) -> Self {
        Self::new_internal(
            road_network,
            SpeedModel::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    /// Create a world from a config and spawn its cars
    pub fn from_config(road_network: SimRoadNetwork, config: &SimConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut world = Self::new_internal(road_network, config.speed_model(), rng);
        world.spawn_cars(config.car_count, config.min_speed, config.max_speed)?;
        Ok(world)
    }

    /// Add `count` cars at random places on random segments
    ///
    /// Ids continue from the highest id already in the world, starting at 1.
    /// Initial speeds are uniform in `[min_speed, max_speed]`, rounded to
    /// two decimals.
    pub fn spawn_cars(&mut self, count: usize, min_speed: f64, max_speed: f64) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if self.road_network.segment_count() == 0 {
            bail!("Cannot place cars on a road network without segments");
        }
        if !(0.0..=max_speed).contains(&min_speed) {
            bail!(
                "Invalid speed range [{}, {}]",
                min_speed,
                max_speed
            );
        }

        let mut next_id = self.cars.last().map(|car| car.id.0).unwrap_or(0) + 1;

        for _ in 0..count {
            let segment_index = self.rng.random_range(0..self.road_network.segment_count());
            let segment = &self.road_network.segments()[segment_index];
            let offset = self.rng.random_range(0.0..=segment.metric_length());
            let position = segment.interpolate(offset);

            let speed = (self.rng.random_range(min_speed..=max_speed) * 100.0).round() / 100.0;
            let forward = self.rng.random_bool(0.5);
            let name = CAR_MAKES.choose(&mut self.rng).copied().unwrap_or("Car");

            self.cars
                .push(SimCar::new(CarId(next_id), name, position, speed, forward));
            next_id += 1;
        }

        info!(
            "Spawned {} cars on {} road segments",
            count,
            self.road_network.segment_count()
        );
        Ok(())
    }

    /// Advance every car by `elapsed_secs` seconds
    pub fn tick(&mut self, elapsed_secs: f64) -> Vec<StepRecord> {
        self.time += elapsed_secs;
        let mut summary = TickSummary::default();
        let mut records = Vec::with_capacity(self.cars.len());

        for car in &mut self.cars {
            let outcome = car.update(
                elapsed_secs,
                &self.road_network,
                &self.speed_model,
                &mut self.rng,
            );
            summary.record(outcome);
            records.push(StepRecord {
                car_id: car.id,
                position: car.position,
                speed: car.speed,
                time: self.time,
                outcome,
            });
        }

        self.last_summary = summary;
        records
    }

    /// Get a car by ID
    pub fn get_car(&self, id: CarId) -> Option<&SimCar> {
        self.cars.iter().find(|car| car.id == id)
    }

    pub fn print_summary(&self) {
        info!("=== GPS Simulation Summary ===");
        info!("Time: {:.2}s", self.time);
        info!(
            "Roads: {} segments, {} junction links",
            self.road_network.segment_count(),
            self.road_network.link_count()
        );
        info!("Cars: {}", self.cars.len());
        info!(
            "Last tick: moved={}, transferred={}, stalled={}, off_network={}",
            self.last_summary.moved,
            self.last_summary.transferred,
            self.last_summary.stalled,
            self.last_summary.off_network
        );
    }
}
