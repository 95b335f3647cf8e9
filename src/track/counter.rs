use anyhow::Result;
use serde::Serialize;

use crate::detect::{Detection, Point};
use crate::exit::ExitRegionSet;
use crate::pipeline::{FrameRecord, Stage, StageDescriptor};
use crate::track::trajectory::Trajectory;
use crate::{require_positive, ConfigurationError};

pub const DEFAULT_PATH_SIZE: usize = 10;
pub const DEFAULT_MAX_DISTANCE: f64 = 30.0;
pub const DEFAULT_AXIS_WEIGHT: f64 = 1.0;
pub const DEFAULT_MAX_COAST_FRAMES: u32 = 5;

/// Tuning for `VehicleCounter`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CounterSettings {
    /// Points kept per path, and the minimum path length for a count.
    pub path_size: usize,
    /// Largest weighted distance at which a detection may extend a path.
    pub max_distance: f64,
    /// Horizontal scale inside the distance metric.
    pub x_weight: f64,
    /// Vertical scale inside the distance metric. Raise it above `x_weight`
    /// when traffic moves vertically through the frame.
    pub y_weight: f64,
    /// Consecutive unmatched frames a path survives. One more and it is
    /// abandoned.
    pub max_coast_frames: u32,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            path_size: DEFAULT_PATH_SIZE,
            max_distance: DEFAULT_MAX_DISTANCE,
            x_weight: DEFAULT_AXIS_WEIGHT,
            y_weight: DEFAULT_AXIS_WEIGHT,
            max_coast_frames: DEFAULT_MAX_COAST_FRAMES,
        }
    }
}

impl CounterSettings {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.path_size == 0 {
            return Err(ConfigurationError::new("path_size", "must be > 0"));
        }
        require_positive("max_distance", self.max_distance)?;
        require_positive("x_weight", self.x_weight)?;
        require_positive("y_weight", self.y_weight)?;
        if self.max_coast_frames == 0 {
            return Err(ConfigurationError::new("max_coast_frames", "must be > 0"));
        }
        Ok(())
    }
}

/// A path counted during the most recent update.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Crossing {
    pub path_id: u64,
    /// Last point outside every exit region.
    pub from: Point,
    /// First point inside an exit region.
    pub to: Point,
}

/// Links per-frame detections into paths and counts exit crossings.
///
/// Matching is greedy: paths are visited in the order they were created and
/// each takes the nearest unclaimed detection to its predicted position.
/// Results therefore depend on that order, which is kept stable so that
/// replaying the same detections always gives the same paths and count.
#[derive(Clone, Debug)]
pub struct VehicleCounter {
    exits: ExitRegionSet,
    settings: CounterSettings,
    paths: Vec<Trajectory>,
    vehicle_count: u64,
    next_path_id: u64,
    crossings: Vec<Crossing>,
}

impl VehicleCounter {
    pub fn new(
        exits: ExitRegionSet,
        settings: CounterSettings,
    ) -> Result<Self, ConfigurationError> {
        settings.validate()?;
        Ok(Self {
            exits,
            settings,
            paths: Vec::new(),
            vehicle_count: 0,
            next_path_id: 0,
            crossings: Vec::new(),
        })
    }

    pub fn settings(&self) -> &CounterSettings {
        &self.settings
    }

    pub fn exits(&self) -> &ExitRegionSet {
        &self.exits
    }

    /// Live paths, in matching order.
    pub fn paths(&self) -> &[Trajectory] {
        &self.paths
    }

    /// Vehicles counted since construction. Never decreases.
    pub fn vehicle_count(&self) -> u64 {
        self.vehicle_count
    }

    /// Crossings confirmed by the most recent `update`.
    pub fn last_crossings(&self) -> &[Crossing] {
        &self.crossings
    }

    pub fn is_in_exit(&self, point: Point) -> bool {
        self.exits.contains(point)
    }

    /// Advance one frame.
    pub fn update(&mut self, detections: &[Detection]) {
        self.crossings.clear();
        let mut unclaimed: Vec<Point> = detections.iter().map(|d| d.centroid).collect();

        if self.paths.is_empty() {
            // Seeded even inside exit regions, unlike the leftovers below.
            for centroid in unclaimed {
                self.seed(centroid);
            }
        } else {
            self.associate(&mut unclaimed);
            for centroid in unclaimed {
                if self.exits.contains(centroid) {
                    log::trace!("skipping new path already inside exit at {:?}", centroid);
                    continue;
                }
                self.seed(centroid);
            }
        }

        let window = self.settings.path_size;
        for path in &mut self.paths {
            path.keep_last(window);
        }

        self.count_and_prune();

        log::trace!(
            "{} live paths, {} vehicles counted",
            self.paths.len(),
            self.vehicle_count
        );
    }

    fn seed(&mut self, point: Point) {
        self.paths.push(Trajectory::seed(self.next_path_id, point));
        self.next_path_id += 1;
    }

    fn associate(&mut self, unclaimed: &mut Vec<Point>) {
        let settings = self.settings;
        for path in &mut self.paths {
            let matched = path
                .predicted_position()
                .and_then(|predicted| nearest(unclaimed, predicted, &settings))
                .filter(|&(_, distance)| distance <= settings.max_distance);
            match matched {
                Some((index, _)) => path.push(unclaimed.remove(index)),
                // Nothing in reach: the path coasts this frame.
                None => path.coast(),
            }
        }
    }

    fn count_and_prune(&mut self) {
        let window = self.settings.path_size;
        let paths = std::mem::take(&mut self.paths);
        let mut retained = Vec::with_capacity(paths.len());

        for path in paths {
            if let Some((prev, curr)) = path.last_step() {
                if path.len() >= window && !self.exits.contains(prev) && self.exits.contains(curr)
                {
                    self.vehicle_count += 1;
                    log::debug!(
                        "path {} entered exit at ({:.1}, {:.1}); vehicles found: {}",
                        path.id(),
                        curr.x,
                        curr.y,
                        self.vehicle_count
                    );
                    self.crossings.push(Crossing {
                        path_id: path.id(),
                        from: prev,
                        to: curr,
                    });
                    continue;
                }
            }

            if path.missed_frames() > self.settings.max_coast_frames {
                log::trace!(
                    "abandoning path {} after {} missed frames",
                    path.id(),
                    path.missed_frames()
                );
                continue;
            }

            // Paths stranded inside exit territory must not pick up new
            // detections.
            if path.points().all(|p| self.exits.contains(*p)) {
                log::trace!("pruning path {} stranded inside exit", path.id());
                continue;
            }
            retained.push(path);
        }

        self.paths = retained;
    }
}

/// Weighted Euclidean distance: `sqrt((xw * dx)^2 + (yw * dy)^2)`.
pub(crate) fn weighted_distance(a: Point, b: Point, settings: &CounterSettings) -> f64 {
    let dx = settings.x_weight * (a.x - b.x);
    let dy = settings.y_weight * (a.y - b.y);
    (dx * dx + dy * dy).sqrt()
}

/// Index and distance of the candidate closest to `target`. The first of
/// equally close candidates wins.
fn nearest(
    candidates: &[Point],
    target: Point,
    settings: &CounterSettings,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let distance = weighted_distance(*candidate, target, settings);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ if distance.is_nan() => {}
            _ => best = Some((index, distance)),
        }
    }
    best
}

impl Stage for VehicleCounter {
    fn descriptor(&self) -> StageDescriptor {
        StageDescriptor {
            name: "vehicle_counter",
        }
    }

    fn process(&mut self, mut record: FrameRecord) -> Result<FrameRecord> {
        self.update(&record.detections);
        record.paths = self.paths.clone();
        record.crossings = self.crossings.clone();
        record.vehicle_count = self.vehicle_count;
        Ok(record)
    }
}
