use std::collections::VecDeque;

use serde::Serialize;

use crate::detect::Point;

/// Time-ordered positions believed to belong to one vehicle.
///
/// Only the counter can extend or trim a trajectory; everything else gets
/// read access.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trajectory {
    id: u64,
    points: VecDeque<Point>,
    missed_frames: u32,
}

impl Trajectory {
    pub(crate) fn seed(id: u64, point: Point) -> Self {
        let mut points = VecDeque::with_capacity(2);
        points.push_back(point);
        Self {
            id,
            points,
            missed_frames: 0,
        }
    }

    /// Sequence number assigned when the trajectory was seeded.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Points, oldest first.
    pub fn points(&self) -> impl ExactSizeIterator<Item = &Point> + '_ {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consecutive frames without a matching detection.
    pub fn missed_frames(&self) -> u32 {
        self.missed_frames
    }

    pub fn last(&self) -> Option<Point> {
        self.points.back().copied()
    }

    /// The two most recent points as `(previous, current)`.
    pub fn last_step(&self) -> Option<(Point, Point)> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        Some((self.points[n - 2], self.points[n - 1]))
    }

    /// Where the vehicle should be next frame.
    ///
    /// A single point predicts no motion; otherwise the last step is repeated
    /// (`2 * last - second_to_last`).
    pub fn predicted_position(&self) -> Option<Point> {
        match self.last_step() {
            Some((prev, curr)) => Some(Point::new(2.0 * curr.x - prev.x, 2.0 * curr.y - prev.y)),
            None => self.last(),
        }
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push_back(point);
        self.missed_frames = 0;
    }

    pub(crate) fn coast(&mut self) {
        self.missed_frames = self.missed_frames.saturating_add(1);
    }

    /// Drop the oldest points until at most `window` remain.
    pub(crate) fn keep_last(&mut self, window: usize) {
        while self.points.len() > window {
            self.points.pop_front();
        }
    }
}
