//! Ring buffer of polygon snapshots trailing behind a shape.

use mystify_core::{ConfigError, Point, RandomSource, Velocity, Viewport, MIN_POINT_COUNT};
use mystify_system_motion::Motion;

/// Fixed-capacity ring of polygon snapshots belonging to one shape.
///
/// Snapshots live in a single arena indexed by `(slot, vertex)`; the arena is
/// sized at construction and never reallocated. The slot at
/// [`lead_index`](Self::lead_index) holds the newest snapshot and the slot
/// `k` positions behind it holds the snapshot from `k` ticks ago.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrailBuffer {
    points: Vec<Point>,
    point_count: usize,
    trail_length: usize,
    lead_index: usize,
}

impl TrailBuffer {
    /// Creates a buffer whose every slot equals `initial`.
    pub fn new(initial: &[Point], trail_length: usize) -> Result<Self, ConfigError> {
        if trail_length == 0 {
            return Err(ConfigError::EmptyTrail);
        }
        if initial.len() < MIN_POINT_COUNT as usize {
            return Err(ConfigError::TooFewPoints {
                point_count: u32::try_from(initial.len()).unwrap_or(u32::MAX),
            });
        }

        let mut points = Vec::with_capacity(initial.len() * trail_length);
        for _ in 0..trail_length {
            points.extend_from_slice(initial);
        }

        Ok(Self {
            points,
            point_count: initial.len(),
            trail_length,
            lead_index: 0,
        })
    }

    /// Number of vertices in every snapshot.
    #[must_use]
    pub const fn point_count(&self) -> usize {
        self.point_count
    }

    /// Number of snapshots kept, the lead included.
    #[must_use]
    pub const fn trail_length(&self) -> usize {
        self.trail_length
    }

    /// Slot holding the most recently computed snapshot.
    #[must_use]
    pub const fn lead_index(&self) -> usize {
        self.lead_index
    }

    /// Most recently computed snapshot.
    #[must_use]
    pub fn lead(&self) -> &[Point] {
        self.slot(self.lead_index)
    }

    /// Snapshot stored in `slot`, if the slot exists.
    #[must_use]
    pub fn polygon(&self, slot: usize) -> Option<&[Point]> {
        (slot < self.trail_length).then(|| self.slot(slot))
    }

    /// Lead snapshot from `ticks_ago` ticks ago, while it is still retained.
    #[must_use]
    pub fn polygon_ago(&self, ticks_ago: usize) -> Option<&[Point]> {
        if ticks_ago >= self.trail_length {
            return None;
        }
        let slot = (self.lead_index + self.trail_length - ticks_ago) % self.trail_length;
        Some(self.slot(slot))
    }

    /// Every snapshot in buffer order, which is not necessarily lead first.
    pub fn polygons(&self) -> impl Iterator<Item = &[Point]> + '_ {
        self.points.chunks_exact(self.point_count)
    }

    /// Computes the next lead snapshot from the current one.
    ///
    /// The cursor moves one slot forward and the oldest snapshot is
    /// overwritten in place with the advanced vertices. `velocities` holds one
    /// entry per vertex and receives the post-bounce velocities.
    pub fn advance<R>(
        &mut self,
        velocities: &mut [Velocity],
        viewport: Viewport,
        motion: &Motion,
        random: &mut R,
    ) where
        R: RandomSource + ?Sized,
    {
        debug_assert_eq!(velocities.len(), self.point_count);

        let previous_base = self.lead_index * self.point_count;
        self.lead_index = (self.lead_index + 1) % self.trail_length;
        let lead_base = self.lead_index * self.point_count;

        for (vertex, velocity) in velocities.iter_mut().enumerate().take(self.point_count) {
            let previous = self.points[previous_base + vertex];
            let (point, next_velocity) = motion.advance(previous, *velocity, viewport, random);
            self.points[lead_base + vertex] = point;
            *velocity = next_velocity;
        }
    }

    /// Regenerates the lead snapshot and collapses every slot onto it.
    ///
    /// `next_point` is called once per vertex, in vertex order.
    pub fn reset<F>(&mut self, mut next_point: F)
    where
        F: FnMut() -> Point,
    {
        self.lead_index = 0;
        let (lead, rest) = self.points.split_at_mut(self.point_count);
        for point in lead.iter_mut() {
            *point = next_point();
        }
        for slot in rest.chunks_exact_mut(self.point_count) {
            slot.copy_from_slice(lead);
        }
    }

    fn slot(&self, slot: usize) -> &[Point] {
        let base = slot * self.point_count;
        &self.points[base..base + self.point_count]
    }
}
