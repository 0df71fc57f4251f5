#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Vertex motion model: integer advection with reflection off the viewport edges.
//!
//! Each axis is handled independently. A vertex that would leave `[0, bound)`
//! is folded back inside by the distance it overshot and its velocity is
//! reversed according to the configured [`MotionPolicy`].

use mystify_core::{MotionPolicy, Point, RandomSource, Velocity, Viewport};

/// Pure system advancing vertices under one velocity policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Motion {
    policy: MotionPolicy,
    max_speed: u32,
}

impl Motion {
    /// Creates a motion model for the provided policy and speed limit.
    #[must_use]
    pub const fn new(policy: MotionPolicy, max_speed: u32) -> Self {
        Self { policy, max_speed }
    }

    /// Draws the velocity a freshly created vertex starts with.
    pub fn initial_velocity<R>(&self, random: &mut R) -> Velocity
    where
        R: RandomSource + ?Sized,
    {
        let dx = self.initial_component(random);
        let dy = self.initial_component(random);
        Velocity::new(dx, dy)
    }

    /// Advances `point` by `velocity`, reflecting each axis off the viewport.
    pub fn advance<R>(
        &self,
        point: Point,
        velocity: Velocity,
        viewport: Viewport,
        random: &mut R,
    ) -> (Point, Velocity)
    where
        R: RandomSource + ?Sized,
    {
        let (x, dx) = self.reflect_axis(point.x(), velocity.dx(), viewport.width(), random);
        let (y, dy) = self.reflect_axis(point.y(), velocity.dy(), viewport.height(), random);
        (Point::new(x, y), Velocity::new(dx, dy))
    }

    /// Moves one coordinate by `velocity` inside `[0, bound)`.
    ///
    /// Returns the new coordinate and the possibly reversed velocity. A bound
    /// of one or less is degenerate: the coordinate collapses to 0 and the
    /// velocity is returned untouched.
    pub fn reflect_axis<R>(
        &self,
        position: i32,
        velocity: i32,
        bound: u32,
        random: &mut R,
    ) -> (i32, i32)
    where
        R: RandomSource + ?Sized,
    {
        if bound <= 1 {
            return (0, velocity);
        }

        let bound = i64::from(bound);
        let candidate = i64::from(position) + i64::from(velocity);
        let overshot_upper = velocity > 0 && candidate >= bound;
        let overshot_lower = velocity < 0 && candidate < 0;

        if overshot_upper || overshot_lower {
            let folded = fold_into_range(candidate, bound);
            (narrow(folded), self.bounce(velocity, random))
        } else {
            (narrow(candidate), velocity)
        }
    }

    fn initial_component<R>(&self, random: &mut R) -> i32
    where
        R: RandomSource + ?Sized,
    {
        match self.policy {
            MotionPolicy::BiasedReroll => {
                let positive = random.next_bool();
                signed(random_speed(self.max_speed, random), positive)
            }
            MotionPolicy::SignFlip => {
                let span = self.max_speed;
                let drawn = i64::from(random.next_int(span)) - i64::from(span / 2);
                if drawn == 0 {
                    signed(1, random.next_bool())
                } else {
                    narrow(drawn)
                }
            }
        }
    }

    fn bounce<R>(&self, velocity: i32, random: &mut R) -> i32
    where
        R: RandomSource + ?Sized,
    {
        match self.policy {
            MotionPolicy::BiasedReroll => {
                signed(random_speed(self.max_speed, random), velocity < 0)
            }
            MotionPolicy::SignFlip => velocity.saturating_neg(),
        }
    }
}

/// Speed drawn uniformly from `[max(1, max_speed / 6), max_speed)`.
///
/// A speed limit of one or less always yields 1.
pub fn random_speed<R>(max_speed: u32, random: &mut R) -> i32
where
    R: RandomSource + ?Sized,
{
    if max_speed <= 1 {
        return 1;
    }
    let min_speed = (max_speed / 6).max(1);
    let speed = min_speed + random.next_int(max_speed - min_speed);
    i32::try_from(speed).unwrap_or(i32::MAX)
}

/// Folds `candidate` into `[0, bound)` as a triangle wave of period `2 * (bound - 1)`.
///
/// For a single overshoot this is `(bound - 1) - (candidate - (bound - 1))` on
/// the upper edge and `-candidate` on the lower edge; larger overshoots keep
/// folding until the value lands inside.
#[must_use]
pub fn fold_into_range(candidate: i64, bound: i64) -> i64 {
    if bound <= 1 {
        return 0;
    }
    let last = bound - 1;
    let period = 2 * last;
    let phase = candidate.rem_euclid(period);
    if phase <= last {
        phase
    } else {
        period - phase
    }
}

fn signed(speed: i32, positive: bool) -> i32 {
    if positive {
        speed
    } else {
        -speed
    }
}

fn narrow(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use mystify_system_random::SeededRandom;

    /// Replays scripted draws; integers are reduced modulo the requested bound.
    #[derive(Debug, Default)]
    struct Scripted {
        ints: VecDeque<u32>,
        bools: VecDeque<bool>,
    }

    impl Scripted {
        fn new(ints: &[u32], bools: &[bool]) -> Self {
            Self {
                ints: ints.iter().copied().collect(),
                bools: bools.iter().copied().collect(),
            }
        }
    }

    impl RandomSource for Scripted {
        fn next_int(&mut self, bound: u32) -> u32 {
            let value = self.ints.pop_front().expect("script exhausted");
            if bound == 0 {
                0
            } else {
                value % bound
            }
        }

        fn next_bool(&mut self) -> bool {
            self.bools.pop_front().expect("script exhausted")
        }
    }

    #[test]
    fn upper_edge_overshoot_folds_back_inside() {
        let motion = Motion::new(MotionPolicy::SignFlip, 20);
        let mut random = Scripted::default();

        assert_eq!(motion.reflect_axis(9, 3, 10, &mut random), (6, -3));
    }

    #[test]
    fn upper_edge_bounce_rerolls_negative_speed_under_biased_policy() {
        let motion = Motion::new(MotionPolicy::BiasedReroll, 20);
        let mut random = Scripted::new(&[4], &[]);

        let (position, velocity) = motion.reflect_axis(9, 3, 10, &mut random);
        assert_eq!(position, 6);
        // min speed is 20 / 6 = 3, so the scripted draw of 4 yields 7.
        assert_eq!(velocity, -7);
    }

    #[test]
    fn lower_edge_overshoot_mirrors_position() {
        let motion = Motion::new(MotionPolicy::BiasedReroll, 12);
        let mut random = Scripted::new(&[0], &[]);

        let (position, velocity) = motion.reflect_axis(1, -4, 10, &mut random);
        assert_eq!(position, 3);
        assert_eq!(velocity, 2);
    }

    #[test]
    fn landing_exactly_on_last_pixel_does_not_bounce() {
        let motion = Motion::new(MotionPolicy::SignFlip, 20);
        let mut random = Scripted::default();

        assert_eq!(motion.reflect_axis(7, 2, 10, &mut random), (9, 2));
        assert_eq!(motion.reflect_axis(2, -2, 10, &mut random), (0, -2));
    }

    #[test]
    fn landing_on_bound_folds_two_pixels_in() {
        let motion = Motion::new(MotionPolicy::SignFlip, 20);
        let mut random = Scripted::default();

        assert_eq!(motion.reflect_axis(8, 2, 10, &mut random), (8, -2));
    }

    #[test]
    fn degenerate_bound_collapses_without_panicking() {
        let motion = Motion::new(MotionPolicy::SignFlip, 20);
        let mut random = Scripted::default();

        assert_eq!(motion.reflect_axis(0, 5, 1, &mut random), (0, 5));
        assert_eq!(motion.reflect_axis(0, -5, 0, &mut random), (0, -5));
    }

    #[test]
    fn speeds_larger_than_viewport_stay_contained() {
        let motion = Motion::new(MotionPolicy::SignFlip, 500);
        let mut random = Scripted::default();

        for (position, velocity) in [(0, 95), (3, -250), (9, 400), (5, -9), (0, i32::MAX)] {
            let (folded, _) = motion.reflect_axis(position, velocity, 10, &mut random);
            assert!((0..10).contains(&folded), "{position}+{velocity} -> {folded}");
        }
    }

    #[test]
    fn fold_matches_single_reflection_formulas() {
        for bound in 2..30_i64 {
            for overshoot in 0..bound {
                let candidate = bound + overshoot - 1;
                if candidate - (bound - 1) <= bound - 1 {
                    assert_eq!(
                        fold_into_range(candidate, bound),
                        (bound - 1) - (candidate - (bound - 1))
                    );
                }
            }
            for candidate in -(bound - 1)..0 {
                assert_eq!(fold_into_range(candidate, bound), -candidate);
            }
        }
    }

    #[test]
    fn random_speed_respects_biased_range() {
        let mut random = SeededRandom::new(3);
        for max_speed in 2..40 {
            let min_speed = (max_speed / 6).max(1) as i32;
            for _ in 0..50 {
                let speed = random_speed(max_speed, &mut random);
                assert!(speed >= min_speed && speed < max_speed as i32);
            }
        }
    }

    #[test]
    fn random_speed_is_one_for_tiny_limits() {
        let mut random = Scripted::default();
        assert_eq!(random_speed(1, &mut random), 1);
        assert_eq!(random_speed(0, &mut random), 1);
    }

    #[test]
    fn biased_initial_velocity_uses_sign_draws() {
        let motion = Motion::new(MotionPolicy::BiasedReroll, 20);
        let mut random = Scripted::new(&[0, 1], &[true, false]);

        assert_eq!(motion.initial_velocity(&mut random), Velocity::new(3, -4));
    }

    #[test]
    fn sign_flip_initial_velocity_is_centered() {
        let motion = Motion::new(MotionPolicy::SignFlip, 20);
        let mut random = Scripted::new(&[0, 19], &[]);

        assert_eq!(motion.initial_velocity(&mut random), Velocity::new(-10, 9));
    }

    #[test]
    fn sign_flip_replaces_zero_draw_with_unit_speed() {
        let motion = Motion::new(MotionPolicy::SignFlip, 20);
        let mut random = Scripted::new(&[10, 10], &[true, false]);

        assert_eq!(motion.initial_velocity(&mut random), Velocity::new(1, -1));
    }

    #[test]
    fn sign_flip_velocities_are_never_zero() {
        let mut random = SeededRandom::new(99);
        for max_speed in 1..12 {
            let motion = Motion::new(MotionPolicy::SignFlip, max_speed);
            for _ in 0..100 {
                let velocity = motion.initial_velocity(&mut random);
                assert_ne!(velocity.dx(), 0);
                assert_ne!(velocity.dy(), 0);
            }
        }
    }

    #[test]
    fn sign_flip_preserves_magnitude_across_many_bounces() {
        let motion = Motion::new(MotionPolicy::SignFlip, 20);
        let viewport = Viewport::new(17, 11);
        let mut random = SeededRandom::new(5);
        let mut point = Point::new(3, 4);
        let mut velocity = Velocity::new(7, -5);

        for _ in 0..500 {
            let (next_point, next_velocity) = motion.advance(point, velocity, viewport, &mut random);
            assert!(viewport.contains(next_point));
            assert_eq!(next_velocity.dx().abs(), 7);
            assert_eq!(next_velocity.dy().abs(), 5);
            point = next_point;
            velocity = next_velocity;
        }
    }

    #[test]
    fn advance_treats_axes_independently() {
        let motion = Motion::new(MotionPolicy::SignFlip, 20);
        let mut random = Scripted::default();

        let (point, velocity) = motion.advance(
            Point::new(9, 5),
            Velocity::new(3, -2),
            Viewport::new(10, 100),
            &mut random,
        );
        assert_eq!(point, Point::new(6, 3));
        assert_eq!(velocity, Velocity::new(-3, -2));
    }
}
