/// Sentries: the detection-capable adversaries.
///
/// Two kinds share one visibility contract — a patrolling guard whose
/// facing follows its movement, and a scanning camera whose facing
/// oscillates between fixed bounds. `can_see` is pure over the current
/// snapshot; moving the sentry is a separate `update(dt)` so tests can
/// probe visibility without simulating motion.

use super::geometry::{angle_diff, Vec2};

/// A patrolling guard is considered to have arrived at a waypoint within
/// this distance and turns toward the next one.
pub const WAYPOINT_RADIUS: f32 = 5.0;

#[derive(Clone, Debug)]
pub enum SentryKind {
    /// Walks a waypoint loop. Facing is the movement direction, held
    /// where it was when the sentry has nowhere to go.
    Patrol {
        waypoints: Vec<Vec2>,
        /// Index of the waypoint currently walked toward.
        target: usize,
        speed: f32,
    },
    /// Fixed position, facing sweeps back and forth between two bounds
    /// at constant angular speed.
    Scanning {
        rotation_speed: f32,
        min_angle: f32,
        max_angle: f32,
        /// +1 sweeping toward max, -1 toward min.
        dir: f32,
    },
}

#[derive(Clone, Debug)]
pub struct Sentry {
    pub pos: Vec2,
    /// Current facing, radians.
    pub facing: f32,
    pub vision_range: f32,
    /// Full field-of-view angle, radians.
    pub vision_fov: f32,
    pub kind: SentryKind,
}

impl Sentry {
    pub fn patrol(
        pos: Vec2,
        waypoints: Vec<Vec2>,
        speed: f32,
        vision_range: f32,
        vision_fov: f32,
    ) -> Self {
        Sentry {
            pos,
            facing: 0.0,
            vision_range,
            vision_fov,
            kind: SentryKind::Patrol { waypoints, target: 0, speed },
        }
    }

    /// A scanning camera sweeping `sweep` radians centered on
    /// `start_angle`, beginning at the center.
    pub fn scanning(
        pos: Vec2,
        start_angle: f32,
        sweep: f32,
        rotation_speed: f32,
        vision_range: f32,
        vision_fov: f32,
    ) -> Self {
        Sentry {
            pos,
            facing: start_angle,
            vision_range,
            vision_fov,
            kind: SentryKind::Scanning {
                rotation_speed,
                min_angle: start_angle - sweep / 2.0,
                max_angle: start_angle + sweep / 2.0,
                dir: 1.0,
            },
        }
    }

    /// Advance patrol movement / sweep rotation by `dt` seconds.
    ///
    /// The caller gates this: it is not invoked while the game is paused
    /// or while the time-freeze effect holds sentries still.
    pub fn update(&mut self, dt: f32) {
        match &mut self.kind {
            SentryKind::Patrol { waypoints, target, speed } => {
                if waypoints.is_empty() {
                    return;
                }
                let goal = waypoints[*target];
                let diff = goal.sub(self.pos);
                if diff.len() < WAYPOINT_RADIUS {
                    *target = (*target + 1) % waypoints.len();
                    return;
                }
                let dir = diff.normalized();
                self.pos = self.pos.add(dir.scale(*speed * dt));
                // Facing tracks movement; it holds once stationary.
                self.facing = dir.angle();
            }
            SentryKind::Scanning { rotation_speed, min_angle, max_angle, dir } => {
                self.facing += *rotation_speed * *dir * dt;
                if self.facing >= *max_angle {
                    self.facing = *max_angle;
                    *dir = -1.0;
                } else if self.facing <= *min_angle {
                    self.facing = *min_angle;
                    *dir = 1.0;
                }
            }
        }
    }

    /// The visibility contract shared by both sentry kinds.
    ///
    /// `hidden` is the global stealth override (the invisibility effect):
    /// a hidden target is never seen. Otherwise the target is visible iff
    /// it is within range and within half the FOV of the current facing.
    pub fn can_see(&self, target: Vec2, hidden: bool) -> bool {
        if hidden {
            return false;
        }
        let to_target = target.sub(self.pos);
        if to_target.len() > self.vision_range {
            return false;
        }
        angle_diff(self.facing, to_target.angle()) <= self.vision_fov / 2.0
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    fn fixed_sentry(facing_deg: f32, range: f32, fov_deg: f32) -> Sentry {
        let mut s = Sentry::scanning(
            Vec2::ZERO,
            facing_deg.to_radians(),
            0.0,
            0.0,
            range,
            fov_deg.to_radians(),
        );
        s.facing = facing_deg.to_radians();
        s
    }

    #[test]
    fn sees_inside_cone_misses_outside_range() {
        // Range 100, FOV 90°, facing +x. (70, 70) is ~99 away at exactly
        // 45° — the cone edge counts as seen. (71, 71) is past the range.
        let s = fixed_sentry(0.0, 100.0, 90.0);
        assert!(s.can_see(Vec2::new(70.0, 70.0), false));
        assert!(!s.can_see(Vec2::new(71.0, 71.0), false));
    }

    #[test]
    fn misses_outside_cone() {
        let s = fixed_sentry(0.0, 100.0, 90.0);
        assert!(!s.can_see(Vec2::new(0.0, 50.0), false)); // 90° off
        assert!(!s.can_see(Vec2::new(-50.0, 0.0), false)); // behind
    }

    #[test]
    fn invisibility_overrides_everything() {
        let s = fixed_sentry(0.0, 100.0, 360.0);
        assert!(!s.can_see(Vec2::new(10.0, 0.0), true));
    }

    #[test]
    fn full_circle_fov_sees_all_directions() {
        let s = fixed_sentry(0.0, 100.0, 360.0);
        for i in 0..12 {
            let a = i as f32 / 12.0 * TAU;
            let p = Vec2::new(a.cos() * 60.0, a.sin() * 60.0);
            assert!(s.can_see(p, false), "direction {i}");
        }
    }

    #[test]
    fn zero_fov_sees_only_dead_ahead() {
        let s = fixed_sentry(0.0, 100.0, 0.0);
        assert!(s.can_see(Vec2::new(50.0, 0.0), false));
        assert!(!s.can_see(Vec2::new(50.0, 0.5), false));
    }

    #[test]
    fn scanning_flips_at_bounds() {
        // Sweep 100° centered on 90°, 35°/s (the security-camera setup).
        let mut s = Sentry::scanning(
            Vec2::ZERO,
            90f32.to_radians(),
            100f32.to_radians(),
            35f32.to_radians(),
            120.0,
            60f32.to_radians(),
        );
        let max = 140f32.to_radians();
        let min = 40f32.to_radians();

        // Sweeps up, clamps at max, comes back down.
        let mut hit_max = false;
        for _ in 0..400 {
            s.update(0.016);
            assert!(s.facing <= max + 1e-4 && s.facing >= min - 1e-4);
            if (s.facing - max).abs() < 1e-4 {
                hit_max = true;
            }
            if hit_max && s.facing < max - 0.1 {
                return; // direction flipped and moved away from the bound
            }
        }
        panic!("sweep never flipped at the max bound");
    }

    #[test]
    fn scanning_flip_is_immediate_at_bound() {
        let mut s = Sentry::scanning(Vec2::ZERO, 0.0, 1.0, 10.0, 50.0, PI);
        // One large step overshoots the 0.5 rad bound: clamp + flip on
        // the same tick.
        s.update(0.2);
        assert!((s.facing - 0.5).abs() < 1e-5);
        s.update(0.01);
        assert!(s.facing < 0.5);
    }

    #[test]
    fn patrol_walks_waypoints_and_faces_movement() {
        let mut s = Sentry::patrol(
            Vec2::ZERO,
            vec![Vec2::new(100.0, 0.0), Vec2::new(0.0, 0.0)],
            30.0,
            100.0,
            75f32.to_radians(),
        );
        s.update(1.0);
        assert!((s.pos.x - 30.0).abs() < 1e-3);
        assert!((s.facing - 0.0).abs() < 1e-4);

        // Walk long enough to arrive and turn around.
        for _ in 0..200 {
            s.update(0.1);
        }
        assert!(angle_diff(s.facing, PI) < 1e-3 || angle_diff(s.facing, 0.0) < 1e-3);
    }

    #[test]
    fn stationary_patrol_holds_facing() {
        let mut s = Sentry::patrol(Vec2::ZERO, vec![], 30.0, 100.0, 1.0);
        s.facing = 1.25;
        s.update(0.5);
        assert_eq!(s.facing, 1.25);
        assert_eq!(s.pos, Vec2::ZERO);
    }
}
