//! Flight of a thrown capture device.
//!
//! A [`Projectile`] is launched from an origin towards an estimated target
//! point and advanced once per tick. Every step sweeps the segment travelled
//! that tick against the target creature's collider and the ground, so a fast
//! device cannot tunnel through either.
//!
//! # Trajectory models
//!
//! - [`TrajectoryModel::Ballistic`]: closed-form launch velocity under
//!   gravity. The time of flight comes from an apex `arc_height` above the
//!   higher endpoint; when the horizontal distance is degenerate the solve
//!   falls back to a travel time derived from the throw speed hint.
//! - [`TrajectoryModel::Curved`]: a quadratic Bézier from origin to target
//!   whose control point is lifted by the arc height and pushed sideways by
//!   `lateral`. Past the end of the curve the device continues ballistically
//!   along the curve's exit tangent.
//!
//! Both models pass through the target point in bounded time. A device that
//! hits nothing expires after its lifetime.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::actor::flat;
use crate::config::CaptureConfig;

/// Fixed simulation step used by hosts that do not supply their own (1/60 s).
pub const FIXED_DT: f32 = 1.0 / 60.0;

const MIN_ARC: f32 = 0.1;
const MIN_TIME_SCALE: f32 = 0.25;
const MIN_TRAVEL_TIME: f32 = 0.25;

/// How the flight path is generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrajectoryModel {
    /// Free flight under gravity from a solved launch velocity.
    Ballistic,
    /// Parametric curve with a sideways bend of `lateral` metres.
    Curved {
        /// Sideways offset of the control point (positive bends right).
        lateral: f32,
    },
}

/// Where and how a device is thrown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchParams {
    /// Launch point.
    pub origin: Vec3,
    /// Estimated target point.
    pub target: Vec3,
    /// Apex height above the higher endpoint.
    pub arc_height: f32,
    /// Path model.
    pub model: TrajectoryModel,
}

impl LaunchParams {
    /// Ballistic throw with the given arc height.
    #[must_use]
    pub const fn ballistic(origin: Vec3, target: Vec3, arc_height: f32) -> Self {
        Self {
            origin,
            target,
            arc_height,
            model: TrajectoryModel::Ballistic,
        }
    }

    /// Curved throw with the given arc height and sideways bend.
    #[must_use]
    pub const fn curved(origin: Vec3, target: Vec3, arc_height: f32, lateral: f32) -> Self {
        Self {
            origin,
            target,
            arc_height,
            model: TrajectoryModel::Curved { lateral },
        }
    }
}

/// A sphere collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Centre.
    pub center: Vec3,
    /// Radius.
    pub radius: f32,
}

/// What happened during one flight step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightStep {
    /// Still airborne.
    InFlight,
    /// Touched the target collider at this point.
    HitTarget(Vec3),
    /// Touched the ground at this point.
    HitTerrain(Vec3),
    /// Lifetime exceeded without contact.
    Expired,
}

/// Launch velocity reaching `end` from `start`.
///
/// The time of flight is the rise-and-fall time of an apex `arc_height`
/// above the higher endpoint, scaled by `time_scale`. The vertical component
/// is then chosen so the path passes exactly through `end` at that time.
/// With near-zero horizontal distance the time of flight comes from
/// `speed_hint` instead.
#[must_use]
pub fn ballistic_velocity(
    start: Vec3,
    end: Vec3,
    arc_height: f32,
    time_scale: f32,
    speed_hint: f32,
    gravity: f32,
) -> Vec3 {
    let g = gravity.abs().max(f32::EPSILON);
    let disp = end - start;
    let disp_xz = Vec3::new(disp.x, 0.0, disp.z);
    let dist_xz = disp_xz.length();
    let scale = time_scale.max(MIN_TIME_SCALE);

    let apex = start.y.max(end.y) + arc_height.max(MIN_ARC);
    let height_up = (apex - start.y).max(0.01);
    let height_down = (apex - end.y).max(0.01);
    let t_up = (2.0 * g * height_up).sqrt() / g;
    let t_down = (2.0 * height_down / g).sqrt();
    let flight_time = (t_up + t_down) * scale;

    let travel_time = if flight_time > 0.01 && dist_xz > 0.001 {
        flight_time
    } else {
        (dist_xz / speed_hint.max(0.1)).max(MIN_TRAVEL_TIME) * scale
    };

    Vec3::new(
        disp.x / travel_time,
        (disp.y + 0.5 * g * travel_time * travel_time) / travel_time,
        disp.z / travel_time,
    )
}

/// Quadratic Bézier path used by [`TrajectoryModel::Curved`].
#[derive(Debug, Clone, Copy, PartialEq)]
struct CurvePath {
    start: Vec3,
    control: Vec3,
    end: Vec3,
    duration: f32,
}

impl CurvePath {
    fn new(start: Vec3, end: Vec3, arc_height: f32, lateral: f32, duration: f32) -> Self {
        let mid = (start + end) * 0.5;
        let apex = start.y.max(end.y) + arc_height.max(MIN_ARC);
        let forward = flat(end - start).normalize_or_zero();
        let right = Vec3::new(forward.y, 0.0, -forward.x);
        // A quadratic Bézier peaks halfway to its control point.
        let control = Vec3::new(mid.x, mid.y + 2.0 * (apex - mid.y), mid.z) + right * lateral;
        Self {
            start,
            control,
            end,
            duration,
        }
    }

    fn point(&self, u: f32) -> Vec3 {
        let v = 1.0 - u;
        self.start * (v * v) + self.control * (2.0 * v * u) + self.end * (u * u)
    }

    fn exit_velocity(&self) -> Vec3 {
        2.0 * (self.end - self.control) / self.duration
    }
}

/// A capture device in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    position: Vec3,
    velocity: Vec3,
    elapsed: f32,
    radius: f32,
    gravity: f32,
    lifetime: f32,
    curve: Option<CurvePath>,
}

impl Projectile {
    /// Launches a device according to `params`.
    #[must_use]
    pub fn launch(params: &LaunchParams, config: &CaptureConfig) -> Self {
        let scale = config.flight_time_scale.max(MIN_TIME_SCALE);
        let (velocity, curve) = match params.model {
            TrajectoryModel::Ballistic => (
                ballistic_velocity(
                    params.origin,
                    params.target,
                    params.arc_height,
                    scale,
                    config.throw_speed_hint,
                    config.gravity,
                ),
                None,
            ),
            TrajectoryModel::Curved { lateral } => {
                let dist = params.origin.distance(params.target);
                let duration =
                    (dist / config.throw_speed_hint.max(0.1)).max(MIN_TRAVEL_TIME) * scale;
                let curve = CurvePath::new(
                    params.origin,
                    params.target,
                    params.arc_height,
                    lateral,
                    duration,
                );
                (2.0 * (curve.control - curve.start) / duration, Some(curve))
            }
        };

        Self {
            position: params.origin,
            velocity,
            elapsed: 0.0,
            radius: config.device_radius,
            gravity: config.gravity.abs(),
            lifetime: config.safety_lifetime,
            curve,
        }
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Seconds since launch.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Collider radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Advances by `dt` and sweeps the travelled segment.
    ///
    /// `target` is the creature collider (if it is still present) and
    /// `ground` samples terrain height at (x, z). The target is tested before
    /// the ground, so a device grazing a creature standing on the ground
    /// counts as a hit.
    pub fn step(
        &mut self,
        dt: f32,
        target: Option<Sphere>,
        ground: &dyn Fn(f32, f32) -> Option<f32>,
    ) -> FlightStep {
        if self.elapsed >= self.lifetime {
            return FlightStep::Expired;
        }

        let from = self.position;
        self.elapsed += dt;
        let to = self.advance(dt);

        if let Some(sphere) = target {
            let reach = sphere.radius + self.radius;
            if let Some(contact) = sweep_sphere(from, to, sphere.center, reach) {
                self.position = contact;
                self.velocity = Vec3::ZERO;
                return FlightStep::HitTarget(contact);
            }
        }

        if let Some(height) = ground(to.x, to.z) {
            if to.y - self.radius <= height {
                let contact = Vec3::new(to.x, height + self.radius, to.z);
                self.position = contact;
                self.velocity = Vec3::ZERO;
                return FlightStep::HitTerrain(contact);
            }
        }

        self.position = to;
        FlightStep::InFlight
    }

    fn advance(&mut self, dt: f32) -> Vec3 {
        if let Some(curve) = self.curve {
            if self.elapsed <= curve.duration {
                let u = self.elapsed / curve.duration;
                let next = curve.point(u);
                self.velocity = (next - self.position) / dt.max(f32::EPSILON);
                return next;
            }
            // Leave the curve once, continuing along its exit tangent.
            self.curve = None;
            let overshoot = self.elapsed - curve.duration;
            self.velocity = curve.exit_velocity();
            return self.integrate(curve.end, overshoot);
        }
        self.integrate(self.position, dt)
    }

    fn integrate(&mut self, from: Vec3, dt: f32) -> Vec3 {
        self.velocity.y -= self.gravity * dt;
        from + self.velocity * dt
    }
}

/// First point where segment `a → b` enters a sphere, if it does.
///
/// A segment starting inside the sphere touches it at `a`.
#[must_use]
pub fn sweep_sphere(a: Vec3, b: Vec3, center: Vec3, radius: f32) -> Option<Vec3> {
    let offset = a - center;
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(a);
    }
    let d = b - a;
    let len_sq = d.length_squared();
    if len_sq <= f32::EPSILON {
        return None;
    }
    let half_b = offset.dot(d);
    if half_b >= 0.0 {
        return None;
    }
    let disc = half_b * half_b - len_sq * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-half_b - disc.sqrt()) / len_sq;
    (0.0..=1.0).contains(&t).then(|| a + d * t)
}
