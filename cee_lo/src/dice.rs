//! Dice collaborator boundary.
//!
//! The game never looks at dice bodies. It asks a [`DiceRoller`] for a
//! throw and gets back one settled [`Roll`]. [`TumbleRoller`] simulates the
//! throw with a small damped rigid-body model and reads the top faces once
//! every die has settled; [`RandomRoller`] skips the simulation.

use async_trait::async_trait;
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{
    f64::consts::PI,
    ops::{Add, Mul},
    time::Duration,
};

use crate::game::entities::{DieFace, Roll};

/// Linear and angular speed below which a die counts as settled.
pub const SETTLE_THRESHOLD: f64 = 0.1;

/// Fixed simulation step, 60 Hz.
pub const STEP: f64 = 1.0 / 60.0;

/// Upper bound on simulated steps per throw (one minute of tumbling).
pub const MAX_STEPS: u32 = 60 * 60;

const GRAVITY: f64 = -9.82;
/// Height of a die's centre when resting on the table.
const FLOOR: f64 = 0.5;
const RESTITUTION: f64 = 0.5;
/// Bounces slower than this are absorbed by the table.
const REST_SPEED: f64 = 1.0;
const FRICTION: f64 = 0.9;
const ANGULAR_DAMPING: f64 = 0.9;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. Degenerate vectors fall back to +X.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len < 1e-10 {
            return Self::new(1.0, 0.0, 0.0);
        }
        self * (1.0 / len)
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Unit quaternion describing a die's orientation.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Quat {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Rotation of `angle` radians around `axis` (right-handed).
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let axis = axis.normalize();
        let (sin, cos) = (angle / 2.0).sin_cos();
        Self {
            w: cos,
            x: axis.x * sin,
            y: axis.y * sin,
            z: axis.z * sin,
        }
    }

    fn vector(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Hamilton product `self * rhs`.
    #[must_use]
    pub fn hamilton(self, rhs: Self) -> Self {
        Self {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }

    #[must_use]
    pub fn normalize(self) -> Self {
        let len = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if len < 1e-10 {
            return Self::IDENTITY;
        }
        Self {
            w: self.w / len,
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }

    /// Rotate a vector from the die's local frame into the world frame.
    #[must_use]
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let u = self.vector();
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }

    /// Advance the orientation by angular velocity `omega` over `dt`.
    #[must_use]
    pub fn integrate(self, omega: Vec3, dt: f64) -> Self {
        let spin = Self {
            w: 0.0,
            x: omega.x,
            y: omega.y,
            z: omega.z,
        }
        .hamilton(self);
        let half_dt = dt / 2.0;
        Self {
            w: self.w + spin.w * half_dt,
            x: self.x + spin.x * half_dt,
            y: self.y + spin.y * half_dt,
            z: self.z + spin.z * half_dt,
        }
        .normalize()
    }
}

/// Local face normals and the pips printed on them.
const FACES: [(Vec3, DieFace); 6] = [
    (Vec3::new(0.0, 1.0, 0.0), DieFace::TWO),
    (Vec3::new(0.0, 0.0, 1.0), DieFace::THREE),
    (Vec3::new(1.0, 0.0, 0.0), DieFace::ONE),
    (Vec3::new(-1.0, 0.0, 0.0), DieFace::SIX),
    (Vec3::new(0.0, 0.0, -1.0), DieFace::FOUR),
    (Vec3::new(0.0, -1.0, 0.0), DieFace::FIVE),
];

/// One die as a rigid body.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Die {
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub orientation: Quat,
}

impl Die {
    /// A die lying still on the table.
    #[must_use]
    pub fn resting(orientation: Quat) -> Self {
        Self {
            position: Vec3::new(0.0, FLOOR, 0.0),
            orientation,
            ..Self::default()
        }
    }

    /// A die tossed from above the table with random spin.
    pub fn thrown<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let axis = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        Self {
            position: Vec3::new(
                rng.random_range(-10.0..10.0),
                rng.random_range(20.0..30.0),
                rng.random_range(-10.0..10.0),
            ),
            velocity: Vec3::new(
                rng.random_range(0.0..10.0),
                rng.random_range(0.0..10.0),
                rng.random_range(0.0..10.0),
            ),
            angular_velocity: Vec3::new(
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
            ),
            orientation: Quat::from_axis_angle(axis, rng.random_range(0.0..2.0 * PI)),
        }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.velocity.length() < SETTLE_THRESHOLD
            && self.angular_velocity.length() < SETTLE_THRESHOLD
    }

    /// The face whose world-space normal points most nearly straight up.
    #[must_use]
    pub fn top_face(&self) -> DieFace {
        let mut best = (f64::NEG_INFINITY, DieFace::TWO);
        for (normal, face) in FACES {
            let alignment = self.orientation.rotate(normal).dot(Vec3::UP);
            if alignment > best.0 {
                best = (alignment, face);
            }
        }
        best.1
    }

    /// Integrate one step of free fall, bouncing off and sliding along the
    /// table.
    pub fn step(&mut self, dt: f64) {
        self.velocity.y += GRAVITY * dt;
        self.position = self.position + self.velocity * dt;
        self.orientation = self.orientation.integrate(self.angular_velocity, dt);

        if self.position.y <= FLOOR {
            self.position.y = FLOOR;
            if self.velocity.y < 0.0 {
                self.velocity.y = -self.velocity.y * RESTITUTION;
            }
            if self.velocity.y.abs() < REST_SPEED {
                self.velocity.y = 0.0;
            }
            self.velocity.x *= FRICTION;
            self.velocity.z *= FRICTION;
            self.angular_velocity = self.angular_velocity * ANGULAR_DAMPING;
        }
    }
}

/// Source of settled rolls. Each call is one throw and resolves exactly once.
#[async_trait]
pub trait DiceRoller: Send + Sync {
    async fn roll(&self) -> Roll;
}

const ALL_FACES: [DieFace; 6] = [
    DieFace::ONE,
    DieFace::TWO,
    DieFace::THREE,
    DieFace::FOUR,
    DieFace::FIVE,
    DieFace::SIX,
];

/// Three independent uniform faces.
pub fn random_roll<R: Rng + ?Sized>(rng: &mut R) -> Roll {
    Roll::new(std::array::from_fn(|_| {
        ALL_FACES[rng.random_range(0..ALL_FACES.len())]
    }))
}

/// Rolls uniform faces without simulating anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomRoller;

#[async_trait]
impl DiceRoller for RandomRoller {
    async fn roll(&self) -> Roll {
        random_roll(&mut rand::rng())
    }
}

/// Throws three simulated dice and waits for them to settle.
#[derive(Clone, Copy, Debug, Default)]
pub struct TumbleRoller {
    pace: Option<Duration>,
}

impl TumbleRoller {
    /// Simulate as fast as possible.
    #[must_use]
    pub const fn new() -> Self {
        Self { pace: None }
    }

    /// Sleep one step between integrations so a throw takes as long as it
    /// would on a real table.
    #[must_use]
    pub fn real_time() -> Self {
        Self {
            pace: Some(Duration::from_secs_f64(STEP)),
        }
    }
}

/// Step every die until all of them settle or the step cap is hit.
/// Returns the number of steps taken.
pub fn settle(dice: &mut [Die]) -> u32 {
    let mut steps = 0;
    while steps < MAX_STEPS && !dice.iter().all(Die::is_settled) {
        for die in dice.iter_mut() {
            die.step(STEP);
        }
        steps += 1;
    }
    steps
}

#[async_trait]
impl DiceRoller for TumbleRoller {
    async fn roll(&self) -> Roll {
        let mut dice: [Die; 3] = {
            let mut rng = rand::rng();
            std::array::from_fn(|_| Die::thrown(&mut rng))
        };

        let steps = match self.pace {
            None => settle(&mut dice),
            Some(pace) => {
                let mut steps = 0;
                while steps < MAX_STEPS && !dice.iter().all(Die::is_settled) {
                    for die in &mut dice {
                        die.step(STEP);
                    }
                    steps += 1;
                    tokio::time::sleep(pace).await;
                }
                steps
            }
        };

        if steps >= MAX_STEPS {
            warn!("Dice still moving after {steps} steps, reading them as they lie");
        } else {
            debug!("Dice settled after {steps} steps");
        }
        Roll::new(dice.map(|die| die.top_face()))
    }
}
