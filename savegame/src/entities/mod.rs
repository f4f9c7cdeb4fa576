//! Entity definitions copied out of a decoded savegame.

mod combat_event;
mod components;

pub use combat_event::*;
pub use components::*;

use serde::{Deserialize, Serialize};

/// A point in sector space, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Treat `self` as the mean of `count` points and fold one more point in.
    ///
    /// Each coordinate is shifted independently: `(c * n + p) / (n + 1)`.
    pub fn shifted_mean(&self, count: usize, point: &Vec3) -> Vec3 {
        let n = count as f64;
        Vec3 {
            x: (self.x * n + point.x) / (n + 1.0),
            y: (self.y * n + point.y) / (n + 1.0),
            z: (self.z * n + point.z) / (n + 1.0),
        }
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.0}, {:.0}, {:.0})", self.x, self.y, self.z)
    }
}

/// In-game time: seconds elapsed since the universe was started.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
pub struct GameTime(pub f64);

impl GameTime {
    pub fn from_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }

    /// Signed number of seconds between `earlier` and `self`.
    pub fn seconds_since(&self, earlier: GameTime) -> f64 {
        self.0 - earlier.0
    }
}

impl std::fmt::Display for GameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.0.max(0.0) as u64;
        let day = total / 86_400 + 1;
        let hours = (total % 86_400) / 3_600;
        let minutes = (total % 3_600) / 60;
        let seconds = total % 60;
        write!(f, "day {}, {:02}:{:02}:{:02}", day, hours, minutes, seconds)
    }
}
