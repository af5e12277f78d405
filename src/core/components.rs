use bevy::prelude::*;

/// Marker for a live playfield object the player can tap (target or distractor).
#[derive(Component)]
pub struct Catchable;

/// Hit-test radius in world units before breathing scale is applied.
#[derive(Component, Debug, Deref, DerefMut, Copy, Clone)]
pub struct ObjectRadius(pub f32);

/// Whether tapping this object counts as a correct hit.
#[derive(Component, Debug, Deref, Copy, Clone)]
pub struct IsTarget(pub bool);

/// Virtual-clock second the object appeared at; reaction time is measured
/// against this, so paused time never counts.
#[derive(Component, Debug, Deref, Copy, Clone)]
pub struct SpawnStamp(pub f64);

/// Seconds the object stays on the field before silently expiring.
#[derive(Component, Debug, Deref, Copy, Clone)]
pub struct Lifespan(pub f32);

/// Linear drift + spin, advanced on the fixed timestep.
#[derive(Component, Debug, Copy, Clone)]
pub struct Motion {
    pub velocity: Vec2,
    /// Radians per second.
    pub spin: f32,
}

/// Breathing scale animation: ping-pongs between MIN and MAX.
#[derive(Component, Debug, Copy, Clone)]
pub struct Breathe {
    pub scale: f32,
    pub direction: f32,
}

impl Breathe {
    pub const MIN: f32 = 0.8;
    pub const MAX: f32 = 1.2;
    /// Scale units per second.
    pub const RATE: f32 = 0.5;

    pub fn new() -> Self {
        Self {
            scale: 1.0,
            direction: 1.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.scale += self.direction * Self::RATE * dt;
        if self.scale > Self::MAX {
            self.scale = Self::MAX;
            self.direction = -1.0;
        } else if self.scale < Self::MIN {
            self.scale = Self::MIN;
            self.direction = 1.0;
        }
    }
}

impl Default for Breathe {
    fn default() -> Self {
        Self::new()
    }
}
