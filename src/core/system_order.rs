use bevy::prelude::*;

/// Update-schedule ordering: pointer input resolves before scoring folds it
/// into the session, and end-of-session checks run last.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct InputSet;

/// UI buttons claim taps first; the playfield hit test only sees what is left.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct UiButtonSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PlayfieldTapSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct ScoringSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct SessionEndSet;

/// FixedUpdate ordering: spawn new objects, then advance everything, then
/// retire the expired / off-screen ones.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct SpawnSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct MotionSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct RetireSet;
