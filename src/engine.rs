use crate::constants::*;
use crate::layout::DefenseKind;
use crate::location::BoardLocation;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Which player a half of the board belongs to, from this bot's perspective.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Side {
    Friendly,
    Enemy,
}

impl Side {
    /// List rows making up this side's half of the diamond.
    pub fn rows(self) -> Range<u8> {
        match self {
            Side::Friendly => HALF_ROWS..GRID_ROWS,
            Side::Enemy => 0..HALF_ROWS,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Friendly => Side::Enemy,
            Side::Enemy => Side::Friendly,
        }
    }
}

/// Spendable per-turn resource pools.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Spent on stationary defenses.
    Build,
    /// Spent on mobile units (not consumed by this crate; listed for callers).
    Deploy,
}

/// Abstract capability surface of the surrounding game engine.
///
/// Implementations exist outside this crate (the live match adapter) and in
/// tests (scripted engines). All calls are synchronous and effectively
/// instantaneous; the engine owns and enforces the resource balance, so an
/// `attempt_spawn` may legitimately place fewer units than requested.
pub trait GameEngine {
    /// Number of opposing units currently able to strike `target`, where
    /// `side` is the half being defended.
    fn attackers_that_can_reach(&self, target: BoardLocation, side: Side) -> u32;

    /// Current spendable balance for a resource kind.
    fn resource(&self, kind: ResourceKind) -> f64;

    /// Request construction of `count` units at `target`. Returns how many
    /// were actually placed, possibly zero (blocked cell, resource race).
    fn attempt_spawn(&mut self, kind: DefenseKind, target: BoardLocation, count: u32) -> u32;
}
