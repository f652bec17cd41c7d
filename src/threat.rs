//! Threat evaluation grid.
//!
//! One score per list coordinate, `ATTACKER_THREAT` (8) per opposing unit
//! able to strike the cell. `full_recompute` is the ground truth, rebuilt
//! from engine queries once per turn per side. `local_patch` is the cheap
//! in-turn alternative: it never re-queries the engine and does not reflect
//! true reachability changes, it only boosts a fixed neighborhood around a
//! fresh placement so the planner stops piling into the same area within a
//! single pass.
//!
//! Scores change only through these two operations (or a whole-map reset);
//! there is no direct cell write.

use crate::arena::JaggedGrid;
use crate::constants::*;
use crate::engine::{GameEngine, Side};
use crate::error::WardenError;
use crate::location::*;
use log::*;
use serde::{Deserialize, Serialize};

/// Tunable shape of a local patch: Chebyshev `radius` around the placement,
/// `increment` added to each covered cell. Defaults to a 5x5 neighborhood at
/// one attacker-equivalent per cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchProfile {
    pub radius: u8,
    pub increment: u32,
}

impl Default for PatchProfile {
    fn default() -> Self {
        PatchProfile {
            radius: 2,
            increment: ATTACKER_THREAT,
        }
    }
}

/// How the map is brought back in line after a successful placement.
/// Whichever strategy is configured is applied consistently for the whole
/// pass; they trade accuracy against deadline headroom.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatUpdate {
    /// Re-query the engine for the full half. Exact, O(cells) per placement.
    Recompute,
    /// Apply a local heuristic boost around the placement. Approximate, O(1).
    LocalPatch(PatchProfile),
}

impl Default for ThreatUpdate {
    fn default() -> Self {
        ThreatUpdate::LocalPatch(PatchProfile::default())
    }
}

/// Per-cell exposure scores for the whole diamond. Rebuilt every turn;
/// never carries state across turn boundaries.
#[derive(Clone)]
pub struct ThreatMap {
    scores: JaggedGrid<u32>,
}

impl Default for ThreatMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatMap {
    pub fn new() -> ThreatMap {
        ThreatMap {
            scores: JaggedGrid::new(0),
        }
    }

    pub fn score(&self, loc: ListLocation) -> u32 {
        *self.scores.get(loc)
    }

    /// Rebuild one side's half from engine queries. This is the ground
    /// truth; call it once per turn per side before planning on that side.
    pub fn full_recompute(
        &mut self,
        side: Side,
        engine: &dyn GameEngine,
    ) -> Result<(), WardenError> {
        for row in side.rows() {
            for col in 0..row_width(row) {
                let loc = ListLocation::new(row, col);
                let count = engine.attackers_that_can_reach(loc.to_board(), side);
                let score = count
                    .checked_mul(ATTACKER_THREAT)
                    .ok_or(WardenError::EngineContract { count })?;
                self.scores.set(loc, score);
            }
        }
        Ok(())
    }

    /// Boost the neighborhood of a fresh placement without re-querying the
    /// engine. Neighborhood cells that fall off the diamond are skipped, not
    /// an error; placements near the arena edge always have such neighbors.
    pub fn local_patch(&mut self, placed: BoardLocation, profile: &PatchProfile) {
        let r = profile.radius as i32;
        for dr in -r..=r {
            for dc in -r..=r {
                let col = placed.col() as i32 + dc;
                let row = placed.row() as i32 + dr;
                if let Some(loc) = ListLocation::from_board(col, row) {
                    let boosted = self.scores.get(loc).saturating_add(profile.increment);
                    self.scores.set(loc, boosted);
                }
            }
        }
    }

    /// Deterministic weakest-cell scan over one side's half: the global
    /// minimum among cells accepted by `eligible`, ties broken by row-major
    /// ascending order (the first minimum seen wins).
    pub fn weakest_cell<F>(&self, side: Side, eligible: F) -> Option<(ListLocation, u32)>
    where
        F: Fn(ListLocation) -> bool,
    {
        let mut best: Option<(ListLocation, u32)> = None;
        for row in side.rows() {
            for col in 0..row_width(row) {
                let loc = ListLocation::new(row, col);
                if !eligible(loc) {
                    continue;
                }
                let score = self.score(loc);
                if best.map_or(true, |(_, s)| score < s) {
                    best = Some((loc, score));
                }
            }
        }
        best
    }

    /// Dump one side's scores at trace level, one line per row.
    pub fn trace_scores(&self, side: Side) {
        if !log_enabled!(Level::Trace) {
            return;
        }
        for row in side.rows() {
            let scores: Vec<u32> = (0..row_width(row))
                .map(|col| self.score(ListLocation::new(row, col)))
                .collect();
            trace!("threat row {:2}: {:?}", row, scores);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DefenseKind;

    /// Engine stub with one attacker count per board cell and no spawn
    /// support.
    struct FixedCounts(JaggedGrid<u32>);

    impl GameEngine for FixedCounts {
        fn attackers_that_can_reach(&self, target: BoardLocation, _side: Side) -> u32 {
            *self.0.get(target.to_list())
        }

        fn resource(&self, _kind: crate::engine::ResourceKind) -> f64 {
            0.0
        }

        fn attempt_spawn(&mut self, _kind: DefenseKind, _at: BoardLocation, _count: u32) -> u32 {
            0
        }
    }

    fn counts_with(cells: &[(ListLocation, u32)]) -> FixedCounts {
        let mut grid = JaggedGrid::new(0u32);
        for &(loc, count) in cells {
            grid.set(loc, count);
        }
        FixedCounts(grid)
    }

    #[test]
    fn recompute_quantizes_counts_onto_the_threat_scale() {
        let engine = counts_with(&[
            (ListLocation::new(14, 0), 3),
            (ListLocation::new(20, 5), 1),
        ]);
        let mut map = ThreatMap::new();
        map.full_recompute(Side::Friendly, &engine).unwrap();

        assert_eq!(map.score(ListLocation::new(14, 0)), 24);
        assert_eq!(map.score(ListLocation::new(20, 5)), 8);
        for loc in all_cells() {
            assert_eq!(map.score(loc) % ATTACKER_THREAT, 0);
        }
    }

    #[test]
    fn recompute_is_idempotent_against_a_static_engine() {
        let engine = counts_with(&[(ListLocation::new(17, 3), 2)]);
        let mut map = ThreatMap::new();
        map.full_recompute(Side::Friendly, &engine).unwrap();
        let first: Vec<u32> = all_cells().map(|l| map.score(l)).collect();

        map.full_recompute(Side::Friendly, &engine).unwrap();
        let second: Vec<u32> = all_cells().map(|l| map.score(l)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn recompute_touches_only_the_requested_half() {
        let engine = FixedCounts(JaggedGrid::new(1u32));
        let mut map = ThreatMap::new();
        map.full_recompute(Side::Friendly, &engine).unwrap();

        for loc in all_cells() {
            let expected = if loc.row() >= HALF_ROWS { 8 } else { 0 };
            assert_eq!(map.score(loc), expected, "at {loc:?}");
        }
    }

    #[test]
    fn patch_covers_exactly_the_chebyshev_neighborhood() {
        let mut map = ThreatMap::new();
        let placed = BoardLocation::new(13, 10);
        map.local_patch(placed, &PatchProfile::default());

        for loc in all_cells() {
            let distance = placed.distance_to(loc.to_board());
            let expected = if distance <= 2 { 8 } else { 0 };
            assert_eq!(map.score(loc), expected, "at {loc:?}");
        }
    }

    #[test]
    fn patch_near_the_edge_clips_instead_of_wrapping() {
        let mut map = ThreatMap::new();
        // Leftmost friendly cell: most of the 5x5 neighborhood is off-diamond.
        map.local_patch(BoardLocation::new(0, 13), &PatchProfile::default());

        let mut touched = 0usize;
        for loc in all_cells() {
            if map.score(loc) > 0 {
                assert_eq!(map.score(loc), 8);
                assert!(BoardLocation::new(0, 13).distance_to(loc.to_board()) <= 2);
                touched += 1;
            }
        }
        // 5x5 = 25 cells, minus everything outside the diamond.
        assert!(touched < 25);
        assert!(touched > 0);
    }

    #[test]
    fn repeated_patches_stack() {
        let mut map = ThreatMap::new();
        let placed = BoardLocation::new(13, 5);
        map.local_patch(placed, &PatchProfile::default());
        map.local_patch(placed, &PatchProfile::default());
        assert_eq!(map.score(placed.to_list()), 16);
    }

    #[test]
    fn malformed_engine_counts_are_fatal() {
        let engine = counts_with(&[(ListLocation::new(14, 0), u32::MAX / 2)]);
        let mut map = ThreatMap::new();
        let err = map.full_recompute(Side::Friendly, &engine).unwrap_err();
        assert!(matches!(err, WardenError::EngineContract { .. }));
    }

    #[test]
    fn weakest_cell_prefers_row_major_order_on_ties() {
        let map = ThreatMap::new();
        let (loc, score) = map.weakest_cell(Side::Friendly, |_| true).unwrap();
        assert_eq!(loc, ListLocation::new(14, 0));
        assert_eq!(score, 0);

        let engine = counts_with(&[(ListLocation::new(14, 0), 5)]);
        let mut map = ThreatMap::new();
        map.full_recompute(Side::Friendly, &engine).unwrap();
        let (loc, _) = map.weakest_cell(Side::Friendly, |_| true).unwrap();
        assert_eq!(loc, ListLocation::new(14, 1));
    }
}
