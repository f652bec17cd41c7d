//! Public API for the defense planner.
//!
//! `DefensePlanner` spends the build resource on the weakest friendly cells,
//! one unit at a time, under a cooperative wall-clock budget. A pass walks
//! three phases: fixed opening anchors, reactive reinforcement of breached
//! lanes, then the greedy fill over the template mask. Progress already
//! committed through successful spawns is final; running out of time or
//! resource is a normal outcome, not an error.

use crate::arena::Arena;
use crate::constants::*;
use crate::engine::{GameEngine, ResourceKind, Side};
use crate::error::WardenError;
use crate::layout::{standard_opening, DefenseKind, DefenseTemplate, OpeningPlacement};
use crate::location::*;
use crate::threat::{ThreatMap, ThreatUpdate};
use fnv::FnvHashSet;
use log::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Wall-clock budget for one turn's worth of planning.
///
/// The closure is polled before every potentially expensive step (cell scan,
/// spawn call, threat update); returning `false` makes the planner wind down
/// with whatever it has already committed. The clock itself stays outside
/// this crate: callers capture their own time source.
pub struct TurnBudget {
    should_continue: Box<dyn Fn() -> bool>,
}

impl TurnBudget {
    pub fn new<F: Fn() -> bool + 'static>(should_continue: F) -> Self {
        TurnBudget {
            should_continue: Box::new(should_continue),
        }
    }

    /// Returns true if there is budget remaining to continue work.
    pub fn has_budget(&self) -> bool {
        (self.should_continue)()
    }

    /// Unlimited budget (for offline/bench use).
    pub fn unlimited() -> Self {
        TurnBudget {
            should_continue: Box::new(|| true),
        }
    }

    /// Budget that expires at a monotonic deadline.
    pub fn until(deadline: Instant) -> Self {
        TurnBudget::new(move || Instant::now() < deadline)
    }
}

/// Build cost per defensive unit class, resolved once at match start from
/// the engine's configuration and never mutated afterwards.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitCosts {
    pub turret: f64,
    pub wall: f64,
    pub support: f64,
}

impl UnitCosts {
    pub fn cost(&self, kind: DefenseKind) -> f64 {
        match kind {
            DefenseKind::Turret => self.turret,
            DefenseKind::Wall => self.wall,
            DefenseKind::Support => self.support,
        }
    }
}

impl Default for UnitCosts {
    fn default() -> Self {
        UnitCosts {
            turret: 3.0,
            wall: 1.0,
            support: 4.0,
        }
    }
}

/// Match-start configuration for the planner. Immutable once built.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Unit classes in the order they get to spend the balance.
    pub priorities: Vec<DefenseKind>,
    /// Board columns deliberately left open for lane control; the greedy
    /// fill never places anything in these lanes.
    pub holes: Vec<u8>,
    /// Scores at or above this are adequate and never reinforced.
    pub adequacy_threshold: u32,
    pub costs: UnitCosts,
    /// How the threat map is updated after each successful placement.
    pub update: ThreatUpdate,
    /// Fixed anchors attempted at the start of every pass.
    pub opening: Vec<OpeningPlacement>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            priorities: vec![DefenseKind::Turret, DefenseKind::Wall, DefenseKind::Support],
            holes: Vec::new(),
            adequacy_threshold: ADEQUACY_THRESHOLD,
            costs: UnitCosts::default(),
            update: ThreatUpdate::default(),
            opening: standard_opening(),
        }
    }
}

impl PlannerConfig {
    /// Leave a board column open for lane control.
    pub fn with_hole(mut self, col: u8) -> Self {
        self.holes.push(col);
        self
    }

    pub fn with_priorities(mut self, priorities: Vec<DefenseKind>) -> Self {
        self.priorities = priorities;
        self
    }

    pub fn with_update(mut self, update: ThreatUpdate) -> Self {
        self.update = update;
        self
    }

    pub fn with_opening(mut self, opening: Vec<OpeningPlacement>) -> Self {
        self.opening = opening;
        self
    }
}

/// How a pass ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every priority class was processed to completion.
    Exhausted,
    /// The budget ran out mid-pass. Normal termination, not a fault.
    DeadlineExpired,
}

/// What one defense pass did, for logging and tests.
#[derive(Clone, Debug)]
pub struct PassStats {
    pub opening_placed: u32,
    pub reactive_placed: u32,
    /// Greedy placements in the order they were committed.
    pub reinforced: Vec<(DefenseKind, BoardLocation)>,
    pub spawn_attempts: u32,
    pub scans: u32,
    pub outcome: PassOutcome,
}

impl Default for PassStats {
    fn default() -> Self {
        PassStats {
            opening_placed: 0,
            reactive_placed: 0,
            reinforced: Vec::new(),
            spawn_attempts: 0,
            scans: 0,
            outcome: PassOutcome::Exhausted,
        }
    }
}

/// Greedy, deadline-bounded defense allocator.
pub struct DefensePlanner {
    arena: Arena,
    template: DefenseTemplate,
    config: PlannerConfig,
}

impl DefensePlanner {
    pub fn new(template: DefenseTemplate, config: PlannerConfig) -> DefensePlanner {
        DefensePlanner {
            arena: Arena::new(),
            template,
            config,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn template(&self) -> &DefenseTemplate {
        &self.template
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Run one turn's defense pass. `breaches` are board locations the
    /// opponent scored through recently (extracted from action frames by the
    /// caller); they get a turret one row in front before the greedy fill
    /// starts. Spawns already issued are never rolled back.
    pub fn run_defense_pass(
        &self,
        engine: &mut dyn GameEngine,
        breaches: &[BoardLocation],
        budget: &TurnBudget,
    ) -> Result<PassStats, WardenError> {
        let mut stats = PassStats::default();

        if !budget.has_budget() {
            stats.outcome = PassOutcome::DeadlineExpired;
            return self.finish(stats);
        }

        self.place_opening(engine, budget, &mut stats);
        if stats.outcome == PassOutcome::DeadlineExpired {
            return self.finish(stats);
        }

        self.reinforce_breaches(engine, breaches, budget, &mut stats);
        if stats.outcome == PassOutcome::DeadlineExpired {
            return self.finish(stats);
        }

        if !budget.has_budget() {
            stats.outcome = PassOutcome::DeadlineExpired;
            return self.finish(stats);
        }

        let mut threat = ThreatMap::new();
        threat.full_recompute(Side::Friendly, engine)?;
        threat.trace_scores(Side::Friendly);

        self.greedy_fill(engine, &mut threat, budget, &mut stats)?;
        self.finish(stats)
    }

    /// Phase 1: fixed anchors. A rejected spawn here is routine -- the
    /// anchor is usually standing from an earlier turn.
    fn place_opening(&self, engine: &mut dyn GameEngine, budget: &TurnBudget, stats: &mut PassStats) {
        for placement in &self.config.opening {
            if !budget.has_budget() {
                stats.outcome = PassOutcome::DeadlineExpired;
                return;
            }
            if engine.resource(ResourceKind::Build) < self.config.costs.cost(placement.kind) {
                continue;
            }
            stats.spawn_attempts += 1;
            stats.opening_placed += engine.attempt_spawn(placement.kind, placement.at, 1);
        }
    }

    /// Phase 2: put a turret one row in front of each breached location.
    /// Breach inputs come from outside the crate, so they are validated
    /// against the arena before use.
    fn reinforce_breaches(
        &self,
        engine: &mut dyn GameEngine,
        breaches: &[BoardLocation],
        budget: &TurnBudget,
        stats: &mut PassStats,
    ) {
        for &breach in breaches {
            if !budget.has_budget() {
                stats.outcome = PassOutcome::DeadlineExpired;
                return;
            }
            if !self.arena.contains(breach.col() as i32, breach.row() as i32) {
                continue;
            }

            let front = match ListLocation::from_board(breach.col() as i32, breach.row() as i32 + 1)
            {
                Some(loc) => loc,
                None => continue,
            };
            if front.row() < HALF_ROWS {
                // Never build past the midline.
                continue;
            }
            if engine.resource(ResourceKind::Build) < self.config.costs.cost(DefenseKind::Turret) {
                continue;
            }

            stats.spawn_attempts += 1;
            stats.reactive_placed +=
                engine.attempt_spawn(DefenseKind::Turret, front.to_board(), 1);
        }
    }

    /// Phase 3: per priority class, keep reinforcing the weakest eligible
    /// cell until the class is adequate, blocked, unaffordable, or time is
    /// up.
    fn greedy_fill(
        &self,
        engine: &mut dyn GameEngine,
        threat: &mut ThreatMap,
        budget: &TurnBudget,
        stats: &mut PassStats,
    ) -> Result<(), WardenError> {
        let mut placed: FnvHashSet<ListLocation> = FnvHashSet::default();

        'priorities: for &kind in &self.config.priorities {
            let cost = self.config.costs.cost(kind);
            loop {
                if !budget.has_budget() {
                    stats.outcome = PassOutcome::DeadlineExpired;
                    break 'priorities;
                }
                if engine.resource(ResourceKind::Build) < cost {
                    trace!("balance below {cost} for {kind:?}, advancing");
                    break;
                }

                stats.scans += 1;
                let candidate = threat.weakest_cell(Side::Friendly, |loc| {
                    self.template.kind_at(loc) == Some(kind)
                        && !placed.contains(&loc)
                        && !self.config.holes.contains(&loc.to_board().col())
                });
                let (loc, score) = match candidate {
                    Some(found) => found,
                    None => break,
                };
                if score >= self.config.adequacy_threshold {
                    // Weakest cell is already adequate; so is everything else
                    // under this mask.
                    break;
                }

                if !budget.has_budget() {
                    stats.outcome = PassOutcome::DeadlineExpired;
                    break 'priorities;
                }
                let board = loc.to_board();
                stats.spawn_attempts += 1;
                if engine.attempt_spawn(kind, board, 1) == 0 {
                    trace!("spawn rejected at {board:?}, advancing past {kind:?}");
                    break;
                }
                placed.insert(loc);
                stats.reinforced.push((kind, board));

                if !budget.has_budget() {
                    stats.outcome = PassOutcome::DeadlineExpired;
                    break 'priorities;
                }
                match self.config.update {
                    ThreatUpdate::Recompute => threat.full_recompute(Side::Friendly, engine)?,
                    ThreatUpdate::LocalPatch(profile) => threat.local_patch(board, &profile),
                }
            }
        }

        Ok(())
    }

    fn finish(&self, stats: PassStats) -> Result<PassStats, WardenError> {
        debug!(
            "Defense pass complete: opening={}, reactive={}, reinforced={}, attempts={}, scans={}, outcome={:?}",
            stats.opening_placed,
            stats.reactive_placed,
            stats.reinforced.len(),
            stats.spawn_attempts,
            stats.scans,
            stats.outcome
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn unlimited_budget_never_expires() {
        let budget = TurnBudget::unlimited();
        for _ in 0..1000 {
            assert!(budget.has_budget());
        }
    }

    #[test]
    fn counting_budget_expires_after_its_polls() {
        let polls = Cell::new(0u32);
        let budget = TurnBudget::new(move || {
            polls.set(polls.get() + 1);
            polls.get() <= 3
        });
        assert!(budget.has_budget());
        assert!(budget.has_budget());
        assert!(budget.has_budget());
        assert!(!budget.has_budget());
    }

    #[test]
    fn default_config_prioritizes_turrets_first() {
        let config = PlannerConfig::default();
        assert_eq!(config.priorities.first(), Some(&DefenseKind::Turret));
        assert_eq!(config.adequacy_threshold, ADEQUACY_THRESHOLD);
        assert!(config.holes.is_empty());
    }

    #[test]
    fn fluent_config_accumulates_holes() {
        let config = PlannerConfig::default().with_hole(13).with_hole(14);
        assert_eq!(config.holes, vec![13, 14]);
    }
}
