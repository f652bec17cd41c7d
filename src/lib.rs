pub mod arena;
pub mod constants;
pub mod engine;
pub mod error;
pub mod layout;
pub mod location;
pub mod planner;
pub mod threat;

pub use crate::arena::{Arena, ArenaFlags, JaggedGrid};
pub use crate::engine::{GameEngine, ResourceKind, Side};
pub use crate::error::WardenError;
pub use crate::layout::{
    standard_opening, standard_template, DefenseKind, DefenseTemplate, OpeningPlacement, RowSpec,
};
pub use crate::location::{all_cells, board_to_list, list_to_board, BoardLocation, ListLocation};
pub use crate::planner::{
    DefensePlanner, PassOutcome, PassStats, PlannerConfig, TurnBudget, UnitCosts,
};
pub use crate::threat::{PatchProfile, ThreatMap, ThreatUpdate};
