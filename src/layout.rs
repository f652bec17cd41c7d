//! Hand-designed base shapes.
//!
//! A `DefenseTemplate` fixes, for every list coordinate, which defensive unit
//! class may ever be built there. Templates are described as mirrored
//! run-length rows (edge gap, support, turret, wall, center gap) and expanded
//! against the diamond cross-section at construction; a row that does not
//! span its grid row exactly is rejected. The mask never changes during a
//! match.

use crate::arena::JaggedGrid;
use crate::constants::*;
use crate::error::WardenError;
use crate::location::*;
use itertools::repeat_n;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Defensive unit classes, in the order the standard priority list uses them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum DefenseKind {
    Turret,
    Wall,
    Support,
}

/// Run lengths for one template row, mirrored around the center gap:
/// `gap, support, turret, wall, center, wall, turret, support, gap`.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct RowSpec {
    pub gap: u8,
    pub support: u8,
    pub turret: u8,
    pub wall: u8,
    pub center: u8,
}

impl RowSpec {
    pub const fn new(gap: u8, support: u8, turret: u8, wall: u8, center: u8) -> RowSpec {
        RowSpec {
            gap,
            support,
            turret,
            wall,
            center,
        }
    }

    fn expand(&self) -> impl Iterator<Item = Option<DefenseKind>> {
        repeat_n(None, self.gap as usize)
            .chain(repeat_n(Some(DefenseKind::Support), self.support as usize))
            .chain(repeat_n(Some(DefenseKind::Turret), self.turret as usize))
            .chain(repeat_n(Some(DefenseKind::Wall), self.wall as usize))
            .chain(repeat_n(None, self.center as usize))
            .chain(repeat_n(Some(DefenseKind::Wall), self.wall as usize))
            .chain(repeat_n(Some(DefenseKind::Turret), self.turret as usize))
            .chain(repeat_n(Some(DefenseKind::Support), self.support as usize))
            .chain(repeat_n(None, self.gap as usize))
    }
}

/// Immutable placement mask over the full list grid. Enemy-half rows carry no
/// entries; friendly-half rows come from the 14 supplied `RowSpec`s.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DefenseTemplate {
    id: Uuid,
    cells: JaggedGrid<Option<DefenseKind>>,
}

impl DefenseTemplate {
    /// Build a template from per-row run lengths for the friendly half
    /// (list rows 14..28, front line first).
    pub fn from_rows(id: Uuid, rows: &[RowSpec; 14]) -> Result<DefenseTemplate, WardenError> {
        let mut cells = JaggedGrid::new(None);

        for (i, spec) in rows.iter().enumerate() {
            let row = HALF_ROWS + i as u8;
            let expected = row_width(row);
            let mut actual = 0usize;

            for kind in spec.expand() {
                if actual < expected as usize {
                    cells.set(ListLocation::new(row, actual as u8), kind);
                }
                actual += 1;
            }

            if actual != expected as usize {
                return Err(WardenError::TemplateShape {
                    row,
                    expected,
                    actual,
                });
            }
        }

        Ok(DefenseTemplate { id, cells })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Unit class allowed at a cell, or `None` where nothing may be built.
    pub fn kind_at(&self, loc: ListLocation) -> Option<DefenseKind> {
        *self.cells.get(loc)
    }

    pub fn count_of(&self, kind: DefenseKind) -> usize {
        self.cells.iter().filter(|(_, &k)| k == Some(kind)).count()
    }
}

/// The standard base: a walled front line with a center gap for lane control,
/// turret clusters at the corners and flanks, supports tucked behind.
pub fn standard_template() -> DefenseTemplate {
    let rows = [
        RowSpec::new(0, 0, 3, 8, 6),
        RowSpec::new(0, 0, 3, 7, 6),
        RowSpec::new(1, 0, 3, 6, 4),
        RowSpec::new(1, 1, 3, 5, 2),
        RowSpec::new(1, 1, 3, 4, 2),
        RowSpec::new(2, 1, 3, 3, 0),
        RowSpec::new(2, 1, 3, 2, 0),
        RowSpec::new(2, 1, 2, 2, 0),
        RowSpec::new(2, 1, 2, 1, 0),
        RowSpec::new(2, 1, 1, 1, 0),
        RowSpec::new(2, 1, 1, 0, 0),
        RowSpec::new(2, 0, 1, 0, 0),
        RowSpec::new(1, 0, 1, 0, 0),
        RowSpec::new(1, 0, 0, 0, 0),
    ];

    DefenseTemplate::from_rows(
        Uuid::from_u128(0x8a41_e0c3_5b2d_4f76_9c18_d4a7_02e9_6b35u128),
        &rows,
    )
    .expect("standard template matches the diamond cross-section")
}

/// A fixed anchor placement attempted at the start of every defense pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningPlacement {
    pub kind: DefenseKind,
    pub at: BoardLocation,
}

impl OpeningPlacement {
    pub fn new(kind: DefenseKind, col: u8, row: u8) -> OpeningPlacement {
        OpeningPlacement {
            kind,
            at: BoardLocation::new(col, row),
        }
    }
}

/// The standard opening: corner turrets, mid-line turret pairs, and walls
/// soaking for the flank turrets.
pub fn standard_opening() -> Vec<OpeningPlacement> {
    vec![
        OpeningPlacement::new(DefenseKind::Turret, 0, 13),
        OpeningPlacement::new(DefenseKind::Turret, 27, 13),
        OpeningPlacement::new(DefenseKind::Turret, 8, 11),
        OpeningPlacement::new(DefenseKind::Turret, 19, 11),
        OpeningPlacement::new(DefenseKind::Turret, 13, 11),
        OpeningPlacement::new(DefenseKind::Turret, 14, 11),
        OpeningPlacement::new(DefenseKind::Wall, 8, 12),
        OpeningPlacement::new(DefenseKind::Wall, 19, 12),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_template_spans_every_friendly_row() {
        let template = standard_template();
        // Enemy half carries no entries.
        for loc in all_cells().filter(|l| l.row() < HALF_ROWS) {
            assert_eq!(template.kind_at(loc), None);
        }
        // Front line: turrets on the corners, walls behind, center open.
        assert_eq!(
            template.kind_at(ListLocation::new(14, 0)),
            Some(DefenseKind::Turret)
        );
        assert_eq!(
            template.kind_at(ListLocation::new(14, 3)),
            Some(DefenseKind::Wall)
        );
        assert_eq!(template.kind_at(ListLocation::new(14, 13)), None);
    }

    #[test]
    fn misshapen_rows_are_rejected() {
        let mut rows = [RowSpec::new(1, 0, 0, 0, 0); 14];
        rows[0] = RowSpec::new(0, 0, 3, 8, 7);

        let err = DefenseTemplate::from_rows(Uuid::from_u128(1), &rows).unwrap_err();
        match err {
            WardenError::TemplateShape { row, expected, actual } => {
                assert_eq!(row, 14);
                assert_eq!(expected, 28);
                assert_eq!(actual, 29);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn standard_opening_sits_on_the_friendly_half() {
        for placement in standard_opening() {
            let list = ListLocation::from_board(placement.at.col() as i32, placement.at.row() as i32)
                .expect("opening anchors are inside the diamond");
            assert!(list.row() >= HALF_ROWS);
        }
    }

    #[test]
    fn template_round_trips_through_bincode() {
        let template = standard_template();
        let bytes = bincode::serialize(&template).expect("serialize template");
        let restored: DefenseTemplate = bincode::deserialize(&bytes).expect("deserialize template");
        assert_eq!(restored.id(), template.id());
        for loc in all_cells() {
            assert_eq!(restored.kind_at(loc), template.kind_at(loc));
        }
    }
}
