use crate::constants::*;
use crate::location::*;
use bitflags::*;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ArenaFlags: u8 {
        const NONE = 0;
        const IN_ARENA = 1;
        const FRIENDLY_HALF = 2;
        const ENEMY_HALF = 4;
        const DEPLOY_EDGE = 8;
    }
}

/// Precomputed per-board-cell classification of the diamond arena.
///
/// Built once at match start; membership and half lookups are flat-buffer
/// reads after that.
#[derive(Clone)]
pub struct Arena {
    buffer: Vec<u8>,
}

impl Arena {
    pub fn new() -> Arena {
        let mut buffer = vec![0u8; (BOARD_SIZE as usize) * (BOARD_SIZE as usize)];

        for loc in all_cells() {
            let mut flags = ArenaFlags::IN_ARENA;
            if loc.row() < HALF_ROWS {
                flags |= ArenaFlags::ENEMY_HALF;
            } else {
                flags |= ArenaFlags::FRIENDLY_HALF;
            }
            if loc.col() == 0 || loc.col() == row_width(loc.row()) - 1 {
                flags |= ArenaFlags::DEPLOY_EDGE;
            }

            let board = loc.to_board();
            let index = (board.row() as usize * BOARD_SIZE as usize) + board.col() as usize;
            buffer[index] = flags.bits();
        }

        Arena { buffer }
    }

    pub fn get(&self, col: u8, row: u8) -> ArenaFlags {
        let index = (row as usize * BOARD_SIZE as usize) + col as usize;
        ArenaFlags::from_bits_truncate(self.buffer[index])
    }

    /// Whether a (possibly off-board) coordinate lies inside the diamond.
    pub fn contains(&self, col: i32, row: i32) -> bool {
        (0..BOARD_SIZE as i32).contains(&col)
            && (0..BOARD_SIZE as i32).contains(&row)
            && self.get(col as u8, row as u8).contains(ArenaFlags::IN_ARENA)
    }

    pub fn is_friendly(&self, col: u8, row: u8) -> bool {
        self.get(col, row).contains(ArenaFlags::FRIENDLY_HALF)
    }

    /// Friendly deploy edges: the two lower diagonals mobile units launch from.
    pub fn friendly_edges(&self) -> Vec<BoardLocation> {
        let mut edges = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let flags = self.get(col, row);
                if flags.contains(ArenaFlags::FRIENDLY_HALF | ArenaFlags::DEPLOY_EDGE) {
                    edges.push(BoardLocation::new(col, row));
                }
            }
        }
        edges
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

/// Dense storage shaped like the diamond: one slot per list coordinate,
/// flattened into a single 420-element buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JaggedGrid<T: Copy> {
    data: Vec<T>,
}

impl<T: Copy> JaggedGrid<T> {
    pub fn new(initial: T) -> Self {
        JaggedGrid {
            data: vec![initial; TOTAL_CELLS],
        }
    }

    #[inline]
    pub fn get(&self, loc: ListLocation) -> &T {
        &self.data[loc.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, loc: ListLocation) -> &mut T {
        &mut self.data[loc.index()]
    }

    #[inline]
    pub fn set(&mut self, loc: ListLocation, value: T) {
        *self.get_mut(loc) = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ListLocation, &T)> + '_ {
        all_cells().map(move |loc| (loc, self.get(loc)))
    }
}

impl<T: Copy + Serialize> Serialize for JaggedGrid<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.data.serialize(serializer)
    }
}

impl<'de, T: Copy + Deserialize<'de>> Deserialize<'de> for JaggedGrid<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = Vec::<T>::deserialize(deserializer)?;
        if data.len() != TOTAL_CELLS {
            return Err(serde::de::Error::custom("Invalid arena grid size"));
        }
        Ok(JaggedGrid { data })
    }
}
