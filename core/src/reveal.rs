use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{Coord2, GameError, Result, TileId};

/// Square grid holding the hidden illustration. The size must be odd so the
/// center cell, which distances are measured from, is well defined.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    size: usize,
}

impl GridSpec {
    pub const fn new_unchecked(size: usize) -> Self {
        Self { size }
    }

    pub fn new(size: usize) -> Result<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(GameError::EvenGridSize(size));
        }
        Ok(Self::new_unchecked(size))
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn center(&self) -> usize {
        self.size / 2
    }

    pub const fn total_tiles(&self) -> usize {
        self.size * self.size
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::new_unchecked(5)
    }
}

/// One cell of the reveal grid.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub row: usize,
    pub col: usize,
    /// Euclidean distance to the grid's center cell, fixed at generation.
    pub distance_from_center: f64,
}

pub trait RevealOrderGenerator {
    fn generate(self, grid: GridSpec) -> RevealPlan;
}

/// Orders tiles from the edges inward, with random jitter so the uncovering
/// does not march in perfect distance rings.
///
/// Each cell gets a one-time score `distance_from_center + U * jitter` with
/// `U` drawn from `[0, 1)` out of an RNG seeded per generation; the descending
/// sort of those scores is computed once and frozen, so a given seed always
/// yields the same order.
#[derive(Clone, Debug, PartialEq)]
pub struct NoisyRadialGenerator {
    seed: u64,
    jitter: f64,
}

impl NoisyRadialGenerator {
    pub const DEFAULT_JITTER: f64 = 1.5;

    pub fn new(seed: u64) -> Self {
        Self::with_jitter(seed, Self::DEFAULT_JITTER)
    }

    pub fn with_jitter(seed: u64, jitter: f64) -> Self {
        Self { seed, jitter }
    }
}

impl RevealOrderGenerator for NoisyRadialGenerator {
    fn generate(self, grid: GridSpec) -> RevealPlan {
        use rand::prelude::*;

        let center = grid.center() as f64;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut scored: Vec<(Tile, f64)> = Vec::with_capacity(grid.total_tiles());
        for row in 0..grid.size() {
            for col in 0..grid.size() {
                let dr = row as f64 - center;
                let dc = col as f64 - center;
                let distance_from_center = (dr * dr + dc * dc).sqrt();
                let tile = Tile {
                    id: row * grid.size() + col,
                    row,
                    col,
                    distance_from_center,
                };
                let noise: f64 = rng.random::<f64>() * self.jitter;
                scored.push((tile, distance_from_center + noise));
            }
        }
        // The noisy score only exists to produce the order; it is not kept.
        scored.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        RevealPlan::from_sorted(grid, scored)
    }
}

/// The frozen reveal order for one piece of hidden-image content.
///
/// Generated exactly once per session; all queries against a plan are
/// consistent with each other, so a cell revealed at some count stays revealed
/// at every higher count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealPlan {
    grid: GridSpec,
    /// Row-major, indexable by `TileId`.
    tiles: Vec<Tile>,
    /// Tile ids in reveal order.
    order: Vec<TileId>,
    /// Reveal rank per cell, the inverse permutation of `order`.
    ranks: Array2<usize>,
}

impl RevealPlan {
    fn from_sorted(grid: GridSpec, scored: Vec<(Tile, f64)>) -> Self {
        let mut order = Vec::with_capacity(scored.len());
        let mut ranks = Array2::from_elem((grid.size(), grid.size()), 0);
        for (rank, (tile, _)) in scored.iter().enumerate() {
            order.push(tile.id);
            ranks[(tile.row, tile.col)] = rank;
        }
        let mut tiles: Vec<Tile> = scored.into_iter().map(|(tile, _)| tile).collect();
        tiles.sort_by_key(|tile| tile.id);
        Self {
            grid,
            tiles,
            order,
            ranks,
        }
    }

    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    pub fn total_tiles(&self) -> usize {
        self.order.len()
    }

    /// Row-major tiles, for rendering.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_at(&self, (row, col): Coord2) -> &Tile {
        &self.tiles[row * self.grid.size() + col]
    }

    /// Position of a cell in the reveal order.
    pub fn reveal_rank(&self, coords: Coord2) -> usize {
        self.ranks[coords]
    }

    /// The ids uncovered once `count` tiles are revealed, in reveal order.
    /// Counts beyond the grid saturate at the full set.
    pub fn revealed(&self, count: usize) -> &[TileId] {
        &self.order[..count.min(self.order.len())]
    }

    pub fn is_revealed(&self, coords: Coord2, count: usize) -> bool {
        self.ranks[coords] < count
    }
}
