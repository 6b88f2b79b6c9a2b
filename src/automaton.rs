// src/automaton.rs

//! Cellular automaton engine.
//!
//! `LifeEngine` keeps two generations of the grid. `step` computes every cell
//! of the next generation from the current one and only then swaps the two
//! buffers, so a sweep never observes its own output. The neighbor rule is a
//! fixed birth/survival table (`Rule`), Conway's B3/S23 by default.

use crate::color::Color;
use crate::error::MatrixError;
use crate::frame::FrameBuffer;
use crate::layout::GridDimensions;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stream selector used when a fixed RNG seed is supplied.
const FIXED_SEED_STREAM: u64 = 0x5851_f42d_4c95_7f2d;

const RANDOM_PREFIX: &str = "random:";

/// Live-cell probability of the default random seed.
pub const DEFAULT_DENSITY: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    Alive,
    #[default]
    Dead,
}

impl CellState {
    pub fn is_alive(self) -> bool {
        self == CellState::Alive
    }
}

/// What happens to neighbor lookups that fall off the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Cells beyond the edge count as dead.
    #[default]
    Bounded,
    /// Opposite edges are adjacent.
    Toroidal,
}

/// Birth/survival table indexed by live-neighbor count (0..=8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    birth: [bool; 9],
    survive: [bool; 9],
}

impl Rule {
    pub fn conway() -> Self {
        let mut rule = Rule {
            birth: [false; 9],
            survive: [false; 9],
        };
        rule.birth[3] = true;
        rule.survive[2] = true;
        rule.survive[3] = true;
        rule
    }

    pub fn next_state(&self, current: CellState, live_neighbors: usize) -> CellState {
        let table = match current {
            CellState::Alive => &self.survive,
            CellState::Dead => &self.birth,
        };
        if table.get(live_neighbors).copied().unwrap_or(false) {
            CellState::Alive
        } else {
            CellState::Dead
        }
    }
}

impl Default for Rule {
    fn default() -> Self {
        Rule::conway()
    }
}

impl FromStr for Rule {
    type Err = MatrixError;

    /// Parses `B3/S23` notation (case-insensitive, either half may be empty).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MatrixError::InvalidSeed(format!("unrecognised rule '{}'", s));
        let (birth, survive) = s.trim().split_once('/').ok_or_else(invalid)?;
        let parse_half = |half: &str, prefix: char| -> Result<[bool; 9], MatrixError> {
            let mut chars = half.chars();
            if !chars.next().is_some_and(|c| c.eq_ignore_ascii_case(&prefix)) {
                return Err(invalid());
            }
            let mut table = [false; 9];
            for c in chars {
                match c.to_digit(10) {
                    Some(n) if n <= 8 => table[n as usize] = true,
                    _ => return Err(invalid()),
                }
            }
            Ok(table)
        };
        Ok(Rule {
            birth: parse_half(birth, 'B')?,
            survive: parse_half(survive, 'S')?,
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |table: &[bool; 9]| -> String {
            (0..9)
                .filter(|n| table[*n])
                .map(|n| char::from(b'0' + n as u8))
                .collect()
        };
        write!(f, "B{}/S{}", digits(&self.birth), digits(&self.survive))
    }
}

/// Well-known starting patterns, placed in the middle of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Blinker,
    Block,
    Glider,
    Beacon,
    Toad,
    RPentomino,
}

impl Pattern {
    /// Live cells as `(row, col)` offsets from the pattern's top-left corner.
    pub fn cells(self) -> &'static [(usize, usize)] {
        match self {
            Pattern::Blinker => &[(0, 0), (0, 1), (0, 2)],
            Pattern::Block => &[(0, 0), (0, 1), (1, 0), (1, 1)],
            Pattern::Glider => &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
            Pattern::Beacon => &[
                (0, 0),
                (0, 1),
                (1, 0),
                (1, 1),
                (2, 2),
                (2, 3),
                (3, 2),
                (3, 3),
            ],
            Pattern::Toad => &[(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)],
            Pattern::RPentomino => &[(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)],
        }
    }

    /// `(height, width)` of the pattern's bounding box.
    pub fn extent(self) -> (usize, usize) {
        self.cells()
            .iter()
            .fold((0, 0), |(h, w), (r, c)| (h.max(r + 1), w.max(c + 1)))
    }

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Blinker => "blinker",
            Pattern::Block => "block",
            Pattern::Glider => "glider",
            Pattern::Beacon => "beacon",
            Pattern::Toad => "toad",
            Pattern::RPentomino => "r-pentomino",
        }
    }

    const ALL: [Pattern; 6] = [
        Pattern::Blinker,
        Pattern::Block,
        Pattern::Glider,
        Pattern::Beacon,
        Pattern::Toad,
        Pattern::RPentomino,
    ];
}

/// Initial population of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Seed {
    Pattern(Pattern),
    /// Each cell is alive with `probability`. `rng_seed` makes the fill
    /// reproducible; without it the generator is seeded from the OS.
    Random {
        probability: f32,
        rng_seed: Option<u64>,
    },
}

impl Default for Seed {
    fn default() -> Self {
        Seed::Random {
            probability: DEFAULT_DENSITY,
            rng_seed: None,
        }
    }
}

impl FromStr for Seed {
    type Err = MatrixError;

    /// Accepts a pattern name, `random`, `random:<p>` or a bare probability.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(pattern) = Pattern::ALL
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
        {
            return Ok(Seed::Pattern(*pattern));
        }
        if s.eq_ignore_ascii_case("random") {
            return Ok(Seed::default());
        }
        let probability = s
            .get(..RANDOM_PREFIX.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(RANDOM_PREFIX))
            .map_or(s, |_| &s[RANDOM_PREFIX.len()..]);
        match probability.parse::<f32>() {
            Ok(probability) => Ok(Seed::Random {
                probability,
                rng_seed: None,
            }),
            Err(_) => Err(MatrixError::InvalidSeed(format!(
                "'{}' is neither a known pattern nor a probability",
                s
            ))),
        }
    }
}

/// Colors used when painting a generation into a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub alive: Color,
    pub dead: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            alive: Color::RED,
            dead: Color::BLACK,
        }
    }
}

/// Double-buffered Game of Life (or any B/S rule) engine.
#[derive(Debug, Clone)]
pub struct LifeEngine {
    dims: GridDimensions,
    rule: Rule,
    edges: EdgePolicy,
    current: Vec<CellState>,
    next: Vec<CellState>,
    generation: u64,
}

impl LifeEngine {
    pub fn new(dims: GridDimensions, rule: Rule, edges: EdgePolicy) -> Self {
        LifeEngine {
            dims,
            rule,
            edges,
            current: vec![CellState::Dead; dims.len()],
            next: vec![CellState::Dead; dims.len()],
            generation: 0,
        }
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Clears the grid, applies `seed` and resets the generation counter.
    pub fn seed(&mut self, seed: &Seed) -> Result<(), MatrixError> {
        let mut cells = vec![CellState::Dead; self.dims.len()];
        match *seed {
            Seed::Pattern(pattern) => {
                let (height, width) = pattern.extent();
                if height > self.dims.rows() || width > self.dims.cols() {
                    return Err(MatrixError::InvalidSeed(format!(
                        "pattern '{}' ({}x{}) does not fit a {}x{} grid",
                        pattern.name(),
                        height,
                        width,
                        self.dims.rows(),
                        self.dims.cols()
                    )));
                }
                let top = (self.dims.rows() - height) / 2;
                let left = (self.dims.cols() - width) / 2;
                for (r, c) in pattern.cells() {
                    cells[self.dims.offset(top + r, left + c)] = CellState::Alive;
                }
                debug!(
                    "LifeEngine: Seeded '{}' at ({}, {}).",
                    pattern.name(),
                    top,
                    left
                );
            }
            Seed::Random {
                probability,
                rng_seed,
            } => {
                if !(0.0..=1.0).contains(&probability) {
                    return Err(MatrixError::InvalidSeed(format!(
                        "live-cell probability {} is outside [0, 1]",
                        probability
                    )));
                }
                let state = match rng_seed {
                    Some(value) => (value, FIXED_SEED_STREAM),
                    None => os_seed()?,
                };
                let mut rng: randomize::PCG32 = state.into();
                for cell in cells.iter_mut() {
                    if randomize::f32_half_open_right(rng.next_u32()) < probability {
                        *cell = CellState::Alive;
                    }
                }
                debug!(
                    "LifeEngine: Random fill with p={} left {} live cells.",
                    probability,
                    cells.iter().filter(|c| c.is_alive()).count()
                );
            }
        }
        self.current = cells;
        self.generation = 0;
        Ok(())
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<CellState, MatrixError> {
        self.dims.check(row, col)?;
        Ok(self.current[self.dims.offset(row, col)])
    }

    pub fn set_cell(&mut self, row: usize, col: usize, state: CellState) -> Result<(), MatrixError> {
        self.dims.check(row, col)?;
        let offset = self.dims.offset(row, col);
        self.current[offset] = state;
        Ok(())
    }

    pub fn cells(&self) -> &[CellState] {
        &self.current
    }

    pub fn live_count(&self) -> usize {
        self.current.iter().filter(|c| c.is_alive()).count()
    }

    /// Advances one generation.
    pub fn step(&mut self) {
        for row in 0..self.dims.rows() {
            for col in 0..self.dims.cols() {
                let offset = self.dims.offset(row, col);
                let neighbors = self.live_neighbors(row, col);
                self.next[offset] = self.rule.next_state(self.current[offset], neighbors);
            }
        }
        std::mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;
        trace!(
            "LifeEngine: Generation {} has {} live cells.",
            self.generation,
            self.live_count()
        );
    }

    /// Live cells among the (up to) eight Moore neighbors of a checked cell.
    ///
    /// On a torus narrower than three cells several offsets wrap onto the
    /// same cell, or onto the cell itself; each distinct neighbor counts once
    /// and the cell never counts itself.
    pub fn live_neighbors(&self, row: usize, col: usize) -> usize {
        let (rows, cols) = (self.dims.rows() as isize, self.dims.cols() as isize);
        let mut seen = [(0usize, 0usize); 8];
        let mut distinct = 0;
        let mut count = 0;
        for dr in -1isize..=1 {
            for dc in -1isize..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let (mut r, mut c) = (row as isize + dr, col as isize + dc);
                match self.edges {
                    EdgePolicy::Bounded => {
                        if r < 0 || r >= rows || c < 0 || c >= cols {
                            continue;
                        }
                    }
                    EdgePolicy::Toroidal => {
                        r = r.rem_euclid(rows);
                        c = c.rem_euclid(cols);
                    }
                }
                let neighbor = (r as usize, c as usize);
                if neighbor == (row, col) || seen[..distinct].contains(&neighbor) {
                    continue;
                }
                seen[distinct] = neighbor;
                distinct += 1;
                if self.current[self.dims.offset(neighbor.0, neighbor.1)].is_alive() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Writes the current generation into `frame` using `palette`.
    pub fn paint(&self, frame: &mut FrameBuffer, palette: &Palette) -> Result<(), MatrixError> {
        if frame.dimensions() != self.dims {
            return Err(MatrixError::out_of_range(
                "frame pixel count",
                frame.dimensions().len(),
                self.dims.len(),
            ));
        }
        for row in 0..self.dims.rows() {
            for col in 0..self.dims.cols() {
                let color = if self.current[self.dims.offset(row, col)].is_alive() {
                    palette.alive
                } else {
                    palette.dead
                };
                frame.set(row, col, color)?;
            }
        }
        Ok(())
    }
}

fn os_seed() -> Result<(u64, u64), MatrixError> {
    let mut bytes = [0_u8; 16];
    getrandom::getrandom(&mut bytes).map_err(|e| {
        MatrixError::InvalidSeed(format!("could not read OS randomness: {}", e))
    })?;
    let mut halves = [0_u8; 8];
    halves.copy_from_slice(&bytes[..8]);
    let state = u64::from_ne_bytes(halves);
    halves.copy_from_slice(&bytes[8..]);
    Ok((state, u64::from_ne_bytes(halves)))
}

#[cfg(test)]
mod tests;
