//! 2D toroidal world: grass abundance and agent occupancy per cell.

use grazer_core::{AgentId, Error, PlacementStrategy, Position, Result, SimulationConfig};
use rand::seq::SliceRandom;
use rand::Rng;

/// Two co-indexed toroidal grids: grass units per cell and the agent (if any)
/// standing on it.
///
/// The world holds no agent state beyond the id in each cell; all positions
/// passed in are wrapped onto the torus first.
#[derive(Debug, Clone)]
pub struct World {
    width: i32,
    height: i32,
    grass_cap: Option<u32>,
    grass: Vec<u32>,
    occupancy: Vec<Option<AgentId>>,
    occupied: usize,
}

impl World {
    /// Create an empty world. Both dimensions must be positive and the cell
    /// count must fit in an `i32`.
    pub fn new(width: i32, height: i32, grass_cap: Option<u32>) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidConfig(format!(
                "world dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let size = width.checked_mul(height).ok_or_else(|| {
            Error::InvalidConfig(format!("grid of {}x{} cells is too large", width, height))
        })? as usize;

        Ok(Self {
            width,
            height,
            grass_cap,
            grass: vec![0; size],
            occupancy: vec![None; size],
            occupied: 0,
        })
    }

    /// Create an empty world (no grass, no agents) from a configuration
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let cap = config.grass_cap.map(|cap| cap.max(0) as u32);
        Self::new(config.grid_width, config.grid_height, cap)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn area(&self) -> usize {
        self.grass.len()
    }

    pub fn grass_cap(&self) -> Option<u32> {
        self.grass_cap
    }

    /// Wrap a position onto the grid
    pub fn wrap(&self, pos: Position) -> Position {
        pos.wrap(self.width, self.height)
    }

    /// Grass units at position (with toroidal wrapping)
    pub fn grass_at(&self, pos: Position) -> u32 {
        self.grass[self.index_of(pos)]
    }

    /// Overwrite the grass at a cell, clamped to the cap
    pub fn set_grass_at(&mut self, pos: Position, amount: u32) {
        let index = self.index_of(pos);
        self.grass[index] = match self.grass_cap {
            Some(cap) => amount.min(cap),
            None => amount,
        };
    }

    /// Drop `amount` grass units on uniformly random cells, with replacement.
    ///
    /// Units landing on a cell already at the cap are discarded. One random
    /// draw is made per unit either way. Returns the units actually added.
    pub fn spread_grass<R: Rng + ?Sized>(&mut self, amount: u32, rng: &mut R) -> u32 {
        let mut added = 0;
        for _ in 0..amount {
            let index = rng.gen_range(0..self.grass.len());
            let cell = &mut self.grass[index];
            let full = match self.grass_cap {
                Some(cap) => *cell >= cap,
                None => *cell == u32::MAX,
            };
            if !full {
                *cell += 1;
                added += 1;
            }
        }
        added
    }

    /// Take all grass at a cell, leaving it bare
    pub fn eat_grass_at(&mut self, pos: Position) -> u32 {
        let index = self.index_of(pos);
        std::mem::take(&mut self.grass[index])
    }

    /// Sum of grass over all cells
    pub fn total_grass(&self) -> u64 {
        self.grass.iter().map(|g| *g as u64).sum()
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupancy[self.index_of(pos)].is_some()
    }

    /// Id of the agent standing on a cell
    pub fn occupant(&self, pos: Position) -> Option<AgentId> {
        self.occupancy[self.index_of(pos)]
    }

    /// Number of cells holding an agent
    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Put an agent on a cell. Fails without touching anything if the cell is taken.
    pub fn place_agent(&mut self, id: AgentId, pos: Position) -> bool {
        let index = self.index_of(pos);
        if self.occupancy[index].is_some() {
            return false;
        }
        self.occupancy[index] = Some(id);
        self.occupied += 1;
        true
    }

    /// Clear a cell, returning whoever stood there
    pub fn remove_agent_at(&mut self, pos: Position) -> Option<AgentId> {
        let index = self.index_of(pos);
        let removed = self.occupancy[index].take();
        if removed.is_some() {
            self.occupied -= 1;
        }
        removed
    }

    /// Move the occupant of `from` onto `to`.
    ///
    /// Fails if `to` is taken (including `to == from`) or `from` is empty.
    /// The caller owns the agent record and must update its position on success.
    pub fn move_agent(&mut self, from: Position, to: Position) -> bool {
        let from_index = self.index_of(from);
        let to_index = self.index_of(to);

        if self.occupancy[to_index].is_some() {
            return false;
        }
        match self.occupancy[from_index].take() {
            Some(id) => {
                self.occupancy[to_index] = Some(id);
                true
            }
            None => false,
        }
    }

    /// Pick a free cell uniformly among all free cells.
    ///
    /// Scans the whole grid, so it never misses a free cell no matter how
    /// crowded the world is.
    pub fn find_random_free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        let free: Vec<usize> = self
            .occupancy
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(index, _)| index)
            .collect();

        free.choose(rng).map(|index| self.index_to_pos(*index))
    }

    /// Probe up to `max_attempts` random cells and return the first free one.
    ///
    /// Cheaper than [`World::find_random_free_cell`] on large sparse grids, but
    /// can return `None` on a crowded grid that still has room.
    pub fn find_random_free_cell_sampled<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_attempts: u32,
    ) -> Option<Position> {
        for _ in 0..max_attempts {
            let index = rng.gen_range(0..self.occupancy.len());
            if self.occupancy[index].is_none() {
                return Some(self.index_to_pos(index));
            }
        }
        None
    }

    /// Free-cell search using the configured strategy
    pub fn find_free_cell<R: Rng + ?Sized>(
        &self,
        strategy: PlacementStrategy,
        rng: &mut R,
    ) -> Option<Position> {
        match strategy {
            PlacementStrategy::Exhaustive => self.find_random_free_cell(rng),
            PlacementStrategy::Sampled { max_attempts } => {
                self.find_random_free_cell_sampled(rng, max_attempts)
            }
        }
    }

    /// Row-major grass grid, for rendering
    pub fn grass_cells(&self) -> &[u32] {
        &self.grass
    }

    /// Row-major occupancy grid, for rendering
    pub fn occupancy(&self) -> &[Option<AgentId>] {
        &self.occupancy
    }

    fn index_of(&self, pos: Position) -> usize {
        let wrapped = self.wrap(pos);
        (wrapped.y * self.width + wrapped.x) as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index as i32) % self.width;
        let y = (index as i32) / self.width;
        Position::new(x, y)
    }

    /// Iterator over all positions
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.grass.len()).map(move |i| self.index_to_pos(i))
    }
}
