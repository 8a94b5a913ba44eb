//! Diamond-square heightmap engine
//!
//! Builds a (2^n + 1)² grid by repeated midpoint displacement. Each call to
//! [`DiamondSquare::advance`] runs one iteration over every sub-square at the
//! current spacing:
//! 1. Diamond step: the sub-square centre gets the average of its 4 corners
//!    plus a random offset
//! 2. Square step: each of the 4 edge midpoints gets the average of a diamond
//!    made of 2 corners, the centre and a neighbour mirrored across the edge
//!
//! The spacing then halves and the random amplitude decays by 2^-smoothness.
//! Callers can read a normalized snapshot of the full grid or of the coarser
//! grid visible at the current spacing at any point in the run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::ConfigError;
use crate::params::DiamondSquareParams;
use crate::tilemap::Tilemap;

// =============================================================================
// GRID POINTS & SQUARE-STEP INPUT
// =============================================================================

/// A grid coordinate and the elevation stored there.
/// Coordinates are signed because reflected neighbours can land outside the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPoint {
    pub row: isize,
    pub col: isize,
    pub height: f32,
}

impl GridPoint {
    pub fn new(row: isize, col: isize, height: f32) -> Self {
        Self { row, col, height }
    }
}

/// One vertex of a square-step diamond.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Vertex {
    /// Already on the grid
    Known(GridPoint),
    /// Rebuilt by mirroring a known vertex across the diamond
    Reflected,
}

/// The four vertices around an edge midpoint, exactly one of them reflected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquareInput {
    north: Vertex,
    west: Vertex,
    east: Vertex,
    south: Vertex,
}

/// Mirror `opposite` through `known` along one axis.
pub fn reflect(known: isize, opposite: isize) -> isize {
    2 * known - opposite
}

impl SquareInput {
    /// Top edge of a sub-square: the vertex above lies in the sub-square above.
    pub fn missing_north(west: GridPoint, east: GridPoint, south: GridPoint) -> Self {
        Self {
            north: Vertex::Reflected,
            west: Vertex::Known(west),
            east: Vertex::Known(east),
            south: Vertex::Known(south),
        }
    }

    pub fn missing_west(north: GridPoint, east: GridPoint, south: GridPoint) -> Self {
        Self {
            north: Vertex::Known(north),
            west: Vertex::Reflected,
            east: Vertex::Known(east),
            south: Vertex::Known(south),
        }
    }

    pub fn missing_east(north: GridPoint, west: GridPoint, south: GridPoint) -> Self {
        Self {
            north: Vertex::Known(north),
            west: Vertex::Known(west),
            east: Vertex::Reflected,
            south: Vertex::Known(south),
        }
    }

    pub fn missing_south(north: GridPoint, west: GridPoint, east: GridPoint) -> Self {
        Self {
            north: Vertex::Known(north),
            west: Vertex::Known(west),
            east: Vertex::Known(east),
            south: Vertex::Reflected,
        }
    }

    /// Grid coordinates of the reflected vertex.
    pub fn reflected_coords(&self) -> (isize, isize) {
        use Vertex::{Known, Reflected};
        match (self.north, self.west, self.east, self.south) {
            (Reflected, Known(w), _, Known(s)) => (reflect(w.row, s.row), s.col),
            (Known(n), Known(w), _, Reflected) => (reflect(w.row, n.row), n.col),
            (Known(n), Reflected, Known(e), _) => (e.row, reflect(n.col, e.col)),
            (Known(n), Known(w), Reflected, _) => (w.row, reflect(n.col, w.col)),
            // Fields are private and only the missing_* constructors build one
            _ => unreachable!("square input always has exactly one reflected vertex"),
        }
    }

    /// Resolve the reflected vertex's height through `lookup` and return all
    /// four vertices as (north, west, east, south).
    pub fn resolve(&self, lookup: impl Fn(isize, isize) -> f32) -> [GridPoint; 4] {
        let (row, col) = self.reflected_coords();
        let rebuilt = GridPoint::new(row, col, lookup(row, col));
        let pick = |v: Vertex| match v {
            Vertex::Known(p) => p,
            Vertex::Reflected => rebuilt,
        };
        [pick(self.north), pick(self.west), pick(self.east), pick(self.south)]
    }
}

/// Height at a signed grid coordinate, or `outside_height` beyond the edges.
/// In-bounds cells may still hold their zero default if the sub-square that
/// owns them has not been processed yet in this iteration.
pub fn boundary_height(grid: &Tilemap<f32>, row: isize, col: isize, outside_height: f32) -> f32 {
    if grid.contains(row, col) {
        *grid.get(col as usize, row as usize)
    } else {
        outside_height
    }
}

// =============================================================================
// MIN/MAX TRACKING
// =============================================================================

/// Running bounds over written elevations, used to normalize output.
///
/// The minimum only moves for strictly positive values, so the normalization
/// floor never drops below zero. The maximum has no such clamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightRange {
    pub min: f32,
    pub max: f32,
}

impl Default for HeightRange {
    fn default() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }
}

impl HeightRange {
    pub fn record(&mut self, height: f32) {
        if height > self.max {
            self.max = height;
        }
        if height < self.min && height > 0.0 {
            self.min = height;
        }
    }

    /// Whether the bounds span a non-empty interval.
    pub fn is_degenerate(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite() && self.max > self.min)
    }

    /// Map `height` from [min, max] into [0, 1]. Values outside the tracked
    /// bounds are clamped; a degenerate range maps everything to 0.
    pub fn normalize(&self, height: f32) -> f32 {
        if self.is_degenerate() {
            return 0.0;
        }
        ((height - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Stateful diamond-square generator. Single owner, single thread.
pub struct DiamondSquare<R = ChaCha8Rng> {
    params: DiamondSquareParams,
    rng: R,
    grid: Tilemap<f32>,
    resolution: usize,
    /// Spacing between points processed this iteration
    step: usize,
    current_iteration: u32,
    in_progress: bool,
    /// Decays every iteration; starts at `params.variation`
    variation: f32,
    smoothness: f32,
    outside_height: f32,
    height_scaling: f32,
    range: HeightRange,
}

impl DiamondSquare<ChaCha8Rng> {
    /// Create an engine whose random offsets come from ChaCha8 seeded with `seed`.
    pub fn new(params: DiamondSquareParams, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(params, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> DiamondSquare<R> {
    /// Create an engine drawing random offsets from `rng`.
    /// Parameters are validated before the grid is allocated.
    pub fn with_rng(params: DiamondSquareParams, rng: R) -> Result<Self, ConfigError> {
        params.validate()?;

        let mut engine = Self {
            rng,
            grid: Tilemap::new(0, 0),
            resolution: 0,
            step: 0,
            current_iteration: 0,
            in_progress: false,
            variation: params.variation,
            smoothness: params.smoothness,
            outside_height: params.outside_height,
            height_scaling: params.height_scaling,
            range: HeightRange::default(),
            params,
        };
        engine.reset();
        Ok(engine)
    }

    /// Reinitialize grid and iteration state for a fresh run.
    fn reset(&mut self) {
        self.resolution = self.params.resolution();
        let last = self.resolution - 1;

        let mut grid = Tilemap::new_with(self.resolution, self.resolution, 0.0f32);
        let seeds = &self.params.seeds;
        grid.set(0, 0, seeds[0]);
        grid.set(last, 0, seeds[1]);
        grid.set(0, last, seeds[2]);
        grid.set(last, last, seeds[3]);
        self.grid = grid;

        self.step = last;
        self.current_iteration = 0;
        self.in_progress = false;
        self.variation = self.params.variation;
        self.smoothness = self.params.smoothness;
        self.outside_height = self.params.outside_height;
        self.height_scaling = self.params.height_scaling;
        self.range = HeightRange::default();
    }

    /// Run every remaining iteration from a fresh start.
    pub fn generate(&mut self) {
        self.reset();
        self.in_progress = true;
        tracing::debug!(
            resolution = self.resolution,
            iterations = self.params.iteration_count,
            "Starting diamond-square run"
        );

        while self.step > 1 {
            self.advance();
        }
        self.in_progress = false;
    }

    /// Run a single iteration. Starts a fresh run first if none is in progress,
    /// so calling this after a completed run begins a new one.
    ///
    /// Returns false when there was nothing left to subdivide (iteration count 0).
    pub fn advance(&mut self) -> bool {
        if !self.in_progress {
            self.reset();
            self.in_progress = true;
        }
        if self.step <= 1 {
            self.in_progress = false;
            return false;
        }

        self.range = HeightRange::default();

        // Row-major traversal; later sub-squares read cells written by earlier ones
        let step = self.step;
        let last = self.resolution - 1;
        for i in (0..last).step_by(step) {
            for j in (0..last).step_by(step) {
                self.subdivide(i, j, step);
            }
        }

        self.variation *= 2f32.powf(-self.smoothness);
        self.step /= 2;
        self.current_iteration += 1;
        if self.step <= 1 {
            self.in_progress = false;
        }

        tracing::debug!(
            iteration = self.current_iteration,
            step = self.step,
            variation = self.variation,
            min = self.range.min,
            max = self.range.max,
            "Completed iteration"
        );

        true
    }

    /// Diamond step then the four square steps for the sub-square whose
    /// top-left corner is (i, j).
    fn subdivide(&mut self, i: usize, j: usize, step: usize) {
        let top_left = self.point(i, j);
        let top_right = self.point(i, j + step);
        let bottom_left = self.point(i + step, j);
        let bottom_right = self.point(i + step, j + step);

        let centre = self.diamond_step(top_left, top_right, bottom_left, bottom_right);

        self.square_step(SquareInput::missing_north(top_left, top_right, centre));
        self.square_step(SquareInput::missing_west(top_left, centre, bottom_left));
        self.square_step(SquareInput::missing_east(top_right, centre, bottom_right));
        self.square_step(SquareInput::missing_south(centre, bottom_left, bottom_right));
    }

    fn diamond_step(
        &mut self,
        p1: GridPoint,
        p2: GridPoint,
        p3: GridPoint,
        p4: GridPoint,
    ) -> GridPoint {
        let row = (p1.row + p4.row) / 2;
        let col = (p2.col + p3.col) / 2;
        let average = (p1.height + p2.height + p3.height + p4.height) / 4.0;
        let height = average + self.jitter();

        self.write(row, col, height);
        GridPoint::new(row, col, height)
    }

    fn square_step(&mut self, input: SquareInput) {
        let outside_height = self.outside_height;
        let [north, west, east, south] =
            input.resolve(|row, col| boundary_height(&self.grid, row, col, outside_height));

        let row = (north.row + south.row) / 2;
        let col = (west.col + east.col) / 2;
        let average = (north.height + west.height + east.height + south.height) / 4.0;
        let height = average + self.jitter();

        self.write(row, col, height);
    }

    fn point(&self, row: usize, col: usize) -> GridPoint {
        GridPoint::new(row as isize, col as isize, *self.grid.get(col, row))
    }

    /// Midpoints always land inside the grid.
    fn write(&mut self, row: isize, col: isize, height: f32) {
        self.grid.set(col as usize, row as usize, height);
        self.range.record(height);
    }

    /// Uniform offset in [-variation, +variation].
    fn jitter(&mut self) -> f32 {
        let amplitude = self.variation;
        if amplitude > 0.0 && amplitude.is_finite() {
            self.rng.gen_range(-amplitude..=amplitude)
        } else {
            0.0
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn params(&self) -> &DiamondSquareParams {
        &self.params
    }

    /// Side length of the finished grid.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn current_iteration(&self) -> u32 {
        self.current_iteration
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Current random amplitude (after decay).
    pub fn variation(&self) -> f32 {
        self.variation
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    /// Every cell has been filled.
    pub fn is_complete(&self) -> bool {
        self.step <= 1
    }

    /// Side length of the coarse grid visible at the current spacing.
    pub fn intermediate_resolution(&self) -> usize {
        (self.resolution - 1) / self.step + 1
    }

    /// Bounds tracked over the most recent iteration's writes.
    pub fn height_range(&self) -> HeightRange {
        self.range
    }

    /// Copy of the un-normalized grid.
    pub fn raw_heights(&self) -> Tilemap<f32> {
        self.grid.clone()
    }

    /// Full-resolution heights normalized to [0, 1] and multiplied by
    /// `height_scaling`.
    pub fn heights(&self) -> Tilemap<f32> {
        self.sample_normalized(1)
    }

    /// Normalized heights sampled at the current spacing, for previewing an
    /// unfinished run.
    pub fn intermediate_heights(&self) -> Tilemap<f32> {
        self.sample_normalized(self.step)
    }

    fn sample_normalized(&self, stride: usize) -> Tilemap<f32> {
        let stride = stride.max(1);
        let size = (self.resolution - 1) / stride + 1;
        let mut out = Tilemap::new_with(size, size, 0.0f32);
        for (x, y, value) in out.iter_mut() {
            let raw = *self.grid.get(x * stride, y * stride);
            *value = self.range.normalize(raw) * self.height_scaling;
        }
        out
    }
}
