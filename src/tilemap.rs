/// A dense 2D grid stored row-major. Unlike a planet map, a heightmap tile
/// does not wrap at any edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Whether a signed (row, col) coordinate falls inside the map.
    pub fn contains(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    /// Copy out the rows as nested vectors, for callers that want a plain 2D array.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.data.chunks(self.width.max(1)).map(|row| row.to_vec()).collect()
    }
}

/// Summary statistics over a heightmap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl Tilemap<f32> {
    /// Minimum and maximum value in the map.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min_h = f32::MAX;
        let mut max_h = f32::MIN;
        for &h in &self.data {
            if h < min_h {
                min_h = h;
            }
            if h > max_h {
                max_h = h;
            }
        }
        (min_h, max_h)
    }

    pub fn stats(&self) -> HeightStats {
        let (min, max) = self.min_max();
        let sum: f64 = self.data.iter().map(|&h| h as f64).sum();
        let mean = if self.data.is_empty() {
            0.0
        } else {
            (sum / self.data.len() as f64) as f32
        };
        HeightStats { min, max, mean }
    }

    /// Every value is neither NaN nor infinite.
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|h| h.is_finite())
    }
}
