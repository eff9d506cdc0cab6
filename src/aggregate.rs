//! Spatial aggregation: binning, density, smoothing and clustering.
//!
//! Points are binned by grid coordinate. A [`BinGrid`] can be coarsened from
//! sub-cells to terminal cells, merged with another grid (shard combine),
//! turned into a normalized [`IntensityField`], or clustered into
//! 8-connected [`Cluster`]s.

use std::collections::BTreeMap;

use trueno::Vector;

use crate::scale::ProjectedPoint;

/// Grid coordinate `(x, y)`.
pub type Coord = (u32, u32);

/// Aggregation unit over one grid position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bin {
    /// Number of points.
    pub count: u64,
    /// Summed weight.
    pub weight: f64,
    /// Occurrences of each color-group key.
    pub keys: BTreeMap<String, u32>,
}

impl Bin {
    /// Adds one point.
    pub fn add(&mut self, weight: f64, key: Option<&str>) {
        self.count += 1;
        self.weight += weight;
        if let Some(key) = key {
            *self.keys.entry(key.to_string()).or_insert(0) += 1;
        }
    }

    /// Folds another bin into this one.
    pub fn merge(&mut self, other: &Bin) {
        self.count += other.count;
        self.weight += other.weight;
        for (key, n) in &other.keys {
            *self.keys.entry(key.clone()).or_insert(0) += n;
        }
    }

    /// Mean weight per point.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.weight / self.count as f64
        }
    }

    /// Most frequent key; ties go to the lexicographically smallest.
    #[must_use]
    pub fn majority_key(&self) -> Option<&str> {
        majority(&self.keys)
    }
}

fn majority(keys: &BTreeMap<String, u32>) -> Option<&str> {
    // BTreeMap iterates ascending, so `>` keeps the first key on ties.
    let mut best: Option<(&str, u32)> = None;
    for (key, &n) in keys {
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((key.as_str(), n));
        }
    }
    best.map(|(k, _)| k)
}

/// Occupied bins of a `width × height` grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinGrid {
    width: u32,
    height: u32,
    bins: BTreeMap<Coord, Bin>,
}

impl BinGrid {
    /// Empty grid.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width.max(1), height: height.max(1), bins: BTreeMap::new() }
    }

    /// Bins a sequence of projected points.
    #[must_use]
    pub fn from_points<'a>(
        width: u32,
        height: u32,
        points: impl IntoIterator<Item = &'a ProjectedPoint>,
    ) -> Self {
        let mut grid = Self::new(width, height);
        for p in points {
            grid.insert(p);
        }
        grid
    }

    /// Adds one projected point. Coordinates are clamped into the grid.
    pub fn insert(&mut self, point: &ProjectedPoint) {
        let coord = (point.x.min(self.width - 1), point.y.min(self.height - 1));
        self.bins.entry(coord).or_default().add(point.weight, point.key.as_deref());
    }

    /// Combines another grid into this one.
    ///
    /// Counts and weights are summed and key counts united per coordinate, so
    /// the result does not depend on the order shards are merged in.
    pub fn merge(&mut self, other: &BinGrid) {
        self.width = self.width.max(other.width);
        self.height = self.height.max(other.height);
        for (coord, bin) in &other.bins {
            self.bins.entry(*coord).or_default().merge(bin);
        }
    }

    /// Regroups bins into coarser cells of `fx × fy` positions.
    #[must_use]
    pub fn coarsen(&self, fx: u32, fy: u32) -> Self {
        let (fx, fy) = (fx.max(1), fy.max(1));
        let mut out = Self::new(self.width.div_ceil(fx), self.height.div_ceil(fy));
        for (&(x, y), bin) in &self.bins {
            out.bins.entry((x / fx, y / fy)).or_default().merge(bin);
        }
        out
    }

    /// Grid width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of occupied bins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True when no bin is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Bin at a coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Bin> {
        self.bins.get(&coord)
    }

    /// Occupied bins in `(x, y)` order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Bin)> + '_ {
        self.bins.iter().map(|(c, b)| (*c, b))
    }

    /// Total points across all bins.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.bins.values().map(|b| b.count).sum()
    }

    /// Point counts as an intensity field.
    #[must_use]
    pub fn counts(&self) -> IntensityField {
        self.field(|b| b.count as f64)
    }

    /// Mean weights as an intensity field.
    #[must_use]
    pub fn mean_weights(&self) -> IntensityField {
        self.field(Bin::mean)
    }

    fn field(&self, value: impl Fn(&Bin) -> f64) -> IntensityField {
        let mut field = IntensityField::new(self.width, self.height);
        for (&(x, y), bin) in &self.bins {
            field.set(x, y, value(bin));
        }
        field
    }

    /// Groups 8-connected occupied bins into clusters.
    ///
    /// Clusters are returned sorted by centroid `(y, x)` then by size.
    #[must_use]
    pub fn clusters(&self) -> Vec<Cluster> {
        let coords: Vec<Coord> = self.bins.keys().copied().collect();
        let mut sets = DisjointSet::new(coords.len());

        for (i, &(x, y)) in coords.iter().enumerate() {
            // Forward neighbours only; the rest are visited from the other side.
            let neighbours = [
                (x.checked_add(1), Some(y)),
                (x.checked_sub(1), y.checked_add(1)),
                (Some(x), y.checked_add(1)),
                (x.checked_add(1), y.checked_add(1)),
            ];
            for (nx, ny) in neighbours {
                let (Some(nx), Some(ny)) = (nx, ny) else { continue };
                if let Ok(j) = coords.binary_search(&(nx, ny)) {
                    sets.union(i, j);
                }
            }
        }

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..coords.len() {
            groups.entry(sets.find(i)).or_default().push(i);
        }

        let mut clusters: Vec<Cluster> = groups
            .into_values()
            .map(|members| Cluster::from_members(members.iter().map(|&i| (coords[i], &self.bins[&coords[i]]))))
            .collect();
        clusters.sort_by(|a, b| {
            (a.y, a.x, std::cmp::Reverse(a.count)).cmp(&(b.y, b.x, std::cmp::Reverse(b.count)))
        });
        clusters
    }
}

/// Adjacent bins merged into one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Centroid column (rounded half-to-even).
    pub x: u32,
    /// Centroid row (rounded half-to-even).
    pub y: u32,
    /// Points in the cluster.
    pub count: u64,
    /// Summed weight.
    pub weight: f64,
    /// Member bins.
    pub bins: usize,
    /// Most frequent color-group key.
    pub key: Option<String>,
}

impl Cluster {
    fn from_members<'a>(members: impl Iterator<Item = (Coord, &'a Bin)>) -> Self {
        let mut merged = Bin::default();
        let (mut wx, mut wy, mut cx, mut cy) = (0.0, 0.0, 0.0, 0.0);
        let (mut lo, mut hi) = ((u32::MAX, u32::MAX), (0u32, 0u32));
        let mut negative = false;
        let mut bins = 0usize;
        for ((x, y), bin) in members {
            merged.merge(bin);
            wx += f64::from(x) * bin.weight;
            wy += f64::from(y) * bin.weight;
            cx += f64::from(x) * bin.count as f64;
            cy += f64::from(y) * bin.count as f64;
            lo = (lo.0.min(x), lo.1.min(y));
            hi = (hi.0.max(x), hi.1.max(y));
            negative |= bin.weight < 0.0;
            bins += 1;
        }

        // Weighted centroid only for non-negative weights with a positive sum.
        let (sx, sy, total) = if !negative && merged.weight > 0.0 {
            (wx, wy, merged.weight)
        } else {
            (cx, cy, merged.count.max(1) as f64)
        };
        // The centroid never leaves the members' bounding box.
        let place = |s: f64, lo: u32, hi: u32| {
            let v = round_half_even(s / total);
            if v.is_finite() {
                (v.max(f64::from(lo)) as u32).min(hi)
            } else {
                lo
            }
        };

        Self {
            x: place(sx, lo.0, hi.0),
            y: place(sy, lo.1, hi.1),
            count: merged.count,
            weight: merged.weight,
            bins,
            key: majority(&merged.keys).map(str::to_string),
        }
    }
}

/// Rounds to the nearest integer, ties to even.
#[must_use]
pub fn round_half_even(v: f64) -> f64 {
    let r = v.round();
    if (v - v.trunc()).abs() == 0.5 {
        2.0 * (v / 2.0).round()
    } else {
        r
    }
}

/// Dense scalar field over a grid; zero means empty.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityField {
    width: u32,
    height: u32,
    values: Vec<f64>,
    occupied: Vec<bool>,
}

impl IntensityField {
    /// All-empty field.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let n = width as usize * height as usize;
        Self { width, height, values: vec![0.0; n], occupied: vec![false; n] }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Sets a value and marks the position occupied.
    pub fn set(&mut self, x: u32, y: u32, value: f64) {
        if let Some(i) = self.index(x, y) {
            self.values[i] = value;
            self.occupied[i] = true;
        }
    }

    /// Value at a position, `None` when unoccupied.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        let i = self.index(x, y)?;
        self.occupied[i].then_some(self.values[i])
    }

    /// Field width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Field height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Applies `iterations` passes of a 3×3 blur with center weight 4.
    ///
    /// Edge cells average over their in-bounds neighbours only. Cells that
    /// receive a positive value become occupied.
    #[must_use]
    pub fn smoothed(mut self, iterations: u32) -> Self {
        let (w, h) = (self.width as i64, self.height as i64);
        for _ in 0..iterations {
            let mut next = vec![0.0; self.values.len()];
            for y in 0..h {
                for x in 0..w {
                    let i = (y * w + x) as usize;
                    let mut total = self.values[i] * 4.0;
                    let mut weight = 4.0;
                    for dy in -1..=1 {
                        for dx in -1..=1 {
                            let (nx, ny) = (x + dx, y + dy);
                            if (dx, dy) == (0, 0) || nx < 0 || ny < 0 || nx >= w || ny >= h {
                                continue;
                            }
                            total += self.values[(ny * w + nx) as usize];
                            weight += 1.0;
                        }
                    }
                    next[i] = total / weight;
                }
            }
            self.values = next;
        }
        for (occ, v) in self.occupied.iter_mut().zip(&self.values) {
            *occ = *occ || *v > 0.0;
        }
        self
    }

    /// Scales occupied values into [0, 1].
    ///
    /// Non-negative fields are divided by their maximum, so the largest
    /// value maps to exactly 1.0. Fields with negative values are min-max
    /// normalized. A constant field normalizes to 1.0.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let occupied: Vec<f32> = self
            .values
            .iter()
            .zip(&self.occupied)
            .filter(|(_, &o)| o)
            .map(|(&v, _)| v as f32)
            .collect();
        if occupied.is_empty() {
            return self;
        }

        let vec = Vector::from_vec(occupied);
        let max = vec.max().unwrap_or(0.0);
        let min = vec.min().unwrap_or(0.0);

        for (v, &occ) in self.values.iter_mut().zip(&self.occupied) {
            if !occ {
                continue;
            }
            let x = *v as f32;
            *v = if max == min {
                1.0
            } else if min >= 0.0 {
                f64::from(x / max)
            } else {
                f64::from((x - min) / (max - min))
            };
        }
        self
    }

    /// Occupied positions with their values, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, f64)> + '_ {
        let w = self.width.max(1);
        self.values
            .iter()
            .zip(&self.occupied)
            .enumerate()
            .filter(|(_, (_, &o))| o)
            .map(move |(i, (&v, _))| ((i as u32 % w, i as u32 / w), v))
    }
}

/// Union-find over `0..n` with path halving and union by size.
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect(), size: vec![1; n] }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}
