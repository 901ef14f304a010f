//! Component D — geometry primitives on cells.
//!
//! All arithmetic works in the wide (`f64`) coordinate domain regardless of
//! the tree's on-disk `CoordKind`.

use super::rtree_types::Cell;

/// Product of `hi_i - lo_i` over every dimension.
pub fn area(c: &Cell, ndim: usize) -> f64 {
    let mut a = 1.0;
    for d in 0..ndim {
        a *= c.hi(d) - c.lo(d);
    }
    a
}

/// Sum of `hi_i - lo_i` over every dimension.
pub fn margin(c: &Cell, ndim: usize) -> f64 {
    let mut m = 0.0;
    for d in 0..ndim {
        m += c.hi(d) - c.lo(d);
    }
    m
}

/// Replaces `c`'s ranges with the elementwise min/max of `c` and `d`.
pub fn union_into(c: &mut Cell, d: &Cell, ndim: usize) {
    for dim in 0..ndim {
        let lo = c.lo(dim).min(d.lo(dim));
        let hi = c.hi(dim).max(d.hi(dim));
        c.set_lo(dim, lo);
        c.set_hi(dim, hi);
    }
}

/// Returns the union of `a` and `b` without mutating either.
pub fn union(a: &Cell, b: &Cell, ndim: usize) -> Cell {
    let mut out = *a;
    union_into(&mut out, b, ndim);
    out
}

/// `true` iff `c` contains `d` on every dimension.
pub fn contains(c: &Cell, d: &Cell, ndim: usize) -> bool {
    (0..ndim).all(|i| c.lo(i) <= d.lo(i) && c.hi(i) >= d.hi(i))
}

/// `true` iff `c` and `d` overlap (touching counts as overlap) on every dimension.
pub fn intersects(c: &Cell, d: &Cell, ndim: usize) -> bool {
    (0..ndim).all(|i| c.lo(i) <= d.hi(i) && c.hi(i) >= d.lo(i))
}

/// Area added to `c` by unioning with `d`.
pub fn growth(c: &Cell, d: &Cell, ndim: usize) -> f64 {
    union(c, d, ndim).pipe_area(ndim) - area(c, ndim)
}

trait PipeArea {
    fn pipe_area(&self, ndim: usize) -> f64;
}
impl PipeArea for Cell {
    fn pipe_area(&self, ndim: usize) -> f64 {
        area(self, ndim)
    }
}

/// N-volume of the intersection of `c` with `d`, zero if they don't overlap
/// on some dimension.
pub fn overlap_volume(c: &Cell, d: &Cell, ndim: usize) -> f64 {
    let mut vol = 1.0;
    for i in 0..ndim {
        let lo = c.lo(i).max(d.lo(i));
        let hi = c.hi(i).min(d.hi(i));
        if hi < lo {
            return 0.0;
        }
        vol *= hi - lo;
    }
    vol
}

/// Sum of `overlap_volume(c, s)` over a set of cells.
pub fn overlap(c: &Cell, set: &[Cell], ndim: usize) -> f64 {
    set.iter().map(|s| overlap_volume(c, s, ndim)).sum()
}

/// Overlap enlargement: `overlap(c ∪ x, set) - overlap(c, set)`, excluding
/// the entry at `exclude_index` from `set` (the cell being evaluated for
/// insertion is itself not yet a sibling).
pub fn overlap_enlargement(c: &Cell, x: &Cell, set: &[Cell], exclude_index: usize, ndim: usize) -> f64 {
    let others: Vec<Cell> = set
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != exclude_index)
        .map(|(_, v)| *v)
        .collect();
    let merged = union(c, x, ndim);
    overlap(&merged, &others, ndim) - overlap(c, &others, ndim)
}

/// Squared Euclidean distance between `c`'s center and `reference`'s center.
pub fn center_distance_sq(c: &Cell, reference: &Cell, ndim: usize) -> f64 {
    let mut sum = 0.0;
    for i in 0..ndim {
        let cc = (c.lo(i) + c.hi(i)) / 2.0;
        let rc = (reference.lo(i) + reference.hi(i)) / 2.0;
        let diff = cc - rc;
        sum += diff * diff;
    }
    sum
}
