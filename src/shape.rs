//! Directions of travel between cells and the edge and point kinds they imply.

use std::hash::Hash;

use itertools::Itertools;
use strum::VariantArray;

use crate::location::{HexLocation, Location};

/// Functionality that must be implemented on a case-by-case basis for any cell shape.
///
/// [`SquareStep`] and [`HexStep`] are built-in implementations.
/// Each variant doubles as an index into per-direction link arrays, in `VARIANTS` order.
pub trait Step: Sized + Copy + VariantArray + PartialEq + Eq + Hash + Ord + PartialOrd {
    /// The coordinate type this kind of step moves between.
    type At: Copy + Eq;
    /// Attempt the step from `at` in the direction specified by `self` and return the resultant location.
    fn attempt_from(&self, at: Self::At) -> Self::At;
    /// The static array of all "forward" directions.
    ///
    /// Forward directions are those which move a cell to one that comes later in row-major order.
    /// For [`SquareStep`], [`DOWN`](SquareStep::Down) and [`RIGHT`](SquareStep::Right) are forward directions.
    const FORWARD_VARIANTS: &'static [Self];
    /// Invert the direction specified by `self`.
    fn invert(&self) -> Self;
    /// Position of `self` within `VARIANTS`, used to index link arrays.
    fn index(&self) -> usize;
}

/// Moves between square cells of a rectangular grid, or between points of its lattice.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum SquareStep {
    /// Toward row 0.
    Up,
    /// Away from row 0.
    Down,
    /// Toward column 0.
    Left,
    /// Away from column 0.
    Right,
}

impl Step for SquareStep {
    type At = Location;

    fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((0, -1)),
            Self::Down => location.offset_by((0, 1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
        }
    }

    const FORWARD_VARIANTS: &'static [Self] = &[Self::Right, Self::Down];

    fn invert(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

// NB: hexagonal grids use pointy-top hexes laid out in rows, e.g. for a hexagon of side 2:
//   0 1
//  0 1 2
//   0 1
// A cell's W and E neighbours share its row; the other four sit in the rows above and below.
/// Moves between neighbouring cells of a hexagonal grid.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum HexStep {
    /// Same row, to the west.
    W,
    /// Row above, to the west.
    NW,
    /// Row above, to the east.
    NE,
    /// Same row, to the east.
    E,
    /// Row below, to the east.
    SE,
    /// Row below, to the west.
    SW,
}

impl Step for HexStep {
    type At = HexLocation;

    fn attempt_from(&self, location: HexLocation) -> HexLocation {
        // components are (s, nw, ne); every cell-to-cell step keeps the sum at zero
        match self {
            Self::W => location.offset_by((0, 1, -1)),
            Self::NW => location.offset_by((-1, 1, 0)),
            Self::NE => location.offset_by((-1, 0, 1)),
            Self::E => location.offset_by((0, -1, 1)),
            Self::SE => location.offset_by((1, -1, 0)),
            Self::SW => location.offset_by((1, 0, -1)),
        }
    }

    const FORWARD_VARIANTS: &'static [Self] = &[Self::E, Self::SE, Self::SW];

    fn invert(&self) -> Self {
        match self {
            Self::W => Self::E,
            Self::NW => Self::SE,
            Self::NE => Self::SW,
            Self::E => Self::W,
            Self::SE => Self::NW,
            Self::SW => Self::NE,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Functionality on top of [`Step`] with identical implementation across all step types.
pub trait BoardShape: Step {
    /// Get all neighbors of a location in "theory", by attempting every step direction in `Self::VARIANTS`.
    fn neighbors_of(at: Self::At) -> Vec<(Self, Self::At)>;
    /// Determine the direction from `a` to `b` by calling [`attempt_from`](Step::attempt_from) until one works.
    ///
    /// Returns [`None`] unless `b` is one step away from `a`.
    fn direction_to(a: Self::At, b: Self::At) -> Option<Self>;
    /// Convert this [`Self`] to a "forward" direction, if it is not already such a direction.
    ///
    /// For the definition of forward directions, see [`Step::FORWARD_VARIANTS`].
    fn ensure_forward(&self) -> Self;
}

impl<Sh> BoardShape for Sh
where
    Sh: Step,
{
    fn neighbors_of(at: Self::At) -> Vec<(Self, Self::At)> {
        Self::VARIANTS.iter()
            .map(|dir| (*dir, dir.attempt_from(at)))
            .collect_vec()
    }

    fn direction_to(a: Self::At, b: Self::At) -> Option<Self> {
        Self::VARIANTS.iter().find(|dir| dir.attempt_from(a) == b).copied()
    }

    fn ensure_forward(&self) -> Self {
        match Self::FORWARD_VARIANTS.contains(self) {
            true => *self,
            false => self.invert(),
        }
    }
}

/// The two edge flavours of a rectangular grid.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Orientation {
    /// Runs left to right; edge `(x, y)` is the top side of cell `(x, y)`.
    Horizontal,
    /// Runs top to bottom; edge `(x, y)` is the left side of cell `(x, y)`.
    Vertical,
}

/// The three edge flavours of a hexagonal grid, named by the direction each runs in.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum HexAxis {
    /// Separates W and E neighbours.
    Vertical,
    /// Runs NE to SW, separating NW and SE neighbours.
    NeSw,
    /// Runs NW to SE, separating NE and SW neighbours.
    NwSe,
}

/// Points of a hexagonal grid come in two kinds depending on which way their three edges fan out.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum HexPointKind {
    /// Edges run S, NW and NE; coordinates sum to 1.
    Southward,
    /// Edges run N, SE and SW; coordinates sum to -1.
    Northward,
}
