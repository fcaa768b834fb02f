//! Coordinates on rectangular and hexagonal lattices.

use std::num::NonZero;

use ndarray::Ix;

/// A signed lattice coordinate; negative values name places off the board.
pub type Coord = isize;
/// A board dimension, which is never zero.
pub type Dimension = NonZero<usize>;

/// A position on a rectangular lattice, `(x, y)` with `y` growing downward.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
pub struct Location(pub Coord, pub Coord);

impl Location {
    /// The `[row, column]` index into an [`ndarray::Array2`], or `None` when negative.
    pub(crate) fn as_index(&self) -> Option<(Ix, Ix)> {
        Some((usize::try_from(self.1).ok()?, usize::try_from(self.0).ok()?))
    }

    /// Translate by `(dx, dy)`.
    pub fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.1 as Coord, value.0 as Coord)
    }
}

/// A position on a hexagonal lattice, counted in steps toward the S, NW and NE corners of a pointy-top hex.
///
/// The three axes are 120 degrees apart, so `(s + k, nw + k, ne + k)` names the same place for any `k`.
/// Cells are stored with sum 0, southward points with sum 1 and northward points with sum -1.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
pub struct HexLocation(pub Coord, pub Coord, pub Coord);

impl HexLocation {
    /// Shift all three components by the same amount so that the sum lands in `{-1, 0, 1}`.
    pub fn regularize(self) -> Self {
        let shift = (self.sum() + 1).div_euclid(3);
        Self(self.0 - shift, self.1 - shift, self.2 - shift)
    }

    /// Sum of the three components: 0 for cells, 1 and -1 for points.
    pub fn sum(&self) -> Coord {
        self.0 + self.1 + self.2
    }

    /// Translate componentwise.
    pub fn offset_by(self, rhs: (isize, isize, isize)) -> Self {
        Self(self.0 + rhs.0, self.1 + rhs.1, self.2 + rhs.2)
    }
}

/// Free-function form of [`HexLocation::regularize`].
pub fn regularize(s: Coord, nw: Coord, ne: Coord) -> HexLocation {
    HexLocation(s, nw, ne).regularize()
}
