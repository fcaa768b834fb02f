#![warn(missing_docs)]

//! # `gridlogic`
//!
//! Building blocks for solving grid logic puzzles (Slitherlink, Masyu, Nurikabe-style region puzzles, Sudoku and friends) with a SAT solver.
//! Begin by building a board, either a rectangular [`Grid`] or a hexagonal [`HexGrid`], and declare a solver variable on each cell, edge or point you care about.
//! State the puzzle's rules as [`Formula`]s built from those variables, add them to a [`Solver`] such as [`SatSolver`], and check.
//! If the puzzle asks for a single connected region or loop, run the [`RepairLoop`](connectivity::RepairLoop) instead of checking directly.
//!
//! # Navigation
//! Boards hand out refs ([`CellRef`](grid::CellRef), [`EdgeRef`](grid::EdgeRef), [`PointRef`](grid::PointRef) and their hex counterparts)
//! which may point at nothing: asking for the cell left of a cell in column 0 gives an empty ref rather than an error.
//! The [`term`](grid::CellRef::term) of an empty ref is invalid, and anything built from an invalid term is invalid too.
//! The solver drops invalid formulas, so a rule like "this cell differs from the cell to its left" can be added for every cell without special-casing the border.
//!
//! # Connectivity
//! "All shaded cells are connected" has no compact clause form. Instead, the repair loop solves, splits the candidate into components with a
//! [`UnionFind`](union_find::UnionFind), and when there is more than one, adds a constraint forbidding each component as it stands, then solves again.
//! The components come from an [`Adjacency`](connectivity::Adjacency); [`CellRegion`](connectivity::CellRegion) and [`EdgeLoop`](connectivity::EdgeLoop)
//! cover shaded regions and edge loops on either board shape.

pub use error::{Error, Result};
pub use expr::{Formula, Term};
pub use givens::{parse_givens, Given, Givens};
pub use grid::Grid;
pub use hex::HexGrid;
pub use location::{regularize, HexLocation, Location};
pub use solver::{Model, SatSolver, Solver, Var};

mod tests;
pub mod connectivity;
pub mod error;
pub mod expr;
pub mod givens;
pub mod grid;
pub mod hex;
pub mod location;
pub(crate) mod logic;
pub mod render;
pub mod shape;
pub mod solver;
pub mod union_find;
