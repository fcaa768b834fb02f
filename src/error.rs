//! Error types shared by every module of the crate.
//!
//! Walking off the edge of a board is deliberately absent here: it yields an invalid ref, not an error.

/// Result type alias for fallible grid and solver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building boards or solving them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Givens did not match the dimensions of the board they were meant for.
    #[error("givens do not fit a {width}x{height} board: {reason}")]
    ShapeMismatch {
        /// Board width in cells.
        width: usize,
        /// Board height in cells.
        height: usize,
        /// What was wrong with the givens.
        reason: String,
    },

    /// The solver proved that no assignment satisfies the constraints added so far.
    #[error("constraints are unsatisfiable")]
    Unsatisfiable,

    /// A walk along the point lattice was requested with offset 0.
    #[error("cannot walk zero edges from a point")]
    ZeroOffset,

    /// Box dimensions do not evenly divide the board.
    #[error("{box_width}x{box_height} boxes do not tile a {width}x{height} board")]
    BoxMismatch {
        /// Board width in cells.
        width: usize,
        /// Board height in cells.
        height: usize,
        /// Requested box width.
        box_width: usize,
        /// Requested box height.
        box_height: usize,
    },

    /// A hexagonal board description produced a row with no cells, or named a corner row outside the board.
    #[error("hexagonal board is degenerate at row {row}")]
    DegenerateHexBoard {
        /// The offending row.
        row: isize,
    },

    /// An integer variable was declared with an empty range.
    #[error("variable {name} has empty domain {min}..={max}")]
    EmptyDomain {
        /// Variable name.
        name: String,
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },

    /// The connectivity repair loop gave up before finding a connected solution.
    #[error("no connected solution found within {0} attempts")]
    AttemptLimit(usize),

    /// A formula mentioned a variable the solver never declared, including variables of other solvers.
    #[error("variable #{0} was not declared on this solver")]
    UnknownVariable(usize),

    /// Encoding an arithmetic term produced a value outside `i64`.
    #[error("arithmetic overflow while encoding a term")]
    ArithmeticOverflow,

    /// The SAT backend failed for a reason other than unsatisfiability.
    #[error("SAT backend error: {0}")]
    Backend(String),
}
