//! # Error Module
//!
//! Error kinds for the event-driven simulation core, one variant family per
//! failure class named in the design: configuration errors (caught before
//! the event loop starts), numerical errors (fatal mid-run), and consistency
//! errors (fatal in debug builds, logged in release).

use thiserror::Error;

/// Top-level error type for the simulation core.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Numerical(#[from] NumericalError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML decode error: {0}")]
    XmlDe(#[from] quick_xml::DeError),

    #[error("XML encode error: {0}")]
    XmlSe(#[from] quick_xml::SeError),
}

/// Malformed configuration, discovered before the event loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown Type attribute `{attr}` on <{element}>")]
    UnknownType { element: &'static str, attr: String },

    #[error("missing required attribute `{0}`")]
    MissingAttribute(&'static str),

    #[error("attribute `{name}` has invalid value `{value}`: {reason}")]
    InvalidAttribute {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Oversize must be > 1.0, got {0}")]
    InvalidOversize(f64),

    #[error("Lambda must lie in [0, 1], got {0}")]
    InvalidLambda(f64),

    #[error("cell count {0} out of supported range [3, 255]")]
    CellCountOutOfRange(usize),

    #[error("SOCells requires N to be a perfect cube, got N={0}")]
    NotAPerfectCube(usize),

    #[error("ParabolaSentinel global is required when Liouvillean is NewtonianGravity")]
    MissingParabolaSentinel,

    #[error("Lees-Edwards boundary conditions combined with NewtonianGravity are unsupported")]
    ShearingGravityUnsupported,
}

/// Errors surfaced mid-run by numerically impossible states.
#[derive(Debug, Error)]
pub enum NumericalError {
    #[error("sorter produced a negative dt: {0}")]
    NegativeDt(f64),

    #[error("Liouvillean produced a NaN event time")]
    NanEventTime,

    #[error("particle {0} was queried while not up to date")]
    ParticleNotUpToDate(u32),
}

/// Internal invariant violations: wrong-cell membership, overlaps, etc.
#[derive(Debug, Error)]
pub enum ConsistencyError {
    #[error("particle {particle} found in cell {found} but indexed under cell {indexed}")]
    WrongCell {
        particle: u32,
        found: usize,
        indexed: usize,
    },

    #[error("overlap detected between particle {a} and particle {b}")]
    Overlap { a: u32, b: u32 },

    #[error("collision would place particle {0} outside periodic bounds after retry")]
    BoundsViolation(u32),
}
