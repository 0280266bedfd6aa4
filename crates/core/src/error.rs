use std::path::PathBuf;

/// The canonical structure could not be derived or is topologically invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error("sequence has {sequence} residues but the structure has {structure}")]
    LengthMismatch { sequence: usize, structure: usize },
    #[error("residue {index} is paired with itself")]
    SelfPair { index: usize },
    #[error("partner {partner} of residue {index} is out of range")]
    PartnerOutOfRange { index: usize, partner: usize },
    #[error("pairing is not symmetric: {index} -> {partner} but {partner} -> {back:?}")]
    Asymmetric {
        index: usize,
        partner: usize,
        back: Option<usize>,
    },
    #[error("pairs ({0}, {1}) and ({2}, {3}) cross")]
    Crossing(usize, usize, usize, usize),
    #[error("{0}")]
    Invalid(String),
}

/// The drawable model could not be built or the layout engine rejected it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("unmatched ) at position {0}")]
    UnmatchedClosing(usize),
    #[error("unmatched ( at position {0}")]
    UnmatchedOpening(usize),
    #[error("bad dot-bracket character {symbol:?} at position {position}")]
    BadMark { symbol: char, position: usize },
    #[error("invalid residue symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
    #[error("sequence has {sequence} residues but the structure has {structure}")]
    LengthMismatch { sequence: usize, structure: usize },
    #[error("residue {0} names {1} as partner but the pairing is not symmetric")]
    InvalidPair(usize, usize),
    #[error("pair ({0}, {1}) crosses another pair and cannot be drawn in the plane")]
    Crossing(usize, usize),
    #[error("layout produced {got} positions for {expected} residues")]
    PositionCount { expected: usize, got: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid structure: {0}")]
    Structure(#[from] StructureError),
    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("writing to {} is forbidden", path.display())]
    WriteForbidden { path: PathBuf },
    #[error("resource {name} could not be loaded: {reason}")]
    Resource { name: String, reason: String },
    #[error("malformed vector document: {0}")]
    Document(String),
    #[error("options JSON error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
