use std::fmt;

use crate::error::{LayoutError, StructureError};

/// A residue sequence with its pairing-mark (dot-bracket) notation.
///
/// The notation uses `(` and `)` for paired residues, `.` for unpaired ones
/// and `+` for a strand break. Nothing is validated on construction; that
/// happens when the drawable model is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotBracket {
    sequence: String,
    structure: String,
}

impl DotBracket {
    pub fn new(sequence: impl Into<String>, structure: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            structure: structure.into(),
        }
    }

    /// Encode a partner list (`partners[i] = Some(j)` when `i` pairs with `j`).
    ///
    /// The pairing must be symmetric, free of self pairs and planar.
    /// Pseudoknot removal is the caller's business.
    pub fn from_pairs(
        sequence: impl Into<String>,
        partners: &[Option<usize>],
    ) -> Result<Self, StructureError> {
        let sequence = sequence.into();
        let n = partners.len();
        let residues = sequence.chars().filter(|&c| c != '+').count();
        if residues != n {
            return Err(StructureError::LengthMismatch {
                sequence: residues,
                structure: n,
            });
        }

        for (i, &p) in partners.iter().enumerate() {
            let Some(j) = p else { continue };
            if j == i {
                return Err(StructureError::SelfPair { index: i });
            }
            if j >= n {
                return Err(StructureError::PartnerOutOfRange {
                    index: i,
                    partner: j,
                });
            }
            if partners[j] != Some(i) {
                return Err(StructureError::Asymmetric {
                    index: i,
                    partner: j,
                    back: partners[j],
                });
            }
        }

        // open pairs as (opening, closing); the innermost must close first
        let mut open: Vec<(usize, usize)> = Vec::new();
        let mut marks = String::with_capacity(n);
        for (i, &p) in partners.iter().enumerate() {
            match p {
                None => marks.push('.'),
                Some(j) if j > i => {
                    if let Some(&(oi, oj)) = open.last() {
                        if j > oj {
                            return Err(StructureError::Crossing(oi, oj, i, j));
                        }
                    }
                    open.push((i, j));
                    marks.push('(');
                }
                Some(j) => match open.pop() {
                    Some((oi, oj)) if oi == j && oj == i => marks.push(')'),
                    Some((oi, oj)) => return Err(StructureError::Crossing(oi, oj, j, i)),
                    None => {
                        return Err(StructureError::Invalid(format!(
                            "residue {i} closes a pair that was never opened"
                        )))
                    }
                },
            }
        }

        // re-insert strand breaks at the positions the sequence carries them
        let structure = if sequence.contains('+') {
            let mut marks = marks.chars();
            sequence
                .chars()
                .map(|c| if c == '+' { Some('+') } else { marks.next() })
                .collect::<Option<String>>()
                .unwrap_or_default()
        } else {
            marks
        };

        Ok(Self {
            sequence,
            structure,
        })
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn structure(&self) -> &str {
        &self.structure
    }
}

impl fmt::Display for DotBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.sequence, self.structure)
    }
}

/// Pair table from parsing dot-bracket-plus notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTable {
    /// pairs[i] = Some(j) means base i is paired with base j
    pub pairs: Vec<Option<usize>>,
    /// Strand break positions. Always starts with 0.
    pub nicks: Vec<usize>,
    pub n_bases: usize,
}

/// Parse dot-bracket-plus notation into a pair table.
///
/// Characters: `(` = open pair, `)` = close pair, `.` = unpaired, `+` = strand break
pub fn parse_pairs(input: &str) -> Result<PairTable, LayoutError> {
    let mut pairs: Vec<Option<usize>> = Vec::new();
    let mut nicks: Vec<usize> = vec![0];
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut base_idx: usize = 0;

    for (position, ch) in input.chars().enumerate() {
        match ch {
            '(' => {
                pairs.push(None);
                stack.push((base_idx, position));
                base_idx += 1;
            }
            ')' => {
                let (j, _) = stack
                    .pop()
                    .ok_or(LayoutError::UnmatchedClosing(position))?;
                pairs.push(Some(j));
                pairs[j] = Some(base_idx);
                base_idx += 1;
            }
            '.' => {
                pairs.push(None);
                base_idx += 1;
            }
            '+' => nicks.push(base_idx),
            symbol => return Err(LayoutError::BadMark { symbol, position }),
        }
    }

    if let Some(&(_, position)) = stack.last() {
        return Err(LayoutError::UnmatchedOpening(position));
    }

    Ok(PairTable {
        pairs,
        nicks,
        n_bases: base_idx,
    })
}
