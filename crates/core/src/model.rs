use crate::color::Rgb;
use crate::error::LayoutError;
use crate::structure::{parse_pairs, DotBracket};

/// Per-residue drawing style. `None` leaves the renderer default in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStyle {
    pub fill: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub symbol: char,
    pub partner: Option<usize>,
    pub style: NodeStyle,
}

/// Residues, their pairing and per-residue styles, ready for layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableModel {
    nodes: Vec<Node>,
    nicks: Vec<usize>,
}

impl DrawableModel {
    /// Build the model from a sequence and its pairing marks.
    ///
    /// Residue symbols must be ASCII letters (IUPAC codes, `N` for unknown);
    /// a `+` in the sequence marks a strand break and is skipped.
    pub fn from_dot_bracket(db: &DotBracket) -> Result<Self, LayoutError> {
        let table = parse_pairs(db.structure())?;

        let mut symbols = Vec::with_capacity(table.n_bases);
        for (position, symbol) in db.sequence().chars().enumerate() {
            match symbol {
                '+' => {}
                c if c.is_ascii_alphabetic() => symbols.push(c),
                _ => return Err(LayoutError::InvalidSymbol { symbol, position }),
            }
        }
        if symbols.len() != table.n_bases {
            return Err(LayoutError::LengthMismatch {
                sequence: symbols.len(),
                structure: table.n_bases,
            });
        }

        let nodes = symbols
            .into_iter()
            .zip(table.pairs)
            .map(|(symbol, partner)| Node {
                symbol,
                partner,
                style: NodeStyle::default(),
            })
            .collect();

        Ok(Self {
            nodes,
            nicks: table.nicks,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Partner table in residue order.
    pub fn pairs(&self) -> Vec<Option<usize>> {
        self.nodes.iter().map(|n| n.partner).collect()
    }

    /// Strand start positions, always beginning with 0.
    pub fn nicks(&self) -> &[usize] {
        &self.nicks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nodes_in_order() {
        let model = DrawableModel::from_dot_bracket(&DotBracket::new("GGAACC", "((..))")).unwrap();
        assert_eq!(model.len(), 6);
        let symbols: String = model.nodes().iter().map(|n| n.symbol).collect();
        assert_eq!(symbols, "GGAACC");
        assert_eq!(model.nodes()[0].partner, Some(5));
        assert_eq!(model.nodes()[2].partner, None);
        assert!(model.nodes().iter().all(|n| n.style.fill.is_none()));
    }

    #[test]
    fn strand_break_in_both_lines() {
        let model =
            DrawableModel::from_dot_bracket(&DotBracket::new("GA+AC", "(.+.)")).unwrap();
        assert_eq!(model.len(), 4);
        assert_eq!(model.nicks(), &[0, 2]);
    }

    #[test]
    fn rejects_malformed_input() {
        let err = DrawableModel::from_dot_bracket(&DotBracket::new("GGAC", "((.)")).unwrap_err();
        assert_eq!(err, LayoutError::UnmatchedOpening(0));

        let err = DrawableModel::from_dot_bracket(&DotBracket::new("G1AC", "(..)")).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidSymbol {
                symbol: '1',
                position: 1
            }
        );

        let err = DrawableModel::from_dot_bracket(&DotBracket::new("GAC", "(..)")).unwrap_err();
        assert_eq!(
            err,
            LayoutError::LengthMismatch {
                sequence: 3,
                structure: 4
            }
        );
    }
}
