//! Parser actions and their bijective integer codec (spec.md section 4.7).
//!
//! The codec exists so a classifier can be trained against a flat label
//! space: `0` is the stop action, `1` is SHIFT, the next `2*R` codes are
//! RIGHT/LEFT parameterized by relation (`R = RELATION_COUNT`), and the
//! remaining codes cover PHRASE, REDUCE(0/1), SUBGRAPH, SUBJECT, and the
//! three EMPTY categories.

use crate::vocab::{Relation, RELATION_COUNT};

const R: usize = RELATION_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyCategory {
    Noun,
    Adjective,
    Verb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserAction {
    Stop,
    Shift,
    Right(Relation),
    Left(Relation),
    Phrase,
    /// `Reduce(true)` is the variant that additionally asserts the
    /// dependent already has a head (spec.md section 4.4); `Reduce(false)`
    /// is the plain pop.
    Reduce(bool),
    Subgraph,
    Subject,
    Empty(EmptyCategory),
}

impl ParserAction {
    /// Total number of distinct codes, i.e. one past the highest valid code.
    pub const CODE_COUNT: i32 = 2 * R as i32 + 10;

    pub fn to_code(self) -> i32 {
        let r = R as i32;
        match self {
            ParserAction::Stop => 0,
            ParserAction::Shift => 1,
            ParserAction::Right(rel) => 2 + relation_index(rel) as i32,
            ParserAction::Left(rel) => r + 2 + relation_index(rel) as i32,
            ParserAction::Phrase => 2 * r + 2,
            ParserAction::Reduce(false) => 2 * r + 3,
            ParserAction::Reduce(true) => 2 * r + 4,
            ParserAction::Subgraph => 2 * r + 5,
            ParserAction::Subject => 2 * r + 6,
            ParserAction::Empty(EmptyCategory::Noun) => 2 * r + 7,
            ParserAction::Empty(EmptyCategory::Adjective) => 2 * r + 8,
            ParserAction::Empty(EmptyCategory::Verb) => 2 * r + 9,
        }
    }

    pub fn from_code(code: i32) -> Option<ParserAction> {
        let r = R as i32;
        match code {
            0 => Some(ParserAction::Stop),
            1 => Some(ParserAction::Shift),
            c if (2..=r + 1).contains(&c) => relation_at((c - 2) as usize).map(ParserAction::Right),
            c if (r + 2..=2 * r + 1).contains(&c) => {
                relation_at((c - r - 2) as usize).map(ParserAction::Left)
            }
            c if c == 2 * r + 2 => Some(ParserAction::Phrase),
            c if c == 2 * r + 3 => Some(ParserAction::Reduce(false)),
            c if c == 2 * r + 4 => Some(ParserAction::Reduce(true)),
            c if c == 2 * r + 5 => Some(ParserAction::Subgraph),
            c if c == 2 * r + 6 => Some(ParserAction::Subject),
            c if c == 2 * r + 7 => Some(ParserAction::Empty(EmptyCategory::Noun)),
            c if c == 2 * r + 8 => Some(ParserAction::Empty(EmptyCategory::Adjective)),
            c if c == 2 * r + 9 => Some(ParserAction::Empty(EmptyCategory::Verb)),
            _ => None,
        }
    }
}

fn relation_index(rel: Relation) -> usize {
    Relation::ALL
        .iter()
        .position(|r| *r == rel)
        .expect("every Relation variant appears in Relation::ALL")
}

fn relation_at(idx: usize) -> Option<Relation> {
    Relation::ALL.get(idx).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_in_range_round_trips() {
        for code in 0..ParserAction::CODE_COUNT {
            let action = ParserAction::from_code(code).unwrap_or_else(|| panic!("no action for code {code}"));
            assert_eq!(action.to_code(), code);
        }
    }

    #[test]
    fn codes_outside_range_are_rejected() {
        assert!(ParserAction::from_code(-1).is_none());
        assert!(ParserAction::from_code(ParserAction::CODE_COUNT).is_none());
    }

    #[test]
    fn right_and_left_cover_every_relation_distinctly() {
        let mut codes = std::collections::HashSet::new();
        for rel in Relation::ALL {
            assert!(codes.insert(ParserAction::Right(*rel).to_code()));
            assert!(codes.insert(ParserAction::Left(*rel).to_code()));
        }
        assert_eq!(codes.len(), 2 * RELATION_COUNT);
    }
}
