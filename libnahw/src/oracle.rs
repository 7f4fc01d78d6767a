//! The oracle (spec.md section 4.5): given a gold graph and a token-only
//! working graph, derive the canonical action sequence that reconstructs
//! an equivalent graph.

use std::collections::HashMap;

use log::trace;

use crate::action::{EmptyCategory, ParserAction};
use crate::errors::Result;
use crate::graph::{SyntaxGraph, SyntaxNode};
use crate::transitions::{self, ParserState};
use crate::vocab::{PartOfSpeech, Relation, WordType};

fn is_subject_relation(rel: Relation) -> bool {
    matches!(rel, Relation::Subject | Relation::PassiveSubject | Relation::SpecialSubject)
}

/// Maps nodes of a working graph to their counterpart in a gold graph.
/// Token segment nodes are paired eagerly at construction; phrases and
/// later-inserted elided nodes resolve lazily via `SyntaxGraph::equivalent`,
/// with ties (more than one equivalent gold candidate) broken by whichever
/// is closest in index to the querying working node.
pub struct Oracle<'g> {
    gold: &'g SyntaxGraph,
    map: HashMap<SyntaxNode, SyntaxNode>,
}

impl<'g> Oracle<'g> {
    pub fn new(gold: &'g SyntaxGraph, working: &SyntaxGraph) -> Self {
        let gold_segments: Vec<SyntaxNode> = gold
            .segment_nodes_in_order()
            .into_iter()
            .filter(|n| gold.word(*n).map(|w| w.word_type) != Some(WordType::Elided))
            .collect();
        let working_segments = working.segment_nodes_in_order();

        let mut map = HashMap::new();
        for (w, g) in working_segments.into_iter().zip(gold_segments) {
            map.insert(w, g);
        }
        Oracle { gold, map }
    }

    fn resolve(&mut self, working: &SyntaxGraph, node: SyntaxNode) -> Option<SyntaxNode> {
        if let Some(g) = self.map.get(&node) {
            return Some(*g);
        }
        let w_idx = working.index_of(node);
        let candidates: Vec<SyntaxNode> = if node.is_phrase() {
            self.gold.all_phrases().filter(|g| SyntaxGraph::equivalent(working, node, self.gold, *g)).collect()
        } else {
            self.gold
                .segment_nodes_in_order()
                .into_iter()
                .filter(|g| SyntaxGraph::equivalent(working, node, self.gold, *g))
                .collect()
        };
        let best = candidates
            .into_iter()
            .min_by_key(|g| (self.gold.index_of(*g) as i64 - w_idx as i64).abs());
        if let Some(g) = best {
            self.map.insert(node, g);
        }
        best
    }

    fn has_working_counterpart(&self, gold_node: SyntaxNode) -> bool {
        self.map.values().any(|g| *g == gold_node)
    }

    /// Total edges (incoming as dependent, outgoing as head) incident to
    /// `node` in `graph`. The oracle counts both without distinction
    /// (spec.md section 9, "has_all_edges symmetry").
    fn edge_count(graph: &SyntaxGraph, node: SyntaxNode) -> usize {
        let as_dependent = if graph.head(node).is_some() { 1 } else { 0 };
        as_dependent + graph.edges_with_head(node).count()
    }

    fn has_all_edges(&self, working: &SyntaxGraph, working_node: SyntaxNode, gold_node: SyntaxNode) -> bool {
        Self::edge_count(self.gold, gold_node) == Self::edge_count(working, working_node)
    }

    fn gold_subject_node(&self, gold_verb: SyntaxNode) -> Option<SyntaxNode> {
        self.gold
            .edges_with_head(gold_verb)
            .find(|e| {
                is_subject_relation(e.relation)
                    && self.gold.word(e.dependent).map(|w| w.word_type) == Some(WordType::Elided)
            })
            .map(|e| e.dependent)
    }

    fn empty_category_between(&mut self, working: &SyntaxGraph, s0: SyntaxNode, s1: SyntaxNode) -> Option<(SyntaxNode, PartOfSpeech)> {
        let g0 = self.resolve(working, s0)?;
        let g1 = self.resolve(working, s1)?;
        self.gold
            .segment_nodes_in_order()
            .into_iter()
            .filter(|n| self.gold.word(*n).map(|w| w.word_type) == Some(WordType::Elided))
            .filter_map(|e| {
                let pos = self.gold.part_of_speech(e)?;
                if !matches!(pos, PartOfSpeech::Noun | PartOfSpeech::Adjective | PartOfSpeech::Verb) {
                    return None;
                }
                let connects = (self.gold.edge(g0, e).is_some() && self.gold.edge(e, g1).is_some())
                    || (self.gold.edge(g1, e).is_some() && self.gold.edge(e, g0).is_some());
                if connects && !self.has_working_counterpart(e) {
                    Some((e, pos))
                } else {
                    None
                }
            })
            .next()
    }

    /// Computes the next action for `state` against `working`, per the
    /// eleven priority-ordered rules. Returns `ParserAction::Stop` when no
    /// rule fires (rule 11).
    pub fn next_action(&mut self, working: &SyntaxGraph, state: &ParserState) -> ParserAction {
        let s0 = state.at(0);
        let s1 = state.at(1);
        let s2 = state.at(2);

        // Rule 1
        if let (Some(s0), Some(s1)) = (s0, s1) {
            if let (Some(g0), Some(g1)) = (self.resolve(working, s0), self.resolve(working, s1)) {
                if let Some(gold_edge) = self.gold.edge(g0, g1) {
                    if working.edge(s0, s1).is_none() {
                        if gold_edge.dependent == g0 && working.head(s0).is_none() {
                            return ParserAction::Right(gold_edge.relation);
                        }
                        if gold_edge.dependent == g1 && working.head(s1).is_none() {
                            return ParserAction::Left(gold_edge.relation);
                        }
                    }
                }
            }
        }

        // Rule 2. spec.md section 4.5 rule 2 names stack[1] (not stack[0])
        // as the covering phrase, the reverse of original_source's
        // oracle.py:_next, which tests `_covers(s0, s1)` with s0 as the
        // phrase. Followed here as specified.
        if let (Some(s0), Some(s1)) = (s0, s1) {
            if s1.is_phrase() {
                if let Some((start, end)) = working.phrase_endpoints(s1) {
                    let idx0 = working.index_of(s0);
                    if working.index_of(start) <= idx0 && idx0 <= working.index_of(end) {
                        if let Some(g1) = self.resolve(working, s1) {
                            if self.has_all_edges(working, s1, g1) {
                                return ParserAction::Reduce(true);
                            }
                        }
                    }
                }
            }
        }

        // Rule 3
        if let (Some(s0), Some(s1)) = (s0, s1) {
            if !s0.is_phrase() && !s1.is_phrase() && working.index_of(s0) == working.index_of(s1) + 1 {
                if let (Some(g0), Some(g1)) = (self.resolve(working, s0), self.resolve(working, s1)) {
                    if self.gold.phrase(g1, g0).is_some() && working.phrase(s1, s0).is_none() {
                        let gold_dependents = self.gold.edges_with_head(g0).count();
                        let some_attached = working.edges_with_head(s0).count() > 0;
                        if gold_dependents == 0 || some_attached {
                            return ParserAction::Phrase;
                        }
                    }
                }
            }
        }

        // Rule 4
        if let Some(s0) = s0 {
            if !s0.is_phrase() {
                if let Some(end) = crate::subgraph::subgraph_end(working, s0) {
                    if working.phrase(s0, end).is_none() {
                        if let (Some(g0), Some(g_end)) = (self.resolve(working, s0), self.resolve(working, end)) {
                            if self.gold.phrase(g0, g_end).is_some() {
                                if let Some(subject) = self.gold_subject_node(g0) {
                                    if !self.has_working_counterpart(subject) {
                                        return ParserAction::Subject;
                                    }
                                }
                                return ParserAction::Subgraph;
                            }
                        }
                    }
                }
            }
        }

        // Rule 5
        if state.peek_queue().is_none() {
            if let Some(s0) = s0 {
                if let Some(g0) = self.resolve(working, s0) {
                    if let Some(subject) = self.gold_subject_node(g0) {
                        if !self.has_working_counterpart(subject) {
                            return ParserAction::Subject;
                        }
                    }
                }
            }
        }

        // Rule 6
        if let Some(s0) = s0 {
            if let Some(g0) = self.resolve(working, s0) {
                if self.has_all_edges(working, s0, g0) {
                    return ParserAction::Reduce(false);
                }
            }
        }

        // Rule 7
        if state.peek_queue().is_some() {
            return ParserAction::Shift;
        }

        // Rule 8
        if let (Some(s0), Some(s2)) = (s0, s2) {
            if let (Some(g0), Some(g2)) = (self.resolve(working, s0), self.resolve(working, s2)) {
                if self.gold.edge(g0, g2).is_some() {
                    return ParserAction::Reduce(true);
                }
            }
        }

        // Rule 9
        if let (Some(s0), Some(s1)) = (s0, s1) {
            if let Some((_, pos)) = self.empty_category_between(working, s0, s1) {
                let category = match pos {
                    PartOfSpeech::Noun => EmptyCategory::Noun,
                    PartOfSpeech::Adjective => EmptyCategory::Adjective,
                    PartOfSpeech::Verb => EmptyCategory::Verb,
                    _ => unreachable!("empty_category_between only yields NOUN/ADJECTIVE/VERB"),
                };
                return ParserAction::Empty(category);
            }
        }

        // Rule 10
        if state.stack_len() > 0 {
            return ParserAction::Reduce(false);
        }

        // Rule 11
        ParserAction::Stop
    }
}

/// Runs the oracle to completion against `gold`, returning the action
/// sequence that reconstructs an equivalent graph from `gold.only_tokens()`.
/// The oracle is guaranteed to terminate via rule 11 for any well-formed
/// gold graph (spec.md section 7); no divergence guard is applied here.
pub fn derive_actions(gold: &SyntaxGraph) -> Result<Vec<ParserAction>> {
    let working = gold.only_tokens();
    let mut oracle = Oracle::new(gold, &working);
    let mut state = ParserState::new(working);
    let mut actions = Vec::new();

    loop {
        let action = oracle.next_action(&state.graph, &state);
        trace!("oracle emitted {:?} at stack depth {}", action, state.stack_len());
        actions.push(action);
        if action == ParserAction::Stop {
            break;
        }
        transitions::execute(&mut state, action)?;
    }

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{AgreementFeatures, Segment, Token};
    use crate::vocab::{Location, SegmentType, WordType};
    use std::rc::Rc;

    fn noun_token(loc: u32) -> Rc<Token> {
        Rc::new(Token {
            location: Location::new(1, 1, loc),
            arabic: None,
            segments: vec![Segment {
                segment_type: SegmentType::Stem,
                part_of_speech: PartOfSpeech::Noun,
                segment_number: 1,
                lemma: None,
                features: AgreementFeatures::default(),
            }],
        })
    }

    #[test]
    fn single_token_graph_shifts_and_reduces() {
        let mut gold = SyntaxGraph::new();
        gold.add_word(WordType::Token, Some(noun_token(1)), None, None);
        let actions = derive_actions(&gold).unwrap();
        assert_eq!(
            actions,
            vec![ParserAction::Shift, ParserAction::Reduce(false), ParserAction::Stop]
        );
    }

    #[test]
    fn two_tokens_with_gold_edge_emit_left() {
        let mut gold = SyntaxGraph::new();
        let a = gold.add_word(WordType::Token, Some(noun_token(1)), None, None)[0];
        let b = gold.add_word(WordType::Token, Some(noun_token(2)), None, None)[0];
        gold.add_edge(a, b, Relation::Subject).unwrap();

        let actions = derive_actions(&gold).unwrap();
        assert_eq!(
            actions,
            vec![
                ParserAction::Shift,
                ParserAction::Shift,
                ParserAction::Left(Relation::Subject),
                ParserAction::Reduce(false),
                ParserAction::Reduce(false),
                ParserAction::Stop,
            ]
        );
    }

    #[test]
    fn oracle_is_deterministic() {
        let mut gold = SyntaxGraph::new();
        let a = gold.add_word(WordType::Token, Some(noun_token(1)), None, None)[0];
        let b = gold.add_word(WordType::Token, Some(noun_token(2)), None, None)[0];
        gold.add_edge(a, b, Relation::Adjective).unwrap();

        let first = derive_actions(&gold).unwrap();
        let second = derive_actions(&gold).unwrap();
        assert_eq!(first, second);
    }
}
