//! Feature extraction and ensemble dispatch (spec.md section 4.6): maps
//! parser state to a sparse binary feature vector and to the bucket index
//! of the sub-classifier responsible for the next prediction.

use crate::graph::{SyntaxGraph, SyntaxNode};
use crate::lemma::LemmaInterner;
use crate::subgraph::subgraph_end;
use crate::transitions::ParserState;
use crate::vocab::{
    CaseType, MoodType, PartOfSpeech, PhraseType, PronounType, Relation, SegmentType, SpecialType,
    StateType, VoiceType, PHRASE_TYPE_COUNT, POS_COUNT, RELATION_COUNT,
};

/// Number of sub-model buckets: one per POS value, one per phrase type, plus
/// one for the empty-stack case.
pub const BUCKET_COUNT: usize = POS_COUNT + PHRASE_TYPE_COUNT + 1;

/// Bucket selecting which sub-model predicts the next action, derived from
/// `stack[0]` alone.
pub fn ensemble_index(graph: &SyntaxGraph, stack_top: Option<SyntaxNode>) -> usize {
    match stack_top {
        None => 0,
        Some(n) if !n.is_phrase() => graph.part_of_speech(n).map(|p| p.value() as usize).unwrap_or(0),
        Some(n) => POS_COUNT + graph.phrase_type(n).unwrap().value() as usize,
    }
}

/// A sparse binary feature vector: ascending set-bit positions plus the
/// total declared dimensionality.
#[derive(Debug, Clone, Default)]
pub struct FeatureVector {
    pub bits: Vec<u32>,
    pub dim: u32,
}

struct Builder {
    bits: Vec<u32>,
    offset: u32,
}

impl Builder {
    fn one_hot<T: Copy + PartialEq>(&mut self, all: &[T], value: Option<T>) {
        let n = all.len() as u32;
        if let Some(v) = value {
            if let Some(pos) = all.iter().position(|x| *x == v) {
                self.bits.push(self.offset + pos as u32);
            }
        }
        self.offset += n;
    }

    fn lemma_one_hot(&mut self, domain: u32, value: Option<u32>) {
        if let Some(v) = value {
            if v < domain {
                self.bits.push(self.offset + v);
            }
        }
        self.offset += domain;
    }

    fn relation_bits(&mut self, graph: &SyntaxGraph, node: Option<SyntaxNode>) {
        for (i, rel) in Relation::ALL.iter().enumerate() {
            let set = node.map(|n| graph.edges_with_head(n).any(|e| e.relation == *rel)).unwrap_or(false);
            if set {
                self.bits.push(self.offset + i as u32);
            }
        }
        self.offset += RELATION_COUNT as u32;
    }

    fn bit(&mut self, set: bool) {
        if set {
            self.bits.push(self.offset);
        }
        self.offset += 1;
    }
}

fn is_valid_subgraph_start(graph: &SyntaxGraph, node: SyntaxNode) -> bool {
    if node.is_phrase() {
        return false;
    }
    match subgraph_end(graph, node) {
        Some(end) => graph.head(node).is_none() && graph.head(end).is_some() && graph.phrase(node, end).is_none(),
        None => false,
    }
}

fn emit_slot(
    b: &mut Builder,
    graph: &SyntaxGraph,
    interner: &LemmaInterner,
    lemma_domain: u32,
    node: Option<SyntaxNode>,
    stack_edge: bool,
) {
    let pos = node.and_then(|n| graph.part_of_speech(n));
    b.one_hot(PartOfSpeech::ALL, pos);

    let ptype = node.filter(|n| n.is_phrase()).and_then(|n| graph.phrase_type(*n));
    b.one_hot(PhraseType::ALL, ptype);

    let seg = node.filter(|n| !n.is_phrase()).and_then(|n| graph.segment(*n));
    b.one_hot(VoiceType::ALL, seg.and_then(|s| s.features.voice));
    b.one_hot(MoodType::ALL, seg.and_then(|s| s.features.mood));
    b.one_hot(CaseType::ALL, seg.and_then(|s| s.features.case));
    b.one_hot(StateType::ALL, seg.and_then(|s| s.features.state));
    b.one_hot(PronounType::ALL, seg.and_then(|s| s.features.pronoun_type));
    b.one_hot(SegmentType::ALL, seg.map(|s| s.segment_type));
    b.one_hot(SpecialType::ALL, seg.and_then(|s| s.features.special_type));

    let lemma_id = seg.and_then(|s| s.lemma.as_deref()).and_then(|l| interner.value_of(l).ok());
    b.lemma_one_hot(lemma_domain, lemma_id);

    b.relation_bits(graph, node);

    let subgraph_start = node.map(|n| is_valid_subgraph_start(graph, n)).unwrap_or(false);
    b.bit(subgraph_start);

    b.bit(stack_edge);
}

/// Extracts the feature vector for the current parser state.
pub fn extract(interner: &LemmaInterner, state: &ParserState) -> FeatureVector {
    let graph = &state.graph;
    let lemma_domain = interner.len() as u32;
    let mut b = Builder { bits: Vec::new(), offset: 0 };

    let stack_edge = match (state.at(0), state.at(1)) {
        (Some(a), Some(b2)) => graph.edge(a, b2).is_some(),
        _ => false,
    };

    for slot in [state.at(0), state.at(1), state.at(2), state.peek_queue()] {
        emit_slot(&mut b, graph, interner, lemma_domain, slot, stack_edge);
    }

    FeatureVector { bits: b.bits, dim: b.offset }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::WordType;

    #[test]
    fn empty_state_has_zero_ensemble_index_and_no_set_bits() {
        let graph = SyntaxGraph::new();
        let state = ParserState::new(graph);
        assert_eq!(ensemble_index(&state.graph, state.at(0)), 0);

        let interner = LemmaInterner::new();
        let fv = extract(&interner, &state);
        assert!(fv.bits.is_empty());
        assert!(fv.dim > 0);
    }

    #[test]
    fn dimension_is_stable_across_extractions() {
        let mut graph = SyntaxGraph::new();
        graph.add_word(WordType::Elided, None, None, Some(PartOfSpeech::Noun));
        let interner = LemmaInterner::new();
        let state = ParserState::new(graph);
        let a = extract(&interner, &state);
        let b = extract(&interner, &state);
        assert_eq!(a.dim, b.dim);
    }
}
