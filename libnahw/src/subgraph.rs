//! Subgraph-end search (spec.md section 4.2): from a presumed left edge of
//! a projective subtree, find the rightmost segment node reachable back to
//! it by repeatedly following "effective heads."

use crate::graph::{SyntaxGraph, SyntaxNode};
use crate::vocab::PartOfSpeech;

/// `cur` is always a segment node, never a phrase: every rule below resolves
/// a phrase result to its `start` segment before returning it. This matters
/// because a phrase's own `index` is frozen at creation and goes stale after
/// a later `insert_elided_word` reindexes segments (spec.md section 9); only
/// a segment's `index` stays meaningful as the search walks back.
fn effective_head(graph: &SyntaxGraph, cur: SyntaxNode) -> Option<SyntaxNode> {
    let cur_idx = graph.index_of(cur);

    // Rule 1: graph head, resolved through a phrase to its start, must be
    // strictly left of `cur`.
    if let Some(head) = graph.head(cur) {
        let head_start = if head.is_phrase() { graph.phrase_endpoints(head).unwrap().0 } else { head };
        if graph.index_of(head_start) < cur_idx {
            return Some(head_start);
        }
    }

    // Rule 2: if `cur` is the start of some phrase, consider that phrase's
    // own head.
    if let Some(phrase) = graph.all_phrases().find(|p| graph.phrase_endpoints(*p).unwrap().0 == cur) {
        if let Some(phrase_head) = graph.head(phrase) {
            if !phrase_head.is_phrase() && graph.index_of(phrase_head) < cur_idx {
                return Some(phrase_head);
            }
        }
    }

    // Rule 3: `cur` is the head of a dependent to its left. Later-iterated
    // matching edges win over earlier ones (original_source/subgraph.py
    // does not break out of its edge scan).
    let mut rule3 = None;
    for edge in graph.edges_with_head(cur) {
        let dep_start = if edge.dependent.is_phrase() {
            graph.phrase_endpoints(edge.dependent).unwrap().0
        } else {
            edge.dependent
        };
        if graph.index_of(dep_start) < cur_idx {
            rule3 = Some(dep_start);
        }
    }
    if let Some(head) = rule3 {
        return Some(head);
    }

    // Rule 4: a vocative/preventive particle immediately to the left.
    if let Some(prev) = graph.previous_segment_node(cur) {
        if matches!(
            graph.part_of_speech(prev),
            Some(PartOfSpeech::Vocative) | Some(PartOfSpeech::Preventive)
        ) {
            return Some(prev);
        }
    }

    // Rule 5: an exceptive particle always reaches back to the previous node.
    if graph.part_of_speech(cur) == Some(PartOfSpeech::Exceptive) {
        if let Some(prev) = graph.previous_segment_node(cur) {
            return Some(prev);
        }
    }

    None
}

/// Finds the rightmost segment node reachable from `start` by repeatedly
/// following effective heads back to `start`. `None` if `start` is a phrase
/// or no such node exists.
pub fn subgraph_end(graph: &SyntaxGraph, start: SyntaxNode) -> Option<SyntaxNode> {
    if start.is_phrase() {
        return None;
    }
    let start_idx = graph.index_of(start);
    let last_idx = graph.segment_node_count().checked_sub(1)?;

    let mut end_idx = last_idx;
    while end_idx > start_idx {
        let end = graph.segment_node_at(end_idx).unwrap();
        let mut cur = end;
        let mut steps = 0usize;
        let found = loop {
            if cur == start {
                break true;
            }
            steps += 1;
            if steps > graph.segment_node_count() {
                break false;
            }
            match effective_head(graph, cur) {
                Some(next) => cur = next,
                None => break false,
            }
        };
        if found {
            return Some(end);
        }
        end_idx -= 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{AgreementFeatures, Segment, Token};
    use crate::vocab::{Location, Relation, SegmentType};
    use std::rc::Rc;

    fn token(kind: PartOfSpeech) -> Rc<Token> {
        Rc::new(Token {
            location: Location::new(1, 1, 1),
            arabic: None,
            segments: vec![Segment {
                segment_type: SegmentType::Stem,
                part_of_speech: kind,
                segment_number: 1,
                lemma: None,
                features: AgreementFeatures::default(),
            }],
        })
    }

    #[test]
    fn finds_end_through_right_leaning_heads() {
        use crate::vocab::WordType;
        let mut g = SyntaxGraph::new();
        let a = g.add_word(WordType::Token, Some(token(PartOfSpeech::Verb)), None, None)[0];
        let b = g.add_word(WordType::Token, Some(token(PartOfSpeech::Noun)), None, None)[0];
        let c = g.add_word(WordType::Token, Some(token(PartOfSpeech::Noun)), None, None)[0];
        // b and c both point back (rightward head) to a.
        g.add_edge(b, a, Relation::Subject).unwrap();
        g.add_edge(c, b, Relation::Object).unwrap();

        assert_eq!(subgraph_end(&g, a), Some(c));
    }

    #[test]
    fn rejects_phrase_start() {
        use crate::vocab::{PhraseType, WordType};
        let mut g = SyntaxGraph::new();
        let a = g.add_word(WordType::Token, Some(token(PartOfSpeech::Noun)), None, None)[0];
        let b = g.add_word(WordType::Token, Some(token(PartOfSpeech::Noun)), None, None)[0];
        let p = g.add_phrase(PhraseType::Sentence, a, b);
        assert_eq!(subgraph_end(&g, p), None);
    }
}
