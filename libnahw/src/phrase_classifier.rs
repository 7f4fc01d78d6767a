//! Phrase-type classifier (spec.md section 4.3): assigns one of six phrase
//! tags to a `(start, end)` span of segment nodes.

use crate::graph::{SyntaxGraph, SyntaxNode};
use crate::vocab::{PartOfSpeech, PhraseType, Relation, WordType};

fn span_len(graph: &SyntaxGraph, start: SyntaxNode, end: SyntaxNode) -> usize {
    graph.index_of(end) - graph.index_of(start)
}

/// Whether `node` is a phrase entirely nested within `[start, end]`.
fn is_subphrase_of(graph: &SyntaxGraph, node: SyntaxNode, start_idx: usize, end_idx: usize) -> bool {
    if let Some((s, e)) = graph.phrase_endpoints(node) {
        graph.index_of(s) >= start_idx && graph.index_of(e) <= end_idx
    } else {
        false
    }
}

/// Whether `node` satisfies the minimum-covering condition for `[start,
/// end]`: it is itself a nested sub-phrase, or its smallest covering phrase
/// in the graph is no tighter than `[start, end]`.
fn satisfies_minimum_covering(
    graph: &SyntaxGraph,
    node: SyntaxNode,
    start: SyntaxNode,
    end: SyntaxNode,
) -> bool {
    let start_idx = graph.index_of(start);
    let end_idx = graph.index_of(end);
    if is_subphrase_of(graph, node, start_idx, end_idx) {
        return true;
    }
    match graph.minimum_covering_phrase(node) {
        None => true,
        Some(cover) => {
            let (cs, ce) = graph.phrase_endpoints(cover).unwrap();
            span_len(graph, cs, ce) >= span_len(graph, start, end)
        }
    }
}

fn node_index_in_span(graph: &SyntaxGraph, node: SyntaxNode, start_idx: usize, end_idx: usize) -> bool {
    let idx = graph.index_of(node);
    idx >= start_idx && idx <= end_idx
}

pub fn classify_phrase(graph: &SyntaxGraph, start: SyntaxNode, end: SyntaxNode) -> PhraseType {
    if matches!(
        graph.part_of_speech(start),
        Some(PartOfSpeech::SubordinatingConjunction) | Some(PartOfSpeech::Purpose)
    ) {
        return PhraseType::SubordinateClause;
    }

    let start_idx = graph.index_of(start);
    let end_idx = graph.index_of(end);

    let mut genitive = false;
    let mut verbal_subject = false;
    let mut condition = false;
    let mut predicate = false;

    for edge in graph.all_edges() {
        if !node_index_in_span(graph, edge.dependent, start_idx, end_idx)
            || !node_index_in_span(graph, edge.head, start_idx, end_idx)
        {
            continue;
        }
        if !satisfies_minimum_covering(graph, edge.dependent, start, end)
            || !satisfies_minimum_covering(graph, edge.head, start, end)
        {
            continue;
        }

        match edge.relation {
            Relation::Genitive => genitive = true,
            Relation::Subject | Relation::PassiveSubject => {
                if graph.part_of_speech(edge.head) == Some(PartOfSpeech::Verb) {
                    verbal_subject = true;
                }
            }
            Relation::Condition => condition = true,
            Relation::Predicate | Relation::SpecialPredicate | Relation::SpecialSubject => {
                predicate = true;
            }
            _ => {}
        }
    }

    if genitive {
        return PhraseType::PrepositionPhrase;
    }
    if verbal_subject {
        return PhraseType::VerbalSentence;
    }
    if condition {
        return PhraseType::ConditionalSentence;
    }
    if predicate {
        return PhraseType::NominalSentence;
    }

    for node in graph.segment_nodes_in_order() {
        let idx = graph.index_of(node);
        if idx < start_idx || idx > end_idx {
            continue;
        }
        let Some(word) = graph.word(node) else { continue };
        if word.word_type != WordType::Elided {
            continue;
        }
        let pos = graph.part_of_speech(node);
        if pos != Some(PartOfSpeech::Verb) && pos != Some(PartOfSpeech::Noun) {
            continue;
        }
        if satisfies_minimum_covering(graph, node, start, end) {
            return if pos == Some(PartOfSpeech::Verb) {
                PhraseType::VerbalSentence
            } else {
                PhraseType::NominalSentence
            };
        }
    }

    PhraseType::Sentence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{AgreementFeatures, Segment, Token};
    use crate::vocab::{Location, SegmentType, WordType};
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
    fn genitive_edge_yields_preposition_phrase() {
        let mut g = SyntaxGraph::new();
        let p = g.add_word(WordType::Token, Some(token(PartOfSpeech::Preposition)), None, None)[0];
        let n = g.add_word(WordType::Token, Some(token(PartOfSpeech::Noun)), None, None)[0];
        g.add_edge(n, p, Relation::Genitive).unwrap();
        assert_eq!(classify_phrase(&g, p, n), PhraseType::PrepositionPhrase);
    }

    #[test]
    fn verbal_subject_yields_verbal_sentence() {
        let mut g = SyntaxGraph::new();
        let v = g.add_word(WordType::Token, Some(token(PartOfSpeech::Verb)), None, None)[0];
        let n = g.add_word(WordType::Token, Some(token(PartOfSpeech::Noun)), None, None)[0];
        g.add_edge(n, v, Relation::Subject).unwrap();
        assert_eq!(classify_phrase(&g, v, n), PhraseType::VerbalSentence);
    }

    #[test]
    fn no_matching_edge_yields_sentence() {
        let mut g = SyntaxGraph::new();
        let a = g.add_word(WordType::Token, Some(token(PartOfSpeech::Noun)), None, None)[0];
        let b = g.add_word(WordType::Token, Some(token(PartOfSpeech::Adjective)), None, None)[0];
        assert_eq!(classify_phrase(&g, a, b), PhraseType::Sentence);
    }
}
