//! Attachment scoring: compares a parsed graph against its gold counterpart
//! by resolving each token-backed dependent through `SyntaxGraph::equivalent`
//! and checking whether the gold graph attaches it to the same head (UAS)
//! under the same relation (LAS). Phrase and elided heads are scored as a
//! mismatch unless the head is itself token-backed and resolves, which is a
//! deliberate simplification (see DESIGN.md).

use libnahw::graph::{SyntaxGraph, SyntaxNode};
use libnahw::vocab::WordType;

#[derive(Debug, Clone, Copy, Default)]
pub struct Scorecard {
    pub scored: u32,
    pub unlabeled_correct: u32,
    pub labeled_correct: u32,
}

impl Scorecard {
    pub fn merge(&mut self, other: Scorecard) {
        self.scored += other.scored;
        self.unlabeled_correct += other.unlabeled_correct;
        self.labeled_correct += other.labeled_correct;
    }

    pub fn uas(&self) -> f64 {
        if self.scored == 0 { 0.0 } else { self.unlabeled_correct as f64 / self.scored as f64 }
    }

    pub fn las(&self) -> f64 {
        if self.scored == 0 { 0.0 } else { self.labeled_correct as f64 / self.scored as f64 }
    }
}

fn is_token_segment(graph: &SyntaxGraph, node: SyntaxNode) -> bool {
    matches!(graph.word(node).map(|w| w.word_type), Some(WordType::Token))
}

fn resolve_in_gold(predicted: &SyntaxGraph, node: SyntaxNode, gold: &SyntaxGraph) -> Option<SyntaxNode> {
    let candidates: Vec<SyntaxNode> = if node.is_phrase() {
        gold.all_phrases().collect()
    } else {
        gold.segment_nodes_in_order()
    };
    candidates.into_iter().find(|&g| SyntaxGraph::equivalent(predicted, node, gold, g))
}

pub fn score(predicted: &SyntaxGraph, gold: &SyntaxGraph) -> Scorecard {
    let mut card = Scorecard::default();

    for dependent in predicted.segment_nodes_in_order() {
        if !is_token_segment(predicted, dependent) {
            continue;
        }
        let Some(gold_dependent) = resolve_in_gold(predicted, dependent, gold) else { continue };
        card.scored += 1;

        let Some(predicted_head) = predicted.head(dependent) else { continue };
        let Some(gold_head) = gold.head(gold_dependent) else { continue };
        let Some(predicted_head_in_gold) = resolve_in_gold(predicted, predicted_head, gold) else { continue };
        if !SyntaxGraph::same(predicted_head_in_gold, gold_head) {
            continue;
        }
        card.unlabeled_correct += 1;

        let predicted_relation = predicted.edge(dependent, predicted_head).map(|e| e.relation);
        let gold_relation = gold.edge(gold_dependent, gold_head).map(|e| e.relation);
        if predicted_relation == gold_relation {
            card.labeled_correct += 1;
        }
    }

    card
}
