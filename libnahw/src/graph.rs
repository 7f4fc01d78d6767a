//! The syntax graph: segment nodes, phrase nodes, edges, and the mutation
//! API described in spec.md section 4.1.
//!
//! Nodes are referred to by stable arena ids rather than physical vector
//! position, because `insert_elided_word` re-homes both a word and a
//! segment node without disturbing any other node's identity (see the
//! "shared node references" design note). The `.index` spec.md assigns to
//! every node is tracked separately as a `position` field that IS updated
//! on reordering for segment nodes, and frozen at creation for phrases.

use std::rc::Rc;

use crate::errors::{NahwError, Result};
use crate::morphology::{Segment, Token};
use crate::vocab::{PartOfSpeech, PhraseType, Relation, WordType};

/// A fully ingested token, shared by `Rc` so that a gold graph and its
/// `only_tokens()` working graph can compare token segments by identity.
pub type TokenData = Token;

#[derive(Debug, Clone)]
pub struct Word {
    pub word_type: WordType,
    pub token: Option<Rc<TokenData>>,
    pub elided_text: Option<String>,
    pub elided_pos: Option<PartOfSpeech>,
}

impl Word {
    pub fn token_word(word_type: WordType, token: Rc<TokenData>) -> Self {
        Word { word_type, token: Some(token), elided_text: None, elided_pos: None }
    }

    pub fn elided(elided_pos: PartOfSpeech, elided_text: Option<String>) -> Self {
        Word { word_type: WordType::Elided, token: None, elided_text, elided_pos: Some(elided_pos) }
    }
}

#[derive(Debug, Clone)]
struct WordSlot {
    id: usize,
    word: Word,
}

#[derive(Debug, Clone)]
struct SegmentNodeData {
    word_id: usize,
    segment_number: u32,
    position: usize,
}

#[derive(Debug, Clone)]
struct PhraseNodeData {
    phrase_type: PhraseType,
    start: SyntaxNode,
    end: SyntaxNode,
    position: usize,
}

/// A node in the syntax graph: either a segment node or a phrase node,
/// referred to by its stable creation-order id within its own arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxNode {
    Segment(usize),
    Phrase(usize),
}

impl SyntaxNode {
    pub fn is_phrase(&self) -> bool {
        matches!(self, SyntaxNode::Phrase(_))
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub dependent: SyntaxNode,
    pub head: SyntaxNode,
    pub relation: Relation,
}

#[derive(Debug, Clone, Default)]
pub struct SyntaxGraph {
    words: Vec<WordSlot>,
    segment_nodes: Vec<SegmentNodeData>,
    phrases: Vec<PhraseNodeData>,
    edges: Vec<Edge>,
    next_word_id: usize,
}

impl SyntaxGraph {
    pub fn new() -> Self {
        SyntaxGraph::default()
    }

    // -- word / segment node construction -----------------------------------

    /// Appends a word and its segment nodes. Returns the nodes created, in
    /// segment order (empty only if impossible, which cannot happen for a
    /// well-formed token).
    pub fn add_word(
        &mut self,
        word_type: WordType,
        token: Option<Rc<TokenData>>,
        elided_text: Option<String>,
        elided_pos: Option<PartOfSpeech>,
    ) -> Vec<SyntaxNode> {
        let word_id = self.next_word_id;
        self.next_word_id += 1;
        let word = Word { word_type, token: token.clone(), elided_text, elided_pos };
        self.words.push(WordSlot { id: word_id, word });

        let mut created = Vec::new();
        match word_type {
            WordType::Elided => {
                let seg_id = self.segment_nodes.len();
                let position = seg_id;
                self.segment_nodes.push(SegmentNodeData { word_id, segment_number: 1, position });
                created.push(SyntaxNode::Segment(seg_id));
            }
            WordType::Token | WordType::Reference => {
                let tok = token.expect("token/reference word must carry a token");
                for (i, seg) in tok.segments.iter().enumerate() {
                    if seg.part_of_speech == PartOfSpeech::Determiner {
                        continue;
                    }
                    let seg_id = self.segment_nodes.len();
                    let position = seg_id;
                    self.segment_nodes.push(SegmentNodeData {
                        word_id,
                        segment_number: (i + 1) as u32,
                        position,
                    });
                    created.push(SyntaxNode::Segment(seg_id));
                }
            }
        }
        created
    }

    /// Inserts a new elided word at `word_position` in the word list, and
    /// its single segment node immediately before the first segment node of
    /// the word that currently occupies `word_position`. All segment-node
    /// `index` fields are reassigned afterward. Phrase indices are left
    /// untouched (spec.md section 9).
    pub fn insert_elided_word(
        &mut self,
        word_position: usize,
        pos: PartOfSpeech,
        text: Option<String>,
    ) -> SyntaxNode {
        let original_word_count = self.words.len();
        let created = self.add_word(WordType::Elided, None, text, Some(pos));
        let new_node = created[0];
        let new_seg_id = match new_node {
            SyntaxNode::Segment(id) => id,
            SyntaxNode::Phrase(_) => unreachable!("add_word(Elided, ..) always yields a segment node"),
        };

        let slot = self.words.pop().expect("add_word always appends a word");
        let insert_at = word_position.min(self.words.len());
        self.words.insert(insert_at, slot);

        let anchor_word_id = if word_position < original_word_count {
            self.words.get(insert_at + 1).map(|w| w.id)
        } else {
            None
        };

        let mut ordered: Vec<usize> = (0..self.segment_nodes.len()).filter(|id| *id != new_seg_id).collect();
        ordered.sort_by_key(|id| self.segment_nodes[*id].position);

        let insert_idx = anchor_word_id
            .and_then(|anchor_id| ordered.iter().position(|id| self.segment_nodes[*id].word_id == anchor_id))
            .unwrap_or(ordered.len());

        ordered.insert(insert_idx, new_seg_id);

        for (new_pos, id) in ordered.iter().enumerate() {
            self.segment_nodes[*id].position = new_pos;
        }

        new_node
    }

    // -- phrase construction --------------------------------------------

    pub fn add_phrase(&mut self, phrase_type: PhraseType, start: SyntaxNode, end: SyntaxNode) -> SyntaxNode {
        let position = self.segment_nodes.len() + self.phrases.len();
        let id = self.phrases.len();
        self.phrases.push(PhraseNodeData { phrase_type, start, end, position });
        SyntaxNode::Phrase(id)
    }

    pub fn phrase(&self, start: SyntaxNode, end: SyntaxNode) -> Option<SyntaxNode> {
        self.phrases
            .iter()
            .enumerate()
            .find(|(_, p)| p.start == start && p.end == end)
            .map(|(id, _)| SyntaxNode::Phrase(id))
    }

    pub fn phrase_type(&self, node: SyntaxNode) -> Option<PhraseType> {
        match node {
            SyntaxNode::Phrase(id) => Some(self.phrases[id].phrase_type),
            SyntaxNode::Segment(_) => None,
        }
    }

    pub fn phrase_endpoints(&self, node: SyntaxNode) -> Option<(SyntaxNode, SyntaxNode)> {
        match node {
            SyntaxNode::Phrase(id) => Some((self.phrases[id].start, self.phrases[id].end)),
            SyntaxNode::Segment(_) => None,
        }
    }

    /// The existing phrase of smallest span whose range contains `node`'s
    /// index, or `None`.
    pub fn minimum_covering_phrase(&self, node: SyntaxNode) -> Option<SyntaxNode> {
        let idx = self.index_of(node);
        self.phrases
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                let s = self.index_of(p.start);
                let e = self.index_of(p.end);
                s <= idx && idx <= e
            })
            .min_by_key(|(_, p)| self.index_of(p.end) - self.index_of(p.start))
            .map(|(id, _)| SyntaxNode::Phrase(id))
    }

    pub fn all_phrases(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        (0..self.phrases.len()).map(SyntaxNode::Phrase)
    }

    // -- edges ------------------------------------------------------------

    pub fn head(&self, node: SyntaxNode) -> Option<SyntaxNode> {
        self.edges.iter().find(|e| e.dependent == node).map(|e| e.head)
    }

    pub fn edge(&self, a: SyntaxNode, b: SyntaxNode) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| (e.dependent == a && e.head == b) || (e.dependent == b && e.head == a))
    }

    pub fn edges_with_head(&self, node: SyntaxNode) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.head == node)
    }

    pub fn edges_with_dependent(&self, node: SyntaxNode) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.dependent == node)
    }

    pub fn all_edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_cyclic_dependency(&self, dependent: SyntaxNode, head: SyntaxNode) -> bool {
        let mut cur = Some(head);
        while let Some(node) = cur {
            if node == dependent {
                return true;
            }
            cur = self.head(node);
        }
        false
    }

    pub fn add_edge(&mut self, dependent: SyntaxNode, head: SyntaxNode, relation: Relation) -> Result<()> {
        if self.head(dependent).is_some() {
            return Err(NahwError::invariant("dependent already has a head"));
        }
        if self.is_cyclic_dependency(dependent, head) {
            return Err(NahwError::invariant("edge would close a cycle"));
        }
        self.edges.push(Edge { dependent, head, relation });
        Ok(())
    }

    // -- navigation ---------------------------------------------------------

    pub fn index_of(&self, node: SyntaxNode) -> usize {
        match node {
            SyntaxNode::Segment(id) => self.segment_nodes[id].position,
            SyntaxNode::Phrase(id) => self.phrases[id].position,
        }
    }

    pub fn segment_node_count(&self) -> usize {
        self.segment_nodes.len()
    }

    pub fn segment_node_at(&self, position: usize) -> Option<SyntaxNode> {
        self.segment_nodes
            .iter()
            .enumerate()
            .find(|(_, s)| s.position == position)
            .map(|(id, _)| SyntaxNode::Segment(id))
    }

    pub fn previous_segment_node(&self, node: SyntaxNode) -> Option<SyntaxNode> {
        let idx = self.index_of(node);
        if idx == 0 {
            None
        } else {
            self.segment_node_at(idx - 1)
        }
    }

    pub fn next_segment_node(&self, node: SyntaxNode) -> Option<SyntaxNode> {
        self.segment_node_at(self.index_of(node) + 1)
    }

    /// All segment nodes in ascending index order.
    pub fn segment_nodes_in_order(&self) -> Vec<SyntaxNode> {
        let mut nodes: Vec<SyntaxNode> = (0..self.segment_nodes.len()).map(SyntaxNode::Segment).collect();
        nodes.sort_by_key(|n| self.index_of(*n));
        nodes
    }

    /// Position in `words` of the word owning `node`, or -1 for phrases.
    pub fn word_index(&self, node: SyntaxNode) -> i64 {
        match node {
            SyntaxNode::Phrase(_) => -1,
            SyntaxNode::Segment(id) => {
                let word_id = self.segment_nodes[id].word_id;
                self.words
                    .iter()
                    .position(|w| w.id == word_id)
                    .map(|p| p as i64)
                    .unwrap_or(-1)
            }
        }
    }

    pub fn word(&self, node: SyntaxNode) -> Option<&Word> {
        match node {
            SyntaxNode::Phrase(_) => None,
            SyntaxNode::Segment(id) => {
                let word_id = self.segment_nodes[id].word_id;
                self.words.iter().find(|w| w.id == word_id).map(|w| &w.word)
            }
        }
    }

    pub fn segment_number(&self, node: SyntaxNode) -> Option<u32> {
        match node {
            SyntaxNode::Segment(id) => Some(self.segment_nodes[id].segment_number),
            SyntaxNode::Phrase(_) => None,
        }
    }

    /// The elided POS for an elided word, or the underlying segment's POS
    /// for a token/reference word. `None` for phrase nodes.
    pub fn part_of_speech(&self, node: SyntaxNode) -> Option<PartOfSpeech> {
        let word = self.word(node)?;
        match word.word_type {
            WordType::Elided => word.elided_pos,
            WordType::Token | WordType::Reference => {
                let seg_number = self.segment_number(node)? as usize;
                word.token.as_ref()?.segments.get(seg_number - 1).map(|s| s.part_of_speech)
            }
        }
    }

    pub fn segment(&self, node: SyntaxNode) -> Option<&Segment> {
        let word = self.word(node)?;
        let seg_number = self.segment_number(node)? as usize;
        word.token.as_ref()?.segments.get(seg_number - 1)
    }

    /// A new graph containing only non-ELIDED words, in their original
    /// relative order, with no edges or phrases.
    pub fn only_tokens(&self) -> SyntaxGraph {
        let mut out = SyntaxGraph::new();
        for slot in &self.words {
            if slot.word.word_type != WordType::Elided {
                out.add_word(slot.word.word_type, slot.word.token.clone(), None, None);
            }
        }
        out
    }

    pub fn words_len(&self) -> usize {
        self.words.len()
    }

    // -- cross-graph / within-graph equality --------------------------------

    /// Identity within a single graph (or across graphs that share node
    /// ids, which only `only_tokens()` graphs built from phrase-free
    /// token-only sources can assume).
    pub fn same(a: SyntaxNode, b: SyntaxNode) -> bool {
        a == b
    }

    /// Structural cross-graph equality, per spec.md section 3: phrases
    /// equal when endpoints compare equal; elided segment nodes equal when
    /// elided POS and text match; token segment nodes equal when they share
    /// the same underlying `Segment` by identity (same `Rc<Token>` and
    /// segment number).
    pub fn equivalent(ga: &SyntaxGraph, a: SyntaxNode, gb: &SyntaxGraph, b: SyntaxNode) -> bool {
        match (a, b) {
            (SyntaxNode::Phrase(_), SyntaxNode::Phrase(_)) => {
                let (sa, ea) = ga.phrase_endpoints(a).unwrap();
                let (sb, eb) = gb.phrase_endpoints(b).unwrap();
                SyntaxGraph::equivalent(ga, sa, gb, sb) && SyntaxGraph::equivalent(ga, ea, gb, eb)
            }
            (SyntaxNode::Segment(_), SyntaxNode::Segment(_)) => {
                let wa = ga.word(a).unwrap();
                let wb = gb.word(b).unwrap();
                match (wa.word_type, wb.word_type) {
                    (WordType::Elided, WordType::Elided) => {
                        wa.elided_pos == wb.elided_pos && wa.elided_text == wb.elided_text
                    }
                    (WordType::Elided, _) | (_, WordType::Elided) => false,
                    _ => match (wa.token.as_ref(), wb.token.as_ref()) {
                        (Some(ta), Some(tb)) => {
                            Rc::ptr_eq(ta, tb) && ga.segment_number(a) == gb.segment_number(b)
                        }
                        _ => false,
                    },
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{AgreementFeatures, Segment, Token};
    use crate::vocab::{Location, Relation, SegmentType};

    fn noun_token(loc: u32) -> Rc<TokenData> {
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
    fn segment_index_is_contiguous() {
        let mut g = SyntaxGraph::new();
        g.add_word(WordType::Token, Some(noun_token(1)), None, None);
        g.add_word(WordType::Token, Some(noun_token(2)), None, None);
        for (i, n) in g.segment_nodes_in_order().into_iter().enumerate() {
            assert_eq!(g.index_of(n), i);
        }
    }

    #[test]
    fn single_head_and_acyclicity() {
        let mut g = SyntaxGraph::new();
        let a = g.add_word(WordType::Token, Some(noun_token(1)), None, None)[0];
        let b = g.add_word(WordType::Token, Some(noun_token(2)), None, None)[0];
        g.add_edge(a, b, Relation::Subject).unwrap();
        assert!(g.add_edge(a, b, Relation::Object).is_err());
        assert!(g.add_edge(b, a, Relation::Object).is_err());
    }

    #[test]
    fn insert_elided_word_reindexes_segments() {
        let mut g = SyntaxGraph::new();
        g.add_word(WordType::Token, Some(noun_token(1)), None, None);
        let second = g.add_word(WordType::Token, Some(noun_token(2)), None, None)[0];
        assert_eq!(g.word_index(second), 1);

        let elided = g.insert_elided_word(1, PartOfSpeech::Pronoun, None);
        assert_eq!(g.index_of(elided), 1);
        assert_eq!(g.word_index(elided), 1);
        assert_eq!(g.word_index(second), 2);
        for (i, n) in g.segment_nodes_in_order().into_iter().enumerate() {
            assert_eq!(g.index_of(n), i);
        }
    }

    #[test]
    fn only_tokens_drops_elided_words() {
        let mut g = SyntaxGraph::new();
        g.add_word(WordType::Token, Some(noun_token(1)), None, None);
        g.insert_elided_word(1, PartOfSpeech::Verb, None);
        let working = g.only_tokens();
        assert_eq!(working.segment_node_count(), 1);
        assert_eq!(working.all_edges().len(), 0);
    }

    #[test]
    fn equivalent_matches_by_segment_identity() {
        let tok = noun_token(1);
        let mut gold = SyntaxGraph::new();
        let gold_node = gold.add_word(WordType::Token, Some(tok.clone()), None, None)[0];

        let mut working = SyntaxGraph::new();
        let working_node = working.add_word(WordType::Token, Some(tok), None, None)[0];

        assert!(SyntaxGraph::equivalent(&gold, gold_node, &working, working_node));
    }
}
