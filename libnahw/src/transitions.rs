//! The shift/reduce transition system (spec.md section 4.4): parser state,
//! the eight action kinds, the action validator, the parse loop, and the
//! inference-only post-processing pass that fills in missing verbal
//! subjects.

use log::{trace, warn};

use crate::action::{EmptyCategory, ParserAction};
use crate::errors::{NahwError, Result};
use crate::graph::{SyntaxGraph, SyntaxNode};
use crate::phrase_classifier::classify_phrase;
use crate::subgraph::subgraph_end;
use crate::vocab::{GenderType, NumberType, PartOfSpeech, PersonType, Relation, VoiceType, WordType};

/// Parser divergence guard (spec.md section 4.4 / section 7).
pub const MAX_PARSE_STEPS: u32 = 250;

/// Stack top is index 0 conceptually; physically the vector's last element
/// is the top so push/pop stay O(1).
pub struct ParserState {
    pub graph: SyntaxGraph,
    stack: Vec<SyntaxNode>,
    queue: Option<SyntaxNode>,
}

impl ParserState {
    pub fn new(graph: SyntaxGraph) -> Self {
        let queue = graph.segment_node_at(0);
        ParserState { graph, stack: Vec::new(), queue }
    }

    /// Stack element at `depth` from the top (0 = top), or `None`.
    pub fn at(&self, depth: usize) -> Option<SyntaxNode> {
        let len = self.stack.len();
        if depth >= len {
            None
        } else {
            Some(self.stack[len - 1 - depth])
        }
    }

    pub fn peek_queue(&self) -> Option<SyntaxNode> {
        self.queue
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }
}

/// The action validator: every action the parser executes must pass this
/// immediately beforehand. A rejected prediction is silently replaced with
/// `Reduce(false)` by the caller, never surfaced.
pub fn is_valid(state: &ParserState, action: ParserAction) -> bool {
    match action {
        ParserAction::Stop => true,
        ParserAction::Shift => state.queue.is_some(),
        ParserAction::Right(_) => match (state.at(0), state.at(1)) {
            (Some(dep), Some(head)) => {
                state.graph.head(dep).is_none() && !state.graph.is_cyclic_dependency(dep, head)
            }
            _ => false,
        },
        ParserAction::Left(_) => match (state.at(0), state.at(1)) {
            (Some(head), Some(dep)) => {
                state.graph.head(dep).is_none() && !state.graph.is_cyclic_dependency(dep, head)
            }
            _ => false,
        },
        ParserAction::Phrase => match (state.at(0), state.at(1)) {
            (Some(top), Some(below)) => !top.is_phrase() && !below.is_phrase(),
            _ => false,
        },
        ParserAction::Reduce(false) => state.at(0).is_some(),
        ParserAction::Reduce(true) => state.at(1).is_some(),
        ParserAction::Subgraph => match state.at(0) {
            Some(start) if !start.is_phrase() => match subgraph_end(&state.graph, start) {
                Some(end) => state.graph.phrase(start, end).is_none(),
                None => false,
            },
            _ => false,
        },
        ParserAction::Subject => match state.at(0) {
            Some(top) => {
                state.graph.part_of_speech(top) == Some(PartOfSpeech::Verb)
                    && !state.graph.edges_with_head(top).any(|e| is_subject_relation(e.relation))
            }
            None => false,
        },
        ParserAction::Empty(_) => match state.at(0) {
            Some(top) => {
                let anchor = effective_anchor(&state.graph, top);
                match state.graph.previous_segment_node(anchor) {
                    Some(prev) => state.graph.word(prev).map(|w| w.word_type) != Some(WordType::Elided),
                    None => true,
                }
            }
            None => false,
        },
    }
}

fn is_subject_relation(rel: Relation) -> bool {
    matches!(rel, Relation::Subject | Relation::PassiveSubject | Relation::SpecialSubject)
}

fn effective_anchor(graph: &SyntaxGraph, node: SyntaxNode) -> SyntaxNode {
    if node.is_phrase() {
        graph.phrase_endpoints(node).unwrap().0
    } else {
        node
    }
}

fn subject_relation_for(graph: &SyntaxGraph, verb: SyntaxNode) -> Relation {
    match graph.segment(verb).map(|s| &s.features) {
        Some(f) if f.special_type.is_some() => Relation::SpecialSubject,
        Some(f) if f.voice == Some(VoiceType::Passive) => Relation::PassiveSubject,
        _ => Relation::Subject,
    }
}

fn surface_pronoun(person: PersonType, gender: GenderType, number: NumberType) -> Option<&'static str> {
    use GenderType::*;
    use NumberType::*;
    use PersonType::*;
    match (person, gender, number) {
        (First, _, Singular) => Some("أَنَا"),
        (First, _, Plural) => Some("نَحْنُ"),
        (First, _, Dual) => Some("نَحْنُ"),
        (Second, Masculine, Singular) => Some("أَنْتَ"),
        (Second, Feminine, Singular) => Some("أَنْتِ"),
        (Second, _, Dual) => Some("أَنْتُمَا"),
        (Second, Masculine, Plural) => Some("أَنْتُمْ"),
        (Second, Feminine, Plural) => Some("أَنْتُنَّ"),
        (Third, Masculine, Singular) => Some("هُوَ"),
        (Third, Feminine, Singular) => Some("هِيَ"),
        (Third, _, Dual) => Some("هُمَا"),
        (Third, Masculine, Plural) => Some("هُمْ"),
        (Third, Feminine, Plural) => Some("هُنَّ"),
    }
}

fn elided_pronoun_text(graph: &SyntaxGraph, verb: SyntaxNode) -> Option<String> {
    let features = &graph.segment(verb)?.features;
    let (p, g, n) = (features.person?, features.gender?, features.number?);
    surface_pronoun(p, g, n).map(|s| s.to_string())
}

/// Inserts an elided subject pronoun to the right of `verb`, pushes it onto
/// the stack, and adds the subject edge. Used by both the SUBJECT action
/// and the post-processing pass.
fn add_subject_pronoun(state: &mut ParserState, verb: SyntaxNode) -> Result<()> {
    let word_pos = state.graph.word_index(verb);
    if word_pos < 0 {
        return Err(NahwError::invariant("SUBJECT action requires a non-phrase verb"));
    }
    let text = elided_pronoun_text(&state.graph, verb);
    let pronoun = state.graph.insert_elided_word(word_pos as usize + 1, PartOfSpeech::Pronoun, text);
    let relation = subject_relation_for(&state.graph, verb);
    state.stack.push(pronoun);
    state.graph.add_edge(pronoun, verb, relation)?;
    Ok(())
}

/// Executes `action` against `state`, assumed already validated.
pub fn execute(state: &mut ParserState, action: ParserAction) -> Result<()> {
    match action {
        ParserAction::Stop => {}
        ParserAction::Shift => {
            let node = state.queue.ok_or_else(|| NahwError::invariant("SHIFT with empty queue"))?;
            state.queue = state.graph.next_segment_node(node);
            state.stack.push(node);
        }
        ParserAction::Right(rel) => {
            let dep = state.at(0).ok_or_else(|| NahwError::invariant("RIGHT with empty stack"))?;
            let head = state.at(1).ok_or_else(|| NahwError::invariant("RIGHT needs stack depth 2"))?;
            state.graph.add_edge(dep, head, rel)?;
        }
        ParserAction::Left(rel) => {
            let head = state.at(0).ok_or_else(|| NahwError::invariant("LEFT with empty stack"))?;
            let dep = state.at(1).ok_or_else(|| NahwError::invariant("LEFT needs stack depth 2"))?;
            state.graph.add_edge(dep, head, rel)?;
        }
        ParserAction::Phrase => {
            let top = state.at(0).ok_or_else(|| NahwError::invariant("PHRASE with empty stack"))?;
            let below = state.at(1).ok_or_else(|| NahwError::invariant("PHRASE needs stack depth 2"))?;
            let phrase_type = classify_phrase(&state.graph, below, top);
            let phrase = state.graph.add_phrase(phrase_type, below, top);
            state.stack.pop();
            state.stack.pop();
            state.stack.push(phrase);
        }
        ParserAction::Reduce(depth1) => {
            let depth = if depth1 { 1 } else { 0 };
            if depth >= state.stack.len() {
                return Err(NahwError::invariant("REDUCE of nonexistent stack depth"));
            }
            let idx = state.stack.len() - 1 - depth;
            state.stack.remove(idx);
        }
        ParserAction::Subgraph => {
            let start = state.at(0).ok_or_else(|| NahwError::invariant("SUBGRAPH with empty stack"))?;
            let end = subgraph_end(&state.graph, start)
                .ok_or_else(|| NahwError::invariant("SUBGRAPH with no valid end"))?;
            let phrase_type = classify_phrase(&state.graph, start, end);
            let phrase = state.graph.add_phrase(phrase_type, start, end);
            state.stack.pop();
            state.stack.push(phrase);
        }
        ParserAction::Subject => {
            let verb = state.at(0).ok_or_else(|| NahwError::invariant("SUBJECT with empty stack"))?;
            add_subject_pronoun(state, verb)?;
        }
        ParserAction::Empty(category) => {
            let top = state.at(0).ok_or_else(|| NahwError::invariant("EMPTY with empty stack"))?;
            let anchor = effective_anchor(&state.graph, top);
            let word_pos = state.graph.word_index(anchor);
            if word_pos < 0 {
                return Err(NahwError::invariant("EMPTY anchor has no owning word"));
            }
            let pos = match category {
                EmptyCategory::Noun => PartOfSpeech::Noun,
                EmptyCategory::Adjective => PartOfSpeech::Adjective,
                EmptyCategory::Verb => PartOfSpeech::Verb,
            };
            let node = state.graph.insert_elided_word(word_pos as usize, pos, None);
            let below_top = state.stack.len() - 1;
            state.stack.insert(below_top, node);
        }
    }
    Ok(())
}

/// Drives the parse loop: repeatedly asks `predict` for the next action
/// (returning `None` signals stop), validates it, falling back to
/// `Reduce(false)` on rejection, and executes it. Fails with
/// `ParseDiverged` past `max_steps` actions without a stop.
pub fn run<F>(state: &mut ParserState, max_steps: u32, mut predict: F) -> Result<()>
where
    F: FnMut(&ParserState) -> Option<ParserAction>,
{
    let mut steps = 0u32;
    loop {
        let Some(action) = predict(state) else { break };
        let action = if is_valid(state, action) {
            action
        } else {
            trace!("predicted action rejected by validator, falling back to REDUCE(0)");
            ParserAction::Reduce(false)
        };
        execute(state, action)?;
        steps += 1;
        if steps > max_steps {
            warn!("parser exceeded {} steps without a stop prediction", max_steps);
            return Err(NahwError::ParseDiverged { steps });
        }
    }
    Ok(())
}

/// Inference-only post-pass: right-to-left, every token VERB with no
/// subject-class incoming edge gets an elided pronoun subject inserted.
pub fn complete_missing_subjects(state: &mut ParserState) -> Result<()> {
    let verbs: Vec<SyntaxNode> = state
        .graph
        .segment_nodes_in_order()
        .into_iter()
        .filter(|n| {
            state.graph.word(*n).map(|w| w.word_type) == Some(WordType::Token)
                && state.graph.part_of_speech(*n) == Some(PartOfSpeech::Verb)
        })
        .collect();

    for verb in verbs.into_iter().rev() {
        let has_subject = state.graph.edges_with_head(verb).any(|e| is_subject_relation(e.relation));
        if has_subject {
            continue;
        }
        let word_pos = state.graph.word_index(verb);
        if word_pos < 0 {
            continue;
        }
        let text = elided_pronoun_text(&state.graph, verb);
        let pronoun = state.graph.insert_elided_word(word_pos as usize + 1, PartOfSpeech::Pronoun, text);
        let relation = subject_relation_for(&state.graph, verb);
        state.graph.add_edge(pronoun, verb, relation)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{AgreementFeatures, Segment, Token};
    use crate::vocab::{Location, SegmentType, WordType};
    use std::rc::Rc;

    fn verb_token(features: AgreementFeatures) -> Rc<Token> {
        Rc::new(Token {
            location: Location::new(1, 1, 1),
            arabic: None,
            segments: vec![Segment {
                segment_type: SegmentType::Stem,
                part_of_speech: PartOfSpeech::Verb,
                segment_number: 1,
                lemma: None,
                features,
            }],
        })
    }

    #[test]
    fn shift_then_reduce_empties_stack() {
        let mut g = SyntaxGraph::new();
        g.add_word(
            WordType::Token,
            Some(verb_token(AgreementFeatures::default())),
            None,
            None,
        );
        let mut state = ParserState::new(g);
        assert!(is_valid(&state, ParserAction::Shift));
        execute(&mut state, ParserAction::Shift).unwrap();
        assert_eq!(state.stack_len(), 1);
        assert!(is_valid(&state, ParserAction::Reduce(false)));
        execute(&mut state, ParserAction::Reduce(false)).unwrap();
        assert_eq!(state.stack_len(), 0);
    }

    #[test]
    fn subject_action_inserts_pronoun_with_surface_text() {
        let features = AgreementFeatures {
            person: Some(PersonType::Third),
            gender: Some(GenderType::Masculine),
            number: Some(NumberType::Singular),
            ..Default::default()
        };
        let mut g = SyntaxGraph::new();
        g.add_word(WordType::Token, Some(verb_token(features)), None, None);
        let mut state = ParserState::new(g);
        execute(&mut state, ParserAction::Shift).unwrap();
        let verb = state.at(0).unwrap();
        assert!(is_valid(&state, ParserAction::Subject));
        execute(&mut state, ParserAction::Subject).unwrap();
        let pronoun = state.at(0).unwrap();
        assert_eq!(state.graph.word(pronoun).unwrap().elided_text.as_deref(), Some("هُوَ"));
        assert_eq!(state.graph.head(pronoun), Some(verb));
        assert!(!is_valid(&state, ParserAction::Subject));
    }

    #[test]
    fn reduce_on_empty_stack_fails() {
        let mut g = SyntaxGraph::new();
        g.add_word(
            WordType::Token,
            Some(verb_token(AgreementFeatures::default())),
            None,
            None,
        );
        let mut state = ParserState::new(g);
        let err = run(&mut state, |_| Some(ParserAction::Reduce(false)));
        assert!(err.is_err());
    }
}
