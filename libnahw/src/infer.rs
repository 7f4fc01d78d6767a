//! Inference driver (spec.md section 4.8): replays per-bucket model
//! predictions through the parse loop, falling back safely on an invalid
//! or missing prediction, then runs the post-processing pass.

use std::collections::HashMap;

use crate::action::ParserAction;
use crate::errors::Result;
use crate::features::{self, ensemble_index};
use crate::graph::SyntaxGraph;
use crate::lemma::LemmaInterner;
use crate::model::{ActionClassifier, BucketModel};
use crate::transitions::{self, ParserState};

/// Parses `working` (a token-only graph) to completion using one model per
/// ensemble bucket, then fills in any verbs left without a subject.
pub fn parse(
    working: SyntaxGraph,
    interner: &LemmaInterner,
    models: &HashMap<usize, BucketModel>,
    max_parse_steps: u32,
) -> Result<SyntaxGraph> {
    let mut state = ParserState::new(working);

    transitions::run(&mut state, max_parse_steps, |s| {
        let bucket = ensemble_index(&s.graph, s.at(0));
        let model = models.get(&bucket)?;
        let features = features::extract(interner, s);
        let code = model.predict(&features)?;
        match ParserAction::from_code(code) {
            Some(ParserAction::Stop) | None => None,
            Some(action) => Some(action),
        }
    })?;

    transitions::complete_missing_subjects(&mut state)?;
    Ok(state.graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConstantClassifier;
    use crate::morphology::{AgreementFeatures, Segment, Token};
    use crate::vocab::{Location, PartOfSpeech, SegmentType, WordType};
    use std::rc::Rc;

    fn noun_token() -> Rc<Token> {
        Rc::new(Token {
            location: Location::new(1, 1, 1),
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
    fn missing_bucket_model_stops_immediately() {
        let mut graph = SyntaxGraph::new();
        graph.add_word(WordType::Token, Some(noun_token()), None, None);
        let interner = LemmaInterner::new();
        let models = HashMap::new();
        let result = parse(graph, &interner, &models, crate::transitions::MAX_PARSE_STEPS).unwrap();
        assert_eq!(result.all_edges().len(), 0);
    }

    #[test]
    fn shift_then_stop_code_halts_the_loop() {
        let mut graph = SyntaxGraph::new();
        graph.add_word(WordType::Token, Some(noun_token()), None, None);
        let interner = LemmaInterner::new();
        let mut models = HashMap::new();
        models.insert(
            0,
            BucketModel::Constant(ConstantClassifier { action_code: ParserAction::Shift.to_code() }),
        );
        let bucket_for_noun = crate::vocab::PartOfSpeech::Noun.value() as usize;
        models.insert(
            bucket_for_noun,
            BucketModel::Constant(ConstantClassifier { action_code: ParserAction::Stop.to_code() }),
        );
        let result = parse(graph, &interner, &models, crate::transitions::MAX_PARSE_STEPS).unwrap();
        assert_eq!(result.segment_node_count(), 1);
        assert_eq!(result.all_edges().len(), 0);
    }
}
