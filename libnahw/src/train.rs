//! Trainer (spec.md section 4.8): replays the oracle over a corpus of gold
//! graphs, collecting one training problem per ensemble bucket, then fits a
//! model per bucket.

use std::collections::HashMap;

use crate::action::ParserAction;
use crate::errors::Result;
use crate::features::{self, ensemble_index, FeatureVector};
use crate::graph::SyntaxGraph;
use crate::lemma::LemmaInterner;
use crate::model::{BucketModel, ConstantClassifier, LinearClassifier};
use crate::oracle::Oracle;
use crate::transitions::{self, ParserState};

pub type Problems = HashMap<usize, Vec<(FeatureVector, i32)>>;

/// Runs the oracle over every gold graph, collecting `(features, action
/// code)` pairs keyed by ensemble bucket, including the terminal stop
/// action for each graph.
pub fn build_training_problems(gold_graphs: &[SyntaxGraph], interner: &LemmaInterner) -> Result<Problems> {
    let mut problems: Problems = HashMap::new();

    for gold in gold_graphs {
        let working = gold.only_tokens();
        let mut oracle = Oracle::new(gold, &working);
        let mut state = ParserState::new(working);

        loop {
            let action = oracle.next_action(&state.graph, &state);
            let bucket = ensemble_index(&state.graph, state.at(0));
            let features = features::extract(interner, &state);
            problems.entry(bucket).or_default().push((features, action.to_code()));

            if action == ParserAction::Stop {
                break;
            }
            transitions::execute(&mut state, action)?;
        }
    }

    Ok(problems)
}

/// Fits one model per bucket. A bucket whose examples carry a single
/// distinct label is stored as a constant; otherwise an averaged-perceptron
/// model is trained against it.
pub fn train_models(problems: &Problems, training_rounds: u32) -> HashMap<usize, BucketModel> {
    let mut models = HashMap::new();

    for (&bucket, examples) in problems {
        let mut labels: Vec<i32> = examples.iter().map(|(_, l)| *l).collect();
        labels.sort_unstable();
        labels.dedup();

        let model = if labels.len() <= 1 {
            let code = labels.first().copied().unwrap_or(ParserAction::Stop.to_code());
            BucketModel::Constant(ConstantClassifier { action_code: code })
        } else {
            let dim = examples.iter().map(|(f, _)| f.dim).max().unwrap_or(0);
            let mut linear = LinearClassifier::new(dim);
            linear.train(examples, training_rounds);
            BucketModel::Linear(linear)
        };

        models.insert(bucket, model);
    }

    models
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{AgreementFeatures, Segment, Token};
    use crate::vocab::{Location, PartOfSpeech, Relation, SegmentType, WordType};
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
    fn single_label_buckets_become_constant_models() {
        let mut gold = SyntaxGraph::new();
        let a = gold.add_word(WordType::Token, Some(noun_token(1)), None, None)[0];
        let b = gold.add_word(WordType::Token, Some(noun_token(2)), None, None)[0];
        gold.add_edge(a, b, Relation::Adjective).unwrap();

        let interner = LemmaInterner::new();
        let problems = build_training_problems(&[gold], &interner).unwrap();
        let models = train_models(&problems, 5);
        assert!(!models.is_empty());
    }
}
