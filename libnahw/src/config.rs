//! Core-level configuration (spec.md section 6): the parse divergence limit
//! and the SVM hyperparameters used when training a multi-class bucket.
//! Everything else (corpus location, CLI flags) lives above this crate.

use serde::{Deserialize, Serialize};

use crate::model::SvmHyperParams;
use crate::transitions::MAX_PARSE_STEPS;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub max_parse_steps: u32,
    pub svm: SvmHyperParams,
    /// Number of averaged-perceptron epochs run per bucket during training.
    pub training_rounds: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig { max_parse_steps: MAX_PARSE_STEPS, svm: SvmHyperParams::default(), training_rounds: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let cfg = ParserConfig::default();
        assert_eq!(cfg.max_parse_steps, 250);
        assert_eq!(cfg.svm.c, 0.5);
        assert_eq!(cfg.svm.degree, 2);
        assert_eq!(cfg.svm.gamma, 0.2);
        assert_eq!(cfg.svm.coef0, 0.0);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: ParserConfig = toml::from_str("training_rounds = 5").unwrap();
        assert_eq!(cfg.training_rounds, 5);
        assert_eq!(cfg.max_parse_steps, 250);
    }
}
