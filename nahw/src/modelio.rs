use std::collections::HashMap;
use std::fs;

use anyhow::{Context, Result};
use libnahw::config::ParserConfig;
use libnahw::lemma::LemmaInterner;
use libnahw::model::BucketModel;
use serde::{Deserialize, Serialize};

/// Everything inference needs that training produced: the per-bucket models
/// and the lemma interner they were trained against, since a lemma id is
/// only meaningful relative to the interner that assigned it.
#[derive(Serialize, Deserialize)]
pub struct TrainedArtifact {
    pub interner: LemmaInterner,
    pub models: HashMap<usize, BucketModel>,
    #[serde(default = "default_max_parse_steps")]
    pub max_parse_steps: u32,
}

fn default_max_parse_steps() -> u32 {
    libnahw::transitions::MAX_PARSE_STEPS
}

pub fn load_config(path: Option<&str>) -> Result<ParserConfig> {
    match path {
        None => Ok(ParserConfig::default()),
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            toml::from_str(&text).with_context(|| format!("parsing {} as parser config", path))
        }
    }
}

pub fn load_artifact(path: &str) -> Result<TrainedArtifact> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {} as trained models", path))
}

pub fn save_artifact(path: &str, artifact: &TrainedArtifact) -> Result<()> {
    let json = serde_json::to_string_pretty(artifact)?;
    fs::write(path, json).with_context(|| format!("writing {}", path))
}
