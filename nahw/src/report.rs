use tabled::Tabled;

use crate::evaluate::Scorecard;

#[derive(Tabled)]
pub struct EvaluateRow {
    pub file: String,
    pub tokens: u32,
    pub uas: String,
    pub las: String,
}

impl EvaluateRow {
    pub fn new(file: String, card: Scorecard) -> Self {
        EvaluateRow {
            file,
            tokens: card.scored,
            uas: format!("{:.4}", card.uas()),
            las: format!("{:.4}", card.las()),
        }
    }
}
