//! Lemma interner: dense integer ids for lemma strings.
//!
//! Pre-seeded with a fixed set of particle lemmas at fixed low ids so the
//! morphology affix dictionary (`morphology.rs`) can refer to them
//! symbolically without a lookup that could fail at parse time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{NahwError, Result};

/// Fixed particle lemmas, seeded at construction in this order so their ids
/// are stable across runs. spec.md describes this set as "ten fixed particle
/// lemmas"; the literal list it gives has eleven entries and is treated here
/// as authoritative over the prose count (see DESIGN.md).
pub const SEED_LEMMAS: &[&str] =
    &["wa", "fa", "bi", "ka", "ta", "la", "sa", "yaA", "haA", "n", "hum~a"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LemmaInterner {
    ids: HashMap<String, u32>,
    strings: Vec<String>,
}

impl LemmaInterner {
    pub fn new() -> Self {
        let mut interner = LemmaInterner::default();
        for lemma in SEED_LEMMAS {
            interner.intern(lemma);
        }
        interner
    }

    /// Interns `lemma`, returning its id. Idempotent.
    pub fn intern(&mut self, lemma: &str) -> u32 {
        if let Some(id) = self.ids.get(lemma) {
            return *id;
        }
        let id = self.strings.len() as u32;
        self.strings.push(lemma.to_string());
        self.ids.insert(lemma.to_string(), id);
        id
    }

    /// Looks up the id of `lemma`. Fails if `lemma` was never interned.
    pub fn value_of(&self, lemma: &str) -> Result<u32> {
        self.ids
            .get(lemma)
            .copied()
            .ok_or_else(|| NahwError::invariant(format!("unknown lemma '{}'", lemma)))
    }

    pub fn lemma_of(&self, id: u32) -> Option<&str> {
        self.strings.get(id as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_ids_are_stable() {
        let interner = LemmaInterner::new();
        assert_eq!(interner.value_of("wa").unwrap(), 0);
        assert_eq!(interner.value_of("hum~a").unwrap(), (SEED_LEMMAS.len() - 1) as u32);
        assert_eq!(interner.len(), SEED_LEMMAS.len());
    }

    #[test]
    fn unknown_lemma_fails() {
        let interner = LemmaInterner::new();
        assert!(interner.value_of("qamar").is_err());
    }

    #[test]
    fn intern_is_idempotent() {
        let mut interner = LemmaInterner::new();
        let a = interner.intern("qamar");
        let b = interner.intern("qamar");
        assert_eq!(a, b);
        assert_eq!(interner.lemma_of(a), Some("qamar"));
    }
}
