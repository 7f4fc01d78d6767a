//! Morphological data model (Segment/Token/Verse/Chapter) and the
//! segment reader that decodes a single morphology cell string into a
//! `Segment`, per spec.md section 6.

use crate::errors::{NahwError, Result};
use crate::lemma::LemmaInterner;
use crate::vocab::{
    CaseType, GenderType, Location, MoodType, NumberType, PartOfSpeech, PersonType, PronounType,
    SegmentType, SpecialType, StateType, VoiceType,
};

/// Agreement features carried by a segment. All fields are optional because
/// most segment types (conjunctions, particles) carry none of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgreementFeatures {
    pub person: Option<PersonType>,
    pub gender: Option<GenderType>,
    pub number: Option<NumberType>,
    pub mood: Option<MoodType>,
    pub voice: Option<VoiceType>,
    pub case: Option<CaseType>,
    pub state: Option<StateType>,
    pub pronoun_type: Option<PronounType>,
    pub special_type: Option<SpecialType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub segment_type: SegmentType,
    pub part_of_speech: PartOfSpeech,
    pub segment_number: u32,
    pub lemma: Option<String>,
    pub features: AgreementFeatures,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub location: Location,
    pub arabic: Option<String>,
    pub segments: Vec<Segment>,
}

impl Token {
    pub fn new(location: Location, arabic: Option<String>) -> Self {
        Token { location, arabic, segments: Vec::new() }
    }

    pub fn stem(&self) -> Option<&Segment> {
        self.segments.iter().find(|s| s.segment_type == SegmentType::Stem)
    }
}

#[derive(Debug, Clone)]
pub struct Verse {
    pub location: Location,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone)]
pub struct Chapter {
    pub number: u32,
    pub verses: Vec<Verse>,
}

/// One row of input: a location, an optional surface form, and an optional
/// morphology cell string (absent only for verse-level location rows).
#[derive(Debug, Clone)]
pub struct MorphologyRow {
    pub location: Location,
    pub arabic: Option<String>,
    pub morphology: Option<String>,
}

/// Fixed dictionary of 24 affix literals not covered by the `POS:`/`PRON:`
/// grammars, mapping a morphology literal to (segment type, part of
/// speech, symbolic lemma).
const AFFIX_DICTIONARY: &[(&str, SegmentType, PartOfSpeech, Option<&str>)] = &[
    ("Al+", SegmentType::Prefix, PartOfSpeech::Determiner, None),
    ("bi+", SegmentType::Prefix, PartOfSpeech::Preposition, Some("bi")),
    ("ka+", SegmentType::Prefix, PartOfSpeech::Preposition, Some("ka")),
    ("wa+", SegmentType::Prefix, PartOfSpeech::Conjunction, Some("wa")),
    ("fa+", SegmentType::Prefix, PartOfSpeech::Conjunction, Some("fa")),
    ("sa+", SegmentType::Prefix, PartOfSpeech::FutureParticle, Some("sa")),
    ("ta+", SegmentType::Prefix, PartOfSpeech::CertaintyParticle, Some("ta")),
    ("la+", SegmentType::Prefix, PartOfSpeech::EmphaticParticle, Some("la")),
    ("hu", SegmentType::Suffix, PartOfSpeech::Pronoun, None),
    ("hi", SegmentType::Suffix, PartOfSpeech::Pronoun, None),
    ("hA", SegmentType::Suffix, PartOfSpeech::Pronoun, Some("haA")),
    ("humA", SegmentType::Suffix, PartOfSpeech::Pronoun, Some("hum~a")),
    ("kum", SegmentType::Suffix, PartOfSpeech::Pronoun, None),
    ("kumA", SegmentType::Suffix, PartOfSpeech::Pronoun, None),
    ("hum", SegmentType::Suffix, PartOfSpeech::Pronoun, None),
    ("hunna", SegmentType::Suffix, PartOfSpeech::Pronoun, None),
    ("nA", SegmentType::Suffix, PartOfSpeech::Pronoun, None),
    ("ny", SegmentType::Suffix, PartOfSpeech::Pronoun, None),
    ("ma", SegmentType::Prefix, PartOfSpeech::NegativeParticle, None),
    ("lA", SegmentType::Prefix, PartOfSpeech::NegativeParticle, None),
    ("in", SegmentType::Prefix, PartOfSpeech::ConditionalParticle, None),
    ("yA", SegmentType::Prefix, PartOfSpeech::Vocative, Some("yaA")),
    ("illA", SegmentType::Prefix, PartOfSpeech::Exceptive, None),
    ("qad", SegmentType::Prefix, PartOfSpeech::CertaintyParticle, None),
];

fn lookup_affix(literal: &str) -> Option<(SegmentType, PartOfSpeech, Option<&'static str>)> {
    AFFIX_DICTIONARY
        .iter()
        .find(|(tag, _, _, _)| *tag == literal)
        .map(|(_, t, p, l)| (*t, *p, *l))
}

/// Decodes one morphology cell. `segment_number` is the 1-based position of
/// this segment within its token. `existing` is the token's segments
/// decoded so far, needed for the two context-dependent rules: `l:P+`
/// demoting to a suffix when a stem already exists, and empty-cell /
/// `PRON:` PGN inheritance from the stem.
pub fn read_segment(
    cell: &str,
    segment_number: u32,
    existing: &[Segment],
    interner: &mut LemmaInterner,
) -> Result<Segment> {
    let trimmed = cell.trim();

    if trimmed.is_empty() {
        let stem = existing
            .iter()
            .rev()
            .find(|s| s.segment_type == SegmentType::Stem)
            .ok_or_else(|| {
                NahwError::invariant("empty morphology cell with no preceding stem to inherit from")
            })?;
        return Ok(Segment {
            segment_type: SegmentType::Suffix,
            part_of_speech: PartOfSpeech::Pronoun,
            segment_number,
            lemma: None,
            features: AgreementFeatures {
                person: stem.features.person,
                gender: stem.features.gender,
                number: stem.features.number,
                pronoun_type: Some(PronounType::Subject),
                ..Default::default()
            },
        });
    }

    if let Some(rest) = trimmed.strip_prefix("POS:") {
        return read_stem(rest, segment_number, interner);
    }

    if let Some(rest) = trimmed.strip_prefix("PRON:") {
        return read_pronoun_suffix(rest, segment_number, existing);
    }

    if trimmed == "l:P+" {
        let has_stem = existing.iter().any(|s| s.segment_type == SegmentType::Stem);
        let segment_type = if has_stem { SegmentType::Suffix } else { SegmentType::Prefix };
        interner.intern("la");
        return Ok(Segment {
            segment_type,
            part_of_speech: PartOfSpeech::Preposition,
            segment_number,
            lemma: Some("la".to_string()),
            features: AgreementFeatures::default(),
        });
    }

    let (segment_type, pos, lemma) = lookup_affix(trimmed)
        .ok_or_else(|| NahwError::invariant(format!("unrecognized morphology literal '{}'", trimmed)))?;
    if let Some(l) = lemma {
        interner.intern(l);
    }
    Ok(Segment {
        segment_type,
        part_of_speech: pos,
        segment_number,
        lemma: lemma.map(|s| s.to_string()),
        features: AgreementFeatures::default(),
    })
}

fn read_stem(rest: &str, segment_number: u32, interner: &mut LemmaInterner) -> Result<Segment> {
    let mut tokens = rest.split_whitespace();
    let pos_tag = tokens
        .next()
        .ok_or_else(|| NahwError::invariant("stem morphology cell missing POS tag"))?;
    let part_of_speech = PartOfSpeech::from_tag(pos_tag)
        .ok_or_else(|| NahwError::invariant(format!("unknown part of speech tag '{}'", pos_tag)))?;

    let mut lemma = None;
    let mut features = AgreementFeatures::default();

    for tok in tokens {
        if let Some(v) = tok.strip_prefix("LEM:") {
            interner.intern(v);
            lemma = Some(v.to_string());
        } else if let Some(v) = tok.strip_prefix("SP:") {
            features.special_type = SpecialType::from_tag(v);
        } else if let Some(v) = tok.strip_prefix("MOOD:") {
            features.mood = MoodType::from_tag(v);
        } else if tok.starts_with("ROOT:") {
            // root radicals are not part of the modeled agreement features.
        } else if tok.starts_with('(') {
            // free-form annotation, not part of the modeled agreement features.
        } else if matches!(tok, "PERF" | "IMPF" | "IMPV" | "VN") {
            // verb aspect / verbal-noun markers; not modeled as a closed feature.
        } else if let Some(case) = CaseType::from_tag(tok) {
            features.case = Some(case);
        } else if let Some(voice) = VoiceType::from_tag(tok) {
            features.voice = Some(voice);
        } else if let Some(state) = StateType::from_tag(tok) {
            features.state = Some(state);
        } else if let Some(person) = PersonType::from_tag(tok) {
            features.person = Some(person);
        } else if let Some(gender) = GenderType::from_tag(tok) {
            features.gender = Some(gender);
        } else if let Some(number) = NumberType::from_tag(tok) {
            features.number = Some(number);
        }
        // anything else is a positional token this model does not track.
    }

    Ok(Segment { segment_type: SegmentType::Stem, part_of_speech, segment_number, lemma, features })
}

fn read_pronoun_suffix(pgn: &str, segment_number: u32, existing: &[Segment]) -> Result<Segment> {
    let mut features = AgreementFeatures { pronoun_type: Some(PronounType::Object), ..Default::default() };
    for ch in pgn.chars() {
        let s = ch.to_string();
        if let Some(person) = PersonType::from_tag(&s) {
            features.person = Some(person);
        } else if let Some(gender) = GenderType::from_tag(&s) {
            features.gender = Some(gender);
        } else if let Some(number) = NumberType::from_tag(&s) {
            features.number = Some(number);
        } else {
            return Err(NahwError::invariant(format!("unrecognized PRON code '{}'", pgn)));
        }
    }
    if existing.iter().all(|s| s.segment_type != SegmentType::Stem) {
        return Err(NahwError::invariant("PRON suffix with no preceding stem in token"));
    }
    Ok(Segment {
        segment_type: SegmentType::Suffix,
        part_of_speech: PartOfSpeech::Pronoun,
        segment_number,
        lemma: None,
        features,
    })
}

/// Groups flat `MorphologyRow`s into `Chapter`/`Verse`/`Token` containers,
/// decoding each row's morphology cell into a `Segment` on its token.
pub fn ingest(rows: &[MorphologyRow], interner: &mut LemmaInterner) -> Result<Vec<Chapter>> {
    let mut chapters: Vec<Chapter> = Vec::new();

    for row in rows {
        let chapter = match chapters.last_mut() {
            Some(c) if c.number == row.location.chapter => c,
            _ => {
                chapters.push(Chapter { number: row.location.chapter, verses: Vec::new() });
                chapters.last_mut().unwrap()
            }
        };
        let verse_loc = Location::new(row.location.chapter, row.location.verse, 0);
        let verse = match chapter.verses.last_mut() {
            Some(v) if v.location.verse == row.location.verse => v,
            _ => {
                chapter.verses.push(Verse { location: verse_loc, tokens: Vec::new() });
                chapter.verses.last_mut().unwrap()
            }
        };

        if row.location.is_verse_level() {
            continue;
        }

        let token = match verse.tokens.last_mut() {
            Some(t) if t.location.token == row.location.token => t,
            _ => {
                verse.tokens.push(Token::new(row.location, row.arabic.clone()));
                verse.tokens.last_mut().unwrap()
            }
        };

        let Some(cell) = row.morphology.as_deref() else { continue };
        let segment_number = token.segments.len() as u32 + 1;
        let segment = read_segment(cell, segment_number, &token.segments, interner)?;
        token.segments.push(segment);
    }

    Ok(chapters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_stem_with_features() {
        let mut interner = LemmaInterner::new();
        let seg = read_segment("POS:N LEM:kitAb ROOT:ktb M NOM", 1, &[], &mut interner).unwrap();
        assert_eq!(seg.part_of_speech, PartOfSpeech::Noun);
        assert_eq!(seg.lemma.as_deref(), Some("kitAb"));
        assert_eq!(seg.features.gender, Some(GenderType::Masculine));
        assert_eq!(seg.features.case, Some(CaseType::Nominative));
    }

    #[test]
    fn decodes_pronoun_suffix_requires_stem() {
        let mut interner = LemmaInterner::new();
        let err = read_segment("PRON:3MS", 2, &[], &mut interner);
        assert!(err.is_err());

        let stem = read_segment("POS:V MOOD:IND ACT 3 M S", 1, &[], &mut interner).unwrap();
        let seg = read_segment("PRON:3MS", 2, &[stem], &mut interner).unwrap();
        assert_eq!(seg.features.person, Some(PersonType::Third));
        assert_eq!(seg.features.gender, Some(GenderType::Masculine));
        assert_eq!(seg.features.number, Some(NumberType::Singular));
    }

    #[test]
    fn la_prefix_becomes_suffix_after_stem() {
        let mut interner = LemmaInterner::new();
        let stem = read_segment("POS:N LEM:bayt M NOM", 1, &[], &mut interner).unwrap();
        let as_prefix = read_segment("l:P+", 1, &[], &mut interner).unwrap();
        let as_suffix = read_segment("l:P+", 2, &[stem], &mut interner).unwrap();
        assert_eq!(as_prefix.segment_type, SegmentType::Prefix);
        assert_eq!(as_suffix.segment_type, SegmentType::Suffix);
    }

    #[test]
    fn empty_cell_inherits_from_stem() {
        let mut interner = LemmaInterner::new();
        let stem = read_segment("POS:V MOOD:JUS ACT 3 F S", 1, &[], &mut interner).unwrap();
        let implicit = read_segment("", 2, &[stem], &mut interner).unwrap();
        assert_eq!(implicit.features.person, Some(PersonType::Third));
        assert_eq!(implicit.features.gender, Some(GenderType::Feminine));
        assert_eq!(implicit.features.pronoun_type, Some(PronounType::Subject));
    }

    #[test]
    fn unknown_affix_fails() {
        let mut interner = LemmaInterner::new();
        assert!(read_segment("zzz+", 1, &[], &mut interner).is_err());
    }

    #[test]
    fn ingest_groups_rows_into_tokens() {
        let mut interner = LemmaInterner::new();
        let rows = vec![
            MorphologyRow { location: Location::new(1, 1, 0), arabic: None, morphology: None },
            MorphologyRow {
                location: Location::new(1, 1, 1),
                arabic: Some("بِسْمِ".into()),
                morphology: Some("bi+".into()),
            },
            MorphologyRow {
                location: Location::new(1, 1, 1),
                arabic: Some("بِسْمِ".into()),
                morphology: Some("POS:N LEM:{som GEN".into()),
            },
        ];
        let chapters = ingest(&rows, &mut interner).unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].verses.len(), 1);
        assert_eq!(chapters[0].verses[0].tokens.len(), 1);
        assert_eq!(chapters[0].verses[0].tokens[0].segments.len(), 2);
    }
}
