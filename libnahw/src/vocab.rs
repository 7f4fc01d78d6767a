//! Closed tag sets for the morphology and syntax layers.
//!
//! Every set here is a small, stable, `Copy` enum with a short textual tag,
//! mirroring the corpus's string-tagged morphology and treebank formats.
//! Each enum exposes `tag()` and `from_tag()` so the morphology reader and
//! the graph text format can round-trip through the same vocabulary.

use serde::{Deserialize, Serialize};

macro_rules! tagged_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $tag:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn tag(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }

            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn value(&self) -> u32 {
                *self as u32
            }
        }
    };
}

tagged_enum! {
    /// Word class, ~45 closed values, matching the treebank's morphology tags.
    PartOfSpeech {
        Noun = "N",
        ProperNoun = "PN",
        Verb = "V",
        Adjective = "ADJ",
        Pronoun = "PRON",
        DemonstrativePronoun = "DEM",
        RelativePronoun = "REL",
        Determiner = "DET",
        Conjunction = "CONJ",
        SubordinatingConjunction = "SUB",
        Preposition = "P",
        NegativeParticle = "NEG",
        Vocative = "VOC",
        Exceptive = "EXP",
        InterrogativeParticle = "INTG",
        EmphaticParticle = "EMPH",
        ResumptionParticle = "REM",
        CircumstantialParticle = "CIRC",
        CausativeParticle = "CAUS",
        AnswerParticle = "ANS",
        AmendmentParticle = "AMD",
        SurpriseParticle = "SUR",
        ResultParticle = "RSLT",
        ExplanationParticle = "EXL",
        EqualizationParticle = "EQ",
        ExhortationParticle = "EXH",
        InceptiveParticle = "INC",
        InterpretationParticle = "INT",
        Preventive = "PREV",
        RetractionParticle = "RET",
        RestrictionParticle = "RES",
        SupplementalParticle = "SUP",
        FutureParticle = "FUT",
        Purpose = "PRP",
        ComitativeParticle = "COM",
        LocationAdverb = "LOC",
        TimeAdverb = "T",
        ConditionalParticle = "COND",
        Adverb = "ADV",
        ImperativeVerbalNoun = "IMPN",
        Interjection = "INTJ",
        ProhibitionParticle = "PRO",
        CertaintyParticle = "CERT",
        InitialLetters = "INL",
        CardinalNumber = "NUM",
        FocusParticle = "FOC",
    }
}

tagged_enum! {
    SegmentType {
        Prefix = "PREFIX",
        Stem = "STEM",
        Suffix = "SUFFIX",
    }
}

tagged_enum! {
    PersonType {
        First = "1",
        Second = "2",
        Third = "3",
    }
}

tagged_enum! {
    GenderType {
        Masculine = "M",
        Feminine = "F",
    }
}

tagged_enum! {
    NumberType {
        Singular = "S",
        Dual = "D",
        Plural = "P",
    }
}

tagged_enum! {
    MoodType {
        Indicative = "IND",
        Subjunctive = "SUBJ",
        Jussive = "JUS",
    }
}

tagged_enum! {
    VoiceType {
        Active = "ACT",
        Passive = "PASS",
    }
}

tagged_enum! {
    CaseType {
        Nominative = "NOM",
        Genitive = "GEN",
        Accusative = "ACC",
    }
}

tagged_enum! {
    StateType {
        Definite = "DEF",
        Indefinite = "INDEF",
    }
}

tagged_enum! {
    PronounType {
        Subject = "SUBJECT",
        Object = "OBJECT",
        SecondObject = "SECOND_OBJECT",
    }
}

tagged_enum! {
    SpecialType {
        Kaana = "KAANA",
        Kaada = "KAADA",
        Inna = "INNA",
    }
}

tagged_enum! {
    WordType {
        Token = "TOKEN",
        Reference = "REFERENCE",
        Elided = "ELIDED",
    }
}

tagged_enum! {
    /// The six phrase tags the phrase-type classifier can emit.
    PhraseType {
        Sentence = "S",
        NominalSentence = "NS",
        VerbalSentence = "VS",
        ConditionalSentence = "CS",
        PrepositionPhrase = "PP",
        SubordinateClause = "SC",
    }
}

tagged_enum! {
    /// Dependency relation types, ~44 closed values.
    Relation {
        Subject = "SBJ",
        PassiveSubject = "PSBJ",
        Object = "OBJ",
        SecondObject = "OBJ2",
        Predicate = "PRD",
        SpecialSubject = "SSBJ",
        SpecialPredicate = "SPRD",
        Genitive = "GEN",
        Condition = "COND",
        Result = "RSLT",
        Adjective = "ADJ",
        Possessive = "POSS",
        Circumstantial = "CIRC",
        Specification = "SPEC",
        State = "STATE",
        Cause = "CAUS",
        Manner = "MANN",
        Tamyeez = "TMYZ",
        Hal = "HAL",
        Idafa = "IDF",
        Emphasis = "EMPH",
        Surrogate = "SURR",
        Vocative = "VOC",
        Excepted = "EXC",
        Resumption = "REM",
        Complement = "CMPL",
        Prohibition = "PRH",
        Answer = "ANS",
        Amendment = "AMD",
        Surprise = "SUR",
        Explanation = "EXL",
        Equalization = "EQ",
        Exhortation = "EXH",
        Inceptive = "INC",
        Interpretation = "INT",
        Preventive = "PREV",
        Retraction = "RET",
        Restriction = "RES",
        Supplemental = "SUP",
        Conjoined = "CONJ",
        Subordinate = "SUB",
        PurposeClause = "PRPC",
        Oath = "OATH",
        Topic = "TOP",
    }
}

/// (chapter, verse, token); `token == 0` means the location refers to a verse as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub chapter: u32,
    pub verse: u32,
    pub token: u32,
}

impl Location {
    pub fn new(chapter: u32, verse: u32, token: u32) -> Self {
        Location { chapter, verse, token }
    }

    pub fn is_verse_level(&self) -> bool {
        self.token == 0
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.chapter, self.verse, self.token)
    }
}

pub const POS_COUNT: usize = PartOfSpeech::ALL.len();
pub const RELATION_COUNT: usize = Relation::ALL.len();
pub const PHRASE_TYPE_COUNT: usize = PhraseType::ALL.len();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pos_has_forty_five_values() {
        assert_eq!(POS_COUNT, 45);
    }

    #[test]
    fn relation_has_forty_four_values() {
        assert_eq!(RELATION_COUNT, 44);
    }

    #[test]
    fn tag_round_trips() {
        for pos in PartOfSpeech::ALL {
            assert_eq!(PartOfSpeech::from_tag(pos.tag()), Some(*pos));
        }
        for rel in Relation::ALL {
            assert_eq!(Relation::from_tag(rel.tag()), Some(*rel));
        }
    }

    #[test]
    fn location_display() {
        let loc = Location::new(2, 255, 7);
        assert_eq!(loc.to_string(), "2:255:7");
        assert!(!loc.is_verse_level());
    }
}
