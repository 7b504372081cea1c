//! Domain types shared by the client, formatter, history and orchestrator.

use serde::{Deserialize, Serialize};

/// Output style requested from the compaction API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactionMode {
    #[default]
    Summary,
    Bullets,
    Flashcards,
    /// Explained so a child can follow.
    Kids,
    /// Five-sentence summary.
    Short,
    /// Exam-style questions.
    Exam,
    Quiz,
    Cheatsheet,
}

/// The structural shape of a result, which decides decoding and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Text,
    List,
    Cards,
}

impl CompactionMode {
    pub const ALL: [CompactionMode; 8] = [
        CompactionMode::Summary,
        CompactionMode::Bullets,
        CompactionMode::Flashcards,
        CompactionMode::Kids,
        CompactionMode::Short,
        CompactionMode::Exam,
        CompactionMode::Quiz,
        CompactionMode::Cheatsheet,
    ];

    pub fn shape(self) -> ResultShape {
        match self {
            CompactionMode::Summary
            | CompactionMode::Kids
            | CompactionMode::Short
            | CompactionMode::Cheatsheet => ResultShape::Text,
            CompactionMode::Bullets | CompactionMode::Exam => ResultShape::List,
            CompactionMode::Flashcards | CompactionMode::Quiz => ResultShape::Cards,
        }
    }

    /// Wire name sent to the API.
    pub fn as_str(self) -> &'static str {
        match self {
            CompactionMode::Summary => "summary",
            CompactionMode::Bullets => "bullets",
            CompactionMode::Flashcards => "flashcards",
            CompactionMode::Kids => "kids",
            CompactionMode::Short => "short",
            CompactionMode::Exam => "exam",
            CompactionMode::Quiz => "quiz",
            CompactionMode::Cheatsheet => "cheatsheet",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompactionMode::Summary => "Summary",
            CompactionMode::Bullets => "Bullet points",
            CompactionMode::Flashcards => "Flashcards",
            CompactionMode::Kids => "Explained for kids",
            CompactionMode::Short => "In 5 sentences",
            CompactionMode::Exam => "Exam questions",
            CompactionMode::Quiz => "Quiz",
            CompactionMode::Cheatsheet => "Cheat sheet",
        }
    }
}

impl std::fmt::Display for CompactionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CompactionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CompactionMode::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid mode '{}'. Valid values: summary, bullets, flashcards, kids, short, exam, quiz, cheatsheet",
                    s
                )
            })
    }
}

/// Output language tag sent to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    De,
    En,
    Es,
    Fr,
    Tr,
    Ar,
    Ja,
    Zh,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 8] = [
        LanguageCode::De,
        LanguageCode::En,
        LanguageCode::Es,
        LanguageCode::Fr,
        LanguageCode::Tr,
        LanguageCode::Ar,
        LanguageCode::Ja,
        LanguageCode::Zh,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LanguageCode::De => "de",
            LanguageCode::En => "en",
            LanguageCode::Es => "es",
            LanguageCode::Fr => "fr",
            LanguageCode::Tr => "tr",
            LanguageCode::Ar => "ar",
            LanguageCode::Ja => "ja",
            LanguageCode::Zh => "zh",
        }
    }

    /// Native name of the language.
    pub fn label(self) -> &'static str {
        match self {
            LanguageCode::De => "Deutsch",
            LanguageCode::En => "English",
            LanguageCode::Es => "Español",
            LanguageCode::Fr => "Français",
            LanguageCode::Tr => "Türkçe",
            LanguageCode::Ar => "العربية",
            LanguageCode::Ja => "日本語",
            LanguageCode::Zh => "中文",
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LanguageCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        LanguageCode::ALL
            .into_iter()
            .find(|l| l.as_str() == wanted)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid language '{}'. Valid values: de, en, es, fr, tr, ar, ja, zh",
                    s
                )
            })
    }
}

/// How much detail flashcard answers should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Compact,
    #[default]
    Normal,
    Verbose,
}

impl std::fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetailLevel::Compact => write!(f, "compact"),
            DetailLevel::Normal => write!(f, "normal"),
            DetailLevel::Verbose => write!(f, "verbose"),
        }
    }
}

impl std::str::FromStr for DetailLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(DetailLevel::Compact),
            "normal" => Ok(DetailLevel::Normal),
            "verbose" => Ok(DetailLevel::Verbose),
            _ => anyhow::bail!(
                "Invalid detail level '{}'. Valid values: compact, normal, verbose",
                s
            ),
        }
    }
}

pub const MIN_FLASHCARDS: u32 = 3;
pub const MAX_FLASHCARDS: u32 = 50;
pub const DEFAULT_MAX_FLASHCARDS: u32 = 10;

/// Clamp a requested card count into the range the API accepts.
pub fn clamp_flashcards(requested: u32) -> u32 {
    requested.clamp(MIN_FLASHCARDS, MAX_FLASHCARDS)
}

/// Extra knobs sent alongside a text compaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_flashcards: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_level: Option<DetailLevel>,
}

impl CompactOptions {
    /// Options for a request in `mode`. Only card modes carry settings.
    pub fn for_mode(mode: CompactionMode, max_flashcards: u32, detail_level: DetailLevel) -> Self {
        if mode.shape() == ResultShape::Cards {
            Self {
                max_flashcards: Some(clamp_flashcards(max_flashcards)),
                detail_level: Some(detail_level),
            }
        } else {
            Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub answer: String,
}

/// Missing and `null` fields both read as the empty string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A compaction result, shaped by the mode it was requested in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CompactionResult {
    Text { text: String },
    Bullets { items: Vec<String> },
    Cards { cards: Vec<Flashcard> },
}

impl CompactionResult {
    /// The empty result for a mode.
    pub fn empty(mode: CompactionMode) -> Self {
        match mode.shape() {
            ResultShape::Text => CompactionResult::Text {
                text: String::new(),
            },
            ResultShape::List => CompactionResult::Bullets { items: Vec::new() },
            ResultShape::Cards => CompactionResult::Cards { cards: Vec::new() },
        }
    }

    pub fn shape(&self) -> ResultShape {
        match self {
            CompactionResult::Text { .. } => ResultShape::Text,
            CompactionResult::Bullets { .. } => ResultShape::List,
            CompactionResult::Cards { .. } => ResultShape::Cards,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CompactionResult::Text { text } => text.trim().is_empty(),
            CompactionResult::Bullets { items } => items.is_empty(),
            CompactionResult::Cards { cards } => cards.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_str() {
        for mode in CompactionMode::ALL {
            assert_eq!(mode.as_str().parse::<CompactionMode>().unwrap(), mode);
        }
        assert!("poetry".parse::<CompactionMode>().is_err());
    }

    #[test]
    fn test_mode_shapes() {
        assert_eq!(CompactionMode::Summary.shape(), ResultShape::Text);
        assert_eq!(CompactionMode::Short.shape(), ResultShape::Text);
        assert_eq!(CompactionMode::Bullets.shape(), ResultShape::List);
        assert_eq!(CompactionMode::Flashcards.shape(), ResultShape::Cards);
        assert_eq!(CompactionMode::Quiz.shape(), ResultShape::Cards);
    }

    #[test]
    fn test_language_parse_is_case_insensitive() {
        assert_eq!("EN".parse::<LanguageCode>().unwrap(), LanguageCode::En);
        assert_eq!(LanguageCode::default(), LanguageCode::De);
        assert!("xx".parse::<LanguageCode>().is_err());
    }

    #[test]
    fn test_clamp_flashcards() {
        assert_eq!(clamp_flashcards(0), 3);
        assert_eq!(clamp_flashcards(10), 10);
        assert_eq!(clamp_flashcards(500), 50);
    }

    #[test]
    fn test_options_only_for_card_modes() {
        let opts = CompactOptions::for_mode(CompactionMode::Bullets, 20, DetailLevel::Verbose);
        assert_eq!(opts, CompactOptions::default());
        assert_eq!(serde_json::to_string(&opts).unwrap(), "{}");

        let opts = CompactOptions::for_mode(CompactionMode::Flashcards, 99, DetailLevel::Compact);
        assert_eq!(opts.max_flashcards, Some(50));
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["maxFlashcards"], 50);
        assert_eq!(json["detailLevel"], "compact");
    }

    #[test]
    fn test_empty_result_matches_mode_shape() {
        for mode in CompactionMode::ALL {
            let empty = CompactionResult::empty(mode);
            assert_eq!(empty.shape(), mode.shape());
            assert!(empty.is_empty());
        }
    }
}
