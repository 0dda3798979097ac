use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Part of speech assigned when a selection matches no known token.
pub const UNKNOWN_POS: &str = "unknown";

/// A translated sentence together with its lexical candidates and the
/// vocabulary the learner has looked up so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: u32,
    pub original: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub translation: String,
    #[serde(default, rename = "vocab")]
    pub tokens: Vec<Token>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vocabulary: Vec<VocabularyEntry>,
}

impl Sentence {
    pub fn new(id: u32, original: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            id,
            original: original.into(),
            translation: translation.into(),
            tokens: Vec::new(),
            vocabulary: Vec::new(),
        }
    }

    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Entries that have been enriched by a lookup; the only ones shown to the learner.
    pub fn queried_vocabulary(&self) -> impl Iterator<Item = &VocabularyEntry> + '_ {
        self.vocabulary.iter().filter(|entry| entry.queried)
    }

    pub fn find_entry(&self, lemma: &str, part_of_speech: &str) -> Option<&VocabularyEntry> {
        let key = IdentityKey::new(lemma, part_of_speech);
        self.vocabulary.iter().find(|entry| entry.key() == key)
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Lexical candidate extracted from a sentence by the translation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "text")]
    pub surface_text: String,
    pub lemma: String,
    #[serde(rename = "pos")]
    pub part_of_speech: String,
}

impl Token {
    pub fn new(
        surface_text: impl Into<String>,
        lemma: impl Into<String>,
        part_of_speech: impl Into<String>,
    ) -> Self {
        Self {
            surface_text: surface_text.into(),
            lemma: lemma.into(),
            part_of_speech: part_of_speech.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    #[serde(rename = "text")]
    pub surface_text: String,
    pub lemma: String,
    #[serde(rename = "pos")]
    pub part_of_speech: String,
    #[serde(default)]
    pub queried: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl VocabularyEntry {
    pub fn new(
        surface_text: impl Into<String>,
        lemma: impl Into<String>,
        part_of_speech: impl Into<String>,
    ) -> Self {
        Self {
            surface_text: surface_text.into(),
            lemma: lemma.into(),
            part_of_speech: part_of_speech.into(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(&self.lemma, &self.part_of_speech)
    }

    /// Overlays `newer` onto `self`. Present detail fields win, absent ones
    /// keep their current value, and `queried` never reverts to false.
    pub fn merge_from(&mut self, newer: VocabularyEntry) {
        self.surface_text = newer.surface_text;
        self.lemma = newer.lemma;
        self.part_of_speech = newer.part_of_speech;
        self.queried |= newer.queried;
        if newer.translation.is_some() {
            self.translation = newer.translation;
        }
        if newer.definition.is_some() {
            self.definition = newer.definition;
        }
        if newer.example.is_some() {
            self.example = newer.example;
        }
        if newer.level.is_some() {
            self.level = newer.level;
        }
    }

    /// Copies the detail fields of a lookup response onto the entry.
    pub fn with_detail(mut self, detail: DetailFields) -> Self {
        self.translation = detail.translation;
        self.definition = detail.definition;
        self.example = detail.example;
        self.level = detail.level;
        self
    }

    /// Labelled detail rows that carry a non-blank value, in display order.
    pub fn detail_rows(&self) -> Vec<(&'static str, &str)> {
        DetailCategory::ALL
            .iter()
            .filter_map(|category| {
                let value = match category {
                    DetailCategory::Translation => self.translation.as_deref(),
                    DetailCategory::Definition => self.definition.as_deref(),
                    DetailCategory::Example => self.example.as_deref(),
                    DetailCategory::Level => self.level.as_deref(),
                }?;
                (!value.trim().is_empty()).then_some((category.label(), value))
            })
            .collect()
    }
}

/// Case-insensitive `(lemma, part of speech)` identity shared by the store
/// and the request builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub lemma: String,
    pub part_of_speech: String,
}

impl IdentityKey {
    pub fn new(lemma: &str, part_of_speech: &str) -> Self {
        Self {
            lemma: normalize(lemma),
            part_of_speech: normalize(part_of_speech),
        }
    }

    /// Cache-friendly `lemma|pos` form.
    pub fn cache_key(&self) -> String {
        format!("{}|{}", self.lemma, self.part_of_speech)
    }
}

/// Trims and lower-cases a piece of text for identity comparisons.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// The detail categories a lookup can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailCategory {
    Translation,
    Definition,
    Example,
    Level,
}

impl DetailCategory {
    pub const ALL: [DetailCategory; 4] = [
        DetailCategory::Translation,
        DetailCategory::Definition,
        DetailCategory::Example,
        DetailCategory::Level,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetailCategory::Translation => "translation",
            DetailCategory::Definition => "definition",
            DetailCategory::Example => "example",
            DetailCategory::Level => "level",
        }
    }

    /// Short tag used by the lookup menu checkboxes.
    pub fn menu_tag(&self) -> &'static str {
        match self {
            DetailCategory::Translation => "zh",
            DetailCategory::Definition => "en",
            DetailCategory::Example => "ex",
            DetailCategory::Level => "level",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DetailCategory::Translation => "Translation",
            DetailCategory::Definition => "Definition",
            DetailCategory::Example => "Example",
            DetailCategory::Level => "Level",
        }
    }
}

impl fmt::Display for DetailCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown detail category {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for DetailCategory {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize(value).as_str() {
            "translation" | "zh" => Ok(DetailCategory::Translation),
            "definition" | "en" => Ok(DetailCategory::Definition),
            "example" | "ex" => Ok(DetailCategory::Example),
            "level" => Ok(DetailCategory::Level),
            _ => Err(UnknownCategory(value.to_string())),
        }
    }
}

/// The set of categories the learner ticked in the lookup menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedOptions {
    selected: Vec<DetailCategory>,
}

impl RequestedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the category if absent, removes it otherwise.
    pub fn toggle(&mut self, category: DetailCategory) {
        if let Some(pos) = self.selected.iter().position(|c| *c == category) {
            self.selected.remove(pos);
        } else {
            self.selected.push(category);
        }
    }

    pub fn insert(&mut self, category: DetailCategory) {
        if !self.contains(category) {
            self.selected.push(category);
        }
    }

    pub fn contains(&self, category: DetailCategory) -> bool {
        self.selected.contains(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = DetailCategory> + '_ {
        self.selected.iter().copied()
    }

    pub fn flags(&self) -> DetailFlags {
        DetailFlags {
            translation: self.contains(DetailCategory::Translation),
            definition: self.contains(DetailCategory::Definition),
            example: self.contains(DetailCategory::Example),
            level: self.contains(DetailCategory::Level),
        }
    }
}

impl FromIterator<DetailCategory> for RequestedOptions {
    fn from_iter<I: IntoIterator<Item = DetailCategory>>(iter: I) -> Self {
        let mut options = RequestedOptions::new();
        for category in iter {
            options.insert(category);
        }
        options
    }
}

/// One boolean per canonical category, as sent on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailFlags {
    #[serde(default)]
    pub translation: bool,
    #[serde(default)]
    pub definition: bool,
    #[serde(default)]
    pub example: bool,
    #[serde(default)]
    pub level: bool,
}

impl DetailFlags {
    pub fn wants(&self, category: DetailCategory) -> bool {
        match category {
            DetailCategory::Translation => self.translation,
            DetailCategory::Definition => self.definition,
            DetailCategory::Example => self.example,
            DetailCategory::Level => self.level,
        }
    }

    pub fn any(&self) -> bool {
        DetailCategory::ALL.iter().any(|c| self.wants(*c))
    }
}

/// Detail strings returned by a vocabulary lookup. Blank strings decode as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailFields {
    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, deserialize_with = "non_blank", skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl DetailFields {
    pub fn get(&self, category: DetailCategory) -> Option<&str> {
        match category {
            DetailCategory::Translation => self.translation.as_deref(),
            DetailCategory::Definition => self.definition.as_deref(),
            DetailCategory::Example => self.example.as_deref(),
            DetailCategory::Level => self.level.as_deref(),
        }
    }

    pub fn set(&mut self, category: DetailCategory, value: Option<String>) {
        let value = value.filter(|v| !v.trim().is_empty());
        match category {
            DetailCategory::Translation => self.translation = value,
            DetailCategory::Definition => self.definition = value,
            DetailCategory::Example => self.example = value,
            DetailCategory::Level => self.level = value,
        }
    }

    /// Keeps only the categories flagged in `flags`.
    pub fn restricted_to(&self, flags: DetailFlags) -> DetailFields {
        let mut out = DetailFields::default();
        for category in DetailCategory::ALL {
            if flags.wants(category) {
                out.set(category, self.get(category).map(str::to_string));
            }
        }
        out
    }
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// Transient candidate produced by a text selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionCandidate {
    pub text: String,
    pub sentence_index: Option<usize>,
}

impl SelectionCandidate {
    pub fn new(text: impl Into<String>, sentence_index: Option<usize>) -> Self {
        Self {
            text: text.into(),
            sentence_index,
        }
    }
}
