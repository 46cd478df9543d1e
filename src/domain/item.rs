use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Kind of learning content a [`LearningItem`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
  Word,
  Sentence,
  FactCard,
}

impl ItemKind {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "word" => Some(Self::Word),
      "sentence" => Some(Self::Sentence),
      "fact_card" => Some(Self::FactCard),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Word => "word",
      Self::Sentence => "sentence",
      Self::FactCard => "fact_card",
    }
  }
}

/// Stable surrogate identity of a learning item.
pub type ItemId = String;

/// A word, sentence or fact card with its translations inlined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningItem {
  pub uid: ItemId,
  /// BCP-47-ish language code, e.g. "es"
  pub language: String,
  pub kind: ItemKind,
  pub content: String,
  /// Translations into the learner's native language(s)
  pub translations: Vec<String>,
  pub notes: Option<String>,
  /// Related items, e.g. the words an example sentence exercises
  pub links: Vec<ItemId>,
  pub priority: u8,
  /// Excluded from all practice when set
  pub do_not_practice: bool,
}

impl LearningItem {
  pub fn new(uid: impl Into<ItemId>, language: &str, kind: ItemKind, content: &str) -> Self {
    Self {
      uid: uid.into(),
      language: language.to_string(),
      kind,
      content: content.nfc().collect(),
      translations: Vec::new(),
      notes: None,
      links: Vec::new(),
      priority: 1,
      do_not_practice: false,
    }
  }

  pub fn with_translations(mut self, translations: &[&str]) -> Self {
    self.translations = translations.iter().map(|t| t.to_string()).collect();
    self
  }

  pub fn has_translation(&self) -> bool {
    !self.translations.is_empty()
  }

  /// Whitespace token count of the content (cloze eligibility)
  pub fn token_count(&self) -> usize {
    self.content.split_whitespace().count()
  }

  /// Composite key used for exercise identity derivation
  pub fn identity_key(&self) -> String {
    format!("{}:{}:{}", self.language, self.kind.as_str(), self.content)
  }
}

/// A piece of immersion content (video, article, ...) linking practice items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
  pub uid: String,
  pub title: String,
  pub language: String,
  pub vocab: Vec<ItemId>,
  pub fact_cards: Vec<ItemId>,
  /// Set once the learner has consumed the content itself
  pub finished: bool,
}

impl Resource {
  pub fn linked_items(&self) -> impl Iterator<Item = &ItemId> {
    self.vocab.iter().chain(self.fact_cards.iter())
  }
}

/// A learning goal grouping vocabulary the learner wants to acquire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
  pub uid: String,
  pub title: String,
  pub language: String,
  pub vocab: Vec<ItemId>,
  pub completed: bool,
}
