//! Language, character set and encoding metadata used by content negotiation.

use std::fmt::{Display, Formatter};

/// A language tag such as "en" or "en-US". Stored lowercased.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Language(String);

impl Language {
  /// Creates a language tag, normalizing to lowercase.
  pub fn new(tag: impl AsRef<str>) -> Language {
    Language(tag.as_ref().to_ascii_lowercase())
  }

  /// The normalized tag.
  pub fn as_str(&self) -> &str {
    self.0.as_str()
  }

  /// The primary subtag, "en" for "en-us".
  pub fn primary_subtag(&self) -> &str {
    self.0.split('-').next().unwrap_or(self.0.as_str())
  }
}

impl Display for Language {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.0.as_str())
  }
}

/// One entry of a client Accept-Language list.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum LanguageRange {
  /// `*`
  Any,
  /// A concrete tag. The range "en" also covers "en-us", with lower strength.
  Tag(Language),
}

impl LanguageRange {
  /// Parses "*" or a language tag.
  pub fn parse(value: impl AsRef<str>) -> Option<Self> {
    let value = value.as_ref();
    if value == "*" {
      return Some(LanguageRange::Any);
    }
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
      return None;
    }
    Some(LanguageRange::Tag(Language::new(value)))
  }

  /// Match strength against a concrete language, None if no match.
  pub fn specificity(&self, language: &Language) -> Option<f32> {
    match self {
      LanguageRange::Any => Some(0.25),
      LanguageRange::Tag(tag) => {
        if tag == language {
          return Some(1.0);
        }
        // "en" covers "en-us" as a parent range.
        if tag.as_str() == language.primary_subtag() {
          return Some(0.5);
        }
        None
      }
    }
  }
}

impl Display for LanguageRange {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      LanguageRange::Any => f.write_str("*"),
      LanguageRange::Tag(tag) => Display::fmt(tag, f),
    }
  }
}

/// A character set such as "utf-8". Stored lowercased.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct CharacterSet(String);

impl CharacterSet {
  /// Creates a character set name, normalizing to lowercase.
  pub fn new(name: impl AsRef<str>) -> CharacterSet {
    CharacterSet(name.as_ref().to_ascii_lowercase())
  }

  /// The normalized name.
  pub fn as_str(&self) -> &str {
    self.0.as_str()
  }
}

impl Display for CharacterSet {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.0.as_str())
  }
}

/// One entry of a client Accept-Charset list.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum CharsetRange {
  /// `*`
  Any,
  /// A concrete character set.
  Value(CharacterSet),
}

impl CharsetRange {
  /// Parses "*" or a charset name.
  pub fn parse(value: impl AsRef<str>) -> Option<Self> {
    let value = value.as_ref();
    if value == "*" {
      return Some(CharsetRange::Any);
    }
    if value.is_empty() {
      return None;
    }
    Some(CharsetRange::Value(CharacterSet::new(value)))
  }

  /// Match strength against a concrete character set, None if no match.
  pub fn specificity(&self, charset: &CharacterSet) -> Option<f32> {
    match self {
      CharsetRange::Any => Some(0.25),
      CharsetRange::Value(value) => {
        if value == charset {
          Some(1.0)
        } else {
          None
        }
      }
    }
  }
}

/// A content coding such as "gzip" or "identity". Stored lowercased.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Encoding(String);

impl Encoding {
  /// Creates a content coding name, normalizing to lowercase.
  pub fn new(name: impl AsRef<str>) -> Encoding {
    Encoding(name.as_ref().to_ascii_lowercase())
  }

  /// The "identity" coding, the absence of any transformation.
  pub fn identity() -> Encoding {
    Encoding::new("identity")
  }

  /// The normalized name.
  pub fn as_str(&self) -> &str {
    self.0.as_str()
  }
}

impl Display for Encoding {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.0.as_str())
  }
}

/// One entry of a client Accept-Encoding list.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum EncodingRange {
  /// `*`
  Any,
  /// A concrete content coding.
  Value(Encoding),
}

impl EncodingRange {
  /// Parses "*" or a coding name.
  pub fn parse(value: impl AsRef<str>) -> Option<Self> {
    let value = value.as_ref();
    if value == "*" {
      return Some(EncodingRange::Any);
    }
    if value.is_empty() {
      return None;
    }
    Some(EncodingRange::Value(Encoding::new(value)))
  }

  /// Match strength against a concrete coding, None if no match.
  pub fn specificity(&self, encoding: &Encoding) -> Option<f32> {
    match self {
      EncodingRange::Any => Some(0.25),
      EncodingRange::Value(value) => {
        if value == encoding {
          Some(1.0)
        } else {
          None
        }
      }
    }
  }
}
