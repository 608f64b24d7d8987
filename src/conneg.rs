//! Content negotiation: client preferences, variants and the selection engine.
//!
//! Every dimension (media type, language, character set, encoding) is scored
//! independently, the per dimension scores are multiplied and the best
//! scoring variant wins. Variant declaration order breaks ties, the first
//! declared variant wins.

use crate::conditions::Tag;
use crate::http::{
  CharacterSet, CharsetRange, Encoding, EncodingRange, Language, LanguageRange, MediaRange,
  MimeType, QValue,
};
use std::time::SystemTime;

/// A client declared value with an associated quality factor.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Preference<T> {
  /// The accepted value, possibly a wildcard range.
  pub value: T,
  /// How much the client wants it.
  pub quality: QValue,
}

impl<T> Preference<T> {
  /// Creates a preference with the given quality.
  pub fn new(value: T, quality: QValue) -> Preference<T> {
    Preference { value, quality }
  }

  /// Creates a preference with quality 1.0.
  pub fn max(value: T) -> Preference<T> {
    Preference { value, quality: QValue::MAX }
  }
}

/// The ability of a range type to match a concrete value with a
/// specificity score. Exact matches score 1.0, wildcards less.
pub trait AcceptRange {
  /// The concrete value type this range matches against.
  type Value;

  /// Match strength in (0.0, 1.0], or None if the range does not cover the value.
  fn specificity(&self, value: &Self::Value) -> Option<f32>;
}

impl AcceptRange for MediaRange {
  type Value = MimeType;
  fn specificity(&self, value: &MimeType) -> Option<f32> {
    MediaRange::specificity(self, value)
  }
}

impl AcceptRange for LanguageRange {
  type Value = Language;
  fn specificity(&self, value: &Language) -> Option<f32> {
    LanguageRange::specificity(self, value)
  }
}

impl AcceptRange for CharsetRange {
  type Value = CharacterSet;
  fn specificity(&self, value: &CharacterSet) -> Option<f32> {
    CharsetRange::specificity(self, value)
  }
}

impl AcceptRange for EncodingRange {
  type Value = Encoding;
  fn specificity(&self, value: &Encoding) -> Option<f32> {
    EncodingRange::specificity(self, value)
  }
}

/// Score floor for a value that matches no preference in a non strict
/// dimension. Keeps the variant in the running but behind anything the
/// client actually asked for.
const UNMATCHED_FLOOR: f32 = 0.005;

/// Scores one concrete value against one dimension of client preferences.
///
/// No preferences at all means the dimension is "don't care" and scores 1.0.
/// Otherwise the best (specificity * quality) over all covering preferences
/// wins. A covering preference with q=0 is an explicit exclusion and yields
/// None. A value covered by no preference yields None in strict mode and a
/// small floor score otherwise.
fn score_value<R: AcceptRange>(
  value: &R::Value,
  prefs: &[Preference<R>],
  strict: bool,
) -> Option<f32> {
  if prefs.is_empty() {
    return Some(1.0);
  }

  let mut best: Option<f32> = None;
  for pref in prefs {
    if let Some(specificity) = pref.value.specificity(value) {
      let score = specificity * pref.quality.as_f32();
      match best {
        Some(current) if current >= score => {}
        _ => best = Some(score),
      }
    }
  }

  match best {
    Some(score) if score > 0.0 => Some(score),
    // Covered only by q=0 preferences, explicitly refused.
    Some(_) => None,
    None => {
      if strict {
        None
      } else {
        Some(UNMATCHED_FLOOR)
      }
    }
  }
}

/// Computes the best match of a set of server offered values against one
/// dimension of client preferences.
///
/// Returns the winning value and its combined score, or None if every value
/// is unacceptable. An empty preference list accepts everything at 1.0.
/// Ties go to the earlier server value.
pub fn best_match<'a, R: AcceptRange>(
  server_values: &'a [R::Value],
  prefs: &[Preference<R>],
) -> Option<(&'a R::Value, f32)> {
  let mut best: Option<(&'a R::Value, f32)> = None;
  for value in server_values {
    if let Some(score) = score_value(value, prefs, true) {
      match best {
        Some((_, current)) if current >= score => {}
        _ => best = Some((value, score)),
      }
    }
  }

  best
}

/// The negotiation relevant view of the client: its four weighted
/// preference lists, as parsed from the Accept* headers by the connector.
#[derive(Clone, Debug, Default)]
pub struct ClientInfo {
  media_types: Vec<Preference<MediaRange>>,
  languages: Vec<Preference<LanguageRange>>,
  charsets: Vec<Preference<CharsetRange>>,
  encodings: Vec<Preference<EncodingRange>>,
}

impl ClientInfo {
  /// A client without any declared preferences, it accepts everything.
  pub fn new() -> ClientInfo {
    ClientInfo::default()
  }

  /// Adds an accepted media range.
  pub fn accept_media(mut self, range: impl Into<MediaRange>, quality: QValue) -> Self {
    self.media_types.push(Preference::new(range.into(), quality));
    self
  }

  /// Adds an accepted language range.
  pub fn accept_language(mut self, range: LanguageRange, quality: QValue) -> Self {
    self.languages.push(Preference::new(range, quality));
    self
  }

  /// Adds an accepted character set.
  pub fn accept_charset(mut self, range: CharsetRange, quality: QValue) -> Self {
    self.charsets.push(Preference::new(range, quality));
    self
  }

  /// Adds an accepted content coding.
  pub fn accept_encoding(mut self, range: EncodingRange, quality: QValue) -> Self {
    self.encodings.push(Preference::new(range, quality));
    self
  }

  /// The accepted media ranges. Not assumed sorted.
  pub fn media_types(&self) -> &[Preference<MediaRange>] {
    &self.media_types
  }

  /// The accepted language ranges.
  pub fn languages(&self) -> &[Preference<LanguageRange>] {
    &self.languages
  }

  /// The accepted character sets.
  pub fn charsets(&self) -> &[Preference<CharsetRange>] {
    &self.charsets
  }

  /// The accepted content codings.
  pub fn encodings(&self) -> &[Preference<EncodingRange>] {
    &self.encodings
  }
}

/// A candidate representation descriptor. Describes what a handler could
/// produce without holding any body bytes, only the selected variant is
/// ever materialized into a full representation.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Variant {
  media_type: MimeType,
  language: Option<Language>,
  character_set: Option<CharacterSet>,
  encoding: Option<Encoding>,
  size: Option<u64>,
}

impl Variant {
  /// Creates a variant with the given media type and nothing else.
  pub fn new(media_type: MimeType) -> Variant {
    Variant { media_type, language: None, character_set: None, encoding: None, size: None }
  }

  /// Sets the language.
  pub fn with_language(mut self, language: Language) -> Self {
    self.language = Some(language);
    self
  }

  /// Sets the character set.
  pub fn with_character_set(mut self, charset: CharacterSet) -> Self {
    self.character_set = Some(charset);
    self
  }

  /// Sets the content coding.
  pub fn with_encoding(mut self, encoding: Encoding) -> Self {
    self.encoding = Some(encoding);
    self
  }

  /// Sets the expected size in bytes.
  pub fn with_size(mut self, size: u64) -> Self {
    self.size = Some(size);
    self
  }

  /// The media type.
  pub fn media_type(&self) -> &MimeType {
    &self.media_type
  }

  /// The language, if declared.
  pub fn language(&self) -> Option<&Language> {
    self.language.as_ref()
  }

  /// The character set, if declared.
  pub fn character_set(&self) -> Option<&CharacterSet> {
    self.character_set.as_ref()
  }

  /// The content coding, if declared.
  pub fn encoding(&self) -> Option<&Encoding> {
    self.encoding.as_ref()
  }

  /// The expected size in bytes, if known.
  pub fn size(&self) -> Option<u64> {
    self.size
  }

  /// One line "type[/lang][/charset][/enc]" description for variant listings.
  pub fn describe(&self) -> String {
    let mut line = self.media_type.as_str();
    if let Some(language) = &self.language {
      line.push(' ');
      line.push_str(language.as_str());
    }
    if let Some(charset) = &self.character_set {
      line.push(' ');
      line.push_str(charset.as_str());
    }
    if let Some(encoding) = &self.encoding {
      line.push(' ');
      line.push_str(encoding.as_str());
    }
    line
  }
}

/// Combined acceptance score of one variant for one client.
///
/// Dimensions multiply, a zero in any dimension eliminates the variant.
/// Media type is strict, an unaccepted type excludes the variant. The
/// secondary dimensions only exclude on an explicit q=0 preference, a value
/// the client never mentioned is merely penalized down to a small floor
/// score, so a page in an unmentioned language still beats answering 406.
/// A dimension the variant does not declare is neutral.
pub fn score_variant(variant: &Variant, client: &ClientInfo) -> Option<f32> {
  let mut score = score_value(variant.media_type(), client.media_types(), true)?;

  if let Some(language) = variant.language() {
    score *= score_value(language, client.languages(), false)?;
  }
  if let Some(charset) = variant.character_set() {
    score *= score_value(charset, client.charsets(), false)?;
  }
  if let Some(encoding) = variant.encoding() {
    score *= score_value(encoding, client.encodings(), false)?;
  }

  if score > 0.0 {
    Some(score)
  } else {
    None
  }
}

/// Selects the best variant for the given client, or None if no candidate
/// is acceptable. Pure and deterministic, identical inputs always select
/// the same variant. Ties are broken by declaration order, first wins.
pub fn preferred_variant<'a>(candidates: &'a [Variant], client: &ClientInfo) -> Option<&'a Variant> {
  let mut best: Option<(&'a Variant, f32)> = None;

  for candidate in candidates {
    if let Some(score) = score_variant(candidate, client) {
      match best {
        Some((_, current)) if current >= score => {}
        _ => best = Some((candidate, score)),
      }
    }
  }

  if let Some((variant, score)) = &best {
    log::debug!("negotiation selected variant '{}' with score {}", variant.describe(), score);
  }

  best.map(|(variant, _)| variant)
}

/// The metadata of a concrete representation, enough to evaluate
/// conditional requests without materializing any body.
#[derive(Clone, Debug)]
pub struct RepresentationInfo {
  /// The variant this metadata describes.
  pub variant: Variant,
  /// The entity tag, if any.
  pub tag: Option<Tag>,
  /// The last modification date, if any. Compared at second granularity.
  pub modified: Option<SystemTime>,
}

impl RepresentationInfo {
  /// Metadata for a variant without tag or date.
  pub fn new(variant: Variant) -> RepresentationInfo {
    RepresentationInfo { variant, tag: None, modified: None }
  }

  /// Sets the entity tag.
  pub fn with_tag(mut self, tag: Tag) -> Self {
    self.tag = Some(tag);
    self
  }

  /// Sets the last modification date.
  pub fn with_modified(mut self, modified: SystemTime) -> Self {
    self.modified = Some(modified);
    self
  }
}

/// A materialized representation: metadata plus body bytes.
#[derive(Clone, Debug)]
pub struct Representation {
  /// Variant and conditional metadata.
  pub info: RepresentationInfo,
  /// The body bytes.
  pub body: Vec<u8>,
}

impl Representation {
  /// Creates a representation from metadata and a body.
  pub fn new(info: RepresentationInfo, body: impl Into<Vec<u8>>) -> Representation {
    Representation { info, body: body.into() }
  }

  /// Creates a text representation of the given media type.
  pub fn from_text(media_type: MimeType, body: impl AsRef<str>) -> Representation {
    Representation {
      info: RepresentationInfo::new(Variant::new(media_type)),
      body: body.as_ref().as_bytes().to_vec(),
    }
  }

  /// The variant of this representation.
  pub fn variant(&self) -> &Variant {
    &self.info.variant
  }

  /// The body interpreted as utf-8, lossy.
  pub fn body_as_text(&self) -> String {
    String::from_utf8_lossy(&self.body).to_string()
  }
}
