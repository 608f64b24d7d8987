//! Conditional request evaluation: entity tags and precondition headers.

use crate::conneg::RepresentationInfo;
use crate::http::Method;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// An entity tag: an opaque identifier for a specific representation state.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Tag {
  name: String,
  weak: bool,
}

impl Tag {
  /// Creates a strong tag with the given opaque name.
  pub fn new(name: impl AsRef<str>) -> Tag {
    Tag { name: name.as_ref().to_string(), weak: false }
  }

  /// Creates a weak tag with the given opaque name.
  pub fn weak(name: impl AsRef<str>) -> Tag {
    Tag { name: name.as_ref().to_string(), weak: true }
  }

  /// The wildcard tag, matches any entity.
  pub fn all() -> Tag {
    Tag { name: "*".to_string(), weak: false }
  }

  /// Parses the http header representation: `*`, `"name"` or `W/"name"`.
  pub fn parse(value: impl AsRef<str>) -> Option<Tag> {
    let mut value = value.as_ref().trim();
    if value == "*" {
      return Some(Tag::all());
    }

    let mut weak = false;
    if let Some(rest) = value.strip_prefix("W/") {
      weak = true;
      value = rest;
    }

    let name = value.strip_prefix('"')?.strip_suffix('"')?;
    if name.contains('"') {
      return None;
    }

    Some(Tag { name: name.to_string(), weak })
  }

  /// The opaque name, without quotes.
  pub fn name(&self) -> &str {
    self.name.as_str()
  }

  /// true if this is a weak tag.
  pub fn is_weak(&self) -> bool {
    self.weak
  }

  /// true if this is the wildcard tag.
  pub fn is_any(&self) -> bool {
    !self.weak && self.name == "*"
  }

  /// Strong comparison: equal names and neither tag weak.
  pub fn strong_eq(&self, other: &Tag) -> bool {
    !self.weak && !other.weak && self.name == other.name
  }

  /// Weak comparison: equal names, weakness ignored.
  pub fn weak_eq(&self, other: &Tag) -> bool {
    self.name == other.name
  }
}

impl Display for Tag {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    if self.is_any() {
      return f.write_str("*");
    }
    if self.weak {
      f.write_str("W/")?;
    }
    write!(f, "\"{}\"", self.name)
  }
}

/// The outcome of evaluating the preconditions of a request.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum ConditionOutcome {
  /// All preconditions hold, continue normal processing.
  Proceed,
  /// A cache validator matched, answer 304 without a body.
  NotModified,
  /// A precondition is violated, answer 412.
  PreconditionFailed,
}

/// The precondition set of one request. Immutable once parsed.
///
/// Malformed precondition headers never reach this type, the connector
/// treats anything it cannot parse as absent.
#[derive(Clone, Debug, Default)]
pub struct Conditions {
  match_tags: Vec<Tag>,
  none_match_tags: Vec<Tag>,
  modified_since: Option<SystemTime>,
  unmodified_since: Option<SystemTime>,
}

/// Cuts a timestamp down to whole seconds since the epoch.
/// Http dates carry no sub second information, so comparisons must not
/// be influenced by it either.
fn as_http_seconds(time: SystemTime) -> u64 {
  time.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

impl Conditions {
  /// No preconditions at all.
  pub fn none() -> Conditions {
    Conditions::default()
  }

  /// Adds an If-Match tag.
  pub fn with_match(mut self, tag: Tag) -> Self {
    self.match_tags.push(tag);
    self
  }

  /// Adds an If-None-Match tag.
  pub fn with_none_match(mut self, tag: Tag) -> Self {
    self.none_match_tags.push(tag);
    self
  }

  /// Sets the If-Modified-Since date.
  pub fn with_modified_since(mut self, date: SystemTime) -> Self {
    self.modified_since = Some(date);
    self
  }

  /// Sets the If-Unmodified-Since date.
  pub fn with_unmodified_since(mut self, date: SystemTime) -> Self {
    self.unmodified_since = Some(date);
    self
  }

  /// The If-Match tags.
  pub fn match_tags(&self) -> &[Tag] {
    &self.match_tags
  }

  /// The If-None-Match tags.
  pub fn none_match_tags(&self) -> &[Tag] {
    &self.none_match_tags
  }

  /// The If-Modified-Since date.
  pub fn modified_since(&self) -> Option<SystemTime> {
    self.modified_since
  }

  /// The If-Unmodified-Since date.
  pub fn unmodified_since(&self) -> Option<SystemTime> {
    self.unmodified_since
  }

  /// true if at least one precondition is present.
  pub fn has_some(&self) -> bool {
    !self.match_tags.is_empty()
      || !self.none_match_tags.is_empty()
      || self.modified_since.is_some()
      || self.unmodified_since.is_some()
  }

  /// Evaluates the preconditions against the current state of the resource.
  ///
  /// `current` is the metadata of the representation the request would act
  /// on, or None if the resource does not exist. The rules run in a fixed
  /// order, If-Match always wins over the date validators:
  ///
  /// 1. absent resource + wildcard If-Match: PreconditionFailed
  /// 2. If-Match without a strong match on the current tag: PreconditionFailed
  /// 3. If-Unmodified-Since older than the current modification: PreconditionFailed
  /// 4. If-None-Match with a (weak) match on the current tag: NotModified for
  ///    safe methods, PreconditionFailed otherwise
  /// 5. If-Modified-Since not before the current modification: NotModified
  /// 6. Proceed
  pub fn status(&self, method: &Method, current: Option<&RepresentationInfo>) -> ConditionOutcome {
    let current_tag = current.and_then(|info| info.tag.as_ref());
    let current_modified = current.and_then(|info| info.modified);

    if !self.match_tags.is_empty() {
      if current.is_none() && self.match_tags.iter().any(Tag::is_any) {
        // A non existing resource cannot match any entity.
        return ConditionOutcome::PreconditionFailed;
      }

      let matched = self.match_tags.iter().any(|tag| {
        if tag.is_any() {
          return current.is_some();
        }
        current_tag.map(|cur| tag.strong_eq(cur)).unwrap_or(false)
      });

      if !matched {
        return ConditionOutcome::PreconditionFailed;
      }
    }

    if let (Some(unmodified_since), Some(modified)) = (self.unmodified_since, current_modified) {
      if as_http_seconds(modified) > as_http_seconds(unmodified_since) {
        return ConditionOutcome::PreconditionFailed;
      }
    }

    if !self.none_match_tags.is_empty() {
      let matched = self.none_match_tags.iter().any(|tag| {
        if tag.is_any() {
          return current.is_some();
        }
        current_tag.map(|cur| tag.weak_eq(cur)).unwrap_or(false)
      });

      if matched {
        return if method.is_safe() {
          ConditionOutcome::NotModified
        } else {
          ConditionOutcome::PreconditionFailed
        };
      }
    }

    if let (Some(modified_since), Some(modified)) = (self.modified_since, current_modified) {
      if as_http_seconds(modified) <= as_http_seconds(modified_since) {
        return ConditionOutcome::NotModified;
      }
    }

    ConditionOutcome::Proceed
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn tag_parse_roundtrip() {
    let strong = Tag::parse("\"abc123\"").unwrap();
    assert_eq!(strong, Tag::new("abc123"));
    assert_eq!(strong.to_string(), "\"abc123\"");

    let weak = Tag::parse("W/\"abc123\"").unwrap();
    assert!(weak.is_weak());
    assert_eq!(weak.to_string(), "W/\"abc123\"");

    assert!(Tag::parse("*").unwrap().is_any());
    assert!(Tag::parse("abc").is_none());
    assert!(Tag::parse("\"a\"b\"").is_none());
  }

  #[test]
  fn tag_comparison() {
    assert!(Tag::new("a").strong_eq(&Tag::new("a")));
    assert!(!Tag::new("a").strong_eq(&Tag::weak("a")));
    assert!(Tag::new("a").weak_eq(&Tag::weak("a")));
    assert!(!Tag::new("a").weak_eq(&Tag::new("b")));
  }
}
