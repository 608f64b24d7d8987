//! Provides functionality for handling MIME types and quality factors.

use std::fmt::{Display, Formatter};

/// QValue is defined as a fixed point number with up to 3 digits
/// after comma. with a valid range from 0 to 1.
/// We represent this as an u16 from 0 to 1000.
#[derive(Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Debug, Hash)]
#[repr(transparent)]
pub struct QValue(u16);

impl QValue {
  /// The highest possible quality, q=1.
  pub const MAX: QValue = QValue(1000);

  /// q=0, an explicit "not acceptable".
  pub const ZERO: QValue = QValue(0);

  /// Parses the QValue in http header representation.
  /// Note: this is without the "q=" prefix!
  /// Returns none if the value is either out of bounds or otherwise invalid.
  pub fn parse(qvalue: impl AsRef<str>) -> Option<QValue> {
    let qvalue = qvalue.as_ref();
    match qvalue.len() {
      1 => match qvalue {
        "0" => Some(QValue(0)),
        "1" => Some(QValue(1000)),
        _ => None,
      },
      2 => None,
      3 => {
        if !qvalue.starts_with("0.") {
          if qvalue == "1.0" {
            return Some(QValue(1000));
          }
          return None;
        }

        qvalue.get(2..)?.parse::<u16>().ok().map(|value| QValue(value * 100))
      }
      4 => {
        if !qvalue.starts_with("0.") {
          if qvalue == "1.00" {
            return Some(QValue(1000));
          }
          return None;
        }

        qvalue.get(2..)?.parse::<u16>().ok().map(|value| QValue(value * 10))
      }
      5 => {
        if !qvalue.starts_with("0.") {
          if qvalue == "1.000" {
            return Some(QValue(1000));
          }
          return None;
        }

        qvalue.get(2..)?.parse::<u16>().ok().map(QValue)
      }
      _ => None,
    }
  }

  /// Builds a QValue from thousandths, clamping values above 1000.
  pub const fn from_clamped(value: u16) -> QValue {
    if value > 1000 {
      return QValue(1000);
    }
    QValue(value)
  }

  /// The raw value in thousandths.
  pub const fn as_u16(&self) -> u16 {
    self.0
  }

  /// The quality as a fraction in [0.0, 1.0].
  pub fn as_f32(&self) -> f32 {
    f32::from(self.0) / 1000.0
  }
}

impl Display for QValue {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.0 {
      0 => f.write_str("0.0"),
      1000 => f.write_str("1.0"),
      mut value => {
        // Trailing zeros of the fraction are not printed.
        let mut digits = 3;
        while value % 10 == 0 {
          value /= 10;
          digits -= 1;
        }
        write!(f, "0.{value:0width$}", width = digits)
      }
    }
  }
}

impl Default for QValue {
  fn default() -> Self {
    QValue(1000)
  }
}

fn check_token_byte(byte: u8) -> bool {
  byte.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&byte)
}

/// Mime types are split into groups denoted by whatever is before of the "/"
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum MimeGroup {
  /// Custom application specific things.
  Application,
  /// Any human or pseudo human readable text.
  Text,
  /// Images, anything that can be rendered onto a screen.
  Image,
  /// Audio
  Audio,
  /// Video maybe with audio maybe without.
  Video,
  /// Anything else.
  Other(String),
}

impl MimeGroup {
  /// Parses a mime group from a str.
  /// This str can be either the mime group directly such as "video"
  /// or the full mime type such as "video/mp4"
  /// or a media range such as "video/*".
  ///
  /// This fn returns none for invalid or wildcard group names.
  pub fn parse<T: AsRef<str>>(value: T) -> Option<Self> {
    let mut value = value.as_ref();
    if let Some((group, _)) = value.split_once("/") {
      value = group;
    }

    if value.is_empty() {
      return None;
    }

    for byte in value.bytes() {
      if !check_token_byte(byte) {
        return None;
      }
    }

    Some(match value {
      "application" => MimeGroup::Application,
      "text" => MimeGroup::Text,
      "image" => MimeGroup::Image,
      "audio" => MimeGroup::Audio,
      "video" => MimeGroup::Video,
      _ => MimeGroup::Other(value.to_string()),
    })
  }

  /// returns the str name of the mime group.
  /// This name can be fed back into parse to get the equivalent enum of self.
  pub fn as_str(&self) -> &str {
    match self {
      MimeGroup::Application => "application",
      MimeGroup::Text => "text",
      MimeGroup::Image => "image",
      MimeGroup::Audio => "audio",
      MimeGroup::Video => "video",
      MimeGroup::Other(o) => o.as_str(),
    }
  }
}

impl Display for MimeGroup {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Represents a concrete MIME type, without wildcards.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum MimeType {
  /// text/html
  TextHtml,
  /// text/plain
  TextPlain,
  /// text/css
  TextCss,
  /// text/xml
  TextXml,
  /// application/json
  ApplicationJson,
  /// application/xml
  ApplicationXml,
  /// application/octet-stream
  ApplicationOctetStream,
  /// image/png
  ImagePng,
  /// image/jpeg
  ImageJpeg,
  /// image/svg+xml
  ImageSvg,
  /// Anything else, stored as "group/subtype".
  Other(MimeGroup, String),
}

impl MimeType {
  /// Parses a concrete mime type such as "text/html".
  /// Returns none for malformed input or any form of wildcard.
  pub fn parse<T: AsRef<str>>(value: T) -> Option<Self> {
    let value = value.as_ref();
    let (group, subtype) = value.split_once("/")?;
    if subtype.is_empty() || subtype.contains("*") || group.contains("*") {
      return None;
    }

    for byte in subtype.bytes() {
      if !check_token_byte(byte) {
        return None;
      }
    }

    Some(match value {
      "text/html" => MimeType::TextHtml,
      "text/plain" => MimeType::TextPlain,
      "text/css" => MimeType::TextCss,
      "text/xml" => MimeType::TextXml,
      "application/json" => MimeType::ApplicationJson,
      "application/xml" => MimeType::ApplicationXml,
      "application/octet-stream" => MimeType::ApplicationOctetStream,
      "image/png" => MimeType::ImagePng,
      "image/jpeg" => MimeType::ImageJpeg,
      "image/svg+xml" => MimeType::ImageSvg,
      _ => MimeType::Other(MimeGroup::parse(group)?, subtype.to_string()),
    })
  }

  /// The group this mime type belongs to.
  pub fn mime_group(&self) -> MimeGroup {
    match self {
      MimeType::TextHtml | MimeType::TextPlain | MimeType::TextCss | MimeType::TextXml => {
        MimeGroup::Text
      }
      MimeType::ApplicationJson
      | MimeType::ApplicationXml
      | MimeType::ApplicationOctetStream => MimeGroup::Application,
      MimeType::ImagePng | MimeType::ImageJpeg | MimeType::ImageSvg => MimeGroup::Image,
      MimeType::Other(group, _) => group.clone(),
    }
  }

  /// returns the full "group/subtype" name of this mime type.
  pub fn as_str(&self) -> String {
    match self {
      MimeType::TextHtml => "text/html".to_string(),
      MimeType::TextPlain => "text/plain".to_string(),
      MimeType::TextCss => "text/css".to_string(),
      MimeType::TextXml => "text/xml".to_string(),
      MimeType::ApplicationJson => "application/json".to_string(),
      MimeType::ApplicationXml => "application/xml".to_string(),
      MimeType::ApplicationOctetStream => "application/octet-stream".to_string(),
      MimeType::ImagePng => "image/png".to_string(),
      MimeType::ImageJpeg => "image/jpeg".to_string(),
      MimeType::ImageSvg => "image/svg+xml".to_string(),
      MimeType::Other(group, subtype) => format!("{}/{}", group.as_str(), subtype),
    }
  }
}

impl Display for MimeType {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str().as_str())
  }
}

/// One entry of a client Accept list. Either the full wildcard `*/*`,
/// a group wildcard such as `text/*` or a concrete type.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum MediaRange {
  /// `*/*`
  Any,
  /// `group/*`
  Group(MimeGroup),
  /// A concrete type such as `text/html`.
  Specific(MimeType),
}

impl MediaRange {
  /// Parses a media range such as "*/*", "text/*" or "text/html".
  pub fn parse<T: AsRef<str>>(value: T) -> Option<Self> {
    let value = value.as_ref();
    if value == "*/*" {
      return Some(MediaRange::Any);
    }

    if let Some(group) = value.strip_suffix("/*") {
      return Some(MediaRange::Group(MimeGroup::parse(group)?));
    }

    Some(MediaRange::Specific(MimeType::parse(value)?))
  }

  /// Match strength of this range against a concrete type.
  /// Exact matches score highest, wildcards score lower proportional to
  /// their specificity. None means no match at all.
  pub fn specificity(&self, mime: &MimeType) -> Option<f32> {
    match self {
      MediaRange::Any => Some(0.25),
      MediaRange::Group(group) => {
        if group == &mime.mime_group() {
          Some(0.5)
        } else {
          None
        }
      }
      MediaRange::Specific(specific) => {
        if specific == mime {
          Some(1.0)
        } else {
          None
        }
      }
    }
  }
}

impl Display for MediaRange {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      MediaRange::Any => f.write_str("*/*"),
      MediaRange::Group(group) => write!(f, "{}/*", group.as_str()),
      MediaRange::Specific(mime) => Display::fmt(mime, f),
    }
  }
}

impl From<MimeType> for MediaRange {
  fn from(value: MimeType) -> Self {
    MediaRange::Specific(value)
  }
}

impl From<MimeGroup> for MediaRange {
  fn from(value: MimeGroup) -> Self {
    MediaRange::Group(value)
  }
}
