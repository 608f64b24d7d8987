//! Uri template compilation and matching.
//!
//! A template is literal text interspersed with `{name}` variables, each
//! variable typed by the characters it may capture. Templates are compiled
//! once, immutable afterwards and shared read-only across concurrent
//! matches.

use crate::tern_error::{TemplateError, TernResult};
use regex::{Error, Regex};
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

/// Decides what a template variable may capture.
#[derive(Clone, Debug)]
pub enum VariableType {
  /// A uri token, stops at `/`, `;` and `,`. The default.
  Token,
  /// Free text, stops at `;`.
  Comment,
  /// A comment attribute, stops at `;` and `,`.
  CommentAttribute,
  /// Anything. Non greedy, captures up to the next literal, unless it is
  /// the final required variable of the template, then it captures the
  /// whole remainder.
  All,
  /// Constrained by a custom regex, `{name:pattern}` in the template syntax.
  Custom(Regex),
}

impl VariableType {
  /// true if the byte may be part of a capture of this type.
  /// Not meaningful for All and Custom.
  fn permits(&self, byte: u8) -> bool {
    match self {
      VariableType::Token => !matches!(byte, b'/' | b';' | b','),
      VariableType::Comment => byte != b';',
      VariableType::CommentAttribute => !matches!(byte, b';' | b','),
      VariableType::All | VariableType::Custom(_) => true,
    }
  }
}

/// One named variable of a template.
#[derive(Clone, Debug)]
pub struct Variable {
  name: String,
  var_type: VariableType,
  default_value: String,
  required: bool,
}

impl Variable {
  /// A required token variable with an empty default.
  pub fn new(name: impl AsRef<str>) -> Variable {
    Variable {
      name: name.as_ref().to_string(),
      var_type: VariableType::Token,
      default_value: String::new(),
      required: true,
    }
  }

  /// Sets the variable type.
  pub fn with_type(mut self, var_type: VariableType) -> Self {
    self.var_type = var_type;
    self
  }

  /// Sets the value substituted when the variable is unresolved or
  /// captured empty on an optional variable.
  pub fn with_default(mut self, value: impl AsRef<str>) -> Self {
    self.default_value = value.as_ref().to_string();
    self
  }

  /// Marks the variable optional, an empty capture is then permitted.
  pub fn optional(mut self) -> Self {
    self.required = false;
    self
  }

  /// The variable name.
  pub fn name(&self) -> &str {
    self.name.as_str()
  }

  /// The variable type.
  pub fn var_type(&self) -> &VariableType {
    &self.var_type
  }

  /// true if the variable must capture a non empty value.
  pub fn is_required(&self) -> bool {
    self.required
  }
}

#[derive(Clone, Debug)]
enum Segment {
  Literal(String),
  Variable(Variable),
}

/// Decides whether a template must consume the whole path or merely a prefix.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum MatchingMode {
  /// The template must match the complete path.
  Equals,
  /// The template matches any path it is a prefix of.
  StartsWith,
}

/// The result of a successful template match.
#[derive(Clone, Debug, Default)]
pub struct TemplateMatch {
  /// The extracted variables by name.
  pub variables: HashMap<String, String>,
  /// How many bytes of the (decoded) path were consumed.
  pub consumed: usize,
}

/// A compiled uri template.
#[derive(Clone, Debug)]
pub struct Template {
  pattern: String,
  segments: Vec<Segment>,
}

impl Template {
  /// Compiles a pattern string into a template.
  ///
  /// Fails on unbalanced braces, empty or duplicate variable names and
  /// invalid custom regexes. `{name}` compiles to a required token
  /// variable, `{name:regex}` to a regex constrained one.
  pub fn compile(pattern: impl AsRef<str>) -> TernResult<Template> {
    let pattern = pattern.as_ref();
    let mut segments = Vec::new();
    let mut names: HashSet<String> = HashSet::new();
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(idx) = rest.find(['{', '}']) {
      if rest[idx..].starts_with('}') {
        return TemplateError::UnbalancedBraces(pattern.to_string()).into();
      }

      literal.push_str(&rest[..idx]);
      rest = &rest[idx + 1..];

      let Some(end) = rest.find('}') else {
        return TemplateError::UnbalancedBraces(pattern.to_string()).into();
      };

      if rest[..end].contains('{') {
        return TemplateError::UnbalancedBraces(pattern.to_string()).into();
      }

      let inner = &rest[..end];
      rest = &rest[end + 1..];

      let (name, regex) = match inner.split_once(':') {
        Some((name, regex)) => (name, Some(regex)),
        None => (inner, None),
      };

      if name.is_empty() {
        return TemplateError::EmptyVariableName(pattern.to_string()).into();
      }

      if !names.insert(name.to_string()) {
        return TemplateError::DuplicateVariable(pattern.to_string(), name.to_string()).into();
      }

      let variable = match regex {
        None => Variable::new(name),
        Some(regex) => {
          // Anchored wrapper so a match can never start past the current scan position.
          let compiled = Regex::new(format!("\\A(?:{regex})").as_str()).map_err(|e| match e {
            Error::Syntax(syntax) => {
              TemplateError::RegexSyntaxError(pattern.to_string(), regex.to_string(), syntax)
            }
            Error::CompiledTooBig(limit) => {
              TemplateError::RegexTooBig(pattern.to_string(), regex.to_string(), limit)
            }
            _ => TemplateError::RegexSyntaxError(
              pattern.to_string(),
              regex.to_string(),
              e.to_string(),
            ),
          })?;
          Variable::new(name).with_type(VariableType::Custom(compiled))
        }
      };

      if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(&mut literal)));
      }
      segments.push(Segment::Variable(variable));
    }

    literal.push_str(rest);
    if !literal.is_empty() {
      segments.push(Segment::Literal(literal));
    }

    Ok(Template { pattern: pattern.to_string(), segments })
  }

  /// The pattern this template was compiled from.
  pub fn pattern(&self) -> &str {
    self.pattern.as_str()
  }

  /// The names of all variables in template order.
  pub fn variable_names(&self) -> Vec<&str> {
    self
      .segments
      .iter()
      .filter_map(|segment| match segment {
        Segment::Variable(variable) => Some(variable.name()),
        Segment::Literal(_) => None,
      })
      .collect()
  }

  /// The number of variables in the template.
  pub fn variable_count(&self) -> usize {
    self.variable_names().len()
  }

  /// The length of the literal text before the first variable.
  /// Used by best-match routing to break ties.
  pub fn literal_prefix_len(&self) -> usize {
    match self.segments.first() {
      Some(Segment::Literal(literal)) => literal.len(),
      _ => 0,
    }
  }

  /// Reconfigures the named variable. A no-op for unknown names.
  /// Only meaningful before the template is shared, at configuration time.
  pub fn with_variable(mut self, variable: Variable) -> Self {
    for segment in self.segments.iter_mut() {
      if let Segment::Variable(existing) = segment {
        if existing.name == variable.name {
          *existing = variable;
          break;
        }
      }
    }
    self
  }

  /// Matches the template against a path, anchored at the path start.
  ///
  /// The path is percent decoded before matching. Returns the extracted
  /// variables and the consumed length of the decoded path, or None if the
  /// template does not match. Matching is a single left to right scan, no
  /// backtracking across variables is attempted, two adjacent unconstrained
  /// variables are a declared limitation.
  pub fn matches(&self, path: impl AsRef<str>, mode: MatchingMode) -> Option<TemplateMatch> {
    let decoded = urlencoding::decode(path.as_ref()).ok()?;
    let path: &str = &decoded;

    let mut variables = HashMap::new();
    let mut pos = 0usize;

    for (index, segment) in self.segments.iter().enumerate() {
      match segment {
        Segment::Literal(literal) => {
          if !path[pos..].starts_with(literal.as_str()) {
            return None;
          }
          pos += literal.len();
        }
        Segment::Variable(variable) => {
          let captured = match &variable.var_type {
            VariableType::Custom(regex) => {
              let found = regex.find(&path[pos..])?;
              let value = found.as_str();
              pos += value.len();
              value.to_string()
            }
            VariableType::All => {
              let remainder = &path[pos..];
              let is_last = index + 1 == self.segments.len();
              let value = if is_last && variable.required {
                remainder
              } else if let Some(Segment::Literal(literal)) = self.segments.get(index + 1) {
                // Non greedy: stop at the first occurrence of the trailing literal.
                let stop = remainder.find(literal.as_str())?;
                &remainder[..stop]
              } else {
                ""
              };
              pos += value.len();
              value.to_string()
            }
            typed => {
              let remainder = &path[pos..];
              let stop = remainder
                .bytes()
                .position(|byte| !typed.permits(byte))
                .unwrap_or(remainder.len());
              let value = &remainder[..stop];
              pos += value.len();
              value.to_string()
            }
          };

          if captured.is_empty() {
            if variable.required {
              return None;
            }
            variables.insert(variable.name.clone(), variable.default_value.clone());
          } else {
            variables.insert(variable.name.clone(), captured);
          }
        }
      }
    }

    if mode == MatchingMode::Equals && pos != path.len() {
      return None;
    }

    Some(TemplateMatch { variables, consumed: pos })
  }

  /// Substitutes variables back into the template.
  /// Unresolved variables become their default value, which is the empty
  /// string unless configured otherwise. They are never left as literal braces.
  pub fn format(&self, variables: &HashMap<String, String>) -> String {
    let mut out = String::new();
    for segment in &self.segments {
      match segment {
        Segment::Literal(literal) => out.push_str(literal),
        Segment::Variable(variable) => match variables.get(&variable.name) {
          Some(value) => out.push_str(value),
          None => out.push_str(&variable.default_value),
        },
      }
    }
    out
  }
}

impl Display for Template {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.pattern.as_str())
  }
}
