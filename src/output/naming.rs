//! Output file naming
//!
//! Templates use `{name}`, `{num}` and `{ext}` (with `{stem}` and `{index}`
//! as aliases). `{num:03}` zero-pads the part number. `{{` and `}}` are
//! literal braces. A template must number its parts. Any template error
//! falls back to the default pattern instead of failing the batch.

use std::fmt;

use tracing::debug;

use crate::engine::clipper::VIDEO_EXTENSION;

/// Pattern used when no template is given or the template is invalid
pub const DEFAULT_PATTERN: &str = "{name}_part{num}.mp4";

/// Why a template could not be expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    /// `{key}` names nothing the resolver knows
    UnknownPlaceholder(String),
    /// `{` without a closing `}`
    Unterminated,
    /// `}` without an opening `{`
    UnmatchedClose,
    /// The expansion would escape the output directory
    PathSeparator,
    /// Nothing left after expansion
    Empty,
    /// No `{num}` field, so every part would get the same name
    MissingIndex,
}

impl fmt::Display for NamingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPlaceholder(key) => write!(f, "'{}'", key),
            Self::Unterminated => f.write_str("unterminated '{'"),
            Self::UnmatchedClose => f.write_str("single '}' encountered"),
            Self::PathSeparator => f.write_str("path separator in file name"),
            Self::Empty => f.write_str("empty file name"),
            Self::MissingIndex => f.write_str("'num' missing, parts would overwrite each other"),
        }
    }
}

/// Result of resolving one file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingOutcome {
    /// The template expanded cleanly
    Resolved(String),
    /// The template failed; the default pattern was used
    Fallback { filename: String, error: NamingError },
}

impl NamingOutcome {
    pub fn filename(&self) -> &str {
        match self {
            Self::Resolved(name) => name,
            Self::Fallback { filename, .. } => filename,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Warning line for a fallback, if any
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Resolved(_) => None,
            Self::Fallback { error, .. } => Some(format!(
                "Warning: Invalid naming pattern variable {}. Using default.",
                error
            )),
        }
    }
}

/// Expands naming templates into concrete file names
#[derive(Debug, Clone, Default)]
pub struct NamingResolver {
    template: Option<String>,
}

impl NamingResolver {
    /// Blank templates count as no template
    pub fn new(template: Option<String>) -> Self {
        Self {
            template: template.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Resolve the file name of part `index` of `stem.ext`
    pub fn resolve(&self, stem: &str, index: usize, ext: &str) -> NamingOutcome {
        let Some(template) = self.template.as_deref() else {
            return NamingOutcome::Resolved(default_name(stem, index));
        };

        match expand(template, stem, index, ext) {
            Ok(name) => NamingOutcome::Resolved(ensure_extension(name)),
            Err(error) => {
                debug!("Naming template '{}' rejected: {}", template, error);
                NamingOutcome::Fallback {
                    filename: default_name(stem, index),
                    error,
                }
            }
        }
    }
}

fn default_name(stem: &str, index: usize) -> String {
    format!("{}_part{}.{}", stem, index, VIDEO_EXTENSION)
}

/// Append the container extension unless the name already carries it
fn ensure_extension(name: String) -> String {
    let suffix = format!(".{}", VIDEO_EXTENSION);
    if name.to_ascii_lowercase().ends_with(&suffix) {
        name
    } else {
        name + &suffix
    }
}

fn expand(template: &str, stem: &str, index: usize, ext: &str) -> Result<String, NamingError> {
    let mut out = String::with_capacity(template.len() + stem.len());
    let mut has_index = false;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(NamingError::UnmatchedClose),
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => field.push(ch),
                        None => return Err(NamingError::Unterminated),
                    }
                }
                let (value, is_index) = substitute(&field, stem, index, ext)?;
                has_index |= is_index;
                out.push_str(&value);
            }
            other => out.push(other),
        }
    }

    if out.contains(['/', '\\']) {
        return Err(NamingError::PathSeparator);
    }
    if out.trim().is_empty() {
        return Err(NamingError::Empty);
    }
    if !has_index {
        return Err(NamingError::MissingIndex);
    }
    Ok(out)
}

/// Expand one `{field}`; the flag is set when the field was the part index
fn substitute(field: &str, stem: &str, index: usize, ext: &str) -> Result<(String, bool), NamingError> {
    let (key, spec) = match field.split_once(':') {
        Some((key, spec)) => (key, Some(spec)),
        None => (field, None),
    };
    let unknown = || NamingError::UnknownPlaceholder(field.to_string());

    match (key, spec) {
        ("name" | "stem", None) => Ok((stem.to_string(), false)),
        ("ext", None) => Ok((ext.to_string(), false)),
        ("num" | "index", None) => Ok((index.to_string(), true)),
        ("num" | "index", Some(spec)) => {
            // `{num:}`, `{num:0}` and `{num:d}` mean no padding
            let digits = spec.strip_suffix('d').unwrap_or(spec).trim_start_matches('0');
            let width: usize = if digits.is_empty() {
                0
            } else {
                digits.parse().map_err(|_| unknown())?
            };
            Ok((format!("{:0width$}", index, width = width), true))
        }
        _ => Err(unknown()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(template: &str) -> NamingResolver {
        NamingResolver::new(Some(template.to_string()))
    }

    #[test]
    fn default_pattern_without_template() {
        let outcome = NamingResolver::new(None).resolve("clip", 3, "mov");
        assert_eq!(outcome, NamingOutcome::Resolved("clip_part3.mp4".to_string()));
        assert_eq!(outcome.warning(), None);
    }

    #[test]
    fn blank_template_is_no_template() {
        assert_eq!(NamingResolver::new(Some("  ".into())).template(), None);
    }

    #[test]
    fn expands_recognized_placeholders() {
        let outcome = resolver("{name}_part{num}.{ext}").resolve("clip", 2, "mp4");
        assert_eq!(outcome.filename(), "clip_part2.mp4");
        assert!(!outcome.is_fallback());
    }

    #[test]
    fn aliases_and_padding() {
        assert_eq!(
            resolver("{stem}-{index:03}").resolve("talk", 7, "mkv").filename(),
            "talk-007.mp4"
        );
    }

    #[test]
    fn empty_or_zero_width_means_no_padding() {
        for template in ["{name}_{num:}", "{name}_{num:0}", "{name}_{num:00}", "{name}_{num:d}"] {
            let outcome = resolver(template).resolve("clip", 12, "mp4");
            assert_eq!(outcome, NamingOutcome::Resolved("clip_12.mp4".to_string()), "{}", template);
        }
        assert_eq!(resolver("{name}_{num:02d}").resolve("clip", 4, "mp4").filename(), "clip_04.mp4");
    }

    #[test]
    fn template_without_part_number_falls_back() {
        let names: Vec<NamingOutcome> = (1..=3)
            .map(|i| resolver("{name}_clip").resolve("a", i, "mp4"))
            .collect();
        assert!(names.iter().all(NamingOutcome::is_fallback));
        assert_eq!(names[0].filename(), "a_part1.mp4");
        assert_eq!(names[2].filename(), "a_part3.mp4");
        assert!(names[0].warning().unwrap().contains("'num' missing"));
    }

    #[test]
    fn appends_container_extension() {
        assert_eq!(resolver("{name}-{num}.{ext}").resolve("a", 1, "mov").filename(), "a-1.mov.mp4");
        assert_eq!(resolver("{name}-{num}.MP4").resolve("a", 1, "mov").filename(), "a-1.MP4");
    }

    #[test]
    fn literal_braces() {
        assert_eq!(resolver("{{{name}}}_{num}").resolve("a", 1, "mp4").filename(), "{a}_1.mp4");
    }

    #[test]
    fn unknown_placeholder_falls_back_with_one_warning() {
        let outcome = resolver("{bogus}").resolve("clip", 2, "mp4");
        assert!(outcome.is_fallback());
        assert_eq!(outcome.filename(), "clip_part2.mp4");
        let warning = outcome.warning().unwrap();
        assert!(warning.starts_with("Warning: Invalid naming pattern variable 'bogus'"));
    }

    #[test]
    fn malformed_templates_fall_back() {
        for template in ["{name", "name}", "{num:xx}", "../{name}", "{}"] {
            let outcome = resolver(template).resolve("clip", 1, "mp4");
            assert!(outcome.is_fallback(), "{} should fall back", template);
            assert_eq!(outcome.filename(), "clip_part1.mp4");
        }
    }
}
