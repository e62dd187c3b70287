//! Path template compilation and matching.
//!
//! # Responsibilities
//! - Classify templates as static or dynamic
//! - Compile `_name_` segments into named captures of non-slash runs
//! - Extract path parameters from a concrete path
//!
//! # Design Decisions
//! - Literal segments are regex-escaped, so only `_name_` segments match
//!   variable text
//! - Anchored patterns: a template matches the whole path or nothing

use indexmap::IndexMap;
use regex::Regex;

use crate::routing::router::RouteTableError;

/// Name of the parameter a segment declares, if it is `_name_`.
pub fn segment_param(segment: &str) -> Option<&str> {
    if segment.len() > 2 && segment.starts_with('_') && segment.ends_with('_') {
        Some(&segment[1..segment.len() - 1])
    } else {
        None
    }
}

pub fn is_dynamic(template: &str) -> bool {
    template.split('/').any(|segment| segment_param(segment).is_some())
}

fn is_valid_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A compiled dynamic template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    regex: Regex,
    params: Vec<String>,
}

impl PathPattern {
    pub fn compile(template: &str) -> Result<Self, RouteTableError> {
        let mut pattern = String::from("^");
        let mut params = Vec::new();

        for (i, segment) in template.split('/').enumerate() {
            if i > 0 {
                pattern.push('/');
            }
            match segment_param(segment) {
                Some(name) => {
                    if !is_valid_param_name(name) {
                        return Err(RouteTableError::InvalidParamName {
                            path: template.to_string(),
                            segment: segment.to_string(),
                        });
                    }
                    if params.iter().any(|p| p == name) {
                        return Err(RouteTableError::DuplicateParam {
                            path: template.to_string(),
                            name: name.to_string(),
                        });
                    }
                    pattern.push_str(&format!("(?P<{}>[^/]+)", name));
                    params.push(name.to_string());
                }
                None => pattern.push_str(&regex::escape(segment)),
            }
        }
        pattern.push('$');

        Ok(Self {
            template: template.to_string(),
            regex: Regex::new(&pattern)?,
            params,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    /// Parameters extracted from `path`, or `None` when it does not match.
    pub fn captures(&self, path: &str) -> Option<IndexMap<String, String>> {
        let captures = self.regex.captures(path)?;
        Some(
            self.params
                .iter()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }
}
