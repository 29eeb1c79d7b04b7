//! URL routes and their parameters.
//!
//! Patterns use `[name]` for a dynamic segment. Trailing slashes and a
//! trailing `index.html` are ignored, so `/posts/a`, `/posts/a/` and
//! `/posts/a/index.html` all match `/posts/[id]`.

use super::PageError;
use std::{
    collections::BTreeMap,
    path::{Component, Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    PostIndex,
    Post,
    ExpertIndex,
    Expert,
}

impl Route {
    const TABLE: &'static [(&'static str, Route)] = &[
        ("/", Route::Home),
        ("/posts", Route::PostIndex),
        ("/posts/[id]", Route::Post),
        ("/experts", Route::ExpertIndex),
        ("/experts/[id]", Route::Expert),
    ];

    pub fn pattern(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, route)| *route == self)
            .map(|(pattern, _)| *pattern)
            .unwrap_or("/")
    }

    /// Match a request path, capturing dynamic segments.
    pub fn parse(path: &str) -> Option<(Self, RouteParams)> {
        let segments = split(path)?;
        Self::TABLE.iter().find_map(|(pattern, route)| {
            let pattern: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
            if pattern.len() != segments.len() {
                return None;
            }
            let mut params = RouteParams::default();
            for (expected, actual) in pattern.iter().zip(&segments) {
                match expected.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                    Some(name) => params.insert(name, actual),
                    None if expected == actual => {}
                    None => return None,
                }
            }
            Some((*route, params))
        })
    }

    /// Canonical URL path, always with a trailing slash.
    pub fn url(self, params: &RouteParams) -> Result<String, PageError> {
        let mut url = String::from("/");
        for segment in self.pattern().split('/').filter(|s| !s.is_empty()) {
            match segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                Some(name) => url.push_str(&urlencoding::encode(params.get(name)?)),
                None => url.push_str(segment),
            }
            url.push('/');
        }
        Ok(url)
    }

    /// Where the exported page lives under `output`.
    ///
    /// Every parameter must be a single plain path segment, so the result
    /// always stays inside `output`.
    pub fn output_file(self, params: &RouteParams, output: &Path) -> Result<PathBuf, PageError> {
        let mut path = output.to_path_buf();
        for segment in self.pattern().split('/').filter(|s| !s.is_empty()) {
            match segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                Some(name) => {
                    let value = params.get(name)?;
                    if !is_segment(value) {
                        return Err(PageError::InvalidParam {
                            name,
                            value: value.to_owned(),
                        });
                    }
                    path.push(value);
                }
                None => path.push(segment),
            }
        }
        Ok(path.join("index.html"))
    }
}

/// Decoded, non-empty path segments; `None` for `..` or undecodable input.
fn split(path: &str) -> Option<Vec<String>> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = Vec::new();
    for raw in path.split('/').filter(|s| !s.is_empty()) {
        let segment = urlencoding::decode(raw).ok()?.into_owned();
        if !is_segment(&segment) {
            return None;
        }
        segments.push(segment);
    }
    if segments.last().is_some_and(|s| s == "index.html") {
        segments.pop();
    }
    Some(segments)
}

/// Exactly one normal path component: no separators, `.`, `..` or roots.
fn is_segment(value: &str) -> bool {
    !value.contains(['/', '\\'])
        && matches!(
            Path::new(value).components().collect::<Vec<_>>().as_slice(),
            [Component::Normal(_)]
        )
}

/// Request-scoped values captured from the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_owned(), value.into());
    }

    pub fn get(&self, name: &'static str) -> Result<&str, PageError> {
        self.0
            .get(name)
            .map(String::as_str)
            .ok_or(PageError::MissingParam(name))
    }
}
