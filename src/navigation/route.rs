use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A route entry as written in the configuration file.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct RouteConfig {
    pub path: String,
    /// Component reference for the view, may use an alias such as `@/views/X.vue`.
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Path to redirect to instead of rendering a view.
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub meta: RouteMeta,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
pub struct RouteMeta {
    #[serde(default)]
    pub requires_auth: bool,
}

/// What a route does once it is matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RouteTarget {
    View { component: String },
    Redirect { to: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// Compiled path pattern, e.g. `/records/:id`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Self {
        let segments = split_segments(raw)
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(segment.to_lowercase()),
            })
            .collect();
        PathPattern {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Matches a request path, returning the captured params.
    ///
    /// Static segments compare case-insensitively and one trailing slash
    /// on the request path is ignored.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = split_segments(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(expected) => {
                    if !expected.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    trimmed.split('/').filter(|segment| !segment.is_empty())
}

/// A validated route, ready to be matched against navigations.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub pattern: PathPattern,
    pub name: Option<String>,
    pub target: RouteTarget,
    pub meta: RouteMeta,
}

impl RouteEntry {
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Result of looking a path up in the route table.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: HashMap<String, String>,
}

impl RouteMatch<'_> {
    pub fn meta(&self) -> RouteMeta {
        self.entry.meta
    }
}
