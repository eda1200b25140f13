//! Name and value pattern tables for column classification.

use once_cell::sync::Lazy;
use regex::Regex;

use super::SemanticType;

/// A naming convention rule mapping a column name shape to a semantic type.
#[derive(Debug, Clone)]
pub struct NamingRule {
    /// Rule identifier.
    pub name: &'static str,
    /// Semantic type assigned on match.
    pub semantic: SemanticType,
    /// Priority (higher = checked first).
    pub priority: u8,
    pattern: NamePattern,
}

#[derive(Debug, Clone)]
enum NamePattern {
    /// Column name is exactly this (case-insensitive).
    Exact(&'static str),
    /// Column name ends with this suffix.
    Suffix(&'static str),
    /// Column name starts with this prefix.
    Prefix(&'static str),
    /// Column name contains this substring.
    Contains(&'static str),
}

impl NamingRule {
    pub fn matches(&self, column_name: &str) -> bool {
        let lower = column_name.to_lowercase();
        match &self.pattern {
            NamePattern::Exact(value) => lower == *value,
            NamePattern::Suffix(suffix) => lower.ends_with(suffix),
            NamePattern::Prefix(prefix) => lower.starts_with(prefix),
            NamePattern::Contains(sub) => lower.contains(sub),
        }
    }
}

/// The default rule table, pre-sorted by priority (descending).
pub fn default_naming_rules() -> Vec<NamingRule> {
    let mut rules = vec![
        NamingRule {
            name: "exact_id",
            semantic: SemanticType::Identifier,
            priority: 100,
            pattern: NamePattern::Exact("id"),
        },
        NamingRule {
            name: "exact_uuid",
            semantic: SemanticType::Uuid,
            priority: 100,
            pattern: NamePattern::Exact("uuid"),
        },
        NamingRule {
            name: "exact_guid",
            semantic: SemanticType::Uuid,
            priority: 100,
            pattern: NamePattern::Exact("guid"),
        },
        NamingRule {
            name: "uuid_suffix",
            semantic: SemanticType::Uuid,
            priority: 90,
            pattern: NamePattern::Suffix("_uuid"),
        },
        NamingRule {
            name: "id_suffix",
            semantic: SemanticType::Reference,
            priority: 80,
            pattern: NamePattern::Suffix("_id"),
        },
        NamingRule {
            name: "key_suffix",
            semantic: SemanticType::Reference,
            priority: 80,
            pattern: NamePattern::Suffix("_key"),
        },
        NamingRule {
            name: "ref_suffix",
            semantic: SemanticType::Reference,
            priority: 80,
            pattern: NamePattern::Suffix("_ref"),
        },
        NamingRule {
            name: "at_suffix",
            semantic: SemanticType::Temporal,
            priority: 70,
            pattern: NamePattern::Suffix("_at"),
        },
        NamingRule {
            name: "date_suffix",
            semantic: SemanticType::Temporal,
            priority: 70,
            pattern: NamePattern::Suffix("_date"),
        },
        NamingRule {
            name: "time_suffix",
            semantic: SemanticType::Temporal,
            priority: 70,
            pattern: NamePattern::Suffix("_time"),
        },
        NamingRule {
            name: "exact_date",
            semantic: SemanticType::Temporal,
            priority: 70,
            pattern: NamePattern::Exact("date"),
        },
        NamingRule {
            name: "exact_timestamp",
            semantic: SemanticType::Temporal,
            priority: 70,
            pattern: NamePattern::Exact("timestamp"),
        },
        NamingRule {
            name: "is_prefix",
            semantic: SemanticType::Boolean,
            priority: 60,
            pattern: NamePattern::Prefix("is_"),
        },
        NamingRule {
            name: "has_prefix",
            semantic: SemanticType::Boolean,
            priority: 60,
            pattern: NamePattern::Prefix("has_"),
        },
        NamingRule {
            name: "email_name",
            semantic: SemanticType::Email,
            priority: 50,
            pattern: NamePattern::Contains("email"),
        },
        NamingRule {
            name: "url_name",
            semantic: SemanticType::Url,
            priority: 50,
            pattern: NamePattern::Contains("url"),
        },
        NamingRule {
            name: "link_suffix",
            semantic: SemanticType::Url,
            priority: 50,
            pattern: NamePattern::Suffix("_link"),
        },
    ];
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    rules
}

/// Find the highest-priority naming rule hit for a column name.
pub fn name_hint(rules: &[NamingRule], column_name: &str) -> Option<SemanticType> {
    rules
        .iter()
        .find(|rule| rule.matches(column_name))
        .map(|rule| rule.semantic)
}

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://\S+$").unwrap());

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}([T ]\d{2}:\d{2}(:\d{2})?)?").unwrap());

pub fn looks_like_uuid(value: &str) -> bool {
    UUID_RE.is_match(value)
}

pub fn looks_like_url(value: &str) -> bool {
    URL_RE.is_match(value)
}

pub fn looks_like_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn looks_like_date(value: &str) -> bool {
    DATE_RE.is_match(value)
}

/// Classify string samples by their value shape. Returns a type only when
/// every non-empty sample matches the same probe.
pub fn value_shape(samples: &[&str]) -> Option<SemanticType> {
    let non_empty: Vec<&&str> = samples.iter().filter(|s| !s.is_empty()).collect();
    if non_empty.is_empty() {
        return None;
    }
    if non_empty.iter().all(|s| looks_like_uuid(s)) {
        return Some(SemanticType::Uuid);
    }
    if non_empty.iter().all(|s| looks_like_email(s)) {
        return Some(SemanticType::Email);
    }
    if non_empty.iter().all(|s| looks_like_url(s)) {
        return Some(SemanticType::Url);
    }
    if non_empty.iter().all(|s| looks_like_date(s)) {
        return Some(SemanticType::Temporal);
    }
    None
}
