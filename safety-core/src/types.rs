use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stored classification of a safety alert.
///
/// The remote service labels categories in Korean; the English names are
/// accepted too. Labels outside the known set are kept verbatim so a single
/// unexpected post never fails a whole poll.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Traffic,
    Protest,
    Disaster,
    Caution,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 4] = [
        Category::Traffic,
        Category::Protest,
        Category::Disaster,
        Category::Caution,
    ];

    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        match label {
            "교통" => return Category::Traffic,
            "시위" => return Category::Protest,
            "재해" => return Category::Disaster,
            "주의" => return Category::Caution,
            _ => {}
        }

        match label.to_ascii_uppercase().as_str() {
            "TRAFFIC" => Category::Traffic,
            "PROTEST" => Category::Protest,
            "DISASTER" => Category::Disaster,
            "CAUTION" => Category::Caution,
            _ => Category::Other(label.to_string()),
        }
    }

    /// Label used on the wire by the safety service.
    pub fn wire_label(&self) -> &str {
        match self {
            Category::Traffic => "교통",
            Category::Protest => "시위",
            Category::Disaster => "재해",
            Category::Caution => "주의",
            Category::Other(label) => label,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Category::Traffic => "TRAFFIC",
            Category::Protest => "PROTEST",
            Category::Disaster => "DISASTER",
            Category::Caution => "CAUTION",
            Category::Other(label) => label,
        }
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::parse(&label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.wire_label().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Category selector value. `All` and `Hot` are filters only and never
/// appear on a stored post.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Hot,
    Only(Category),
}

impl CategoryFilter {
    /// Parses a navigation `filter` parameter.
    pub fn parse_label(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed == "전체" || trimmed.eq_ignore_ascii_case("ALL") {
            CategoryFilter::All
        } else if trimmed.eq_ignore_ascii_case("HOT") {
            CategoryFilter::Hot
        } else {
            CategoryFilter::Only(Category::parse(trimmed))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("ALL"),
            CategoryFilter::Hot => f.write_str("HOT"),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    pub category: Category,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "count_or_null")]
    pub views: u64,
    #[serde(
        rename = "commentCount",
        alias = "comment_count",
        default,
        deserialize_with = "count_or_null"
    )]
    pub comment_count: u64,
    #[serde(rename = "location_address", alias = "locationAddress")]
    pub location_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Post {
    /// Shortened message for list rows; counts characters, not bytes.
    pub fn message_preview(&self, max_chars: usize) -> String {
        if self.message.chars().count() > max_chars {
            let cut: String = self.message.chars().take(max_chars).collect();
            format!("{}...", cut)
        } else {
            self.message.clone()
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

fn count_or_null<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

/// A place resolved from the device position.
///
/// Two string forms exist: the cache form `"<city> <district>"` persisted
/// between runs, and the match form compared against
/// `Post::location_address`. The match form is always derived from the cache
/// form by turning its first space into `", "`, so a location reloaded from
/// the cache matches exactly the posts it matched before. Equality follows
/// the cache form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub city: String,
    pub district: String,
}

impl ResolvedLocation {
    pub fn new(city: impl Into<String>, district: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            district: district.into(),
        }
    }

    /// An empty district leaves the city alone.
    pub fn cache_form(&self) -> String {
        if self.district.is_empty() {
            self.city.clone()
        } else {
            format!("{} {}", self.city, self.district)
        }
    }

    pub fn match_key(&self) -> String {
        self.cache_form().replacen(' ', ", ", 1)
    }

    /// Splits a cached value on its first space.
    pub fn from_cache_form(value: &str) -> Self {
        match value.split_once(' ') {
            Some((city, district)) => Self::new(city, district),
            None => Self::new(value, ""),
        }
    }
}

impl PartialEq for ResolvedLocation {
    fn eq(&self, other: &Self) -> bool {
        self.cache_form() == other.cache_form()
    }
}

impl Eq for ResolvedLocation {}

impl Hash for ResolvedLocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cache_form().hash(state);
    }
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_form())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyTip {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tip: String,
}
