//! Data models for the dashboard core.
//!
//! This module contains the structures shared between the aggregator,
//! the controllers and the presentation layer: trend samples, derived
//! growth points, sentiment counts and conversation messages.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One dated, multi-keyword observation from the trend series.
///
/// The `date` key is reserved; every other key is a keyword and its value.
/// Values are kept as raw JSON so a malformed entry degrades to zero instead
/// of rejecting the whole sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSample {
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub date: NaiveDate,

    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl TrendSample {
    /// Build a sample from numeric keyword values.
    pub fn new<K, I>(date: NaiveDate, values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Self {
            date,
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), Value::from(v)))
                .collect(),
        }
    }

    /// Value of one keyword; absent or non-numeric values count as 0.
    pub fn value(&self, keyword: &str) -> f64 {
        self.values
            .get(keyword)
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// Sum of every numeric keyword value in this sample.
    pub fn total(&self) -> f64 {
        self.values.values().filter_map(Value::as_f64).sum()
    }

    /// The keywords present on this sample, in key order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date: {}", raw)))
}

/// Month-over-month change of the average sample total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    /// Short display label, e.g. `Feb 24`.
    pub month: String,

    /// Percentage change against the previous month, one decimal.
    #[serde(rename = "growth")]
    pub growth_percent: f64,

    /// Rounded average sample total for the month.
    #[serde(rename = "avg_value")]
    pub average_value: i64,
}

/// Distribution of entities across the sentiment thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Market sentiment card as reported by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSentiment {
    pub value: String,
    pub label: String,
}

impl Default for MarketSentiment {
    fn default() -> Self {
        Self {
            value: "50%".to_string(),
            label: "Neutral".to_string(),
        }
    }
}

/// One competitor page from the competitor analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub title: String,
    pub sentiment: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

/// Actionable recommendations: quick calls to action plus a posting
/// cadence per platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentRecommendations {
    #[serde(default)]
    pub ctas: Vec<String>,
    /// Platform name to posting frequency.
    #[serde(default)]
    pub platform_specific: BTreeMap<String, String>,
}

impl ContentRecommendations {
    pub fn is_empty(&self) -> bool {
        self.ctas.is_empty() && self.platform_specific.is_empty()
    }
}

/// Headline metric cards shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub market_sentiment: MarketSentiment,
    /// Average total activity over the trailing window.
    pub search_volume: i64,
    /// Average brand keyword activity over the trailing window.
    pub brand_mentions: i64,
    /// Percent change between the leading and trailing windows.
    pub growth_rate: i64,
}

/// Who authored a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "ARTfinder Ai"),
        }
    }
}

/// Millisecond timestamp identifying an assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference attached to an assistant reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Text(String),
    Structured(Value),
}

impl From<Value> for Reference {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Reference::Text(s),
            other => Reference::Structured(other),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Text(s) => write!(f, "{}", s),
            Reference::Structured(v) => write!(f, "{}", v),
        }
    }
}

/// Raw body of a `/chat` response. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub insights: Option<Value>,
    #[serde(default)]
    pub references: Option<Value>,
}

impl ChatReply {
    /// Reply text, or an empty string when the service sent none.
    pub fn text(&self) -> String {
        self.response.clone().unwrap_or_default()
    }

    /// Insights mapping; anything other than an object becomes empty.
    pub fn insights(&self) -> Map<String, Value> {
        match &self.insights {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }

    /// References list; anything other than an array becomes empty.
    pub fn references(&self) -> Vec<Reference> {
        match &self.references {
            Some(Value::Array(items)) => items.iter().cloned().map(Reference::from).collect(),
            _ => Vec::new(),
        }
    }
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    pub role: Role,
    pub text: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub insights: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    pub avatar: String,
}

impl ConversationMessage {
    /// Whether the message carries insights or references worth expanding.
    pub fn has_details(&self) -> bool {
        !self.insights.is_empty() || !self.references.is_empty()
    }
}
