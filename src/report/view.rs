//! Typed, read-only view over the analyze payload.
//!
//! The report is opaque to the controllers. This view pulls out the parts
//! the dashboard renders, and every accessor degrades to an empty default
//! when a field is missing or has an unexpected shape.

use crate::models::{Competitor, ContentRecommendations, MarketSentiment, TrendSample};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub struct ReportView<'a> {
    report: &'a Value,
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl<'a> ReportView<'a> {
    pub fn new(report: &'a Value) -> Self {
        Self { report }
    }

    /// A report with no fields at all has nothing to render.
    pub fn is_empty(&self) -> bool {
        self.report.as_object().map_or(true, |map| map.is_empty())
    }

    pub fn query(&self) -> Option<&'a str> {
        self.report.get("query").and_then(Value::as_str)
    }

    /// The trend series; samples with an unparseable date are skipped.
    pub fn trend_samples(&self) -> Vec<TrendSample> {
        let Some(items) = self
            .report
            .pointer("/trend_analysis/google_trends/data")
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        let samples: Vec<TrendSample> = items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect();

        if samples.len() != items.len() {
            debug!(
                "Skipped {} malformed trend samples",
                items.len() - samples.len()
            );
        }

        samples
    }

    /// Declared trend keywords, or the keys the samples carry when the
    /// report does not list them.
    pub fn keywords(&self) -> Vec<String> {
        let declared = string_list(self.report.pointer("/trend_analysis/google_trends/keywords"));
        if !declared.is_empty() {
            return declared;
        }

        let present: BTreeSet<String> = self
            .trend_samples()
            .iter()
            .flat_map(|sample| sample.keywords().map(str::to_string).collect::<Vec<_>>())
            .collect();
        present.into_iter().collect()
    }

    pub fn key_topics(&self) -> Vec<String> {
        string_list(self.report.pointer("/metadata/key_topics"))
    }

    pub fn pain_points(&self) -> Vec<String> {
        string_list(self.report.pointer("/metadata/pain_points"))
    }

    pub fn triggers(&self) -> Vec<String> {
        string_list(self.report.pointer("/metadata/triggers"))
    }

    pub fn ai_insights(&self) -> &'a str {
        self.report
            .get("ai_insights")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn market_sentiment(&self) -> MarketSentiment {
        let defaults = MarketSentiment::default();
        let Some(card) = self.report.pointer("/metadata/market_sentiment") else {
            return defaults;
        };

        MarketSentiment {
            value: card
                .get("value")
                .and_then(display_value)
                .unwrap_or(defaults.value),
            label: card
                .get("label")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(defaults.label),
        }
    }

    /// Competitor pages; a missing sentiment counts as neutral zero.
    pub fn competitors(&self) -> Vec<Competitor> {
        self.report
            .get("competitor_analysis")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(|item| Competitor {
                        title: item
                            .get("title")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        sentiment: item.get("sentiment").and_then(Value::as_f64).unwrap_or(0.0),
                        summary: item.get("summary").and_then(Value::as_str).map(str::to_string),
                        url: item
                            .get("url")
                            .and_then(Value::as_str)
                            .filter(|url| !url.is_empty())
                            .map(str::to_string),
                        keywords: string_list(item.get("keywords")),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Calls to action and per-platform cadence. A plain list is read as
    /// calls to action only.
    pub fn content_recommendations(&self) -> ContentRecommendations {
        let Some(recommendations) = self.report.get("content_recommendations") else {
            return ContentRecommendations::default();
        };

        if recommendations.is_array() {
            return ContentRecommendations {
                ctas: string_list(Some(recommendations)),
                platform_specific: BTreeMap::new(),
            };
        }

        let platform_specific = recommendations
            .get("platform_specific")
            .and_then(Value::as_object)
            .map(|platforms| {
                platforms
                    .iter()
                    .map(|(platform, strategy)| {
                        let frequency = match strategy {
                            Value::String(s) => s.clone(),
                            other => other
                                .get("frequency")
                                .and_then(display_value)
                                .unwrap_or_default(),
                        };
                        (platform.clone(), frequency)
                    })
                    .collect()
            })
            .unwrap_or_default();

        ContentRecommendations {
            ctas: string_list(recommendations.get("ctas")),
            platform_specific,
        }
    }
}
