//! Page-scoped dashboard state.
//!
//! A [`Dashboard`] is created when the analysis page mounts and dropped when
//! it unmounts. It owns the session guard and the conversation controller
//! for that page, and hands the presentation layer read-only
//! [`DashboardSnapshot`]s.

use crate::analysis::{
    monthly_growth, period_over_period_change, rolling_average_last_n, sentiment_buckets,
    FieldSelector,
};
use crate::chat::{Avatars, ConversationController};
use crate::config::{Config, DashboardConfig};
use crate::models::{
    Competitor, ContentRecommendations, ConversationMessage, DashboardMetrics, GrowthPoint,
    MessageId, SentimentCounts,
};
use crate::report::ReportView;
use crate::session::{NavigationHost, SessionGuard, SessionPhase};
use crate::transport::Transport;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Query parameter carrying the analysis subject.
pub const SUBJECT_PARAM: &str = "uname";

/// Extract the subject from a page location or a bare query string.
pub fn subject_from_location(location: &str) -> Option<String> {
    let location = location.trim();
    let location = if location.contains('?') || location.contains("://") {
        location.to_string()
    } else {
        format!("?{}", location)
    };

    let url = Url::parse(&location).or_else(|_| {
        Url::parse("http://localhost/analysis").and_then(|base| base.join(&location))
    });

    url.ok()?
        .query_pairs()
        .find(|(key, _)| key == SUBJECT_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Headline metric cards for one report.
pub fn dashboard_metrics(view: &ReportView<'_>, config: &DashboardConfig) -> DashboardMetrics {
    let samples = view.trend_samples();

    DashboardMetrics {
        market_sentiment: view.market_sentiment(),
        search_volume: rolling_average_last_n(&samples, config.window, &FieldSelector::Total),
        brand_mentions: rolling_average_last_n(
            &samples,
            config.window,
            &FieldSelector::keyword(config.brand_keyword.as_str()),
        ),
        growth_rate: period_over_period_change(
            &samples,
            &FieldSelector::keyword(config.trend_keyword.as_str()),
            config.window,
        ),
    }
}

/// Everything derived from a loaded report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPanel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub metrics: DashboardMetrics,
    pub keywords: Vec<String>,
    pub key_topics: Vec<String>,
    pub pain_points: Vec<String>,
    pub triggers: Vec<String>,
    pub sample_count: usize,
    pub growth: Vec<GrowthPoint>,
    pub sentiment: SentimentCounts,
    pub insights: String,
    pub competitors: Vec<Competitor>,
    pub recommendations: ContentRecommendations,
}

impl ReportPanel {
    /// Derive the panel, or `None` when the report has no fields.
    pub fn from_report(report: &Value, config: &DashboardConfig) -> Option<Self> {
        let view = ReportView::new(report);
        if view.is_empty() {
            return None;
        }

        let samples = view.trend_samples();
        let competitors = view.competitors();

        Some(Self {
            query: view.query().map(str::to_string),
            metrics: dashboard_metrics(&view, config),
            keywords: view.keywords(),
            key_topics: view.key_topics(),
            pain_points: view.pain_points(),
            triggers: view.triggers(),
            sample_count: samples.len(),
            growth: monthly_growth(&samples),
            sentiment: sentiment_buckets(competitors.iter().map(|c| c.sentiment)),
            insights: view.ai_insights().to_string(),
            competitors,
            recommendations: view.content_recommendations(),
        })
    }
}

/// Read-only state handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportPanel>,
    pub conversation: Vec<ConversationMessage>,
    /// Assistant messages whose details are expanded.
    pub expanded: Vec<MessageId>,
    pub chat_in_flight: bool,
    pub generated_at: DateTime<Utc>,
}

/// Controllers owned by one mounted analysis page.
pub struct Dashboard {
    subject: Option<String>,
    config: DashboardConfig,
    session: SessionGuard,
    chat: ConversationController,
}

impl Dashboard {
    /// Mount the page: create the controllers and install navigation protection.
    pub fn mount(
        transport: Arc<dyn Transport>,
        subject: Option<String>,
        config: &Config,
        host: &mut dyn NavigationHost,
    ) -> Self {
        let avatars = Avatars {
            user: config.chat.user_avatar.clone(),
            assistant: config.chat.assistant_avatar.clone(),
        };

        let mut session = SessionGuard::new(transport.clone());
        session.mount(host);
        debug!("Dashboard mounted for {:?}", subject);

        Self {
            subject,
            config: config.dashboard.clone(),
            session,
            chat: ConversationController::new(transport, avatars),
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn session(&self) -> &SessionGuard {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionGuard {
        &mut self.session
    }

    pub fn chat(&self) -> &ConversationController {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ConversationController {
        &mut self.chat
    }

    /// Run the activation trigger with this page's subject.
    pub async fn activate(&mut self) -> SessionPhase {
        let subject = self.subject.clone();
        self.session.activate(subject.as_deref()).await
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let state = self.session.state();

        let mut expanded: Vec<MessageId> = self
            .chat
            .details()
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(id, _)| *id)
            .collect();
        expanded.sort();

        DashboardSnapshot {
            subject: self.subject.clone(),
            phase: state.phase(),
            error: state.error().map(|e| e.to_string()),
            report: state
                .report()
                .and_then(|report| ReportPanel::from_report(report, &self.config)),
            conversation: self.chat.messages().to_vec(),
            expanded,
            chat_in_flight: self.chat.in_flight(),
            generated_at: Utc::now(),
        }
    }

    /// Tear the page down. Nothing outlives the mount.
    pub fn unmount(mut self) {
        self.session.unmount();
        debug!("Dashboard unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::models::ChatReply;
    use crate::session::navigation::tests::RecordingHost;
    use crate::session::UnloadPolicy;
    use crate::transport::testutil::ScriptedTransport;
    use serde_json::json;

    fn trend_report() -> Value {
        let data: Vec<Value> = (0..60)
            .map(|i| {
                let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i);
                let trend = if i < 30 { 10.0 } else { 20.0 };
                json!({"date": date.format("%Y-%m-%d").to_string(), "trend": trend, "brand": 3.0})
            })
            .collect();

        json!({
            "query": "acme",
            "metadata": {"pain_points": ["Slow shipping"], "triggers": ["Free returns"]},
            "content_recommendations": {
                "ctas": ["Shop the drop"],
                "platform_specific": {"tiktok": {"frequency": "daily"}}
            },
            "trend_analysis": {"google_trends": {"data": data, "keywords": ["trend", "brand"]}},
            "competitor_analysis": [
                {"title": "A", "sentiment": 0.5},
                {"title": "B", "sentiment": 0.0},
                {"title": "C", "sentiment": -0.7}
            ]
        })
    }

    #[test]
    fn test_subject_from_location() {
        assert_eq!(subject_from_location("?uname=acme").as_deref(), Some("acme"));
        assert_eq!(
            subject_from_location("http://localhost:5173/analysis?tab=1&uname=acme%20co").as_deref(),
            Some("acme co")
        );
        assert_eq!(subject_from_location("/analysis?uname=").as_deref(), None);
        assert_eq!(subject_from_location("/analysis").as_deref(), None);
    }

    #[test]
    fn test_subject_from_bare_query_string() {
        assert_eq!(subject_from_location("uname=acme").as_deref(), Some("acme"));
        assert_eq!(subject_from_location(" tab=2&uname=acme+co ").as_deref(), Some("acme co"));
        assert_eq!(subject_from_location("tab=2").as_deref(), None);
    }

    #[test]
    fn test_dashboard_metrics() {
        let report = trend_report();
        let view = ReportView::new(&report);

        let metrics = dashboard_metrics(&view, &DashboardConfig::default());

        assert_eq!(metrics.search_volume, 23);
        assert_eq!(metrics.brand_mentions, 3);
        assert_eq!(metrics.growth_rate, 100);
        assert_eq!(metrics.market_sentiment.label, "Neutral");
    }

    #[tokio::test]
    async fn test_mount_activate_snapshot_unmount() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .with_report(trend_report())
                .push_chat(Ok(ChatReply {
                    response: Some("Grow on video".to_string()),
                    insights: Some(json!({"channel": "reels"})),
                    references: None,
                })),
        );
        let mut host = RecordingHost::default();
        let mut dashboard = Dashboard::mount(
            transport.clone(),
            Some("acme".to_string()),
            &Config::default(),
            &mut host,
        );

        assert_eq!(dashboard.snapshot().phase, SessionPhase::Idle);
        assert_eq!(dashboard.session().on_before_unload(), UnloadPolicy::RequestConfirmation);

        dashboard.activate().await;
        dashboard.activate().await;
        assert_eq!(transport.analyze_calls(), 1);

        dashboard.chat_mut().submit("what next?").await;
        let reply_id = dashboard.chat().messages()[1].id.unwrap();
        dashboard.chat_mut().toggle_details(reply_id);

        let snapshot = dashboard.snapshot();
        let panel = snapshot.report.as_ref().unwrap();

        assert_eq!(snapshot.phase, SessionPhase::Loaded);
        assert_eq!(panel.query.as_deref(), Some("acme"));
        assert_eq!(panel.sample_count, 60);
        assert_eq!(panel.growth.len(), 1);
        assert_eq!(panel.sentiment.total(), 3);
        assert_eq!(panel.pain_points, vec!["Slow shipping"]);
        assert_eq!(panel.triggers, vec!["Free returns"]);
        assert_eq!(panel.recommendations.ctas, vec!["Shop the drop"]);
        assert_eq!(panel.recommendations.platform_specific["tiktok"], "daily");
        assert_eq!(snapshot.conversation.len(), 2);
        assert_eq!(snapshot.expanded, vec![reply_id]);
        assert!(!snapshot.chat_in_flight);

        dashboard.unmount();
        assert_eq!(host.pushes, 1);
    }

    #[tokio::test]
    async fn test_failed_snapshot_carries_error() {
        let transport = Arc::new(
            ScriptedTransport::new().with_analyze_error(TransportError::Connect(
                "http://localhost:8000".to_string(),
            )),
        );
        let mut host = RecordingHost::default();
        let mut dashboard =
            Dashboard::mount(transport, Some("acme".to_string()), &Config::default(), &mut host);

        dashboard.activate().await;
        let snapshot = dashboard.snapshot();

        assert_eq!(snapshot.phase, SessionPhase::Failed);
        assert!(snapshot.report.is_none());
        assert!(snapshot.error.unwrap().contains("Cannot connect"));
    }

    #[tokio::test]
    async fn test_empty_report_has_no_panel() {
        let transport = Arc::new(ScriptedTransport::new().with_report(json!({})));
        let mut host = RecordingHost::default();
        let mut dashboard =
            Dashboard::mount(transport, Some("acme".to_string()), &Config::default(), &mut host);

        dashboard.activate().await;

        assert_eq!(dashboard.snapshot().phase, SessionPhase::Loaded);
        assert!(dashboard.snapshot().report.is_none());
    }
}
