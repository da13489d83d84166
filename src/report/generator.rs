//! Markdown and JSON rendering of dashboard snapshots.
//!
//! This is the terminal host's presentation adapter: it only reads the
//! snapshot it is given.

use crate::dashboard::{DashboardSnapshot, ReportPanel};
use crate::models::{
    Competitor, ContentRecommendations, ConversationMessage, DashboardMetrics, GrowthPoint, Role,
    SentimentCounts,
};
use crate::session::SessionPhase;
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown dashboard.
pub fn generate_markdown_report(snapshot: &DashboardSnapshot) -> String {
    let mut output = String::new();

    // Title
    let title = snapshot
        .report
        .as_ref()
        .and_then(|r| r.query.as_deref())
        .or(snapshot.subject.as_deref());
    match title {
        Some(query) => output.push_str(&format!("# Market Analysis: {}\n\n", query)),
        None => output.push_str("# Market Analysis Report\n\n"),
    }

    output.push_str(&generate_session_section(snapshot));

    match (&snapshot.report, snapshot.phase) {
        (Some(panel), _) => output.push_str(&generate_panel_sections(panel)),
        (None, SessionPhase::Loaded) => output.push_str("No analysis data available\n\n"),
        _ => {}
    }

    output.push_str(&generate_conversation_section(snapshot));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Status line, plus the error panel when the analysis failed.
fn generate_session_section(snapshot: &DashboardSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Session\n\n");
    if let Some(ref subject) = snapshot.subject {
        section.push_str(&format!("- **Subject:** {}\n", subject));
    }
    section.push_str(&format!("- **Status:** {}\n", snapshot.phase));
    section.push_str(&format!(
        "- **Generated:** {}\n\n",
        snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if let Some(ref error) = snapshot.error {
        section.push_str(&format!("> ❌ Error loading analysis: {}\n\n", error));
    }

    section
}

fn generate_panel_sections(panel: &ReportPanel) -> String {
    let mut sections = String::new();

    sections.push_str(&generate_metrics_section(&panel.metrics));
    sections.push_str(&generate_trend_section(panel));
    sections.push_str(&generate_sentiment_section(&panel.sentiment));
    sections.push_str(&generate_insights_section(&panel.insights));
    sections.push_str(&generate_audience_section(panel));
    sections.push_str(&generate_competitors_section(panel));
    sections.push_str(&generate_recommendations_section(&panel.recommendations));

    sections
}

/// Generate the headline metric cards.
fn generate_metrics_section(metrics: &DashboardMetrics) -> String {
    let mut section = String::new();

    section.push_str("## Market Overview\n\n");
    section.push_str("| Market Sentiment | Search Volume | Brand Mentions | Growth Rate |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} ({}) | {} | {} | {}% |\n",
        metrics.market_sentiment.value,
        metrics.market_sentiment.label,
        metrics.search_volume,
        metrics.brand_mentions,
        metrics.growth_rate
    ));
    section.push_str("| | Monthly Average | Last 30 Days | YoY Change |\n\n");

    section
}

fn generate_trend_section(panel: &ReportPanel) -> String {
    let mut section = String::new();

    section.push_str("## Trend Analysis\n\n");

    if !panel.keywords.is_empty() {
        section.push_str(&format!("**Keywords:** {}\n\n", panel.keywords.join(", ")));
    }
    if !panel.key_topics.is_empty() {
        section.push_str(&format!("**Key Topics:** {}\n\n", panel.key_topics.join(", ")));
    }
    section.push_str(&format!("*{} trend samples*\n\n", panel.sample_count));

    if panel.growth.is_empty() {
        section.push_str("Not enough months of data to compute growth.\n\n");
        return section;
    }

    section.push_str("### Monthly Growth\n\n");
    section.push_str("| Month | Growth | Avg Value |\n");
    section.push_str("|:---|---:|---:|\n");
    for point in &panel.growth {
        section.push_str(&generate_growth_row(point));
    }
    section.push('\n');

    section
}

fn generate_growth_row(point: &GrowthPoint) -> String {
    // Adding 0.0 turns -0.0 into 0.0
    let growth = (point.growth_percent * 10.0).round() / 10.0 + 0.0;
    let marker = if growth >= 0.0 { "🟢" } else { "🔴" };
    format!(
        "| {} | {} {:.1}% | {} |\n",
        point.month, marker, growth, point.average_value
    )
}

fn generate_sentiment_section(counts: &SentimentCounts) -> String {
    if counts.total() == 0 {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("### Sentiment Distribution\n\n");
    section.push_str("| Positive | Neutral | Negative |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        counts.positive, counts.neutral, counts.negative
    ));

    section
}

fn generate_insights_section(insights: &str) -> String {
    if insights.trim().is_empty() {
        return String::new();
    }

    format!("## Strategic Insights\n\n{}\n\n", insights.trim())
}

/// Pain points and purchase triggers, side by side in the dashboard.
fn generate_audience_section(panel: &ReportPanel) -> String {
    if panel.pain_points.is_empty() && panel.triggers.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Audience Insights\n\n");
    for (heading, items) in [("Pain Points", &panel.pain_points), ("Triggers", &panel.triggers)] {
        if items.is_empty() {
            continue;
        }
        section.push_str(&format!("### {}\n\n", heading));
        for item in items {
            section.push_str(&format!("- {}\n", item));
        }
        section.push('\n');
    }

    section
}

fn generate_competitors_section(panel: &ReportPanel) -> String {
    if panel.competitors.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Competition Analysis\n\n");
    section.push_str("| Competitor | Sentiment |\n");
    section.push_str("|:---|---:|\n");
    for competitor in &panel.competitors {
        section.push_str(&format!(
            "| {} | {:.1}% |\n",
            competitor_link(competitor),
            competitor.sentiment * 100.0
        ));
    }
    section.push('\n');

    for competitor in &panel.competitors {
        if competitor.summary.is_none() && competitor.keywords.is_empty() {
            continue;
        }

        section.push_str(&format!("### {}\n\n", competitor_name(competitor)));
        if let Some(ref summary) = competitor.summary {
            section.push_str(&format!("{}\n\n", summary));
        }
        if !competitor.keywords.is_empty() {
            section.push_str(&format!("**Keywords:** {}\n\n", competitor.keywords.join(", ")));
        }
    }

    section
}

/// Page titles look like "Brand | Tagline"; only the brand is shown.
fn competitor_name(competitor: &Competitor) -> &str {
    let name = competitor.title.split('|').next().unwrap_or("").trim();
    if name.is_empty() {
        "Unknown"
    } else {
        name
    }
}

fn competitor_link(competitor: &Competitor) -> String {
    match competitor.url {
        Some(ref url) => format!("[{}]({})", competitor_name(competitor), url),
        None => competitor_name(competitor).to_string(),
    }
}

/// Generate the recommendations section.
fn generate_recommendations_section(recommendations: &ContentRecommendations) -> String {
    if recommendations.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Content Recommendations\n\n");

    if !recommendations.ctas.is_empty() {
        section.push_str("### Quick Actions\n\n");
        for (i, cta) in recommendations.ctas.iter().enumerate() {
            section.push_str(&format!("{}. {}\n", i + 1, cta));
        }
        section.push('\n');
    }

    if !recommendations.platform_specific.is_empty() {
        section.push_str("### Platform Strategy\n\n");
        section.push_str("| Platform | Frequency |\n");
        section.push_str("|:---|:---|\n");
        for (platform, frequency) in &recommendations.platform_specific {
            let frequency = if frequency.is_empty() { "n/a" } else { frequency.as_str() };
            section.push_str(&format!("| {} | {} |\n", platform, frequency));
        }
        section.push('\n');
    }

    section
}

fn generate_conversation_section(snapshot: &DashboardSnapshot) -> String {
    if snapshot.conversation.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Conversation\n\n");
    for message in &snapshot.conversation {
        let expanded = message
            .id
            .map_or(false, |id| snapshot.expanded.contains(&id));
        section.push_str(&generate_message_block(message, expanded));
    }

    if snapshot.chat_in_flight {
        section.push_str("*Response generating...*\n\n");
    }

    section
}

/// One chat bubble. Details only render when the message is expanded.
fn generate_message_block(message: &ConversationMessage, expanded: bool) -> String {
    let mut block = String::new();

    block.push_str(&format!("**{}:** {}\n\n", message.role, message.text));

    if message.role != Role::Assistant || !message.has_details() {
        return block;
    }

    if !expanded {
        block.push_str("<details><summary>Show Details</summary></details>\n\n");
        return block;
    }

    if !message.insights.is_empty() {
        block.push_str("**Detailed Insights:**\n\n");
        for (key, value) in &message.insights {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => serde_json::to_string_pretty(other).unwrap_or_default(),
            };
            block.push_str(&format!(
                "- **{}:** {}\n",
                key.replace('_', " ").to_uppercase(),
                rendered
            ));
        }
        block.push('\n');
    }

    if !message.references.is_empty() {
        block.push_str("**References:**\n\n");
        for reference in &message.references {
            block.push_str(&format!("- {}\n", reference));
        }
        block.push('\n');
    }

    block
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Real-time market insights and competitive analysis powered by ARTfinder*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(snapshot: &DashboardSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
