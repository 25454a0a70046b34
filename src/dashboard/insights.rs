use super::dto::{InsightKind, InsightsResponse};
use crate::html::escape;

fn css(kind: InsightKind) -> &'static str {
    match kind {
        InsightKind::Tip => "insight insight-tip",
        InsightKind::Warning => "insight insight-warning",
        InsightKind::Info => "insight insight-info",
        InsightKind::Success => "insight insight-success",
        InsightKind::Other => "insight",
    }
}

/// "12 entries over 7 days", from whatever the API reported.
fn basis(advice: &InsightsResponse) -> Option<String> {
    match (advice.total_entries, advice.period.as_deref()) {
        (Some(1), Some(period)) => Some(format!("1 entry over {period}")),
        (Some(n), Some(period)) => Some(format!("{n} entries over {period}")),
        (Some(1), None) => Some("1 entry".into()),
        (Some(n), None) => Some(format!("{n} entries")),
        (None, Some(period)) => Some(period.to_string()),
        (None, None) => None,
    }
}

pub fn render(advice: &InsightsResponse) -> String {
    let insights = &advice.insights;
    if insights.is_empty() {
        return r#"<div class="card"><h3>Nutrition Insights</h3><p class="empty">No insights available yet<br><small>Start logging your food to get personalized nutrition insights!</small></p></div>"#.to_string();
    }
    let items: String = insights
        .iter()
        .map(|i| {
            format!(
                r#"<div class="{}"><h4>{}</h4><p>{}</p></div>"#,
                css(i.kind),
                escape(&i.title),
                escape(&i.message)
            )
        })
        .collect();
    let basis = basis(advice)
        .map(|b| format!(r#" <small class="muted">{}</small>"#, escape(&b)))
        .unwrap_or_default();
    format!(
        r#"<div class="card"><h3>Nutrition Insights{basis}</h3>{items}<p class="muted legend">Insights are generated based on your nutrition patterns and goals</p></div>"#
    )
}

#[cfg(test)]
mod insights_tests {
    use super::*;
    use crate::dashboard::dto::Insight;

    fn advice(insights: Vec<Insight>, period: Option<&str>, total_entries: Option<u32>) -> InsightsResponse {
        InsightsResponse {
            insights,
            period: period.map(Into::into),
            total_entries,
        }
    }

    #[test]
    fn kinds_map_to_styles() {
        let html = render(&advice(vec![
            Insight {
                kind: InsightKind::Warning,
                title: "Low Protein Intake".into(),
                message: "Add eggs & legumes.".into(),
            },
            Insight {
                kind: InsightKind::Other,
                title: "Streak".into(),
                message: "7 days".into(),
            },
        ], None, None));
        assert!(html.contains(r#"<div class="insight insight-warning"><h4>Low Protein Intake</h4><p>Add eggs &amp; legumes.</p></div>"#));
        assert!(html.contains(r#"<div class="insight"><h4>Streak</h4>"#));
    }

    #[test]
    fn empty_list_has_placeholder() {
        assert!(render(&InsightsResponse::default()).contains("No insights available yet"));
    }

    #[test]
    fn heading_shows_what_the_insights_cover() {
        let tip = Insight {
            kind: InsightKind::Tip,
            title: "Stay Hydrated".into(),
            message: "Drink water.".into(),
        };
        let html = render(&advice(vec![tip.clone()], Some("7 days"), Some(12)));
        assert!(html.contains(r#"<h3>Nutrition Insights <small class="muted">12 entries over 7 days</small></h3>"#));
        let html = render(&advice(vec![tip.clone()], None, Some(1)));
        assert!(html.contains(r#"<small class="muted">1 entry</small>"#));
        let html = render(&advice(vec![tip], None, None));
        assert!(html.contains("<h3>Nutrition Insights</h3>"));
    }
}
