use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;
use time::{Month, OffsetDateTime};
use tracing::instrument;

use super::{chart, insights, progress};
use crate::{
    auth::extractors::CurrentUser,
    formats::{format_date, parse_date},
    html::{escape, num, or_dash},
    state::AppState,
    web::{or_notice, render},
};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub date: Option<String>,
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let today = OffsetDateTime::now_utc().date();
    let date = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        None => today,
        Some(raw) => match parse_date(raw) {
            Ok(date) => date,
            Err(_) => {
                state.notices.error(format!("Invalid date: {raw}")).await;
                today
            }
        },
    };

    let api = &state.api;
    let (summary, progress_data, advice, goal) = tokio::join!(
        async {
            if date == today {
                api.today_summary().await
            } else {
                api.daily_summary(date).await
            }
        },
        api.progress_data(7),
        api.insights(),
        api.current_goal(),
    );
    let summary = or_notice!(state, summary, "Failed to load nutrition summary");
    let progress_data = or_notice!(state, progress_data, "Failed to load progress data");
    let advice = or_notice!(state, advice, "Failed to load insights");
    let goal = or_notice!(state, goal, "Failed to load the current goal").flatten();

    let summary = match (summary, &goal) {
        (Some(summary), Some(goal)) => Some(summary.with_goal(goal)),
        (summary, _) => summary,
    };
    let advice = advice.unwrap_or_default();

    let goal_line = goal
        .map(|g| format!(r#"Active goal: <a href="/goals">{}</a>"#, escape(&g.name())))
        .unwrap_or_else(|| r#"No active goal. <a href="/goals?new=1">Set one</a>"#.to_string());
    let body = format!(
        r#"<form method="get" action="/dashboard" class="card"><p>Nutrition overview for <strong>{date}</strong>. {goal_line}</p><input type="date" name="date" value="{date}"> <button>Show</button></form>
{quick}
<div class="grid">{card}<div>{insights}<div class="card"><h3>Quick Actions</h3><p><a href="/food">Log Food</a></p><p><a href="/goals">Set Goals</a></p><p><a href="/dashboard/weekly">View Progress</a></p></div></div></div>
<div class="card"><h3>Weekly Progress <small class="muted">Last 7 days</small></h3>{chart}</div>
{stats}"#,
        date = format_date(date),
        quick = progress::quick_stats(summary.as_ref()),
        card = progress::summary_card(summary.as_ref()),
        insights = insights::render(&advice),
        chart = chart::render(progress_data.as_ref()),
        stats = progress::day_stats(summary.as_ref()),
    );
    render(&state, "Dashboard", Some(&user), &body).await
}

fn pct(value: Option<f64>) -> String {
    or_dash(value.map(|p| format!("{}%", num(p, 1))))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn weekly(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Response {
    let weekly = or_notice!(state, state.api.weekly_summary().await, "Failed to load weekly summary");

    let body = match weekly {
        Some(week) if !week.summaries.is_empty() => {
            let rows: String = week
                .summaries
                .iter()
                .map(|d| {
                    format!(
                        "<tr><td>{}</td><td>{}</td><td>{}g</td><td>{}g</td><td>{}g</td><td>{}</td><td>{}</td></tr>",
                        format_date(d.date),
                        num(d.calories, 0),
                        num(d.protein, 1),
                        num(d.carbs, 1),
                        num(d.fat, 1),
                        pct(d.calories_progress),
                        pct(d.protein_progress),
                    )
                })
                .collect();
            format!(
                r#"<p class="muted">{} to {} · <a href="/dashboard/monthly">Monthly report</a></p>
<div class="card"><table><thead><tr><th>Date</th><th>Calories</th><th>Protein</th><th>Carbs</th><th>Fat</th><th>Calories progress</th><th>Protein progress</th></tr></thead><tbody>{rows}</tbody></table></div>"#,
                format_date(week.week_start),
                format_date(week.week_end),
            )
        }
        _ => crate::html::empty_state("No data for the last 7 days"),
    };
    render(&state, "Weekly Report", Some(&user), &body).await
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

impl MonthQuery {
    /// Requested month, or the current one when absent or malformed.
    fn resolve(&self, today: time::Date) -> (i32, u8, bool) {
        let year = self.year.as_deref().map(|y| y.trim().parse::<i32>());
        let month = self.month.as_deref().map(|m| m.trim().parse::<u8>());
        match (year, month) {
            (None, None) => (today.year(), today.month() as u8, true),
            (Some(Ok(y)), Some(Ok(m))) if (1..=12).contains(&m) && (1900..=9999).contains(&y) => {
                (y, m, true)
            }
            _ => (today.year(), today.month() as u8, false),
        }
    }
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn monthly(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MonthQuery>,
) -> Response {
    let (year, month, valid) = query.resolve(OffsetDateTime::now_utc().date());
    if !valid {
        state.notices.error("Choose a month between 1 and 12").await;
    }
    let monthly = or_notice!(
        state,
        state.api.monthly_summary(year, month).await,
        "Failed to load monthly summary"
    );

    let picker = format!(
        r#"<form method="get" action="/dashboard/monthly" class="card"><input type="number" name="year" value="{year}" min="1900" max="9999"> <input type="number" name="month" value="{month}" min="1" max="12"> <button>Show</button> <a href="/dashboard/weekly">Weekly report</a></form>"#
    );
    let report = match monthly {
        Some(m) if m.total_entries > 0 => {
            let t = &m.monthly_totals;
            let a = &m.daily_averages;
            let line = |name: &str, total: f64, avg: f64, unit: &str, decimals: usize| {
                format!(
                    "<tr><td>{name}</td><td>{}{unit}</td><td>{}{unit}</td></tr>",
                    num(total, decimals),
                    num(avg, decimals)
                )
            };
            let totals = [
                line("Calories", t.calories, a.calories, "", 0),
                line("Protein", t.protein, a.protein, "g", 1),
                line("Carbs", t.carbs, a.carbs, "g", 1),
                line("Fat", t.fat, a.fat, "g", 1),
                line("Fiber", t.fiber, a.fiber, "g", 1),
                line("Sugar", t.sugar, a.sugar, "g", 1),
                line("Sodium", t.sodium, a.sodium, "mg", 0),
            ]
            .concat();
            let meals: String = m
                .meal_distribution
                .iter()
                .map(|(meal, count)| format!("<tr><td>{}</td><td>{count}</td></tr>", escape(meal)))
                .collect();
            format!(
                r#"<p class="muted">{} to {} · {} days · {} entries</p>
<div class="grid"><div class="card"><h3>Totals</h3><table><thead><tr><th>Nutrient</th><th>Month</th><th>Daily average</th></tr></thead><tbody>{totals}</tbody></table></div>
<div class="card"><h3>Entries by meal</h3><table><tbody>{meals}</tbody></table></div></div>"#,
                format_date(m.start_date),
                format_date(m.end_date),
                m.days_in_month,
                m.total_entries,
            )
        }
        _ => crate::html::empty_state("Nothing logged in this month"),
    };
    let title = match Month::try_from(month) {
        Ok(name) => format!("{name} {year}"),
        Err(_) => format!("{year}-{month:02}"),
    };
    render(&state, &title, Some(&user), &format!("{picker}{report}")).await
}

#[cfg(test)]
mod dashboard_handler_tests {
    use axum::{
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use time::macros::date;

    use super::*;
    use crate::{
        state::AppState,
        testing::{browser, signed_in_state, spawn_app, spawn_fake_api},
    };

    fn dashboard_api() -> Router {
        Router::new()
            .route(
                "/api/v1/dashboard/summary",
                get(|| async {
                    Json(json!({
                        "date": "2024-05-01", "total_calories": 1500, "total_protein_g": 90,
                        "total_carbs_g": 160, "total_fat_g": 50, "total_fiber_g": 22.5,
                        "total_sugar_g": 30, "total_sodium_mg": 1900, "calories_goal": 2000,
                        "protein_goal_g": null, "carbs_goal_g": null, "fat_goal_g": null,
                        "total_meals": 3, "total_snacks": 1
                    }))
                }),
            )
            .route(
                "/api/v1/dashboard/progress",
                get(|| async { Json(json!({"labels": []})) }),
            )
            .route(
                "/api/v1/dashboard/insights",
                get(|| async {
                    Json(json!({"insights": [{"type": "tip", "title": "Stay Hydrated",
                        "message": "Drink water."}], "period": "7 days", "total_entries": 12}))
                }),
            )
            .route(
                "/api/v1/nutrition/goals/current",
                get(|| async {
                    (
                        StatusCode::NOT_FOUND,
                        Json(json!({"detail": "No active nutrition goal found"})),
                    )
                }),
            )
    }

    #[tokio::test]
    async fn dashboard_renders_summary_and_fallbacks() {
        let state = signed_in_state(dashboard_api()).await;
        let app = spawn_app(state).await;

        let res = browser().get(format!("{app}/dashboard")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = res.text().await.unwrap();
        assert!(html.contains("of 2000 goal"));
        assert!(html.contains("<strong>75.0%</strong>"));
        assert!(html.contains("Stay Hydrated"));
        assert!(html.contains("12 entries over 7 days"));
        assert!(html.contains("No progress data available"));
        assert!(html.contains("No active goal"));
        assert!(!html.contains(r#"class="notice notice-error""#));
    }

    #[tokio::test]
    async fn signed_out_visitors_go_to_login() {
        let base = spawn_fake_api(dashboard_api()).await;
        let app = spawn_app(AppState::fake(&format!("{base}/api/v1"))).await;

        let res = browser().get(format!("{app}/dashboard")).send().await.unwrap();
        assert!(res.status().is_redirection());
        assert_eq!(res.headers()["location"], "/login");
    }

    #[tokio::test]
    async fn expired_session_redirects_with_notice() {
        let expired = Router::new().route(
            "/api/v1/dashboard/weekly-summary",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"detail": "Could not validate credentials"})),
                )
            }),
        );
        let state = signed_in_state(expired).await;
        let app = spawn_app(state.clone()).await;

        let res = browser()
            .get(format!("{app}/dashboard/weekly"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.headers()["location"], "/login");
        assert!(!state.session.is_authenticated().await);

        let login = browser().get(format!("{app}/login")).send().await.unwrap();
        let html = login.text().await.unwrap();
        assert!(html.contains("Your session has expired. Please sign in again."));
    }

    #[test]
    fn month_query_falls_back_to_current_month() {
        let today = date!(2024 - 05 - 17);
        let q = |y: &str, m: &str| MonthQuery {
            year: Some(y.into()),
            month: Some(m.into()),
        };
        assert_eq!(MonthQuery::default().resolve(today), (2024, 5, true));
        assert_eq!(q("2023", "12").resolve(today), (2023, 12, true));
        assert_eq!(q("2023", "13").resolve(today), (2024, 5, false));
        assert_eq!(q("soon", "1").resolve(today), (2024, 5, false));
    }
}
