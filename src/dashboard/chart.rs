//! Horizontal per-day bars for the progress chart, one block per nutrient.

use super::{dto::ProgressData, progress::Nutrient};
use crate::html::{empty_state, escape, num};

/// Largest value across the actual and goal series; 0 for empty or all-zero series.
pub fn scale(actual: &[f64], goal: &[f64]) -> f64 {
    actual.iter().chain(goal).copied().fold(0.0, f64::max)
}

/// Bar length in percent of `scale`, capped at 100.
pub fn bar_height(value: f64, scale: f64) -> f64 {
    if scale > 0.0 {
        (value / scale * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayBar {
    pub label: String,
    pub value: f64,
    pub height: f64,
    /// Goal marker position, present only for days with a positive goal.
    pub goal_marker: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutrientChart {
    pub nutrient: Nutrient,
    pub scale: f64,
    pub days: Vec<DayBar>,
    pub has_goal: bool,
}

fn series(data: &ProgressData, nutrient: Nutrient) -> (&[f64], &[f64]) {
    match nutrient {
        Nutrient::Calories => (&data.calories, &data.calories_goal),
        Nutrient::Protein => (&data.protein, &data.protein_goal),
        Nutrient::Carbs => (&data.carbs, &data.carbs_goal),
        Nutrient::Fat => (&data.fat, &data.fat_goal),
    }
}

/// One chart per nutrient, or nothing when there are no days to show.
pub fn build_charts(data: &ProgressData) -> Vec<NutrientChart> {
    if data.labels.is_empty() {
        return Vec::new();
    }
    Nutrient::ALL
        .iter()
        .map(|&nutrient| {
            let (actual, goal) = series(data, nutrient);
            let scale = scale(actual, goal);
            let days = data
                .labels
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let value = actual.get(i).copied().unwrap_or(0.0);
                    let day_goal = goal.get(i).copied().unwrap_or(0.0);
                    DayBar {
                        label: label.clone(),
                        value,
                        height: bar_height(value, scale),
                        goal_marker: (day_goal > 0.0).then(|| bar_height(day_goal, scale)),
                    }
                })
                .collect();
            NutrientChart {
                nutrient,
                scale,
                days,
                has_goal: goal.iter().any(|g| *g > 0.0),
            }
        })
        .collect()
}

pub fn render(data: Option<&ProgressData>) -> String {
    let charts = data.map(build_charts).unwrap_or_default();
    if charts.is_empty() {
        return empty_state("No progress data available");
    }

    charts
        .iter()
        .map(|chart| {
            let rows: String = chart
                .days
                .iter()
                .map(|day| {
                    let marker = day
                        .goal_marker
                        .map(|pos| format!(r#"<div class="goal" style="left:{}%"></div>"#, num(pos, 1)))
                        .unwrap_or_default();
                    format!(
                        r#"<div class="chart-row"><span class="day">{}</span><div class="track"><div class="actual" style="width:{}%"></div>{marker}</div><span class="value">{}</span></div>"#,
                        escape(&day.label),
                        num(day.height, 1),
                        chart.nutrient.amount(day.value),
                    )
                })
                .collect();
            let legend = if chart.has_goal {
                "Actual · Goal (dashed)"
            } else {
                "Actual"
            };
            format!(
                r#"<div class="chart"><h4>{} <small class="muted">Max: {}</small></h4>{rows}<p class="legend">{legend}</p></div>"#,
                chart.nutrient.label(),
                chart.nutrient.amount(chart.scale),
            )
        })
        .collect()
}
