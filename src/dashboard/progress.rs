//! Consumed-versus-target figures for the summary and quick-stat cards.

use super::dto::DailySummary;
use crate::html::{escape, num};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
}

impl Nutrient {
    pub const ALL: [Nutrient; 4] = [Nutrient::Calories, Nutrient::Protein, Nutrient::Carbs, Nutrient::Fat];

    pub fn label(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::Protein => "Protein",
            Nutrient::Carbs => "Carbs",
            Nutrient::Fat => "Fat",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Nutrient::Calories => "",
            _ => "g",
        }
    }

    pub fn decimals(self) -> usize {
        match self {
            Nutrient::Calories => 0,
            _ => 1,
        }
    }

    /// Display form of an amount of this nutrient: `1500`, `80.5g`.
    pub fn amount(self, value: f64) -> String {
        format!("{}{}", num(value, self.decimals()), self.unit())
    }

    fn css(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Fat => "fat",
        }
    }
}

/// `total / goal * 100`, or `None` when there is no positive goal.
pub fn progress(total: f64, goal: Option<f64>) -> Option<f64> {
    match goal {
        Some(goal) if goal > 0.0 => Some(total / goal * 100.0),
        _ => None,
    }
}

/// Bar fill in percent; overshoot is capped at a full bar.
pub fn bar_width(progress: f64) -> f64 {
    progress.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutrientProgress {
    pub nutrient: Nutrient,
    pub total: f64,
    pub goal: Option<f64>,
    pub progress: Option<f64>,
}

impl NutrientProgress {
    pub fn new(nutrient: Nutrient, total: f64, goal: Option<f64>) -> Self {
        let goal = goal.filter(|g| *g > 0.0);
        Self {
            nutrient,
            total,
            goal,
            progress: progress(total, goal),
        }
    }

    pub fn from_summary(summary: &DailySummary) -> [NutrientProgress; 4] {
        [
            Self::new(Nutrient::Calories, summary.total_calories, summary.calories_goal),
            Self::new(Nutrient::Protein, summary.total_protein_g, summary.protein_goal_g),
            Self::new(Nutrient::Carbs, summary.total_carbs_g, summary.carbs_goal_g),
            Self::new(Nutrient::Fat, summary.total_fat_g, summary.fat_goal_g),
        ]
    }

    pub fn total_label(&self) -> String {
        self.nutrient.amount(self.total)
    }

    /// `of 2000` / `of 150.0g`, absent without a goal.
    pub fn goal_label(&self) -> Option<String> {
        self.goal.map(|g| format!("of {}", self.nutrient.amount(g)))
    }

    pub fn percent_label(&self) -> Option<String> {
        self.progress.map(|p| format!("{}%", num(p, 1)))
    }

    pub fn bar_width(&self) -> Option<f64> {
        self.progress.map(bar_width)
    }
}

/// The four headline figures at the top of the dashboard.
pub fn quick_stats(summary: Option<&DailySummary>) -> String {
    let items = match summary {
        Some(s) => NutrientProgress::from_summary(s),
        None => Nutrient::ALL.map(|n| NutrientProgress::new(n, 0.0, None)),
    };
    let items: String = items
        .iter()
        .map(|item| {
            let goal = item
                .goal_label()
                .map(|g| format!(r#"<p class="muted">{} goal</p>"#, escape(&g)))
                .unwrap_or_default();
            format!(
                r#"<div class="card stat stat-{}"><p class="muted">{}</p><p class="big">{}</p>{goal}</div>"#,
                item.nutrient.css(),
                item.nutrient.label(),
                item.total_label(),
            )
        })
        .collect();
    format!(r#"<div class="grid">{items}</div>"#)
}

/// "Today's nutrition" card: per-nutrient totals, goals and bars, then fiber/sugar/sodium.
pub fn summary_card(summary: Option<&DailySummary>) -> String {
    let Some(summary) = summary else {
        return r#"<div class="card"><h3>Today's Nutrition</h3><p class="empty">No nutrition data available for today<br><small>Start logging your food to see your progress!</small></p></div>"#.to_string();
    };

    let rows: String = NutrientProgress::from_summary(summary)
        .iter()
        .map(|item| {
            let goal = item
                .goal_label()
                .map(|g| format!(r#"<div class="muted">{g}</div>"#))
                .unwrap_or_default();
            let bar = match (item.percent_label(), item.bar_width()) {
                (Some(label), Some(width)) => format!(
                    r#"<div class="progress"><span class="muted">Progress</span> <strong>{label}</strong><div class="bar"><span class="{}" style="width:{}%"></span></div></div>"#,
                    item.nutrient.css(),
                    num(width, 1),
                ),
                _ => String::new(),
            };
            format!(
                r#"<div class="nutrient"><div><strong>{}</strong> {}{goal}</div>{bar}</div>"#,
                item.nutrient.label(),
                item.total_label(),
            )
        })
        .collect();

    format!(
        r#"<div class="card"><h3>Nutrition Summary · {date}</h3><div class="grid">{rows}</div>
<div class="grid extra"><div>Fiber <strong>{fiber}g</strong></div><div>Sugar <strong>{sugar}g</strong></div><div>Sodium <strong>{sodium}mg</strong></div></div></div>"#,
        date = crate::formats::format_date(summary.date),
        fiber = num(summary.total_fiber_g, 1),
        sugar = num(summary.total_sugar_g, 1),
        sodium = num(summary.total_sodium_mg, 0),
    )
}

/// Meals, snacks and fiber counters under the chart.
pub fn day_stats(summary: Option<&DailySummary>) -> String {
    let (meals, snacks, fiber) = summary
        .map(|s| (s.total_meals, s.total_snacks, s.total_fiber_g))
        .unwrap_or((0, 0, 0.0));
    format!(
        r#"<div class="grid"><div class="card"><p class="muted">Meals Today</p><p class="big">{meals}</p><p class="muted">main meals</p></div>
<div class="card"><p class="muted">Snacks</p><p class="big">{snacks}</p><p class="muted">snacks consumed</p></div>
<div class="card"><p class="muted">Fiber</p><p class="big">{}g</p><p class="muted">dietary fiber</p></div></div>"#,
        num(fiber, 1)
    )
}

#[cfg(test)]
mod progress_tests {
    use time::macros::date;

    use super::*;

    fn summary(calories: f64, goal: Option<f64>) -> DailySummary {
        DailySummary {
            total_calories: calories,
            calories_goal: goal,
            ..DailySummary::empty(date!(2024 - 05 - 01))
        }
    }

    #[test]
    fn progress_is_omitted_without_positive_goal() {
        assert_eq!(progress(500.0, None), None);
        assert_eq!(progress(500.0, Some(0.0)), None);
        assert_eq!(progress(500.0, Some(-10.0)), None);
    }

    #[test]
    fn progress_is_exact_ratio() {
        assert_eq!(progress(1500.0, Some(2000.0)), Some(75.0));
        assert_eq!(progress(45.0, Some(150.0)), Some(100.0 * 45.0 / 150.0));
        assert_eq!(progress(3000.0, Some(2000.0)), Some(150.0));
    }

    #[test]
    fn bar_caps_but_label_does_not() {
        let over = NutrientProgress::new(Nutrient::Calories, 3000.0, Some(2000.0));
        assert_eq!(over.bar_width(), Some(100.0));
        assert_eq!(over.percent_label().as_deref(), Some("150.0%"));
    }

    #[test]
    fn calories_example_renders_goal_bar_and_label() {
        let s = summary(1500.0, Some(2000.0));
        let [calories, ..] = NutrientProgress::from_summary(&s);
        assert_eq!(calories.total_label(), "1500");
        assert_eq!(calories.goal_label().as_deref(), Some("of 2000"));
        assert_eq!(calories.bar_width(), Some(75.0));
        assert_eq!(calories.percent_label().as_deref(), Some("75.0%"));

        let stats = quick_stats(Some(&s));
        assert!(stats.contains("<p class=\"big\">1500</p><p class=\"muted\">of 2000 goal</p>"));
        let card = summary_card(Some(&s));
        assert!(card.contains("<strong>75.0%</strong>"));
        assert!(card.contains("width:75.0%"));
    }

    #[test]
    fn missing_goal_hides_sub_displays() {
        let s = summary(1500.0, None);
        let card = summary_card(Some(&s));
        assert!(!card.contains("of "));
        assert!(!card.contains("Progress"));
        assert!(!quick_stats(Some(&s)).contains("goal"));
    }

    #[test]
    fn rounding_per_nutrient() {
        assert_eq!(Nutrient::Calories.amount(1499.6), "1500");
        assert_eq!(Nutrient::Protein.amount(80.46), "80.5g");
        let mut s = summary(0.0, None);
        s.total_sodium_mg = 1234.56;
        assert!(summary_card(Some(&s)).contains("<strong>1235mg</strong>"));
    }

    #[test]
    fn empty_states() {
        assert!(summary_card(None).contains("No nutrition data available for today"));
        assert!(quick_stats(None).contains("<p class=\"big\">0</p>"));
        assert!(day_stats(None).contains("0.0g"));
    }
}
