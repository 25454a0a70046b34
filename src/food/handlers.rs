use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use tracing::{info, instrument, warn};

use super::dto::{FoodItem, FoodLogCreate, FoodLogEntry, MealType, NaturalLanguageEntry, ParsedFoodEntry};
use crate::{
    auth::{dto::User, extractors::CurrentUser},
    dashboard::dto::DailySummary,
    formats::{format_clock, format_date, parse_clock, parse_date},
    forms::{non_blank, FieldErrors, NumberRule},
    html::{empty_state, escape, hidden, input, num, or_dash, select, textarea},
    state::AppState,
    web::{api_failure, or_notice, render},
};

const QUANTITY: NumberRule = NumberRule::at_least("Quantity", 0.1);
const TEXT_LIMIT: usize = 500;
const SELECT_FOOD: &str = "Please select a food item";
const LOGGED: &str = "Food logged successfully!";
const LOG_FAILED: &str = "Failed to log food";

const UNITS: [(&str, &str); 6] = [
    ("g", "grams (g)"),
    ("oz", "ounces (oz)"),
    ("cup", "cups"),
    ("tbsp", "tablespoons (tbsp)"),
    ("tsp", "teaspoons (tsp)"),
    ("piece", "pieces"),
];

fn now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

fn meal_options() -> Vec<(&'static str, &'static str)> {
    MealType::ALL.iter().map(|m| (m.as_str(), m.label())).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Natural,
    Manual,
}

impl Tab {
    fn from_query(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("manual") => Tab::Manual,
            _ => Tab::Natural,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Tab::Natural => "natural",
            Tab::Manual => "manual",
        }
    }
}

fn meal_type(errors: &mut FieldErrors, raw: &str) -> Option<MealType> {
    if raw.trim().is_empty() {
        errors.add("meal_type", "Meal type is required");
        return None;
    }
    errors.optional_choice("meal_type", raw, "meal type")
}

/// Combines the date and time inputs into the logged meal time.
fn meal_time(errors: &mut FieldErrors, date: &str, time: &str) -> Option<PrimitiveDateTime> {
    let date = if date.trim().is_empty() {
        errors.add("date", "Date is required");
        None
    } else {
        match parse_date(date) {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("date", "Invalid date");
                None
            }
        }
    };
    let time = if time.trim().is_empty() {
        errors.add("time", "Time is required");
        None
    } else {
        match parse_clock(time) {
            Ok(time) => Some(time),
            Err(_) => {
                errors.add("time", "Invalid time");
                None
            }
        }
    };
    Some(PrimitiveDateTime::new(date?, time?))
}

/// Free-text entry ("2 rotis and a bowl of dal").
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NaturalForm {
    pub text: String,
    pub meal_type: String,
    pub date: String,
    pub time: String,
}

impl NaturalForm {
    fn starting_at(now: PrimitiveDateTime) -> Self {
        Self {
            text: String::new(),
            meal_type: MealType::default().as_str().into(),
            date: format_date(now.date()),
            time: format_clock(now.time()),
        }
    }

    fn validate(&self) -> Result<NaturalLanguageEntry, FieldErrors> {
        let mut errors = FieldErrors::default();
        let text = errors.required("text", &self.text, "Please describe what you ate");
        if text.as_ref().is_some_and(|t| t.chars().count() > TEXT_LIMIT) {
            errors.add("text", format!("Description must be at most {TEXT_LIMIT} characters"));
        }
        let meal = meal_type(&mut errors, &self.meal_type);
        let at = meal_time(&mut errors, &self.date, &self.time);

        match text {
            Some(text) if errors.is_empty() => Ok(NaturalLanguageEntry {
                text,
                meal_type: meal,
                meal_time: at,
            }),
            _ => Err(errors),
        }
    }
}

/// Entry for a food picked from the search results. `q` carries the search along so the
/// results survive a failed submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManualForm {
    pub q: String,
    pub food_id: String,
    pub quantity: String,
    pub unit: String,
    pub meal_type: String,
    pub date: String,
    pub time: String,
    pub notes: String,
}

impl ManualForm {
    fn starting_at(now: PrimitiveDateTime) -> Self {
        Self {
            quantity: "100".into(),
            unit: "g".into(),
            meal_type: MealType::default().as_str().into(),
            date: format_date(now.date()),
            time: format_clock(now.time()),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<FoodLogCreate, FieldErrors> {
        let mut errors = FieldErrors::default();
        let food_id = match self.food_id.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("food_id", SELECT_FOOD);
                None
            }
        };
        let quantity = errors.number("quantity", &self.quantity, QUANTITY);
        let unit = errors.required("unit", &self.unit, "Unit is required");
        let meal = meal_type(&mut errors, &self.meal_type);
        let at = meal_time(&mut errors, &self.date, &self.time);

        match (food_id, quantity, unit, meal, at) {
            (Some(food_id), Some(quantity), Some(unit), Some(meal_type), Some(meal_time))
                if errors.is_empty() =>
            {
                Ok(FoodLogCreate {
                    food_id,
                    quantity,
                    weight_grams: (unit == "g").then_some(quantity),
                    unit,
                    meal_type,
                    meal_time,
                    notes: non_blank(&self.notes),
                })
            }
            _ => Err(errors),
        }
    }
}

/// Everything the food log page shows.
#[derive(Debug, Clone)]
struct FoodPage {
    tab: Tab,
    day: Date,
    natural: NaturalForm,
    natural_errors: FieldErrors,
    preview: Option<ParsedFoodEntry>,
    manual: ManualForm,
    manual_errors: FieldErrors,
    results: Vec<FoodItem>,
    selected: Option<FoodItem>,
    entries: Vec<FoodLogEntry>,
    meal_filter: Option<MealType>,
}

impl FoodPage {
    fn new(tab: Tab, now: PrimitiveDateTime) -> Self {
        Self {
            tab,
            day: now.date(),
            natural: NaturalForm::starting_at(now),
            natural_errors: FieldErrors::default(),
            preview: None,
            manual: ManualForm::starting_at(now),
            manual_errors: FieldErrors::default(),
            results: Vec::new(),
            selected: None,
            entries: Vec::new(),
            meal_filter: None,
        }
    }

    /// Picks the day to list from a submitted date input, keeping the current one otherwise.
    fn with_day(mut self, raw: &str) -> Self {
        if let Ok(day) = parse_date(raw) {
            self.day = day;
        }
        self
    }

    fn body(&self) -> String {
        let day = format_date(self.day);
        let tab_link = |tab: Tab, label: &str| {
            format!(
                r#"<a href="/food?tab={}&amp;date={day}"{}>{label}</a>"#,
                tab.as_str(),
                if tab == self.tab { r#" class="active""# } else { "" }
            )
        };
        let tabs = format!(
            r#"<p class="tabs">{}{}</p>"#,
            tab_link(Tab::Natural, "Natural Language"),
            tab_link(Tab::Manual, "Manual Entry")
        );
        let panel = match self.tab {
            Tab::Natural => self.natural_panel(),
            Tab::Manual => self.manual_panel(),
        };
        format!("{tabs}{panel}{}", self.day_log())
    }

    fn natural_panel(&self) -> String {
        let form = &self.natural;
        let errors = &self.natural_errors;
        let fields = [
            textarea(
                "What did you eat?",
                "text",
                &form.text,
                r#"rows="3" maxlength="500" placeholder="e.g., 2 slices of whole wheat bread with 1 tablespoon of peanut butter""#,
                errors,
            ),
            input("Date", "date", "date", &form.date, "required", errors),
            input("Time", "time", "time", &form.time, "required", errors),
            select("Meal type", "meal_type", &meal_options(), &form.meal_type, errors),
        ]
        .concat();
        let preview = self
            .preview
            .as_ref()
            .map(|parsed| {
                if parsed.foods.is_empty() {
                    return empty_state("No foods recognised in that description");
                }
                let rows: String = parsed
                    .foods
                    .iter()
                    .map(|f| {
                        format!(
                            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                            escape(&f.item),
                            num(f.quantity, 1),
                            escape(&f.unit)
                        )
                    })
                    .collect();
                format!(
                    r#"<div class="card"><h3>Parsed foods <small class="muted">confidence {}%</small></h3><table><thead><tr><th>Item</th><th>Quantity</th><th>Unit</th></tr></thead><tbody>{rows}</tbody></table></div>"#,
                    num(parsed.confidence * 100.0, 0)
                )
            })
            .unwrap_or_default();
        format!(
            r#"<div class="card"><h3>Log Food in Natural Language</h3><p class="muted">Describe what you ate in plain English.</p>
<form method="post" action="/food/natural">{fields}<p><button formaction="/food/parse" class="secondary">Preview</button> <button>Log Food</button></p></form></div>{preview}"#
        )
    }

    fn manual_panel(&self) -> String {
        let form = &self.manual;
        let day = format_date(self.day);
        let search = format!(
            r#"<form method="get" action="/food">{}{}<input name="q" type="search" value="{}" placeholder="Search for food items..."> <button>Search</button></form>"#,
            hidden("tab", Tab::Manual.as_str()),
            hidden("date", &day),
            escape(&form.q),
        );
        let results = if self.results.is_empty() {
            if form.q.trim().is_empty() {
                String::new()
            } else {
                empty_state("No foods found")
            }
        } else {
            let selected_id = self.selected.as_ref().map(|f| f.id);
            self.results
                .iter()
                .map(|food| {
                    format!(
                        r#"<form method="get" action="/food" class="result{}">{}{}{}{}<button><strong>{}</strong>{} <span class="muted">{} per 100g</span></button></form>"#,
                        if selected_id == Some(food.id) { " selected" } else { "" },
                        hidden("tab", Tab::Manual.as_str()),
                        hidden("date", &day),
                        hidden("q", &form.q),
                        hidden("food_id", &food.id.to_string()),
                        escape(&food.name),
                        food.brand
                            .as_deref()
                            .map(|b| format!(" ({})", escape(b)))
                            .unwrap_or_default(),
                        per_100g(food),
                    )
                })
                .collect()
        };

        let entry = match &self.selected {
            Some(food) => {
                let errors = &self.manual_errors;
                let fields = [
                    hidden("q", &form.q),
                    hidden("food_id", &food.id.to_string()),
                    input("Quantity", "quantity", "number", &form.quantity, r#"step="0.1" min="0.1""#, errors),
                    select("Unit", "unit", &UNITS, &form.unit, errors),
                    select("Meal type", "meal_type", &meal_options(), &form.meal_type, errors),
                    input("Date", "date", "date", &form.date, "required", errors),
                    input("Time", "time", "time", &form.time, "required", errors),
                    textarea("Notes", "notes", &form.notes, r#"rows="2""#, errors),
                ]
                .concat();
                format!(
                    r#"<div class="card"><h3>Log {}</h3><form method="post" action="/food/manual">{fields}<p><button>Log Food</button></p></form></div>"#,
                    escape(&food.name)
                )
            }
            None => r#"<p class="muted">Select a food from the search results to log it.</p>"#.into(),
        };
        format!(r#"<div class="card"><h3>Search for Food</h3>{search}{results}</div>{entry}"#)
    }

    fn day_log(&self) -> String {
        let day = format_date(self.day);
        let filter_options: Vec<(&str, &str)> = std::iter::once(("", "All meals"))
            .chain(meal_options())
            .collect();
        let filter = format!(
            r#"<form method="get" action="/food">{}<input type="date" name="date" value="{day}"> <select name="meal_type">{}</select> <button class="secondary">Show</button></form>"#,
            hidden("tab", self.tab.as_str()),
            filter_options
                .iter()
                .map(|(value, label)| {
                    let chosen = self.meal_filter.map(MealType::as_str).unwrap_or("") == *value;
                    format!(
                        r#"<option value="{value}"{}>{label}</option>"#,
                        if chosen { " selected" } else { "" }
                    )
                })
                .collect::<String>(),
        );
        if self.entries.is_empty() {
            return format!(
                r#"<div class="card"><h3>Logged on {day}</h3>{filter}{}</div>"#,
                empty_state("No food logged for this day")
            );
        }

        let rows: String = self
            .entries
            .iter()
            .map(|e| {
                format!(
                    r#"<tr><td>{}</td><td>{}</td><td><a href="/food/log/{}">{}</a></td><td>{} {}</td><td>{}</td><td>{}g</td><td>{}g</td><td>{}g</td></tr>"#,
                    format_clock(e.meal_time.time()),
                    e.meal_type.label(),
                    e.id,
                    escape(&e.food_name),
                    num(e.quantity, 1),
                    escape(&e.unit),
                    num(e.calories, 0),
                    num(e.protein, 1),
                    num(e.carbs, 1),
                    num(e.fat, 1),
                )
            })
            .collect();
        let totals = DailySummary::from_entries(self.day, &self.entries, None);
        format!(
            r#"<div class="card"><h3>Logged on {day}</h3>{filter}<table><thead><tr><th>Time</th><th>Meal</th><th>Food</th><th>Amount</th><th>Calories</th><th>Protein</th><th>Carbs</th><th>Fat</th></tr></thead><tbody>{rows}</tbody>
<tfoot><tr><th colspan="4">Total · {} meals, {} snacks</th><th>{}</th><th>{}g</th><th>{}g</th><th>{}g</th></tr></tfoot></table></div>"#,
            totals.total_meals,
            totals.total_snacks,
            num(totals.total_calories, 0),
            num(totals.total_protein_g, 1),
            num(totals.total_carbs_g, 1),
            num(totals.total_fat_g, 1),
        )
    }
}

fn per_100g(food: &FoodItem) -> String {
    let grams = |v: Option<f64>| v.map(|v| format!("{}g", num(v, 1))).unwrap_or_else(|| "-".into());
    format!(
        "{} cal, {} protein, {} carbs, {} fat",
        food.calories_per_100g.map(|c| num(c, 0)).unwrap_or_else(|| "-".into()),
        grams(food.protein_per_100g),
        grams(food.carbs_per_100g),
        grams(food.fat_per_100g),
    )
}

/// Fills in the search results and the day's entries, then renders.
async fn show(state: &AppState, user: &User, mut page: FoodPage) -> Response {
    if page.tab == Tab::Manual {
        let results = or_notice!(state, state.api.search_foods(&page.manual.q).await, "Search failed");
        page.results = results.unwrap_or_default();
        let food_id = page.manual.food_id.trim().parse::<i64>().ok();
        page.selected = food_id.and_then(|id| page.results.iter().find(|f| f.id == id).cloned());
    }
    let entries = or_notice!(
        state,
        state.api.food_logs(Some(page.day), page.meal_filter).await,
        "Failed to load food log"
    );
    page.entries = entries.unwrap_or_default();
    render(state, "Food Log", Some(user), &page.body()).await
}

#[derive(Debug, Default, Deserialize)]
pub struct FoodQuery {
    pub tab: Option<String>,
    pub q: Option<String>,
    pub food_id: Option<String>,
    pub date: Option<String>,
    pub meal_type: Option<String>,
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn food_log_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<FoodQuery>,
) -> Response {
    let now = now_utc();
    let mut page = FoodPage::new(Tab::from_query(query.tab.as_deref()), now);

    if let Some(raw) = query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        match parse_date(raw) {
            Ok(day) => {
                page.day = day;
                page.natural.date = format_date(day);
                page.manual.date = format_date(day);
            }
            Err(_) => state.notices.error(format!("Invalid date: {raw}")).await,
        }
    }
    page.meal_filter = query.meal_type.as_deref().and_then(|m| m.parse().ok());
    page.manual.q = query.q.unwrap_or_default();
    page.manual.food_id = query.food_id.unwrap_or_default();

    show(&state, &user, page).await
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn parse_natural(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<NaturalForm>,
) -> Response {
    let mut page = FoodPage::new(Tab::Natural, now_utc()).with_day(&form.date);
    match form.validate() {
        Ok(entry) => {
            page.preview = or_notice!(
                state,
                state.api.parse_food(&entry.text, entry.meal_type).await,
                "Failed to parse food description"
            );
        }
        Err(errors) => page.natural_errors = errors,
    }
    page.natural = form;
    show(&state, &user, page).await
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn log_natural(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<NaturalForm>,
) -> Response {
    let mut page = FoodPage::new(Tab::Natural, now_utc()).with_day(&form.date);
    match form.validate() {
        Ok(entry) => {
            let logged = or_notice!(state, state.api.log_natural(&entry).await, LOG_FAILED);
            if let Some(logged) = logged {
                info!(entries = logged.len(), "natural language entry logged");
                state.notices.success(LOGGED).await;
                return Redirect::to(&format!("/food?date={}", format_date(page.day))).into_response();
            }
        }
        Err(errors) => {
            warn!(fields = errors.len(), "food entry rejected");
            page.natural_errors = errors;
        }
    }
    page.natural = form;
    show(&state, &user, page).await
}

#[instrument(skip_all, fields(user_id = user.id, food_id = %form.food_id))]
pub async fn log_manual(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ManualForm>,
) -> Response {
    let mut page = FoodPage::new(Tab::Manual, now_utc()).with_day(&form.date);
    match form.validate() {
        Ok(entry) => {
            let logged = or_notice!(state, state.api.log_food(&entry).await, LOG_FAILED);
            if let Some(logged) = logged {
                info!(entry_id = logged.id, "food logged");
                state.notices.success(LOGGED).await;
                return Redirect::to(&format!("/food?tab=manual&date={}", format_date(page.day)))
                    .into_response();
            }
        }
        Err(errors) => {
            warn!(fields = errors.len(), "food entry rejected");
            if errors.get("food_id").is_some() {
                state.notices.error(SELECT_FOOD).await;
            }
            page.manual_errors = errors;
        }
    }
    page.manual = form;
    show(&state, &user, page).await
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn entry_detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Response {
    let entry = match state.api.food_log(id).await {
        Ok(entry) => entry,
        Err(e) if e.is_not_found() => {
            state.notices.error("Food log entry not found").await;
            return Redirect::to("/food").into_response();
        }
        Err(e) => {
            if let Some(redirect) = api_failure(&state, &e, "Failed to load food log entry").await {
                return redirect;
            }
            return Redirect::to("/food").into_response();
        }
    };

    let row = |name: &str, value: String| format!("<tr><th>{name}</th><td>{value}</td></tr>");
    let rows = [
        row("Meal", entry.meal_type.label().to_string()),
        row(
            "Time",
            format!(
                "{} {}",
                format_date(entry.meal_time.date()),
                format_clock(entry.meal_time.time())
            ),
        ),
        row("Amount", format!("{} {}", num(entry.quantity, 1), escape(&entry.unit))),
        row("Weight", or_dash(entry.weight_grams.map(|w| format!("{}g", num(w, 1))))),
        row("Calories", num(entry.calories, 0)),
        row("Protein", format!("{}g", num(entry.protein, 1))),
        row("Carbs", format!("{}g", num(entry.carbs, 1))),
        row("Fat", format!("{}g", num(entry.fat, 1))),
        row("Fiber", format!("{}g", num(entry.fiber, 1))),
        row("Sugar", format!("{}g", num(entry.sugar, 1))),
        row("Sodium", format!("{}mg", num(entry.sodium, 0))),
        row("Notes", or_dash(entry.notes.clone())),
    ]
    .concat();
    let body = format!(
        r#"<div class="card"><table><tbody>{rows}</tbody></table></div><p><a href="/food?date={}">Back to the food log</a></p>"#,
        format_date(entry.meal_time.date())
    );
    render(&state, &entry.food_name, Some(&user), &body).await
}
