use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::dto::{GoalInput, GoalSet, GoalType, NutritionGoal};
use crate::{
    auth::{dto::User, extractors::CurrentUser},
    formats::format_date,
    forms::{FieldErrors, NumberRule},
    html::{escape, input, num, select},
    state::AppState,
    web::{api_failure, or_notice, render},
};

const CALORIES: NumberRule = NumberRule::between("Calories goal", 800.0, 5000.0, " calories");
const PROTEIN: NumberRule = NumberRule::between("Protein goal", 20.0, 500.0, "g protein");
const CARBS: NumberRule = NumberRule::between("Carbs goal", 20.0, 1000.0, "g carbs");
const FAT: NumberRule = NumberRule::between("Fat goal", 20.0, 200.0, "g fat");
const FIBER: NumberRule = NumberRule::between("Fiber goal", 10.0, 100.0, "g fiber");
const SUGAR: NumberRule = NumberRule::between("Sugar goal", 0.0, 200.0, "g sugar");
const SODIUM: NumberRule = NumberRule::between("Sodium goal", 500.0, 5000.0, "mg sodium");
const TARGET_WEIGHT: NumberRule = NumberRule::between("Target weight", 20.0, 300.0, "kg");

const DELETE_PROMPT: &str = "Are you sure you want to delete this goal?";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GoalForm {
    pub name: String,
    pub daily_calories: String,
    pub daily_protein_g: String,
    pub daily_carbs_g: String,
    pub daily_fat_g: String,
    pub daily_fiber_g: String,
    pub daily_sugar_g: String,
    pub daily_sodium_mg: String,
    pub target_weight_kg: String,
    pub goal_type: String,
}

fn amount(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl GoalForm {
    fn starting() -> Self {
        Self {
            daily_calories: "2000".into(),
            daily_protein_g: "150".into(),
            daily_carbs_g: "250".into(),
            daily_fat_g: "65".into(),
            daily_fiber_g: "25".into(),
            daily_sugar_g: "50".into(),
            daily_sodium_mg: "2300".into(),
            goal_type: GoalType::default().as_str().into(),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<GoalInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = errors.required("name", &self.name, "Goal name is required");
        let calories = errors.number("daily_calories", &self.daily_calories, CALORIES);
        let protein = errors.number("daily_protein_g", &self.daily_protein_g, PROTEIN);
        let carbs = errors.number("daily_carbs_g", &self.daily_carbs_g, CARBS);
        let fat = errors.number("daily_fat_g", &self.daily_fat_g, FAT);
        let fiber = errors.number("daily_fiber_g", &self.daily_fiber_g, FIBER);
        let sugar = errors.number("daily_sugar_g", &self.daily_sugar_g, SUGAR);
        let sodium = errors.number("daily_sodium_mg", &self.daily_sodium_mg, SODIUM);
        let target_weight_kg =
            errors.optional_number("target_weight_kg", &self.target_weight_kg, TARGET_WEIGHT);
        let goal_type = errors
            .optional_choice::<GoalType>("goal_type", &self.goal_type, "goal type")
            .unwrap_or_default();

        match (name, calories, protein, carbs, fat) {
            (Some(description), Some(calories), Some(protein), Some(carbs), Some(fat))
                if errors.is_empty() =>
            {
                Ok(GoalInput {
                    daily_calories: calories.round() as u32,
                    daily_protein_g: protein,
                    daily_carbs_g: carbs,
                    daily_fat_g: fat,
                    daily_fiber_g: fiber,
                    daily_sugar_g: sugar,
                    daily_sodium_mg: sodium,
                    target_weight_kg,
                    description,
                    goal_type,
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&NutritionGoal> for GoalForm {
    fn from(goal: &NutritionGoal) -> Self {
        Self {
            name: goal.name(),
            daily_calories: goal.daily_calories.to_string(),
            daily_protein_g: goal.daily_protein_g.to_string(),
            daily_carbs_g: goal.daily_carbs_g.to_string(),
            daily_fat_g: goal.daily_fat_g.to_string(),
            daily_fiber_g: amount(goal.daily_fiber_g),
            daily_sugar_g: amount(goal.daily_sugar_g),
            daily_sodium_mg: amount(goal.daily_sodium_mg),
            target_weight_kg: amount(goal.target_weight_kg),
            goal_type: goal.goal_type.as_str().into(),
        }
    }
}

/// Which form, if any, sits above the goal list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Editor {
    Closed,
    Create,
    Edit(i64),
}

fn editor_card(editor: Editor, form: &GoalForm, errors: &FieldErrors) -> String {
    let (title, action, submit) = match editor {
        Editor::Closed => return String::new(),
        Editor::Create => ("Create New Goal", "/goals".to_string(), "Create Goal"),
        Editor::Edit(id) => ("Edit Goal", format!("/goals/{id}"), "Update Goal"),
    };
    let goal_types: Vec<(&str, &str)> = GoalType::ALL.iter().map(|g| (g.as_str(), g.label())).collect();
    let number = |label: &str, name: &str, value: &str, range: &str| {
        input(label, name, "number", value, range, errors)
    };
    let fields = [
        input("Goal name", "name", "text", &form.name, "required", errors),
        select("Goal type", "goal_type", &goal_types, &form.goal_type, errors),
        number("Target weight (kg, optional)", "target_weight_kg", &form.target_weight_kg, r#"min="20" max="300" step="0.1""#),
        number("Daily calories", "daily_calories", &form.daily_calories, r#"min="800" max="5000""#),
        number("Protein (g)", "daily_protein_g", &form.daily_protein_g, r#"min="20" max="500" step="0.1""#),
        number("Carbs (g)", "daily_carbs_g", &form.daily_carbs_g, r#"min="20" max="1000" step="0.1""#),
        number("Fat (g)", "daily_fat_g", &form.daily_fat_g, r#"min="20" max="200" step="0.1""#),
        number("Fiber (g)", "daily_fiber_g", &form.daily_fiber_g, r#"min="10" max="100" step="0.1""#),
        number("Sugar (g)", "daily_sugar_g", &form.daily_sugar_g, r#"min="0" max="200" step="0.1""#),
        number("Sodium (mg)", "daily_sodium_mg", &form.daily_sodium_mg, r#"min="500" max="5000""#),
    ]
    .concat();
    format!(
        r#"<div class="card"><h3>{title}</h3><form method="post" action="{action}">{fields}<p class="actions"><a href="/goals">Cancel</a> <button>{submit}</button></p></form></div>"#
    )
}

fn goal_card(goal: &NutritionGoal) -> String {
    let badge = if goal.is_active {
        r#" <span class="badge">Active</span>"#
    } else {
        ""
    };
    let created = goal
        .created_at
        .map(|c| format!(r#"<p class="muted">Created {}</p>"#, format_date(c.date())))
        .unwrap_or_default();
    let target = goal
        .target_weight_kg
        .map(|w| format!("<p>Target weight: <strong>{} kg</strong></p>", num(w, 1)))
        .unwrap_or_default();
    let activate = if goal.is_active {
        r#"<span class="muted">Currently active</span>"#.to_string()
    } else {
        format!(
            r#"<form method="post" action="/goals/{}/activate"><button>Activate Goal</button></form>"#,
            goal.id
        )
    };
    format!(
        r#"<div class="card{current}"><h3>{name}{badge}</h3><p class="muted">{kind}</p>{created}
<table><tbody><tr><td>Calories</td><td>{calories}</td><td>Protein</td><td>{protein}g</td></tr><tr><td>Carbs</td><td>{carbs}g</td><td>Fat</td><td>{fat}g</td></tr></tbody></table>{target}
<div class="actions">{activate}<a href="/goals?edit={id}">Edit</a><form method="post" action="/goals/{id}/delete" onsubmit="return confirm('{DELETE_PROMPT}')"><button class="danger">Delete</button></form></div></div>"#,
        current = if goal.is_active { " current" } else { "" },
        name = escape(&goal.name()),
        kind = goal.goal_type.label(),
        calories = goal.daily_calories,
        protein = num(goal.daily_protein_g, 1),
        carbs = num(goal.daily_carbs_g, 1),
        fat = num(goal.daily_fat_g, 1),
        id = goal.id,
    )
}

fn goals_body(goals: &GoalSet, editor: Editor, form: &GoalForm, errors: &FieldErrors) -> String {
    let header = if editor == Editor::Closed {
        r#"<h2>Your Goals <a href="/goals?new=1"><small>Create New Goal</small></a></h2>"#
    } else {
        "<h2>Your Goals</h2>"
    };
    let list = if goals.is_empty() {
        r#"<div class="card empty"><h3>No goals yet</h3><p>Create your first nutrition goal to get started</p><p><a href="/goals?new=1">Create Your First Goal</a></p></div>"#
            .to_string()
    } else {
        format!(
            r#"<div class="grid">{}</div>"#,
            goals.iter().map(goal_card).collect::<String>()
        )
    };
    format!(
        r#"<p class="muted">Set and manage your nutrition targets</p>{}{header}{list}"#,
        editor_card(editor, form, errors)
    )
}

async fn render_goals(
    state: &AppState,
    user: &User,
    goals: &GoalSet,
    editor: Editor,
    form: &GoalForm,
    errors: &FieldErrors,
) -> Response {
    let body = goals_body(goals, editor, form, errors);
    render(state, "Nutrition Goals", Some(user), &body).await
}

/// Lists the goals and renders them under `editor`. An edit form without submitted values
/// is filled from the goal being edited.
async fn show(
    state: &AppState,
    user: &User,
    mut editor: Editor,
    form: Option<GoalForm>,
    errors: FieldErrors,
) -> Response {
    let goals = or_notice!(state, state.api.goals().await, "Failed to load goals");
    let goals = GoalSet::new(goals.unwrap_or_default());

    let form = match (form, editor) {
        (Some(form), _) => form,
        (None, Editor::Edit(id)) => match goals.get(id) {
            Some(goal) => GoalForm::from(goal),
            None => {
                state.notices.error("Goal not found").await;
                editor = Editor::Closed;
                GoalForm::starting()
            }
        },
        (None, _) => GoalForm::starting(),
    };
    render_goals(state, user, &goals, editor, &form, &errors).await
}

#[derive(Debug, Default, Deserialize)]
pub struct GoalsQuery {
    pub new: Option<String>,
    pub edit: Option<i64>,
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn goals_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<GoalsQuery>,
) -> Response {
    let editor = match (query.edit, query.new.is_some()) {
        (Some(id), _) => Editor::Edit(id),
        (None, true) => Editor::Create,
        (None, false) => Editor::Closed,
    };
    show(&state, &user, editor, None, FieldErrors::default()).await
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn create_goal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<GoalForm>,
) -> Response {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            warn!(fields = errors.len(), "goal form rejected");
            return show(&state, &user, Editor::Create, Some(form), errors).await;
        }
    };
    let created = or_notice!(state, state.api.create_goal(&input).await, "Failed to create goal");
    match created {
        Some(goal) => {
            info!(goal_id = goal.id, "goal created");
            state.notices.success("Goal created successfully!").await;
            Redirect::to("/goals").into_response()
        }
        None => show(&state, &user, Editor::Create, Some(form), FieldErrors::default()).await,
    }
}

#[instrument(skip(state, user, form), fields(user_id = user.id))]
pub async fn update_goal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Form(form): Form<GoalForm>,
) -> Response {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            warn!(fields = errors.len(), "goal form rejected");
            return show(&state, &user, Editor::Edit(id), Some(form), errors).await;
        }
    };
    let updated = or_notice!(state, state.api.update_goal(id, &input).await, "Failed to update goal");
    match updated {
        Some(_) => {
            state.notices.success("Goal updated successfully!").await;
            Redirect::to("/goals").into_response()
        }
        None => show(&state, &user, Editor::Edit(id), Some(form), FieldErrors::default()).await,
    }
}

#[instrument(skip(state, _user), fields(user_id = _user.id))]
pub async fn delete_goal(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> Response {
    match state.api.delete_goal(id).await {
        Ok(_) => state.notices.success("Goal deleted successfully!").await,
        Err(e) => {
            if let Some(redirect) = api_failure(&state, &e, "Failed to delete goal").await {
                return redirect;
            }
        }
    }
    Redirect::to("/goals").into_response()
}

/// Activates `id` remotely, then re-lists and enforces the single active goal locally so a
/// stale listing never shows two.
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn activate_goal(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Response {
    if let Err(e) = state.api.activate_goal(id).await {
        if let Some(redirect) = api_failure(&state, &e, "Failed to activate goal").await {
            return redirect;
        }
        return Redirect::to("/goals").into_response();
    }
    state.notices.success("Goal activated successfully!").await;

    let goals = or_notice!(state, state.api.goals().await, "Failed to load goals");
    let mut goals = GoalSet::new(goals.unwrap_or_default());
    if !goals.activate(id) {
        warn!(goal_id = id, "activated goal missing from listing");
    }
    render_goals(
        &state,
        &user,
        &goals,
        Editor::Closed,
        &GoalForm::starting(),
        &FieldErrors::default(),
    )
    .await
}
