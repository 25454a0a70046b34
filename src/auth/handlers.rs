use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::dto::{ActivityLevel, Gender, RegisterRequest};
use crate::{
    forms::{non_blank, FieldErrors, NumberRule},
    html::{input, select},
    state::AppState,
    web::render,
};

const AGE: NumberRule = NumberRule::between("Age", 1.0, 120.0, " years");
const WEIGHT: NumberRule = NumberRule::between("Weight", 20.0, 300.0, "kg");
const HEIGHT: NumberRule = NumberRule::between("Height", 100.0, 250.0, "cm");

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    fn validate(&self) -> Result<(String, String), FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = errors.email("email", &self.email);
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        match email {
            Some(email) if errors.is_empty() => Ok((email, self.password.clone())),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub gender: String,
    pub weight_kg: String,
    pub height_cm: String,
    pub activity_level: String,
}

impl RegisterForm {
    fn validate(&self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = errors.email("email", &self.email);
        let username = errors.required("username", &self.username, "Username is required");
        if let Some(name) = &username {
            let len = name.chars().count();
            if !(3..=100).contains(&len) {
                errors.add("username", "Username must be between 3 and 100 characters");
            }
        }
        let password = errors.new_password("password", &self.password);
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }
        let age = errors.optional_whole("age", &self.age, AGE);
        let gender = errors.optional_choice::<Gender>("gender", &self.gender, "gender");
        let weight_kg = errors.optional_number("weight_kg", &self.weight_kg, WEIGHT);
        let height_cm = errors.optional_number("height_cm", &self.height_cm, HEIGHT);
        let activity_level =
            errors.optional_choice::<ActivityLevel>("activity_level", &self.activity_level, "activity level");

        match (email, username, password) {
            (Some(email), Some(username), Some(password)) if errors.is_empty() => Ok(RegisterRequest {
                email,
                username,
                password,
                first_name: non_blank(&self.first_name),
                last_name: non_blank(&self.last_name),
                age,
                gender,
                weight_kg,
                height_cm,
                activity_level,
            }),
            _ => Err(errors),
        }
    }
}

fn login_form(form: &LoginForm, errors: &FieldErrors) -> String {
    format!(
        r#"<div class="card"><form method="post" action="/login">{}{}<p><button>Sign in</button></p></form>
<p class="muted">No account yet? <a href="/register">Create one</a>.</p></div>"#,
        input("Email", "email", "email", &form.email, "required", errors),
        input("Password", "password", "password", "", "required", errors),
    )
}

pub(crate) fn gender_options() -> Vec<(&'static str, &'static str)> {
    std::iter::once(("", "Prefer not to say"))
        .chain(Gender::ALL.iter().map(|g| (g.as_str(), g.label())))
        .collect()
}

pub(crate) fn activity_options() -> Vec<(&'static str, &'static str)> {
    std::iter::once(("", "Not set"))
        .chain(ActivityLevel::ALL.iter().map(|a| (a.as_str(), a.label())))
        .collect()
}

fn register_form(form: &RegisterForm, errors: &FieldErrors) -> String {
    let account = [
        input("Email", "email", "email", &form.email, "required", errors),
        input("Username", "username", "text", &form.username, "required", errors),
        input("Password", "password", "password", "", "required", errors),
        input("Confirm password", "confirm_password", "password", "", "required", errors),
    ]
    .concat();
    let profile = [
        input("First name", "first_name", "text", &form.first_name, "", errors),
        input("Last name", "last_name", "text", &form.last_name, "", errors),
        input("Age", "age", "number", &form.age, r#"min="1" max="120""#, errors),
        select("Gender", "gender", &gender_options(), &form.gender, errors),
        input("Weight (kg)", "weight_kg", "number", &form.weight_kg, r#"step="0.1""#, errors),
        input("Height (cm)", "height_cm", "number", &form.height_cm, r#"step="0.1""#, errors),
        select(
            "Activity level",
            "activity_level",
            &activity_options(),
            &form.activity_level,
            errors,
        ),
    ]
    .concat();
    format!(
        r#"<div class="card"><form method="post" action="/register">{account}<h3>About you (optional)</h3>{profile}<p><button>Create account</button></p></form>
<p class="muted">Already registered? <a href="/login">Sign in</a>.</p></div>"#
    )
}

#[instrument(skip(state))]
pub async fn login_page(State(state): State<AppState>) -> Response {
    if state.session.is_authenticated().await {
        return Redirect::to("/dashboard").into_response();
    }
    render(&state, "Sign in", None, &login_form(&LoginForm::default(), &FieldErrors::default())).await
}

#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let (email, password) = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            warn!(fields = errors.len(), "login form rejected");
            return render(&state, "Sign in", None, &login_form(&form, &errors)).await;
        }
    };

    match state.session.login(&email, &password).await {
        Ok(user) => {
            state
                .notices
                .success(format!("Welcome back, {}!", user.display_name()))
                .await;
            Redirect::to("/dashboard").into_response()
        }
        Err(e) => {
            state.notices.error(e.to_string()).await;
            render(&state, "Sign in", None, &login_form(&form, &FieldErrors::default())).await
        }
    }
}

#[instrument(skip(state))]
pub async fn register_page(State(state): State<AppState>) -> Response {
    if state.session.is_authenticated().await {
        return Redirect::to("/dashboard").into_response();
    }
    let body = register_form(&RegisterForm::default(), &FieldErrors::default());
    render(&state, "Create account", None, &body).await
}

#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            warn!(fields = errors.len(), "registration form rejected");
            return render(&state, "Create account", None, &register_form(&form, &errors)).await;
        }
    };

    match state.session.register(request).await {
        Ok(user) => {
            info!(user_id = user.id, "registered");
            state
                .notices
                .success(format!("Welcome to MealMind, {}!", user.display_name()))
                .await;
            Redirect::to("/dashboard").into_response()
        }
        Err(e) => {
            state.notices.error(e.to_string()).await;
            let body = register_form(&form, &FieldErrors::default());
            render(&state, "Create account", None, &body).await
        }
    }
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Response {
    match state.session.logout().await {
        Ok(()) => state.notices.info("You have been signed out.").await,
        Err(e) => state.notices.error(e.to_string()).await,
    }
    Redirect::to("/login").into_response()
}
