use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::{
    bmi::bmi,
    dto::{PasswordChange, ProfileUpdate},
};
use crate::{
    auth::{
        dto::{ActivityLevel, Gender, User, UserPatch},
        extractors::CurrentUser,
        handlers::{activity_options, gender_options},
    },
    formats::format_date,
    forms::{non_blank, FieldErrors, NumberRule},
    html::{escape, input, num, or_dash, select},
    state::AppState,
    web::{api_failure, or_notice, render},
};

const AGE: NumberRule = NumberRule::between("Age", 1.0, 120.0, " years");
const WEIGHT: NumberRule = NumberRule::between("Weight", 20.0, 300.0, "kg");
const HEIGHT: NumberRule = NumberRule::between("Height", 100.0, 250.0, "cm");

const UPDATE_FAILED: &str = "Failed to update profile";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub gender: String,
    pub weight_kg: String,
    pub height_cm: String,
    pub activity_level: String,
}

impl From<&User> for ProfileForm {
    fn from(user: &User) -> Self {
        let text = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            age: user.age.map(|a| a.to_string()).unwrap_or_default(),
            gender: user.gender.map(|g| g.as_str().to_string()).unwrap_or_default(),
            weight_kg: text(user.weight_kg),
            height_cm: text(user.height_cm),
            activity_level: user
                .activity_level
                .map(|a| a.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

impl ProfileForm {
    fn validate(&self) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = errors.email("email", &self.email);
        let age = errors.optional_whole("age", &self.age, AGE);
        let gender = errors.optional_choice::<Gender>("gender", &self.gender, "gender");
        let weight_kg = errors.optional_number("weight_kg", &self.weight_kg, WEIGHT);
        let height_cm = errors.optional_number("height_cm", &self.height_cm, HEIGHT);
        let activity_level =
            errors.optional_choice::<ActivityLevel>("activity_level", &self.activity_level, "activity level");

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ProfileUpdate {
            email,
            first_name: non_blank(&self.first_name),
            last_name: non_blank(&self.last_name),
            age,
            gender,
            weight_kg,
            height_cm,
            activity_level,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordForm {
    fn validate(&self) -> Result<PasswordChange, FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.current_password.is_empty() {
            errors.add("current_password", "Current password is required");
        }
        let new_password = errors.new_password("new_password", &self.new_password);
        if self.new_password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }
        match new_password {
            Some(new_password) if errors.is_empty() => Ok(PasswordChange {
                current_password: self.current_password.clone(),
                new_password,
            }),
            _ => Err(errors),
        }
    }
}

/// State of the profile editor card.
#[derive(Debug, Default)]
enum Editor {
    #[default]
    Closed,
    /// Open on the profile as last fetched.
    Open,
    Submitted(ProfileForm, FieldErrors),
}

/// What the profile page shows below the account summary.
#[derive(Debug, Default)]
struct ProfileView {
    edit: Editor,
    password_errors: FieldErrors,
}

fn summary_card(user: &User) -> String {
    let row = |name: &str, value: String| format!("<tr><th>{name}</th><td>{value}</td></tr>");
    let rows = [
        row("Name", escape(&user.display_name())),
        row("Username", escape(&user.username)),
        row("Email", escape(&user.email)),
        row("Age", or_dash(user.age.map(|a| a.to_string()))),
        row("Gender", or_dash(user.gender.map(|g| g.label().to_string()))),
        row("Weight", or_dash(user.weight_kg.map(|w| format!("{} kg", num(w, 1))))),
        row("Height", or_dash(user.height_cm.map(|h| format!("{} cm", num(h, 1))))),
        row("Activity level", or_dash(user.activity_level.map(|a| a.label().to_string()))),
        row("Member since", or_dash(user.created_at.map(|c| format_date(c.date())))),
    ]
    .concat();
    format!(
        r#"<div class="card"><h3>Personal Information <a href="/profile?edit=1"><small>Edit</small></a></h3><table><tbody>{rows}</tbody></table></div>"#
    )
}

fn bmi_card(user: &User) -> String {
    match bmi(user.weight_kg, user.height_cm) {
        Some(b) => format!(
            r#"<div class="card"><h3>Body Mass Index</h3><p class="big">{}</p><p>{}</p><p class="muted">From your weight and height.</p></div>"#,
            num(b.value, 1),
            b.category.label()
        ),
        None => r#"<div class="card"><h3>Body Mass Index</h3><p class="muted">Add your weight and height to see your BMI.</p></div>"#
            .to_string(),
    }
}

fn edit_card(form: &ProfileForm, errors: &FieldErrors) -> String {
    let fields = [
        input("First name", "first_name", "text", &form.first_name, "", errors),
        input("Last name", "last_name", "text", &form.last_name, "", errors),
        input("Email", "email", "email", &form.email, "required", errors),
        input("Age", "age", "number", &form.age, r#"min="1" max="120""#, errors),
        select("Gender", "gender", &gender_options(), &form.gender, errors),
        input("Weight (kg)", "weight_kg", "number", &form.weight_kg, r#"min="20" max="300" step="0.1""#, errors),
        input("Height (cm)", "height_cm", "number", &form.height_cm, r#"min="100" max="250" step="0.1""#, errors),
        select("Activity level", "activity_level", &activity_options(), &form.activity_level, errors),
    ]
    .concat();
    format!(
        r#"<div class="card"><h3>Edit Profile</h3><form method="post" action="/profile">{fields}<p class="actions"><a href="/profile">Cancel</a> <button>Save Changes</button></p></form></div>"#
    )
}

fn password_card(errors: &FieldErrors) -> String {
    let fields = [
        input("Current password", "current_password", "password", "", "required", errors),
        input("New password", "new_password", "password", "", "required", errors),
        input("Confirm new password", "confirm_password", "password", "", "required", errors),
    ]
    .concat();
    format!(
        r#"<div class="card"><h3>Change Password</h3><form method="post" action="/profile/password">{fields}<p><button>Change Password</button></p></form></div>"#
    )
}

fn profile_body(user: &User, view: &ProfileView) -> String {
    let main = match &view.edit {
        Editor::Closed => summary_card(user),
        Editor::Open => edit_card(&ProfileForm::from(user), &FieldErrors::default()),
        Editor::Submitted(form, errors) => edit_card(form, errors),
    };
    format!(
        r#"<div class="grid"><div>{main}</div><div>{}</div></div>{}
<div class="card"><h3>Deactivate Account</h3><form method="post" action="/profile/deactivate" onsubmit="return confirm('Deactivate your account?')"><button class="danger">Deactivate</button></form></div>"#,
        bmi_card(user),
        password_card(&view.password_errors),
    )
}

/// Fresh profile from the API, falling back to the session's copy.
async fn show(state: &AppState, session_user: User, view: ProfileView) -> Response {
    let fetched = or_notice!(state, state.api.profile().await, "Failed to load profile");
    let user = fetched.unwrap_or(session_user);
    render(state, "Profile", Some(&user), &profile_body(&user, &view)).await
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub edit: Option<String>,
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn profile_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ProfileQuery>,
) -> Response {
    let view = ProfileView {
        edit: if query.edit.is_some() {
            Editor::Open
        } else {
            Editor::Closed
        },
        ..Default::default()
    };
    show(&state, user, view).await
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ProfileForm>,
) -> Response {
    let update = match form.validate() {
        Ok(update) => update,
        Err(errors) => {
            warn!(fields = errors.len(), "profile form rejected");
            let view = ProfileView {
                edit: Editor::Submitted(form, errors),
                ..Default::default()
            };
            return show(&state, user, view).await;
        }
    };

    let updated = or_notice!(state, state.api.update_profile(&update).await, UPDATE_FAILED);
    match updated {
        Some(updated) => {
            info!("profile updated");
            state.session.update_user(UserPatch::from(updated)).await;
            state.notices.success("Profile updated successfully!").await;
            Redirect::to("/profile").into_response()
        }
        None => {
            let view = ProfileView {
                edit: Editor::Submitted(form, FieldErrors::default()),
                ..Default::default()
            };
            show(&state, user, view).await
        }
    }
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<PasswordForm>,
) -> Response {
    let change = match form.validate() {
        Ok(change) => change,
        Err(errors) => {
            let view = ProfileView {
                password_errors: errors,
                ..Default::default()
            };
            return show(&state, user, view).await;
        }
    };

    let ack = or_notice!(
        state,
        state.api.change_password(&change).await,
        "Failed to change password"
    );
    match ack {
        Some(ack) => {
            let message = ack
                .and_then(|a| a.message)
                .unwrap_or_else(|| "Password changed successfully".into());
            state.notices.success(message).await;
            Redirect::to("/profile").into_response()
        }
        None => show(&state, user, ProfileView::default()).await,
    }
}

#[instrument(skip(state, _user), fields(user_id = _user.id))]
pub async fn deactivate(State(state): State<AppState>, CurrentUser(_user): CurrentUser) -> Response {
    if let Err(e) = state.api.deactivate_account().await {
        if let Some(redirect) = api_failure(&state, &e, "Failed to deactivate account").await {
            return redirect;
        }
        return Redirect::to("/profile").into_response();
    }
    if let Err(e) = state.session.logout().await {
        state.notices.error(e.to_string()).await;
    }
    state.notices.info("Your account has been deactivated.").await;
    Redirect::to("/login").into_response()
}
