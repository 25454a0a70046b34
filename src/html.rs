//! Server-side HTML: the page shell and small form/value helpers shared by every page.

use axum::response::Html;

use crate::{auth::dto::User, forms::FieldErrors, notify::Notice};

const STYLE: &str = r#"
:root { --fg:#1f2937; --muted:#6b7280; --line:#e5e7eb; --brand:#16a34a; --warn:#d97706; --bad:#dc2626; --info:#2563eb; }
* { box-sizing: border-box; }
body { margin:0; font-family: system-ui, sans-serif; color:var(--fg); background:#f9fafb; }
nav { display:flex; gap:1rem; align-items:center; padding:.75rem 1.5rem; background:#fff; border-bottom:1px solid var(--line); }
nav .brand { font-weight:700; color:var(--brand); margin-right:auto; text-decoration:none; }
nav a { color:var(--fg); text-decoration:none; }
nav form { margin:0; }
main { max-width:72rem; margin:0 auto; padding:1.5rem; }
.card { background:#fff; border:1px solid var(--line); border-radius:.5rem; padding:1rem 1.25rem; margin-bottom:1rem; }
.grid { display:grid; grid-template-columns:repeat(auto-fit, minmax(14rem, 1fr)); gap:1rem; }
.muted { color:var(--muted); }
.big { font-size:1.75rem; font-weight:700; margin:.25rem 0; }
.empty { color:var(--muted); text-align:center; padding:2rem 0; }
.notice { padding:.75rem 1rem; border-radius:.375rem; margin-bottom:.75rem; }
.notice-success { background:#dcfce7; } .notice-error { background:#fee2e2; } .notice-info { background:#dbeafe; }
.bar { height:.5rem; background:var(--line); border-radius:.25rem; overflow:hidden; }
.bar > span { display:block; height:100%; background:var(--brand); }
.chart-row { display:flex; align-items:center; gap:.75rem; margin:.25rem 0; }
.chart-row .day { width:4rem; text-align:right; font-size:.75rem; color:var(--muted); }
.chart-row .value { width:4rem; text-align:right; font-size:.75rem; }
.track { position:relative; flex:1; height:1.5rem; background:#f3f4f6; border-radius:.375rem; overflow:hidden; }
.track .actual { height:100%; background:var(--brand); }
.track .goal { position:absolute; top:0; bottom:0; border-left:2px dashed var(--warn); }
.legend { font-size:.75rem; color:var(--muted); text-align:center; }
.insight { border-left:4px solid var(--muted); padding:.5rem .75rem; margin-bottom:.5rem; }
.insight-tip { border-color:var(--info); } .insight-warning { border-color:var(--warn); }
.insight-info { border-color:var(--muted); } .insight-success { border-color:var(--brand); }
label { display:block; margin:.5rem 0 .25rem; font-size:.875rem; }
input, select, textarea { width:100%; padding:.4rem .5rem; border:1px solid var(--line); border-radius:.25rem; }
.field-error { color:var(--bad); font-size:.8rem; }
.tabs a { margin-right:1rem; } .tabs a.active { font-weight:700; }
.result { margin:.25rem 0; } .result button { width:100%; text-align:left; background:#fff; color:var(--fg); border:1px solid var(--line); }
.card.current { border-color:var(--brand); border-width:2px; }
.badge { display:inline-block; padding:.1rem .5rem; border-radius:999px; font-size:.75rem; background:#dcfce7; color:#166534; }
.actions { display:flex; gap:.5rem; align-items:center; } .actions form { margin:0; }
.result.selected button { border-color:var(--brand); background:#f0fdf4; }
table { width:100%; border-collapse:collapse; } td, th { text-align:left; padding:.35rem .5rem; border-bottom:1px solid var(--line); }
button { padding:.4rem .9rem; border:0; border-radius:.25rem; background:var(--brand); color:#fff; cursor:pointer; }
button.secondary { background:var(--muted); } button.danger { background:var(--bad); }
"#;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Fixed-precision number for display.
pub fn num(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}")
}

pub fn page(title: &str, user: Option<&User>, notices: &[Notice], body: &str) -> Html<String> {
    let nav = match user {
        Some(user) => format!(
            r#"<a href="/dashboard">Dashboard</a><a href="/food">Food Log</a><a href="/goals">Goals</a><a href="/dashboard/weekly">Reports</a><a href="/profile">{}</a><form method="post" action="/logout"><button class="secondary">Sign out</button></form>"#,
            escape(&user.display_name())
        ),
        None => r#"<a href="/login">Sign in</a><a href="/register">Create account</a>"#.to_string(),
    };
    let notices: String = notices
        .iter()
        .map(|n| format!(r#"<div class="{}">{}</div>"#, n.kind.css_class(), escape(&n.text)))
        .collect();
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{title} · MealMind</title><style>{STYLE}</style></head>
<body>
<nav><a class="brand" href="/">MealMind</a>{nav}</nav>
<main>{notices}<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

fn field_error(name: &str, errors: &FieldErrors) -> String {
    errors
        .get(name)
        .map(|e| format!(r#"<div class="field-error">{}</div>"#, escape(e)))
        .unwrap_or_default()
}

/// `<input>` with label and inline error. `extra` is raw attribute text (`step="0.1"`).
pub fn input(label: &str, name: &str, kind: &str, value: &str, extra: &str, errors: &FieldErrors) -> String {
    format!(
        r#"<label for="{name}">{label}</label><input id="{name}" name="{name}" type="{kind}" value="{value}" {extra}>{error}"#,
        label = escape(label),
        value = escape(value),
        error = field_error(name, errors),
    )
}

pub fn textarea(label: &str, name: &str, value: &str, extra: &str, errors: &FieldErrors) -> String {
    format!(
        r#"<label for="{name}">{label}</label><textarea id="{name}" name="{name}" {extra}>{value}</textarea>{error}"#,
        label = escape(label),
        value = escape(value),
        error = field_error(name, errors),
    )
}

/// `<select>` over `(value, label)` pairs.
pub fn select(label: &str, name: &str, options: &[(&str, &str)], selected: &str, errors: &FieldErrors) -> String {
    let options: String = options
        .iter()
        .map(|(value, text)| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape(value),
                if *value == selected { " selected" } else { "" },
                escape(text)
            )
        })
        .collect();
    format!(
        r#"<label for="{name}">{label}</label><select id="{name}" name="{name}">{options}</select>{error}"#,
        label = escape(label),
        error = field_error(name, errors),
    )
}

pub fn hidden(name: &str, value: &str) -> String {
    format!(r#"<input type="hidden" name="{name}" value="{}">"#, escape(value))
}

pub fn empty_state(text: &str) -> String {
    format!(r#"<p class="empty">{}</p>"#, escape(text))
}

/// Renders an optional value, or `-` when absent.
pub fn or_dash(value: Option<String>) -> String {
    value.map(|v| escape(&v)).unwrap_or_else(|| "-".into())
}

#[cfg(test)]
mod html_tests {
    use super::*;
    use crate::notify::NoticeKind;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<b>"Tom" & 'Jerry'</b>"#), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn number_precision() {
        assert_eq!(num(1499.6, 0), "1500");
        assert_eq!(num(75.0, 1), "75.0");
        assert_eq!(num(12.345, 1), "12.3");
    }

    #[test]
    fn field_shows_its_error() {
        let mut errors = FieldErrors::default();
        errors.add("quantity", "Quantity is required");
        let html = input("Quantity", "quantity", "number", "", r#"step="0.1""#, &errors);
        assert!(html.contains(r#"name="quantity""#));
        assert!(html.contains("Quantity is required"));
        assert!(!input("Unit", "unit", "text", "g", "", &errors).contains("field-error"));
    }

    #[test]
    fn select_marks_current_option() {
        let html = select(
            "Meal type",
            "meal_type",
            &[("breakfast", "Breakfast"), ("lunch", "Lunch")],
            "lunch",
            &FieldErrors::default(),
        );
        assert!(html.contains(r#"<option value="lunch" selected>Lunch</option>"#));
        assert!(html.contains(r#"<option value="breakfast">Breakfast</option>"#));
    }

    #[test]
    fn page_lists_notices_and_signed_out_nav() {
        let notices = vec![Notice {
            kind: NoticeKind::Error,
            text: "Search failed".into(),
        }];
        let Html(html) = page("Sign in", None, &notices, "<form></form>");
        assert!(html.contains(r#"<div class="notice notice-error">Search failed</div>"#));
        assert!(html.contains(r#"href="/register""#));
        assert!(!html.contains("Sign out"));
    }
}
