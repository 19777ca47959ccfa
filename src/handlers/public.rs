use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Barbershop, LandingPage, Service};
use crate::state::AppState;

// GET /p/:slug
pub async fn landing_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let (shop, page, services) = {
        let db = state.db.lock().unwrap();
        let shop = queries::barbershops::get_barbershop_by_slug(&db, &slug)?
            .ok_or_else(|| AppError::NotFound("page not found".to_string()))?;
        let page = queries::landing::get_landing(&db, &shop.id)?
            .filter(|p| p.published)
            .ok_or_else(|| AppError::NotFound("page not found".to_string()))?;
        let services = queries::services::list_services(&db, &shop.id)?;
        (shop, page, services)
    };

    Ok(Html(render_page(&shop, &page, &services)))
}

// GET /p/:slug/logo
pub async fn landing_logo(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let (bytes, content_type) = {
        let db = state.db.lock().unwrap();
        let shop = queries::barbershops::get_barbershop_by_slug(&db, &slug)?
            .ok_or_else(|| AppError::NotFound("page not found".to_string()))?;
        queries::landing::get_landing(&db, &shop.id)?
            .filter(|p| p.published)
            .ok_or_else(|| AppError::NotFound("page not found".to_string()))?;
        queries::landing::get_logo(&db, &shop.id)?
            .ok_or_else(|| AppError::NotFound("logo not found".to_string()))?
    };

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

fn render_page(shop: &Barbershop, page: &LandingPage, services: &[Service]) -> String {
    let title = if page.title.is_empty() {
        &shop.name
    } else {
        &page.title
    };

    let logo_html = if page.has_logo {
        format!(
            r#"<img class="logo" src="/p/{}/logo" alt="{}">"#,
            escape_html(&shop.slug),
            escape_html(title)
        )
    } else {
        String::new()
    };

    let services_html = services
        .iter()
        .map(|s| {
            format!(
                "<li><span>{}</span><span>{} min &middot; {}</span></li>",
                escape_html(&s.name),
                s.duration_minutes,
                format_price(s.price_cents)
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ");

    let contact_html = [
        (&page.contact_phone, "tel"),
        (&page.contact_email, "mailto"),
    ]
    .iter()
    .filter(|(value, _)| !value.is_empty())
    .map(|(value, scheme)| {
        format!(
            r#"<a href="{scheme}:{0}">{0}</a>"#,
            escape_html(value)
        )
    })
    .collect::<Vec<_>>()
    .join(" &middot; ");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <style>
    body {{ font-family: system-ui, sans-serif; margin: 0; color: #111; }}
    header {{ background: {theme}; color: #fff; padding: 3rem 1.5rem; text-align: center; }}
    .logo {{ max-height: 96px; margin-bottom: 1rem; }}
    main {{ max-width: 640px; margin: 0 auto; padding: 1.5rem; }}
    ul.services {{ list-style: none; padding: 0; }}
    ul.services li {{ display: flex; justify-content: space-between; padding: .6rem 0; border-bottom: 1px solid #eee; }}
    footer {{ text-align: center; padding: 1.5rem; color: #555; }}
  </style>
</head>
<body>
  <header>
    {logo_html}
    <h1>{title}</h1>
  </header>
  <main>
    <p>{about}</p>
    <h2>Services</h2>
    <ul class="services">
        {services_html}
    </ul>
  </main>
  <footer>{contact_html}</footer>
</body>
</html>
"#,
        title = escape_html(title),
        theme = escape_html(&page.theme_color),
        about = escape_html(&page.about),
    )
}

fn format_price(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Ed & Sons"</b>"#),
            "&lt;b&gt;&quot;Ed &amp; Sons&quot;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(2500), "$25.00");
        assert_eq!(format_price(1999), "$19.99");
        assert_eq!(format_price(5), "$0.05");
    }
}
