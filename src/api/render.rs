//! Minimal inline HTML rendering.
//!
//! The original system rendered server-side templates via `qor/render`; the
//! teacher's own web UI is a prebuilt single-page app served as embedded
//! assets. Neither artifact exists in this crate's scope, so pages are
//! rendered as small inline `format!` strings instead of reaching for a
//! templating crate or an asset-embedding one.

use crate::core::config::AppConfig;

fn analytics_snippet(config: &AppConfig) -> String {
    if !config.is_production() {
        return String::new();
    }
    let id = config.google_analytics_id.as_deref().unwrap_or("");
    format!(
        r#"<script async src="https://www.googletagmanager.com/gtag/js?id={id}"></script>
<script>
  window.dataLayer = window.dataLayer || [];
  function gtag(){{dataLayer.push(arguments);}}
  gtag('js', new Date());
  gtag('config', '{id}');
</script>"#
    )
}

fn page(config: &AppConfig, title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
{analytics}
{body}
</body>
</html>"#,
        title = title,
        analytics = analytics_snippet(config),
        body = body,
    )
}

pub fn index(config: &AppConfig) -> String {
    page(
        config,
        "jobhub",
        r#"<h1>jobhub</h1>
<form method="post" action="/jobs">
  <label>Job id <input type="number" name="id" required></label>
  <button type="submit">Start job</button>
</form>"#,
    )
}

pub fn job(config: &AppConfig, job_id: u64) -> String {
    page(
        config,
        &format!("job {job_id}"),
        &format!(
            r#"<h1>job {job_id}</h1>
<ul id="log"></ul>
<script>
  const ws = new WebSocket(`ws://${{location.host}}/jobs/{job_id}/stream`);
  ws.onmessage = (ev) => {{
    const li = document.createElement("li");
    li.textContent = ev.data;
    document.getElementById("log").appendChild(li);
  }};
</script>"#
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_config() -> AppConfig {
        AppConfig {
            server: crate::core::config::ServerConfig {
                host: "localhost".into(),
                port: 8081,
            },
            app_env: "development".into(),
            debug: false,
            google_analytics_id: None,
            hub_queue_capacity: 100,
        }
    }

    #[test]
    fn no_analytics_snippet_outside_production() {
        assert_eq!(analytics_snippet(&dev_config()), "");
    }

    #[test]
    fn analytics_snippet_included_in_production() {
        let mut config = dev_config();
        config.app_env = "production".to_string();
        config.google_analytics_id = Some("G-TEST".to_string());
        let snippet = analytics_snippet(&config);
        assert!(snippet.contains("G-TEST"));
    }

    #[test]
    fn index_contains_form() {
        let html = index(&dev_config());
        assert!(html.contains("action=\"/jobs\""));
    }
}
