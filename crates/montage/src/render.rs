//! The renderer failure boundary.
//!
//! [`crate::Frontend::render`] must always produce a page: a missing handle
//! or an engine failure becomes a minimal self-contained diagnostic HTML
//! document instead of an error. Nothing escapes this boundary.

use crate::error::RenderError;
use crate::frontend::Frontend;
use crate::{Context, LAYOUT_HANDLE_KEY, LAYOUT_MODULE_KEY};

pub(crate) fn render_layout(frontend: &Frontend, handle: &str, context: Context) -> String {
    let Some(resolution) = frontend.locate(handle) else {
        return missing_layout_page(handle, &context);
    };

    let mut merged = Context::new();
    merged.insert(
        LAYOUT_HANDLE_KEY.to_string(),
        serde_json::Value::String(handle.to_string()),
    );
    merged.insert(
        LAYOUT_MODULE_KEY.to_string(),
        serde_json::Value::String(resolution.module.clone()),
    );
    // Caller-supplied keys win over the injected pair.
    merged.extend(context);

    match frontend.engine().render(&resolution.template, &merged) {
        Ok(html) => html,
        Err(err) => {
            log::error!("error rendering layout '{handle}': {err}");
            render_failure_page(handle, &err)
        }
    }
}

pub(crate) fn missing_layout_page(handle: &str, context: &Context) -> String {
    let title = context
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or("Layout missing");
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title></head>\
         <body><main><p>Layout handle '{}' is not activated. \
         Run `montage layout generate {}` to copy it into src/modules.</p></main></body></html>",
        escape_html(title),
        escape_html(handle),
        escape_html(handle),
    )
}

pub(crate) fn render_failure_page(handle: &str, err: &RenderError) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title></head>\
         <body><main><pre>{}</pre></main></body></html>",
        escape_html(handle),
        escape_html(&err.to_string()),
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
