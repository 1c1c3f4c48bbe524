//! The in-template `slot()` function.
//!
//! Templates pull their own slot content: `{{ slot("main.sidebar") }}` looks
//! up the rendering layout's `layout_handle` in the active render context and
//! delegates to the slot registry, passing that context as the base layer.
//! Without a `layout_handle` in scope the call renders as the empty string.

use std::sync::{Arc, Mutex};

use minijinja::value::Value;
use minijinja::{Environment, ErrorKind, State};

use crate::error::RenderError;
use crate::slots::SlotRegistry;
use crate::{Context, LAYOUT_HANDLE_KEY};

/// State shared between the engine and its template functions.
///
/// The context stack mirrors the render call chain: the engine pushes the
/// top-level layout context, and each slot contribution pushes its merged
/// context, so nested `slot()` calls see the context they render under.
#[derive(Debug)]
pub(crate) struct RenderShared {
    pub(crate) slots: Arc<SlotRegistry>,
    stack: Mutex<Vec<Context>>,
}

impl RenderShared {
    pub(crate) fn new(slots: Arc<SlotRegistry>) -> Self {
        Self {
            slots,
            stack: Mutex::new(Vec::new()),
        }
    }

    fn current(&self) -> Context {
        self.stack
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .last()
            .cloned()
            .unwrap_or_default()
    }
}

/// Pushes a context frame for the duration of one render.
pub(crate) struct ContextGuard<'a> {
    shared: &'a RenderShared,
}

impl<'a> ContextGuard<'a> {
    pub(crate) fn push(shared: &'a RenderShared, context: Context) -> Self {
        shared
            .stack
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(context);
        Self { shared }
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.shared
            .stack
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop();
    }
}

/// Registers the `slot(name, extra_context?)` function.
pub(crate) fn register(env: &mut Environment<'static>, shared: Arc<RenderShared>) {
    env.add_function(
        "slot",
        move |state: &State, name: String, extra: Option<Value>| -> Result<Value, minijinja::Error> {
            render_slot(&shared, state, &name, extra)
        },
    );
}

fn render_slot(
    shared: &RenderShared,
    state: &State,
    slot: &str,
    extra: Option<Value>,
) -> Result<Value, minijinja::Error> {
    let handle = match state.lookup(LAYOUT_HANDLE_KEY) {
        Some(value) if !value.is_undefined() && !value.is_none() => value
            .as_str()
            .map(str::to_owned)
            .unwrap_or_else(|| value.to_string()),
        _ => return Ok(Value::from("")),
    };

    let inline = match extra {
        Some(value) if !value.is_undefined() && !value.is_none() => value_to_context(&value)?,
        _ => Context::new(),
    };

    let base = shared.current();
    let html = shared
        .slots
        .render_with(&handle, slot, &base, &inline, |template, context| {
            let tmpl = state.env().get_template(template)?;
            let _guard = ContextGuard::push(shared, context.clone());
            Ok(tmpl.render(Value::from_serialize(context))?)
        })
        .map_err(engine_error)?;

    // Slot output is composed of already-rendered fragments; the caller must
    // not escape it a second time.
    Ok(Value::from_safe_string(html))
}

fn value_to_context(value: &Value) -> Result<Context, minijinja::Error> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map.into_iter().collect()),
        _ => Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            "slot() extra context must be a mapping",
        )),
    }
}

fn engine_error(err: RenderError) -> minijinja::Error {
    minijinja::Error::new(ErrorKind::InvalidOperation, err.to_string())
}
