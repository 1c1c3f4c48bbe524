//! Slot registry: named extension points inside rendered layouts.
//!
//! Modules register (template, context, priority) contributions against a
//! (handle, slot) pair, typically at bootstrap. Rendering a slot renders
//! every contribution in ascending priority order and concatenates the
//! results. Slots are optional by design: an empty bucket renders as the
//! empty string.
//!
//! The registry is engine-agnostic: [`SlotRegistry::render_with`] takes the
//! rendering step as a closure, so ordering and context layering are testable
//! without a template engine.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::Context;

/// One registered contribution filling a slot.
#[derive(Debug, Clone)]
pub struct Contribution {
    template: String,
    context: Context,
    priority: i32,
}

impl Contribution {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// Process-wide table of slot contributions.
///
/// Keys are case-insensitive; the table grows monotonically — re-registering
/// an identical tuple appends a duplicate contribution, and idempotency is
/// the caller's responsibility.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    buckets: Mutex<HashMap<String, Vec<Contribution>>>,
}

/// Composite bucket key. A single normalized key avoids nested-map edge
/// cases on partial lookups.
fn slot_key(handle: &str, slot: &str) -> String {
    format!("{}\u{0}{}", handle.to_lowercase(), slot.to_lowercase())
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a contribution for `(handle, slot)`.
    ///
    /// The bucket is kept sorted ascending by priority; equal priorities
    /// preserve registration order.
    pub fn register(
        &self,
        handle: &str,
        slot: &str,
        template: impl Into<String>,
        context: Context,
        priority: i32,
    ) {
        let mut buckets = self.buckets.lock().unwrap_or_else(|p| p.into_inner());
        let bucket = buckets.entry(slot_key(handle, slot)).or_default();
        bucket.push(Contribution {
            template: template.into(),
            context,
            priority,
        });
        bucket.sort_by_key(|c| c.priority);
    }

    /// Snapshot of the contributions for `(handle, slot)`, in render order.
    pub fn contributions(&self, handle: &str, slot: &str) -> Vec<Contribution> {
        let buckets = self.buckets.lock().unwrap_or_else(|p| p.into_inner());
        buckets.get(&slot_key(handle, slot)).cloned().unwrap_or_default()
    }

    /// Renders every contribution for `(handle, slot)` through `render`,
    /// concatenating the results in priority order with no separator.
    ///
    /// Context layers merge as base → stored contribution context → inline,
    /// later layers overwriting same-named keys. An empty or absent bucket
    /// yields `Ok("")`. Failures inside a contribution propagate to the
    /// caller; the renderer's failure boundary handles them.
    pub fn render_with<F>(
        &self,
        handle: &str,
        slot: &str,
        base: &Context,
        inline: &Context,
        mut render: F,
    ) -> Result<String, RenderError>
    where
        F: FnMut(&str, &Context) -> Result<String, RenderError>,
    {
        let entries = self.contributions(handle, slot);
        if entries.is_empty() {
            return Ok(String::new());
        }

        let mut html = String::new();
        for entry in entries {
            let mut context = base.clone();
            context.extend(entry.context.clone());
            context.extend(inline.clone());
            html.push_str(&render(&entry.template, &context)?);
        }
        Ok(html)
    }

    /// Drops every registered contribution. Test-isolation affordance.
    pub fn clear(&self) {
        self.buckets
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clear();
    }

    pub fn is_empty(&self) -> bool {
        self.buckets
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_empty()
    }
}

/// Declarative slot contribution, applied at module registration time.
///
/// The data-only front-end over [`SlotRegistry::register`]: modules declare
/// bindings (in code or metadata) and apply them during bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotBinding {
    pub handle: String,
    pub slot: String,
    pub template: String,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub priority: i32,
}

impl SlotBinding {
    pub fn new(
        handle: impl Into<String>,
        slot: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            handle: handle.into(),
            slot: slot.into(),
            template: template.into(),
            context: Context::new(),
            priority: 0,
        }
    }

    /// Sets the fixed context rendered with every invocation.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Adds one fixed context value.
    pub fn with_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Registers this binding.
    pub fn apply(&self, registry: &SlotRegistry) {
        registry.register(
            &self.handle,
            &self.slot,
            self.template.clone(),
            self.context.clone(),
            self.priority,
        );
    }
}
