// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool registration adapters and idempotent tool wrapping.
//!
//! Applications hand over tools in whatever shape they already have: a
//! keyed map, an ordered list, or a single invokable. The shape is
//! normalized once at registration and every tool is wrapped so that
//! invoking it opens a tool span. Wrapping an already-wrapped tool is a
//! no-op, so double registration cannot produce nested duplicate spans.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use tollgate_core::SpanType;

use crate::guard::traced;

/// Error type tools return: whatever the application uses, boxed.
/// Tollgate never replaces or rewraps it.
pub type ToolError = Box<dyn std::error::Error + Send + Sync>;

/// A single invokable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used as the span label and registry key.
    fn name(&self) -> &str;

    /// Invoke the tool. Errors pass through Tollgate unchanged.
    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError>;

    /// Marker for idempotent wrapping. Only [`TracedTool`] returns true.
    #[doc(hidden)]
    fn is_traced(&self) -> bool {
        false
    }
}

/// A tool whose invocations run inside a tool span.
pub struct TracedTool {
    inner: Arc<dyn Tool>,
}

#[async_trait]
impl Tool for TracedTool {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        traced(self.inner.name(), SpanType::Tool, self.inner.invoke(input)).await
    }

    fn is_traced(&self) -> bool {
        true
    }
}

/// Wrap a tool so its invocations open a tool span.
///
/// Idempotent: an already-wrapped tool is returned as-is.
pub fn trace_tool(tool: Arc<dyn Tool>) -> Arc<dyn Tool> {
    if tool.is_traced() {
        tool
    } else {
        Arc::new(TracedTool { inner: tool })
    }
}

/// The shapes a tool collection may arrive in.
pub enum ToolCollection {
    /// Name-keyed mapping; iteration order is normalized by sorting keys.
    Keyed(HashMap<String, Arc<dyn Tool>>),
    /// Ordered list; registration order is preserved.
    Ordered(Vec<Arc<dyn Tool>>),
    /// A single invokable object.
    Single(Arc<dyn Tool>),
}

impl From<HashMap<String, Arc<dyn Tool>>> for ToolCollection {
    fn from(map: HashMap<String, Arc<dyn Tool>>) -> Self {
        ToolCollection::Keyed(map)
    }
}

impl From<Vec<Arc<dyn Tool>>> for ToolCollection {
    fn from(list: Vec<Arc<dyn Tool>>) -> Self {
        ToolCollection::Ordered(list)
    }
}

impl From<Arc<dyn Tool>> for ToolCollection {
    fn from(tool: Arc<dyn Tool>) -> Self {
        ToolCollection::Single(tool)
    }
}

/// A normalized, traced tool set.
///
/// Built once at registration; lookups afterwards are by name.
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolSet {
    /// Register a collection of tools, normalizing its shape and
    /// wrapping every entry exactly once.
    pub fn register(collection: impl Into<ToolCollection>) -> Self {
        let ordered: Vec<(String, Arc<dyn Tool>)> = match collection.into() {
            ToolCollection::Keyed(map) => {
                let mut entries: Vec<_> = map.into_iter().collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                entries
            }
            ToolCollection::Ordered(list) => list
                .into_iter()
                .map(|t| (t.name().to_string(), t))
                .collect(),
            ToolCollection::Single(tool) => vec![(tool.name().to_string(), tool)],
        };

        let mut tools = Vec::with_capacity(ordered.len());
        let mut by_name = HashMap::with_capacity(ordered.len());
        for (name, tool) in ordered {
            by_name.insert(name, tools.len());
            tools.push(trace_tool(tool));
        }
        Self { tools, by_name }
    }

    /// Look up a tool by registration name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    /// Iterate tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
