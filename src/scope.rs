//! Lexically nested variable environments.
//!
//! A [`Scope`] is a stack of frames. Reads walk from the innermost frame
//! outward; writes always land in the innermost frame, shadowing any outer
//! binding of the same name. The evaluator opens a child scope for each
//! attribute inside a block body and for each comprehension iteration.

use indexmap::IndexMap;

use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct Scope {
    frames: Vec<IndexMap<String, Value>>,
}

impl Scope {
    /// An empty root scope.
    pub fn new() -> Self {
        Self {
            frames: vec![IndexMap::new()],
        }
    }

    /// A root scope seeded with the given bindings.
    pub fn with_variables<K, V>(variables: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            frames: vec![variables
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect()],
        }
    }

    /// A scope whose lookups fall through to `parent` after missing in the
    /// given bindings.
    pub fn with_parent<K, V>(
        variables: impl IntoIterator<Item = (K, V)>,
        parent: &Scope,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut scope = parent.child();
        for (key, value) in variables {
            scope.set(key, value);
        }
        scope
    }

    /// Opens a nested scope on top of this one.
    pub fn child(&self) -> Scope {
        let mut frames = self.frames.clone();
        frames.push(IndexMap::new());
        Scope { frames }
    }

    /// Looks a name up, innermost frame first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Binds a name in the innermost frame.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), value.into());
        }
    }

    /// The bindings of the innermost frame, in insertion order.
    pub fn local_variables(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.frames
            .last()
            .into_iter()
            .flat_map(|frame| frame.iter().map(|(key, value)| (key.as_str(), value)))
    }
}
