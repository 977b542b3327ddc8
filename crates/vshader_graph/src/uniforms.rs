// SPDX-License-Identifier: MIT OR Apache-2.0
//! Uniform bindings and uniform-name bookkeeping.

use crate::mode::Stage;
use crate::node::NodeId;
use crate::params::ResourceHandle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named shader parameter the host must bind at draw time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformBinding {
    /// Uniform name as declared in the source
    pub name: String,
    /// Default resource, if one was assigned
    pub resource: Option<ResourceHandle>,
}

impl UniformBinding {
    /// Create a binding
    pub fn new(name: impl Into<String>, resource: Option<ResourceHandle>) -> Self {
        Self {
            name: name.into(),
            resource,
        }
    }
}

/// Fallback name when sanitising leaves nothing
pub const FALLBACK_UNIFORM_NAME: &str = "uniform";

/// Make a user-entered name usable as a GLSL identifier.
///
/// Leading non-letters are dropped, spaces become underscores and any
/// other character outside `[A-Za-z0-9_]` is removed.
pub fn sanitize_uniform_name(raw: &str) -> String {
    let trimmed = raw.trim_start_matches(|c: char| !c.is_ascii_alphabetic());
    let name: String = trimmed
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '_' => Some(c),
            _ => None,
        })
        .collect();
    if name.is_empty() {
        FALLBACK_UNIFORM_NAME.to_string()
    } else {
        name
    }
}

/// Pick a name not present in `taken`: trailing digits are stripped and an
/// attempt counter starting at 2 is appended until the name is free.
pub fn unique_uniform_name<'a>(wanted: &str, taken: impl IntoIterator<Item = &'a str>) -> String {
    let taken: Vec<&str> = taken.into_iter().collect();
    if !taken.contains(&wanted) {
        return wanted.to_string();
    }
    let mut stem = wanted.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.is_empty() {
        stem = FALLBACK_UNIFORM_NAME;
    }
    let mut attempt = 2u32;
    loop {
        let candidate = format!("{stem}{attempt}");
        if !taken.contains(&candidate.as_str()) {
            return candidate;
        }
        attempt += 1;
    }
}

/// Collects declared uniform names and bindings during one compile.
#[derive(Debug, Default)]
pub(crate) struct UniformCollector {
    declared: HashMap<String, (Stage, NodeId)>,
    bound: HashMap<String, (Stage, NodeId)>,
    bindings: Vec<UniformBinding>,
}

impl UniformCollector {
    /// Record a uniform declaration; returns the first owner on a clash
    pub(crate) fn declare(
        &mut self,
        name: &str,
        stage: Stage,
        id: NodeId,
    ) -> Result<(), (Stage, NodeId)> {
        match self.declared.get(name) {
            Some(owner) if *owner != (stage, id) => Err(*owner),
            Some(_) => Ok(()),
            None => {
                self.declared.insert(name.to_string(), (stage, id));
                Ok(())
            }
        }
    }

    /// Record a binding; returns the first owner on a clash
    pub(crate) fn bind(
        &mut self,
        binding: UniformBinding,
        stage: Stage,
        id: NodeId,
    ) -> Result<(), (Stage, NodeId)> {
        if let Some(owner) = self.bound.get(&binding.name) {
            return if *owner == (stage, id) { Ok(()) } else { Err(*owner) };
        }
        self.bound.insert(binding.name.clone(), (stage, id));
        self.bindings.push(binding);
        Ok(())
    }

    pub(crate) fn finish(self) -> Vec<UniformBinding> {
        self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_uniform_name("my color"), "my_color");
        assert_eq!(sanitize_uniform_name("9lives"), "lives");
        assert_eq!(sanitize_uniform_name("_x-y.z"), "xyz");
        assert_eq!(sanitize_uniform_name("  "), FALLBACK_UNIFORM_NAME);
        assert_eq!(sanitize_uniform_name("albedo2"), "albedo2");
    }

    #[test]
    fn test_unique_name() {
        assert_eq!(unique_uniform_name("mask", ["albedo"]), "mask");
        assert_eq!(unique_uniform_name("mask", ["mask"]), "mask2");
        assert_eq!(unique_uniform_name("mask", ["mask", "mask2"]), "mask3");
        // trailing digits are replaced, not extended
        assert_eq!(unique_uniform_name("mask2", ["mask2"]), "mask3");
    }

    #[test]
    fn test_collector_rejects_duplicates() {
        let mut c = UniformCollector::default();
        assert!(c.declare("mask", Stage::Fragment, 2).is_ok());
        assert!(c.declare("mask", Stage::Fragment, 2).is_ok());
        assert_eq!(c.declare("mask", Stage::Vertex, 4), Err((Stage::Fragment, 2)));

        assert!(c.bind(UniformBinding::new("mask", None), Stage::Fragment, 2).is_ok());
        assert!(c.bind(UniformBinding::new("mask", None), Stage::Light, 3).is_err());
        assert_eq!(c.finish().len(), 1);
    }
}
