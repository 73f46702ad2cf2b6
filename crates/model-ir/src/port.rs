// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Node identities, ports and [`PortElements`] wiring.
//!
//! Nodes never hold references to each other. An input names the values it
//! consumes as a list of ranges `(node, port, offset, length)` into output
//! ports of the same model.

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tensor_core::{ElementType, MemoryLayout};

pub const DEFAULT_INPUT_PORT: &str = "input";
pub const DEFAULT_OUTPUT_PORT: &str = "output";
pub const INPUT1_PORT: &str = "input1";
pub const INPUT2_PORT: &str = "input2";
pub const FILTER_WEIGHTS_PORT: &str = "filter_weights";

/// Opaque node identity, stable for the lifetime of the owning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An output slot: name, element type and the layout of its buffer.
///
/// The port's size is the layout's physical memory size, padding included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPort {
    pub name: &'static str,
    pub element_type: ElementType,
    pub layout: MemoryLayout,
}

impl OutputPort {
    pub fn new(name: &'static str, element_type: ElementType, layout: MemoryLayout) -> Self {
        Self {
            name,
            element_type,
            layout,
        }
    }

    pub fn size(&self) -> usize {
        self.layout.memory_size()
    }
}

/// An input slot together with the elements it is wired to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPort<'a> {
    pub name: &'static str,
    pub element_type: ElementType,
    pub elements: &'a PortElements,
}

/// A contiguous slice of one output port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    pub node: NodeId,
    pub port: String,
    pub offset: usize,
    pub length: usize,
}

impl PortRange {
    pub fn new(node: NodeId, port: impl Into<String>, offset: usize, length: usize) -> Self {
        Self {
            node,
            port: port.into(),
            offset,
            length,
        }
    }

    /// One past the last value, or `None` if `offset + length` overflows.
    pub fn checked_end(&self) -> Option<usize> {
        self.offset.checked_add(self.length)
    }

    /// Like [`checked_end`](Self::checked_end), saturating at `usize::MAX`.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    fn is_continued_by(&self, next: &PortRange) -> bool {
        self.node == next.node && self.port == next.port && self.checked_end() == Some(next.offset)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}[{}..{}]", self.node, self.port, self.offset, self.end())
    }
}

/// An ordered list of [`PortRange`]s; the values an input port consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortElements {
    ranges: Vec<PortRange>,
}

impl PortElements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements covering all `size` values of `node.port`.
    pub fn full(node: NodeId, port: impl Into<String>, size: usize) -> Self {
        Self::from(PortRange::new(node, port, 0, size))
    }

    pub fn from_ranges(ranges: Vec<PortRange>) -> Self {
        Self { ranges }
    }

    pub fn ranges(&self) -> &[PortRange] {
        &self.ranges
    }

    /// Total number of values referenced, saturating at `usize::MAX`.
    pub fn size(&self) -> usize {
        self.ranges
            .iter()
            .fold(0usize, |total, r| total.saturating_add(r.length))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Appends `other`'s ranges, merging a range that continues the last one.
    pub fn append(&mut self, other: &PortElements) {
        for range in &other.ranges {
            self.push(range.clone());
        }
    }

    pub fn push(&mut self, range: PortRange) {
        if range.length == 0 {
            return;
        }
        if let Some(last) = self.ranges.last_mut() {
            if last.is_continued_by(&range) {
                if let Some(length) = last.length.checked_add(range.length) {
                    last.length = length;
                    return;
                }
            }
        }
        self.ranges.push(range);
    }

    /// Distinct producer nodes, in first-reference order.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = Vec::new();
        for range in &self.ranges {
            if !out.contains(&range.node) {
                out.push(range.node);
            }
        }
        out
    }

    /// The values `[offset, offset + length)` of this element list.
    pub fn sub_elements(&self, offset: usize, length: usize) -> Result<PortElements, ModelError> {
        let size = self.size();
        if offset.checked_add(length).map_or(true, |end| end > size) {
            return Err(ModelError::InvalidReference(format!(
                "sub-range of {length} at {offset} exceeds {size} elements"
            )));
        }
        let mut result = PortElements::new();
        let mut skip = offset;
        let mut remaining = length;
        for range in &self.ranges {
            if remaining == 0 {
                break;
            }
            if skip >= range.length {
                skip -= range.length;
                continue;
            }
            let take = (range.length - skip).min(remaining);
            let start = range.offset.checked_add(skip).ok_or_else(|| {
                ModelError::InvalidReference(format!("{range} overflows its port"))
            })?;
            result.push(PortRange::new(range.node, range.port.clone(), start, take));
            remaining -= take;
            skip = 0;
        }
        Ok(result)
    }

    /// Rewrites every range's node id through `f`.
    pub fn remap<F>(&self, mut f: F) -> Result<PortElements, ModelError>
    where
        F: FnMut(NodeId) -> Result<NodeId, ModelError>,
    {
        let mut result = PortElements::new();
        for range in &self.ranges {
            result.push(PortRange::new(f(range.node)?, range.port.clone(), range.offset, range.length));
        }
        Ok(result)
    }
}

impl From<PortRange> for PortElements {
    fn from(range: PortRange) -> Self {
        let mut elements = PortElements::new();
        elements.push(range);
        elements
    }
}

impl fmt::Display for PortElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ranges.iter().map(|r| r.to_string()).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> NodeId {
        NodeId(n)
    }

    #[test]
    fn test_push_merges_adjacent_ranges() {
        let mut e = PortElements::new();
        e.push(PortRange::new(id(1), "output", 0, 2));
        e.push(PortRange::new(id(1), "output", 2, 3));
        e.push(PortRange::new(id(2), "output", 0, 1));
        assert_eq!(e.ranges().len(), 2);
        assert_eq!(e.size(), 6);
    }

    #[test]
    fn test_sub_elements_spans_ranges() {
        let e = PortElements::from_ranges(vec![
            PortRange::new(id(1), "output", 0, 3),
            PortRange::new(id(2), "output", 4, 3),
        ]);
        let sub = e.sub_elements(2, 3).unwrap();
        assert_eq!(
            sub.ranges(),
            &[
                PortRange::new(id(1), "output", 2, 1),
                PortRange::new(id(2), "output", 4, 2),
            ]
        );
        assert!(e.sub_elements(5, 2).is_err());
    }

    #[test]
    fn test_nodes_are_distinct() {
        let e = PortElements::from_ranges(vec![
            PortRange::new(id(3), "output", 0, 1),
            PortRange::new(id(1), "output", 0, 1),
            PortRange::new(id(3), "output", 2, 1),
        ]);
        assert_eq!(e.nodes(), vec![id(3), id(1)]);
    }

    #[test]
    fn test_serde_is_a_plain_range_list() {
        let e = PortElements::full(id(4), "output", 9);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#"[{"node":4,"port":"output","offset":0,"length":9}]"#);
        let back: PortElements = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_huge_offsets_do_not_overflow() {
        let r = PortRange::new(id(1), "output", usize::MAX, 2);
        assert_eq!(r.checked_end(), None);
        assert_eq!(r.end(), usize::MAX);

        let e = PortElements::from_ranges(vec![
            PortRange::new(id(1), "output", 0, usize::MAX),
            PortRange::new(id(2), "output", 0, 5),
        ]);
        assert_eq!(e.size(), usize::MAX);
        assert!(e.sub_elements(usize::MAX, 1).is_err());

        let e = PortElements::from_ranges(vec![PortRange::new(id(1), "output", usize::MAX - 1, 4)]);
        assert!(matches!(e.sub_elements(2, 1), Err(ModelError::InvalidReference(_))));
    }

    #[test]
    fn test_push_keeps_overflowing_ranges_apart() {
        let mut e = PortElements::new();
        e.push(PortRange::new(id(1), "output", 0, usize::MAX - 1));
        e.push(PortRange::new(id(1), "output", usize::MAX - 1, 1));
        assert_eq!(e.ranges().len(), 1);
        e.push(PortRange::new(id(1), "output", usize::MAX, 1));
        assert_eq!(e.ranges().len(), 2);
    }
}
