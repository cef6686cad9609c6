//! Field-path traversal.
//!
//! Walks a document and yields `(path, value)` for every object key it can
//! reach:
//!
//! - object keys extend the path with `.` (`{"a": {"b": 1}}` → `a`, `a.b`)
//! - arrays never extend the path; container elements are walked under the
//!   array's own path, scalar elements yield nothing
//!   (`{"opts": [{"x": 1}, {"y": 2}]}` → `opts`, `opts.x`, `opts.y`)
//!
//! An array of N objects that all carry key `k` therefore yields `opts.k`
//! N times. Profiling relies on this: occurrence counters see every element,
//! presence is de-duplicated per document.

use std::slice;

use crate::document::{Document, FieldPath};

/// Iterate `(path, value)` pairs of `doc`, starting from the root.
pub fn field_paths(doc: &Document) -> FieldPaths<'_> {
    FieldPaths::with_prefix(doc, None)
}

/// Lazy pre-order walk over a document's field paths.
///
/// Emission order matches a recursive walk: a key's own pair comes first,
/// then everything beneath it, then its next sibling.
pub struct FieldPaths<'a> {
    stack: Vec<Frame<'a>>,
}

enum Frame<'a> {
    Object {
        prefix: Option<String>,
        entries: slice::Iter<'a, (String, Document)>,
    },
    Array {
        prefix: Option<String>,
        items: slice::Iter<'a, Document>,
    },
}

impl<'a> Frame<'a> {
    fn for_value(value: &'a Document, prefix: Option<String>) -> Option<Self> {
        match value {
            Document::Object(entries) => Some(Frame::Object {
                prefix,
                entries: entries.iter(),
            }),
            Document::Array(items) => Some(Frame::Array {
                prefix,
                items: items.iter(),
            }),
            Document::Scalar(_) => None,
        }
    }
}

impl<'a> FieldPaths<'a> {
    /// Walk `doc` as if it were nested under `prefix`.
    pub fn with_prefix(doc: &'a Document, prefix: Option<&str>) -> Self {
        let stack = Frame::for_value(doc, prefix.map(str::to_string))
            .into_iter()
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for FieldPaths<'a> {
    type Item = (FieldPath, &'a Document);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            match frame {
                Frame::Object { prefix, entries } => {
                    let Some((key, value)) = entries.next() else {
                        self.stack.pop();
                        continue;
                    };
                    let path = FieldPath::join(prefix.as_deref(), key);
                    if value.is_container() {
                        let child = Frame::for_value(value, Some(path.as_str().to_string()));
                        self.stack.extend(child);
                    }
                    // An empty top-level key has no path of its own; its
                    // children are still walked (with an empty prefix).
                    if path.is_empty() {
                        continue;
                    }
                    return Some((path, value));
                }
                Frame::Array { prefix, items } => {
                    let Some(item) = items.next() else {
                        self.stack.pop();
                        continue;
                    };
                    if item.is_container() {
                        let child = Frame::for_value(item, prefix.clone());
                        self.stack.extend(child);
                    }
                }
            }
        }
    }
}
