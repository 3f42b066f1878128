//! Trace explanation: why is `sub` related to `super`?
//!
//! Walks the dependency lists of trace records depth-first and renders the
//! derivation as an indented proof trace, one line per relation:
//!
//! ```text
//! 1 -> 16    VB
//!     1 -> 5    direct
//!     5 -> 16    direct
//! ```
//!
//! With names enabled each class is shown as `(id) name`. A pair without any
//! trace record renders as the [`NO_DATA`] sentinel.
//!
//! The walk uses an explicit stack. Dependencies that are missing from the
//! store, that repeat a relation already on the current path, or that lie
//! below the configured depth limit are rendered as marker lines and not
//! expanded.

use std::collections::HashSet;
use std::fmt::Write;

use crate::class::{ClassId, RelationKey};
use crate::store::{StoreResult, TraceStore};

/// Output for a pair that has no trace record at all.
pub const NO_DATA: &str = "->";

/// Indentation added per proof level.
pub const INDENT: &str = "    ";

/// Default for [`Explainer::with_max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Separator between a relation and its label.
const LABEL_GAP: &str = "    ";

// ── ProofLine ───────────────────────────────────────────────────────────

/// What a proof line says about its relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineLabel {
    /// The rule label stored with the relation's trace record.
    Rule(String),
    /// A dependency with no trace record of its own.
    Missing,
    /// A dependency that repeats a relation already on the path from the root.
    Cycle,
    /// A dependency below the depth limit.
    DepthLimit,
}

impl std::fmt::Display for LineLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineLabel::Rule(kind) => f.write_str(kind),
            LineLabel::Missing => f.write_str("(no tracedata)"),
            LineLabel::Cycle => f.write_str("(cycle)"),
            LineLabel::DepthLimit => f.write_str("(depth limit)"),
        }
    }
}

/// One line of a proof trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofLine {
    /// Nesting level; the queried relation is at depth 0.
    pub depth: usize,
    pub key: RelationKey,
    pub sub_name: Option<String>,
    pub super_name: Option<String>,
    pub label: LineLabel,
}

impl ProofLine {
    /// Render without the trailing newline.
    pub fn render(&self, with_names: bool) -> String {
        let mut out = INDENT.repeat(self.depth);
        if with_names {
            push_named(&mut out, self.key.sub, self.sub_name.as_deref());
            out.push_str(" -> ");
            push_named(&mut out, self.key.sup, self.super_name.as_deref());
        } else {
            let _ = write!(out, "{} -> {}", self.key.sub, self.key.sup);
        }
        out.push_str(LABEL_GAP);
        out.push_str(&self.label.to_string());
        out
    }
}

fn push_named(out: &mut String, id: ClassId, name: Option<&str>) {
    let _ = write!(out, "({id})");
    if let Some(name) = name {
        out.push(' ');
        out.push_str(name);
    }
}

// ── Explanation ─────────────────────────────────────────────────────────

/// A fully expanded proof trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub key: RelationKey,
    pub with_names: bool,
    /// Lines in pre-order. Empty when the queried pair has no record.
    pub lines: Vec<ProofLine>,
}

impl Explanation {
    /// Whether the queried pair had no trace record.
    pub fn is_no_data(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render as newline-terminated lines, or [`NO_DATA`].
    pub fn render(&self) -> String {
        if self.is_no_data() {
            return NO_DATA.to_string();
        }
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.render(self.with_names));
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for Explanation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

// ── Explainer ───────────────────────────────────────────────────────────

struct Frame {
    key: RelationKey,
    depth: usize,
}

/// Expands relations into proof traces against a [`TraceStore`].
#[derive(Debug, Clone)]
pub struct Explainer<S> {
    store: S,
    max_depth: usize,
}

impl<S: TraceStore> Explainer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Deepest level whose records are fetched and expanded.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Explain why `sub` is related to `sup`, rendered as text.
    pub fn explain(&self, sub: ClassId, sup: ClassId, with_names: bool) -> StoreResult<String> {
        Ok(self.trace(RelationKey { sub, sup }, with_names)?.render())
    }

    /// Build the proof trace for `root`.
    pub fn trace(&self, root: RelationKey, with_names: bool) -> StoreResult<Explanation> {
        let mut lines = Vec::new();
        let mut path: Vec<RelationKey> = Vec::new();
        let mut on_path: HashSet<RelationKey> = HashSet::new();
        let mut stack = vec![Frame {
            key: root,
            depth: 0,
        }];

        while let Some(frame) = stack.pop() {
            // Ancestors of this frame are exactly the first `depth` path entries.
            for left in path.drain(frame.depth.min(path.len())..) {
                on_path.remove(&left);
            }

            if on_path.contains(&frame.key) {
                tracing::warn!(key = %frame.key, root = %root, "cycle in trace dependencies");
                lines.push(self.marker(frame, LineLabel::Cycle, with_names)?);
                continue;
            }
            if frame.depth > self.max_depth {
                lines.push(self.marker(frame, LineLabel::DepthLimit, with_names)?);
                continue;
            }

            let Some(record) = self.store.fetch(frame.key, with_names)? else {
                if frame.depth == 0 {
                    tracing::info!(key = %root, "no trace data");
                    return Ok(Explanation {
                        key: root,
                        with_names,
                        lines: Vec::new(),
                    });
                }
                tracing::warn!(key = %frame.key, root = %root, "dependency has no trace record");
                lines.push(self.marker(frame, LineLabel::Missing, with_names)?);
                continue;
            };

            for dep in record.dependencies.iter().rev() {
                stack.push(Frame {
                    key: dep.key(),
                    depth: frame.depth + 1,
                });
            }
            path.push(frame.key);
            on_path.insert(frame.key);
            lines.push(ProofLine {
                depth: frame.depth,
                key: frame.key,
                sub_name: record.sub_name,
                super_name: record.super_name,
                label: LineLabel::Rule(record.kind),
            });
        }

        tracing::info!(key = %root, with_names, lines = lines.len(), "explained relation");
        Ok(Explanation {
            key: root,
            with_names,
            lines,
        })
    }

    fn marker(&self, frame: Frame, label: LineLabel, with_names: bool) -> StoreResult<ProofLine> {
        let (sub_name, super_name) = if with_names {
            (
                self.store.lookup_name(frame.key.sub)?,
                self.store.lookup_name(frame.key.sup)?,
            )
        } else {
            (None, None)
        };
        Ok(ProofLine {
            depth: frame.depth,
            key: frame.key,
            sub_name,
            super_name,
            label,
        })
    }
}
