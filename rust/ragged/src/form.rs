//! Forms: the type-level description of a tree, without its buffers.
//!
//! A [`Form`] mirrors the node structure of a [`Content`](crate::content::Content)
//! (node kinds, index widths, primitive types, record fields, parameters). The
//! getitem algebra uses it for depth queries and union simplification; it also
//! renders to JSON for inspection.

use serde::Serialize;

use crate::{data::PrimitiveType, index::IndexDType, parameters::Parameters};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Form {
    #[serde(flatten)]
    pub kind: FormKind,
    pub has_identifier: bool,
    #[serde(skip_serializing_if = "Parameters::is_empty")]
    pub parameters: Parameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "class")]
pub enum FormKind {
    EmptyArray,
    NumpyArray {
        primitive: PrimitiveType,
        inner_shape: Vec<usize>,
    },
    RegularArray {
        content: Box<Form>,
        size: usize,
    },
    ListArray {
        starts: IndexDType,
        stops: IndexDType,
        content: Box<Form>,
    },
    ListOffsetArray {
        offsets: IndexDType,
        content: Box<Form>,
    },
    RecordArray {
        contents: Vec<Form>,
        fields: Option<Vec<String>>,
    },
    IndexedArray {
        index: IndexDType,
        content: Box<Form>,
    },
    IndexedOptionArray {
        index: IndexDType,
        content: Box<Form>,
    },
    ByteMaskedArray {
        mask: IndexDType,
        content: Box<Form>,
        valid_when: bool,
    },
    BitMaskedArray {
        mask: IndexDType,
        content: Box<Form>,
        valid_when: bool,
        lsb_order: bool,
    },
    UnmaskedArray {
        content: Box<Form>,
    },
    UnionArray {
        tags: IndexDType,
        index: IndexDType,
        contents: Vec<Form>,
    },
}

impl Form {
    pub fn new(kind: FormKind, has_identifier: bool, parameters: Parameters) -> Form {
        Form {
            kind,
            has_identifier,
            parameters,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Whether two forms describe the same type, ignoring identifiers.
    pub fn same_type(&self, other: &Form) -> bool {
        self.parameters == other.parameters && self.strip_identifiers() == other.strip_identifiers()
    }

    fn strip_identifiers(&self) -> Form {
        let strip = |f: &Form| Box::new(f.strip_identifiers());
        let kind = match &self.kind {
            FormKind::RegularArray { content, size } => FormKind::RegularArray {
                content: strip(content),
                size: *size,
            },
            FormKind::ListArray {
                starts,
                stops,
                content,
            } => FormKind::ListArray {
                starts: *starts,
                stops: *stops,
                content: strip(content),
            },
            FormKind::ListOffsetArray { offsets, content } => FormKind::ListOffsetArray {
                offsets: *offsets,
                content: strip(content),
            },
            FormKind::RecordArray { contents, fields } => FormKind::RecordArray {
                contents: contents.iter().map(Form::strip_identifiers).collect(),
                fields: fields.clone(),
            },
            FormKind::IndexedArray { index, content } => FormKind::IndexedArray {
                index: *index,
                content: strip(content),
            },
            FormKind::IndexedOptionArray { index, content } => FormKind::IndexedOptionArray {
                index: *index,
                content: strip(content),
            },
            FormKind::ByteMaskedArray {
                mask,
                content,
                valid_when,
            } => FormKind::ByteMaskedArray {
                mask: *mask,
                content: strip(content),
                valid_when: *valid_when,
            },
            FormKind::BitMaskedArray {
                mask,
                content,
                valid_when,
                lsb_order,
            } => FormKind::BitMaskedArray {
                mask: *mask,
                content: strip(content),
                valid_when: *valid_when,
                lsb_order: *lsb_order,
            },
            FormKind::UnmaskedArray { content } => FormKind::UnmaskedArray {
                content: strip(content),
            },
            FormKind::UnionArray {
                tags,
                index,
                contents,
            } => FormKind::UnionArray {
                tags: *tags,
                index: *index,
                contents: contents.iter().map(Form::strip_identifiers).collect(),
            },
            leaf @ (FormKind::EmptyArray | FormKind::NumpyArray { .. }) => leaf.clone(),
        };
        Form::new(kind, false, self.parameters.clone())
    }

    /// The single child of a list-like or option-like node.
    fn only_content(&self) -> Option<&Form> {
        match &self.kind {
            FormKind::RegularArray { content, .. }
            | FormKind::ListArray { content, .. }
            | FormKind::ListOffsetArray { content, .. }
            | FormKind::IndexedArray { content, .. }
            | FormKind::IndexedOptionArray { content, .. }
            | FormKind::ByteMaskedArray { content, .. }
            | FormKind::BitMaskedArray { content, .. }
            | FormKind::UnmaskedArray { content } => Some(content),
            _ => None,
        }
    }

    fn is_list(&self) -> bool {
        matches!(
            self.kind,
            FormKind::RegularArray { .. } | FormKind::ListArray { .. } | FormKind::ListOffsetArray { .. }
        )
    }

    /// Number of list dimensions above the first record or union, or `None`
    /// when the branches of a union disagree.
    pub fn purelist_depth(&self) -> Option<usize> {
        match &self.kind {
            FormKind::EmptyArray => Some(1),
            FormKind::NumpyArray { inner_shape, .. } => Some(inner_shape.len() + 1),
            FormKind::RecordArray { .. } => Some(1),
            FormKind::UnionArray { contents, .. } => {
                let mut depths = contents.iter().map(Form::purelist_depth);
                let first = depths.next().flatten()?;
                depths.all(|d| d == Some(first)).then_some(first)
            }
            _ if self.is_list() => {
                if self.parameters.is_string_like() {
                    Some(1)
                } else {
                    self.only_content()?.purelist_depth().map(|d| d + 1)
                }
            }
            _ => self.only_content()?.purelist_depth(),
        }
    }

    /// Minimum and maximum depth over all branches of the tree.
    pub fn minmax_depth(&self) -> (usize, usize) {
        match &self.kind {
            FormKind::EmptyArray => (1, 1),
            FormKind::NumpyArray { inner_shape, .. } => {
                let depth = inner_shape.len() + 1;
                (depth, depth)
            }
            FormKind::RecordArray { contents, .. } | FormKind::UnionArray { contents, .. } => {
                if contents.is_empty() {
                    return (1, 1);
                }
                contents
                    .iter()
                    .map(Form::minmax_depth)
                    .fold((usize::MAX, 0), |(lo, hi), (min, max)| (lo.min(min), hi.max(max)))
            }
            _ => {
                let Some(content) = self.only_content() else {
                    return (1, 1);
                };
                if !self.is_list() {
                    content.minmax_depth()
                } else if self.parameters.is_string_like() {
                    (1, 1)
                } else {
                    let (min, max) = content.minmax_depth();
                    (min + 1, max + 1)
                }
            }
        }
    }

    /// Whether the tree branches into sub-trees of different depths, and the
    /// minimum depth.
    pub fn branch_depth(&self) -> (bool, usize) {
        match &self.kind {
            FormKind::EmptyArray => (false, 1),
            FormKind::NumpyArray { inner_shape, .. } => (false, inner_shape.len() + 1),
            FormKind::RecordArray { contents, .. } | FormKind::UnionArray { contents, .. } => {
                if contents.is_empty() {
                    return (false, 1);
                }
                let depths = contents.iter().map(Form::branch_depth).collect::<Vec<_>>();
                let min_depth = depths.iter().map(|(_, d)| *d).min().unwrap_or(1);
                let branch =
                    depths.iter().any(|(b, _)| *b) || depths.iter().any(|(_, d)| *d != min_depth);
                (branch, min_depth)
            }
            _ => {
                let Some(content) = self.only_content() else {
                    return (false, 1);
                };
                if !self.is_list() {
                    content.branch_depth()
                } else if self.parameters.is_string_like() {
                    (false, 1)
                } else {
                    let (branch, depth) = content.branch_depth();
                    (branch, depth + 1)
                }
            }
        }
    }

    /// Whether a field projection by `name` would succeed: some record is
    /// reachable through wrappers and lists (every branch for unions) and it
    /// has a field called `name`.
    pub fn has_field(&self, name: &str) -> bool {
        match &self.kind {
            FormKind::RecordArray { contents, fields } => match fields {
                Some(fields) => fields.iter().any(|f| f == name),
                None => name.parse::<usize>().is_ok_and(|i| i < contents.len()),
            },
            FormKind::UnionArray { contents, .. } => contents.iter().all(|c| c.has_field(name)),
            _ => self.only_content().is_some_and(|c| c.has_field(name)),
        }
    }
}
