use std::sync::Arc;

use ragged_common::{Result, error::Error, verify_arg};

use crate::{
    config::{CarryMode, OutOfBounds},
    content::{
        Content, ListArray,
        list::{LIST_INDEX_TYPES, getitem_next_lists, list_content},
        node_common,
    },
    form::{Form, FormKind},
    index::{Index, Index64, with_index},
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem},
    value::Value,
};

/// Variable-length lists laid out back to back: element `i` is
/// `content[offsets[i]..offsets[i+1]]`.
#[derive(Debug, Clone)]
pub struct ListOffsetArray {
    offsets: Index,
    content: Arc<Content>,
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(ListOffsetArray);

impl ListOffsetArray {
    pub fn try_new(offsets: Index, content: impl Into<Arc<Content>>) -> Result<ListOffsetArray> {
        offsets.verify_dtype("offsets", &LIST_INDEX_TYPES)?;
        verify_arg!(offsets, !offsets.is_empty());
        let content = content.into();
        let offsets64 = offsets.to_index64();
        verify_arg!(offsets, offsets64[0] >= 0);
        verify_arg!(offsets, offsets64.windows(2).all(|w| w[0] <= w[1]));
        if offsets64[offsets64.len() - 1] as usize > content.len() {
            return Err(Error::invalid_arg(
                "offsets",
                format!(
                    "last offset {} exceeds content length {}",
                    offsets64[offsets64.len() - 1],
                    content.len()
                ),
            ));
        }
        Ok(ListOffsetArray {
            offsets,
            content,
            identifier: None,
            parameters: Parameters::default(),
        })
    }

    /// Wraps offsets derived from an already valid node: non-empty,
    /// non-decreasing and within `content`.
    pub(crate) fn from_valid_offsets(offsets: Index, content: impl Into<Arc<Content>>) -> ListOffsetArray {
        debug_assert!(!offsets.is_empty());
        ListOffsetArray {
            offsets,
            content: content.into(),
            identifier: None,
            parameters: Parameters::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn offsets(&self) -> &Index {
        &self.offsets
    }

    /// Zero-copy view of `offsets[..len]`.
    pub fn starts(&self) -> Index {
        self.offsets.slice(0, self.len())
    }

    /// Zero-copy view of `offsets[1..]`.
    pub fn stops(&self) -> Index {
        self.offsets.slice(1, self.len() + 1)
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::ListOffsetArray {
                offsets: self.offsets.dtype(),
                content: Box::new(self.content.form()),
            },
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    /// The same lists as a starts/stops node over the same content.
    pub fn to_list_array(&self) -> ListArray {
        match ListArray::try_new(self.starts(), self.stops(), self.content.clone()) {
            Ok(list) => list
                .with_parameters(self.parameters.clone())
                .with_identifier(self.identifier.clone()),
            Err(_) => unreachable!("offset views always form a valid ListArray"),
        }
    }

    /// The reachable part of the content, starting at `offsets[0]`.
    pub(crate) fn trimmed(&self) -> Result<(Index64, Content)> {
        let offsets = self.offsets.to_index64();
        let first = offsets[0];
        let last = offsets[offsets.len() - 1];
        let content = if first == 0 && last as usize == self.content.len() {
            self.content.as_ref().clone()
        } else {
            self.content
                .getitem_range_unchecked(first as usize, last as usize)?
        };
        let offsets = if first == 0 {
            offsets
        } else {
            offsets.iter().map(|&o| o - first).collect()
        };
        Ok((offsets, content))
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        let start = self.offsets.get(at);
        let stop = self.offsets.get(at + 1);
        let content = list_content(&self.label(), at, start, stop, &self.content)?;
        Ok(Value::Content(content))
    }

    pub(crate) fn getitem_range(&self, start: usize, stop: usize) -> Result<Content> {
        let mut out = ListOffsetArray::from_valid_offsets(self.offsets.slice(start, stop + 1), self.content.clone());
        out.parameters = self.parameters.clone();
        out.identifier = self.range_identifier(start, stop);
        Ok(out.into())
    }

    pub(crate) fn getitem_field(&self, name: &str, only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_field(name, only_fields)?;
        let mut out = ListOffsetArray::from_valid_offsets(self.offsets.clone(), content);
        out.identifier = self.field_identifier(name);
        Ok(out.into())
    }

    pub(crate) fn getitem_fields(&self, names: &[String], only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_fields(names, only_fields)?;
        let mut out = ListOffsetArray::from_valid_offsets(self.offsets.clone(), content);
        out.identifier = self.identifier.clone();
        Ok(out.into())
    }

    pub(crate) fn carry(
        &self,
        carry: Index64,
        mode: CarryMode,
        exception: OutOfBounds,
    ) -> Result<Content> {
        self.to_list_array().carry(carry, mode, exception)
    }

    pub(crate) fn getitem_next(
        &self,
        head: DimHead<'_>,
        tail: &[SliceItem],
        advanced: Option<&Index64>,
    ) -> Result<Content> {
        let len = self.len();
        with_index!(&self.offsets, offsets => {
            getitem_next_lists(
                || self.label(),
                &offsets[..len],
                &offsets[1..],
                &self.content,
                head,
                tail,
                advanced,
            )
        })
    }

    pub(crate) fn getitem_nothing(&self) -> Result<Content> {
        self.content.getitem_range_unchecked(0, 0)
    }
}
