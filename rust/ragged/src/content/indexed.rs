use std::sync::Arc;

use ragged_common::{Result, error::Error};
use ragged_kernels::{gather::gather, indexed::indexed_getitem_nextcarry};

use crate::{
    config::{CarryMode, OutOfBounds},
    content::{Content, carry_error, kernel_error, node_common, normalize_carry, slice_error},
    form::{Form, FormKind},
    index::{Index, Index64, IndexDType, with_index},
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem},
    value::Value,
};

pub(crate) const INDEXED_INDEX_TYPES: [IndexDType; 3] = [IndexDType::I32, IndexDType::U32, IndexDType::I64];

/// A lazy re-indexing of its content: element `i` is `content[index[i]]`.
///
/// Index entries are validated when they are used, not at construction.
#[derive(Debug, Clone)]
pub struct IndexedArray {
    index: Index,
    content: Arc<Content>,
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(IndexedArray);

impl IndexedArray {
    pub fn try_new(index: Index, content: impl Into<Arc<Content>>) -> Result<IndexedArray> {
        index.verify_dtype("index", &INDEXED_INDEX_TYPES)?;
        Ok(IndexedArray {
            index,
            content: content.into(),
            identifier: None,
            parameters: Parameters::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub(crate) fn content_arc(&self) -> &Arc<Content> {
        &self.content
    }

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::IndexedArray {
                index: self.index.dtype(),
                content: Box::new(self.content.form()),
            },
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    fn nextcarry(&self) -> std::result::Result<Index64, ragged_kernels::KernelError> {
        let mut nextcarry = vec![0i64; self.len()];
        with_index!(&self.index, index => {
            indexed_getitem_nextcarry(&mut nextcarry, index.as_slice(), self.content.len())
        })?;
        Ok(nextcarry.into())
    }

    /// Applies the index to the content, producing a node without the
    /// indirection.
    pub fn project(&self) -> Result<Content> {
        let nextcarry = self.nextcarry().map_err(kernel_error)?;
        self.content
            .carry64(nextcarry, CarryMode::Eager, OutOfBounds::Nested)
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        let j = self.index.get(at);
        if j < 0 || j as usize >= self.content.len() {
            return Err(Error::nested_index(
                self.label(),
                at.to_string(),
                Some(format!("index[{at}] = {j} is out of range for the content")),
            ));
        }
        self.content.getitem_at_unchecked(j as usize)
    }

    pub(crate) fn getitem_range(&self, start: usize, stop: usize) -> Result<Content> {
        let mut out = IndexedArray::try_new(self.index.slice(start, stop), self.content.clone())?;
        out.parameters = self.parameters.clone();
        out.identifier = self.range_identifier(start, stop);
        Ok(out.into())
    }

    pub(crate) fn getitem_field(&self, name: &str, only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_field(name, only_fields)?;
        let mut out = IndexedArray::try_new(self.index.clone(), content)?;
        out.identifier = self.field_identifier(name);
        Ok(out.into())
    }

    pub(crate) fn getitem_fields(&self, names: &[String], only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_fields(names, only_fields)?;
        let mut out = IndexedArray::try_new(self.index.clone(), content)?;
        out.identifier = self.identifier.clone();
        Ok(out.into())
    }

    pub(crate) fn carry(
        &self,
        carry: Index64,
        mode: CarryMode,
        exception: OutOfBounds,
    ) -> Result<Content> {
        let carry = normalize_carry(carry, self.len(), mode, exception, || self.label())?;
        let mut nextindex = vec![0i64; carry.len()];
        gather(&mut nextindex, &self.index.to_index64(), &carry)
            .map_err(|e| carry_error(exception, self.label(), &carry, e))?;
        let mut out = IndexedArray::try_new(Index::from(nextindex), self.content.clone())?;
        out.parameters = self.parameters.clone();
        out.identifier = self.carry_identifier(&carry);
        Ok(out.into())
    }

    pub(crate) fn getitem_next(
        &self,
        head: DimHead<'_>,
        tail: &[SliceItem],
        advanced: Option<&Index64>,
    ) -> Result<Content> {
        let nextcarry = self
            .nextcarry()
            .map_err(|e| slice_error(self.label(), head, e))?;
        let next = self
            .content
            .carry64(nextcarry, CarryMode::Eager, OutOfBounds::Nested)?;
        next.getitem_next_dim(head, tail, advanced)
    }

    pub(crate) fn getitem_nothing(&self) -> Result<Content> {
        self.content.getitem_range_unchecked(0, 0)
    }
}
