use std::sync::Arc;

use ragged_common::{Result, error::Error};
use ragged_kernels::{
    gather::gather,
    masked::{bytemasked_getitem_nextcarry_outindex, bytemasked_numnull, bytemasked_to_indexed_option},
};

use crate::{
    buffer::Buffer,
    config::{CarryMode, OutOfBounds},
    content::{
        Content, IndexedOptionArray, carry_error, indexed_option::getitem_next_present, kernel_error,
        node_common, normalize_carry, slice_error,
    },
    form::{Form, FormKind},
    index::{Index, Index64, IndexDType},
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem},
    value::Value,
};

/// An option type with one mask byte per element.
///
/// Element `i` is present when `(mask[i] != 0) == valid_when`. The content
/// is at least as long as the mask and is aligned with it.
#[derive(Debug, Clone)]
pub struct ByteMaskedArray {
    mask: Buffer<i8>,
    content: Arc<Content>,
    valid_when: bool,
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(ByteMaskedArray);

impl ByteMaskedArray {
    pub fn try_new(
        mask: impl Into<Buffer<i8>>,
        content: impl Into<Arc<Content>>,
        valid_when: bool,
    ) -> Result<ByteMaskedArray> {
        let mask = mask.into();
        let content = content.into();
        if mask.len() > content.len() {
            return Err(Error::invalid_arg(
                "mask",
                format!("mask of length {} is longer than content of length {}", mask.len(), content.len()),
            ));
        }
        Ok(ByteMaskedArray {
            mask,
            content,
            valid_when,
            identifier: None,
            parameters: Parameters::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn mask(&self) -> &Buffer<i8> {
        &self.mask
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn valid_when(&self) -> bool {
        self.valid_when
    }

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::ByteMaskedArray {
                mask: IndexDType::I8,
                content: Box::new(self.content.form()),
                valid_when: self.valid_when,
            },
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    fn is_valid(&self, at: usize) -> bool {
        (self.mask[at] != 0) == self.valid_when
    }

    /// One byte per element, `1` where the element is missing.
    pub fn bytemask(&self) -> Buffer<i8> {
        self.mask
            .iter()
            .map(|&m| ((m != 0) != self.valid_when) as i8)
            .collect()
    }

    /// The same option type as an index: `i` where present, `-1` where missing.
    pub fn to_indexed_option_array(&self) -> Result<IndexedOptionArray> {
        let mut index = vec![0i64; self.len()];
        bytemasked_to_indexed_option(&mut index, &self.mask, self.valid_when).map_err(kernel_error)?;
        Ok(IndexedOptionArray::try_new(Index::from(index), self.content.clone())?
            .with_parameters(self.parameters.clone())
            .with_identifier(self.identifier.clone()))
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        if self.is_valid(at) {
            self.content.getitem_at_unchecked(at)
        } else {
            Ok(Value::Missing)
        }
    }

    pub(crate) fn getitem_range(&self, start: usize, stop: usize) -> Result<Content> {
        let content = self.content.getitem_range_unchecked(start, stop)?;
        let mut out = ByteMaskedArray::try_new(self.mask.slice(start..stop), content, self.valid_when)?;
        out.parameters = self.parameters.clone();
        out.identifier = self.range_identifier(start, stop);
        Ok(out.into())
    }

    pub(crate) fn getitem_field(&self, name: &str, only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_field(name, only_fields)?;
        let mut out = ByteMaskedArray::try_new(self.mask.clone(), content, self.valid_when)?;
        out.identifier = self.field_identifier(name);
        Ok(out.into())
    }

    pub(crate) fn getitem_fields(&self, names: &[String], only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_fields(names, only_fields)?;
        let mut out = ByteMaskedArray::try_new(self.mask.clone(), content, self.valid_when)?;
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
        let mut nextmask = vec![0i8; carry.len()];
        gather(&mut nextmask, &self.mask, &carry)
            .map_err(|e| carry_error(exception, self.label(), &carry, e))?;
        let identifier = self.carry_identifier(&carry);
        let content = self.content.carry64(carry, mode, exception)?;
        let mut out = ByteMaskedArray::try_new(nextmask, content, self.valid_when)?;
        out.parameters = self.parameters.clone();
        out.identifier = identifier;
        Ok(out.into())
    }

    pub(crate) fn getitem_next(
        &self,
        head: DimHead<'_>,
        tail: &[SliceItem],
        advanced: Option<&Index64>,
    ) -> Result<Content> {
        let numnull = bytemasked_numnull(&self.mask, self.valid_when);
        let mut nextcarry = vec![0i64; self.len() - numnull];
        let mut outindex = vec![0i64; self.len()];
        bytemasked_getitem_nextcarry_outindex(&mut nextcarry, &mut outindex, &self.mask, self.valid_when)
            .map_err(|e| slice_error(self.label(), head, e))?;
        let next = self
            .content
            .carry64(nextcarry.into(), CarryMode::Lazy, OutOfBounds::Nested)?;
        let outindex: Index64 = outindex.into();
        let out = getitem_next_present(&next, &outindex, head, tail, advanced)?;
        IndexedOptionArray::try_new(Index::I64(outindex), out)?.simplify_optiontype()
    }

    pub(crate) fn getitem_nothing(&self) -> Result<Content> {
        self.content.getitem_range_unchecked(0, 0)
    }
}
