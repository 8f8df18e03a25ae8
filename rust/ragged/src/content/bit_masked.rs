use std::sync::Arc;

use ragged_common::{Result, error::Error};
use ragged_kernels::masked::bitmasked_to_bytemask;

use crate::{
    buffer::Buffer,
    config::{CarryMode, OutOfBounds},
    content::{ByteMaskedArray, Content, IndexedOptionArray, kernel_error, node_common},
    form::{Form, FormKind},
    index::{Index64, IndexDType},
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem},
    value::Value,
};

/// An option type with one mask bit per element, eight elements per byte.
///
/// Element `i` is present when its bit equals `valid_when`. With `lsb_order`
/// the first element of a byte is its least significant bit, otherwise its
/// most significant one. The mask may cover more bits than `length`.
#[derive(Debug, Clone)]
pub struct BitMaskedArray {
    mask: Buffer<u8>,
    content: Arc<Content>,
    valid_when: bool,
    length: usize,
    lsb_order: bool,
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(BitMaskedArray);

impl BitMaskedArray {
    pub fn try_new(
        mask: impl Into<Buffer<u8>>,
        content: impl Into<Arc<Content>>,
        valid_when: bool,
        length: usize,
        lsb_order: bool,
    ) -> Result<BitMaskedArray> {
        let mask = mask.into();
        let content = content.into();
        if length > mask.len() * 8 {
            return Err(Error::invalid_arg(
                "length",
                format!("length {length} exceeds the {} bits of the mask", mask.len() * 8),
            ));
        }
        if length > content.len() {
            return Err(Error::invalid_arg(
                "length",
                format!("length {length} exceeds content of length {}", content.len()),
            ));
        }
        Ok(BitMaskedArray {
            mask,
            content,
            valid_when,
            length,
            lsb_order,
            identifier: None,
            parameters: Parameters::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn mask(&self) -> &Buffer<u8> {
        &self.mask
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn valid_when(&self) -> bool {
        self.valid_when
    }

    pub fn lsb_order(&self) -> bool {
        self.lsb_order
    }

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::BitMaskedArray {
                mask: IndexDType::U8,
                content: Box::new(self.content.form()),
                valid_when: self.valid_when,
                lsb_order: self.lsb_order,
            },
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    fn bit(&self, at: usize) -> bool {
        let byte = self.mask[at / 8];
        let shift = at % 8;
        if self.lsb_order {
            byte & (1u8 << shift) != 0
        } else {
            byte & (0x80u8 >> shift) != 0
        }
    }

    fn unpack(&self, valid_when: bool) -> Result<Buffer<i8>> {
        let mut bytes = vec![0i8; self.mask.len() * 8];
        bitmasked_to_bytemask(&mut bytes, &self.mask, valid_when, self.lsb_order).map_err(kernel_error)?;
        bytes.truncate(self.length);
        Ok(bytes.into())
    }

    /// One byte per element, `1` where the element is missing.
    pub fn bytemask(&self) -> Result<Buffer<i8>> {
        self.unpack(self.valid_when)
    }

    /// The same option type with one byte per element; the result is valid
    /// where its byte is `1`.
    pub fn to_byte_masked_array(&self) -> Result<ByteMaskedArray> {
        let mask = self.unpack(!self.valid_when)?;
        Ok(ByteMaskedArray::try_new(mask, self.content.clone(), true)?
            .with_parameters(self.parameters.clone())
            .with_identifier(self.identifier.clone()))
    }

    pub fn to_indexed_option_array(&self) -> Result<IndexedOptionArray> {
        self.to_byte_masked_array()?.to_indexed_option_array()
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        if self.bit(at) == self.valid_when {
            self.content.getitem_at_unchecked(at)
        } else {
            Ok(Value::Missing)
        }
    }

    pub(crate) fn getitem_range(&self, start: usize, stop: usize) -> Result<Content> {
        self.to_byte_masked_array()?.getitem_range(start, stop)
    }

    pub(crate) fn getitem_field(&self, name: &str, only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_field(name, only_fields)?;
        let mut out = BitMaskedArray::try_new(
            self.mask.clone(),
            content,
            self.valid_when,
            self.length,
            self.lsb_order,
        )?;
        out.identifier = self.field_identifier(name);
        Ok(out.into())
    }

    pub(crate) fn getitem_fields(&self, names: &[String], only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_fields(names, only_fields)?;
        let mut out = BitMaskedArray::try_new(
            self.mask.clone(),
            content,
            self.valid_when,
            self.length,
            self.lsb_order,
        )?;
        out.identifier = self.identifier.clone();
        Ok(out.into())
    }

    pub(crate) fn carry(
        &self,
        carry: Index64,
        mode: CarryMode,
        exception: OutOfBounds,
    ) -> Result<Content> {
        self.to_byte_masked_array()?.carry(carry, mode, exception)
    }

    pub(crate) fn getitem_next(
        &self,
        head: DimHead<'_>,
        tail: &[SliceItem],
        advanced: Option<&Index64>,
    ) -> Result<Content> {
        self.to_byte_masked_array()?.getitem_next(head, tail, advanced)
    }

    pub(crate) fn getitem_nothing(&self) -> Result<Content> {
        self.content.getitem_range_unchecked(0, 0)
    }
}
