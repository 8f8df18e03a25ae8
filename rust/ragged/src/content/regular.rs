use std::sync::Arc;

use ragged_common::{Result, error::Error};
use ragged_kernels::{
    regular::{
        regular_getitem_carry, regular_getitem_next_array, regular_getitem_next_array_advanced,
        regular_getitem_next_array_regularize, regular_getitem_next_at, regular_getitem_next_range,
        regular_getitem_next_range_spreadadvanced,
    },
    slicing::{range_len, regularize_range},
};

use crate::{
    config::{CarryMode, OutOfBounds},
    content::{Content, getitem_next_array_wrap, kernel_error, node_common, normalize_carry, slice_error},
    form::{Form, FormKind},
    index::Index64,
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem, head_tail},
    value::Value,
};

/// Lists of one fixed `size`: element `i` is `content[i*size..(i+1)*size]`.
///
/// Content beyond `length * size` is unreachable. With `size == 0` the
/// length cannot be derived from the content and is given explicitly as
/// `zeros_length`.
#[derive(Debug, Clone)]
pub struct RegularArray {
    content: Arc<Content>,
    size: usize,
    length: usize,
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(RegularArray);

impl RegularArray {
    pub fn try_new(content: impl Into<Arc<Content>>, size: usize, zeros_length: usize) -> Result<RegularArray> {
        let content = content.into();
        let length = if size > 0 {
            content.len() / size
        } else {
            zeros_length
        };
        Ok(RegularArray {
            content,
            size,
            length,
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

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::RegularArray {
                content: Box::new(self.content.form()),
                size: self.size,
            },
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    /// Equivalent offsets `0, size, 2*size, ...`.
    pub fn compact_offsets64(&self) -> Index64 {
        (0..=self.length).map(|i| (i * self.size) as i64).collect()
    }

    /// The accessible part of the content: `length * size` elements.
    pub(crate) fn trimmed_content(&self) -> Result<Content> {
        let stop = self.length * self.size;
        if stop == self.content.len() {
            Ok(self.content.as_ref().clone())
        } else {
            self.content.getitem_range_unchecked(0, stop)
        }
    }

    fn rewrap(&self, content: Content, length: usize) -> Result<Content> {
        let mut out = RegularArray::try_new(content, self.size, length)?;
        out.parameters = self.parameters.clone();
        Ok(out.into())
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        let start = at * self.size;
        let content = self.content.getitem_range_unchecked(start, start + self.size)?;
        Ok(Value::Content(content))
    }

    pub(crate) fn getitem_range(&self, start: usize, stop: usize) -> Result<Content> {
        let content = self
            .content
            .getitem_range_unchecked(start * self.size, stop * self.size)?;
        let mut out = RegularArray::try_new(content, self.size, stop - start)?;
        out.parameters = self.parameters.clone();
        out.identifier = self.range_identifier(start, stop);
        Ok(out.into())
    }

    pub(crate) fn getitem_field(&self, name: &str, only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_field(name, only_fields)?;
        let mut out = RegularArray::try_new(content, self.size, self.length)?;
        out.identifier = self.field_identifier(name);
        Ok(out.into())
    }

    pub(crate) fn getitem_fields(&self, names: &[String], only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_fields(names, only_fields)?;
        let mut out = RegularArray::try_new(content, self.size, self.length)?;
        out.identifier = self.identifier.clone();
        Ok(out.into())
    }

    pub(crate) fn carry(
        &self,
        carry: Index64,
        mode: CarryMode,
        exception: OutOfBounds,
    ) -> Result<Content> {
        let carry = normalize_carry(carry, self.length, mode, exception, || self.label())?;
        let mut nextcarry = vec![0i64; carry.len() * self.size];
        regular_getitem_carry(&mut nextcarry, &carry, self.size).map_err(kernel_error)?;
        let content = self.content.carry64(nextcarry.into(), mode, exception)?;
        let mut out = RegularArray::try_new(content, self.size, carry.len())?;
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
        let (nexthead, nexttail) = head_tail(tail);
        match head {
            DimHead::At(at) => {
                let mut nextcarry = vec![0i64; self.length];
                regular_getitem_next_at(&mut nextcarry, at, self.size)
                    .map_err(|e| slice_error(self.label(), head, e))?;
                let nextcontent =
                    self.content
                        .carry64(nextcarry.into(), CarryMode::Lazy, OutOfBounds::Nested)?;
                nextcontent.getitem_next(nexthead, nexttail, advanced)
            }

            DimHead::Range(slice) => {
                let step = slice.step_or_one();
                if step == 0 {
                    return Err(Error::nested_index(
                        self.label(),
                        head.to_string(),
                        Some("slice step must not be 0".into()),
                    ));
                }
                let (start, stop) = regularize_range(slice.start, slice.stop, step, self.size as i64);
                let nextsize = range_len(start, stop, step);
                let mut nextcarry = vec![0i64; self.length * nextsize];
                regular_getitem_next_range(&mut nextcarry, start, step, self.length, self.size, nextsize)
                    .map_err(|e| slice_error(self.label(), head, e))?;
                let nextcontent =
                    self.content
                        .carry64(nextcarry.into(), CarryMode::Lazy, OutOfBounds::Nested)?;

                let out = match advanced {
                    Some(advanced) if !advanced.is_empty() => {
                        let mut nextadvanced = vec![0i64; advanced.len() * nextsize];
                        regular_getitem_next_range_spreadadvanced(&mut nextadvanced, advanced, nextsize)
                            .map_err(|e| slice_error(self.label(), head, e))?;
                        let nextadvanced: Index64 = nextadvanced.into();
                        nextcontent.getitem_next(nexthead, nexttail, Some(&nextadvanced))?
                    }
                    _ => nextcontent.getitem_next(nexthead, nexttail, advanced)?,
                };
                Ok(RegularArray::try_new(out, nextsize, self.length)?.into())
            }

            DimHead::Array(array) => {
                let flathead = array.flat();
                let mut regular_flathead = vec![0i64; flathead.len()];
                regular_getitem_next_array_regularize(&mut regular_flathead, flathead, self.size)
                    .map_err(|e| slice_error(self.label(), head, e))?;

                match advanced {
                    Some(advanced) if !advanced.is_empty() => {
                        if self.size == 0 {
                            let nextcontent = self.content.carry64(
                                Index64::empty(),
                                CarryMode::Lazy,
                                OutOfBounds::Nested,
                            )?;
                            return nextcontent.getitem_next(nexthead, nexttail, Some(&Index64::empty()));
                        }
                        let mut nextcarry = vec![0i64; self.length];
                        let mut nextadvanced = vec![0i64; self.length];
                        regular_getitem_next_array_advanced(
                            &mut nextcarry,
                            &mut nextadvanced,
                            advanced,
                            &regular_flathead,
                            self.size,
                        )
                        .map_err(|e| slice_error(self.label(), head, e))?;
                        let nextcontent = self.content.carry64(
                            nextcarry.into(),
                            CarryMode::Lazy,
                            OutOfBounds::Nested,
                        )?;
                        let nextadvanced: Index64 = nextadvanced.into();
                        nextcontent.getitem_next(nexthead, nexttail, Some(&nextadvanced))
                    }
                    _ => {
                        let lenflat = regular_flathead.len();
                        let mut nextcarry = vec![0i64; self.length * lenflat];
                        let mut nextadvanced = vec![0i64; self.length * lenflat];
                        regular_getitem_next_array(
                            &mut nextcarry,
                            &mut nextadvanced,
                            &regular_flathead,
                            self.length,
                            self.size,
                        )
                        .map_err(|e| slice_error(self.label(), head, e))?;
                        let nextcontent = self.content.carry64(
                            nextcarry.into(),
                            CarryMode::Lazy,
                            OutOfBounds::Nested,
                        )?;
                        let nextadvanced: Index64 = nextadvanced.into();
                        let out = nextcontent.getitem_next(nexthead, nexttail, Some(&nextadvanced))?;
                        if advanced.is_none() {
                            getitem_next_array_wrap(out, array.shape(), self.length)
                        } else {
                            Ok(out)
                        }
                    }
                }
            }
        }
    }

    pub(crate) fn getitem_nothing(&self) -> Result<Content> {
        self.content.getitem_range_unchecked(0, 0)
    }

    pub(crate) fn merge(&self, other: &RegularArray) -> Result<Content> {
        let content = self.trimmed_content()?.merge(&other.trimmed_content()?)?;
        self.rewrap(content, self.length + other.length)
    }
}
