use std::sync::Arc;

use ragged_common::{Result, error::Error};
use ragged_kernels::{
    KernelResult,
    gather::gather,
    indexed::{indexed_getitem_nextcarry_outindex, indexed_numnull, indexed_simplify},
};

use crate::{
    config::{CarryMode, OutOfBounds},
    content::{Content, carry_error, kernel_error, node_common, normalize_carry, slice_error},
    form::{Form, FormKind},
    index::{Index, Index64, IndexDType, with_index},
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem},
    value::Value,
};

pub(crate) const OPTION_INDEX_TYPES: [IndexDType; 2] = [IndexDType::I32, IndexDType::I64];

/// An option type expressed as an indirection: element `i` is missing when
/// `index[i] < 0` and `content[index[i]]` otherwise.
#[derive(Debug, Clone)]
pub struct IndexedOptionArray {
    index: Index,
    content: Arc<Content>,
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(IndexedOptionArray);

impl IndexedOptionArray {
    pub fn try_new(index: Index, content: impl Into<Arc<Content>>) -> Result<IndexedOptionArray> {
        index.verify_dtype("index", &OPTION_INDEX_TYPES)?;
        Ok(IndexedOptionArray {
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

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::IndexedOptionArray {
                index: self.index.dtype(),
                content: Box::new(self.content.form()),
            },
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    /// One byte per element, `1` where the element is missing.
    pub fn bytemask(&self) -> Vec<i8> {
        self.index.iter().map(|j| (j < 0) as i8).collect()
    }

    /// The present elements only, with the indirection applied.
    pub fn project(&self) -> Result<Content> {
        let (nextcarry, _) = self.nextcarry_outindex().map_err(kernel_error)?;
        self.content
            .carry64(nextcarry, CarryMode::Eager, OutOfBounds::Nested)
    }

    fn nextcarry_outindex(&self) -> KernelResult<(Index64, Index64)> {
        let numnull = with_index!(&self.index, index => indexed_numnull(index.as_slice()));
        let mut nextcarry = vec![0i64; self.len() - numnull];
        let mut outindex = vec![0i64; self.len()];
        with_index!(&self.index, index => {
            indexed_getitem_nextcarry_outindex(
                &mut nextcarry,
                &mut outindex,
                index.as_slice(),
                self.content.len(),
            )
        })?;
        Ok((nextcarry.into(), outindex.into()))
    }

    /// Collapses an option or indirection node directly below this one into
    /// a single index over the grandchild.
    ///
    /// Any other content is returned unchanged, wrapped in `self`.
    pub fn simplify_optiontype(self) -> Result<Content> {
        let (inner_index, grandchild) = match self.content.as_ref() {
            Content::Indexed(inner) => (inner.index().to_index64(), inner.content_arc().clone()),
            Content::IndexedOption(inner) => (inner.index.to_index64(), inner.content.clone()),
            Content::ByteMasked(inner) => {
                let inner = inner.to_indexed_option_array()?;
                (inner.index.to_index64(), inner.content)
            }
            Content::BitMasked(inner) => {
                let inner = inner.to_indexed_option_array()?;
                (inner.index.to_index64(), inner.content)
            }
            Content::Unmasked(inner) => {
                let mut out = IndexedOptionArray::try_new(self.index, inner.content_arc().clone())?;
                out.parameters = self.parameters;
                out.identifier = self.identifier;
                return Ok(out.into());
            }
            _ => return Ok(self.into()),
        };
        log::debug!(
            "simplify_optiontype: collapsing {} over {}",
            self.label(),
            self.content.kind_name()
        );
        let mut composed = vec![0i64; self.len()];
        with_index!(&self.index, outer => {
            indexed_simplify(&mut composed, outer.as_slice(), inner_index.as_slice())
        })
        .map_err(kernel_error)?;
        let mut out = IndexedOptionArray::try_new(Index::from(composed), grandchild)?;
        out.parameters = self.parameters;
        out.identifier = self.identifier;
        Ok(out.into())
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        let j = self.index.get(at);
        if j < 0 {
            return Ok(Value::Missing);
        }
        if j as usize >= self.content.len() {
            return Err(Error::nested_index(
                self.label(),
                at.to_string(),
                Some(format!("index[{at}] = {j} is out of range for the content")),
            ));
        }
        self.content.getitem_at_unchecked(j as usize)
    }

    pub(crate) fn getitem_range(&self, start: usize, stop: usize) -> Result<Content> {
        let mut out = IndexedOptionArray::try_new(self.index.slice(start, stop), self.content.clone())?;
        out.parameters = self.parameters.clone();
        out.identifier = self.range_identifier(start, stop);
        Ok(out.into())
    }

    pub(crate) fn getitem_field(&self, name: &str, only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_field(name, only_fields)?;
        let mut out = IndexedOptionArray::try_new(self.index.clone(), content)?;
        out.identifier = self.field_identifier(name);
        Ok(out.into())
    }

    pub(crate) fn getitem_fields(&self, names: &[String], only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_fields(names, only_fields)?;
        let mut out = IndexedOptionArray::try_new(self.index.clone(), content)?;
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
        let mut out = IndexedOptionArray::try_new(Index::from(nextindex), self.content.clone())?;
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
        let (nextcarry, outindex) = self
            .nextcarry_outindex()
            .map_err(|e| slice_error(self.label(), head, e))?;
        let next = self
            .content
            .carry64(nextcarry, CarryMode::Lazy, OutOfBounds::Nested)?;
        let out = getitem_next_present(&next, &outindex, head, tail, advanced)?;
        IndexedOptionArray::try_new(Index::I64(outindex), out)?.simplify_optiontype()
    }

    pub(crate) fn getitem_nothing(&self) -> Result<Content> {
        self.content.getitem_range_unchecked(0, 0)
    }
}

/// Applies `head` to the present elements of an option node.
///
/// `outindex` maps every element of the option node to its position among
/// the present ones (`-1` where missing); the advanced index, if any, is
/// narrowed to the present elements the same way.
pub(crate) fn getitem_next_present(
    next: &Content,
    outindex: &Index64,
    head: DimHead<'_>,
    tail: &[SliceItem],
    advanced: Option<&Index64>,
) -> Result<Content> {
    match advanced {
        Some(adv) if !adv.is_empty() => {
            let nextadvanced: Index64 = outindex
                .iter()
                .zip(adv.iter())
                .filter(|(o, _)| **o >= 0)
                .map(|(_, a)| *a)
                .collect();
            next.getitem_next_dim(head, tail, Some(&nextadvanced))
        }
        _ => next.getitem_next_dim(head, tail, advanced),
    }
}

#[cfg(test)]
mod tests {
    use super::IndexedOptionArray;
    use crate::{
        config::{CarryMode, OutOfBounds},
        content::{Content, IndexedArray, ListOffsetArray, NumpyArray},
        index::Index,
        selector::SliceItem,
    };

    fn option() -> Content {
        IndexedOptionArray::try_new(
            Index::from(vec![2i64, 2, -1, 1, -1, 5, 4]),
            NumpyArray::new(vec![0.0, 1.1, 2.2, 3.3, 4.4, 5.5]),
        )
        .unwrap()
        .into()
    }

    fn values(content: &Content) -> Vec<Option<f64>> {
        (0..content.len() as i64)
            .map(|i| content.getitem_at(i).unwrap().as_f64())
            .collect()
    }

    #[test]
    fn test_getitem_at_missing() {
        let a = option();
        assert_eq!(
            values(&a),
            vec![Some(2.2), Some(2.2), None, Some(1.1), None, Some(5.5), Some(4.4)]
        );
        assert!(a.getitem_at(2).unwrap().is_missing());
        assert!(a.getitem_at(7).is_err());
    }

    #[test]
    fn test_carry_keeps_missing() {
        let a = option();
        let out = a
            .carry(&Index::from(vec![4i64, 0, -2]), CarryMode::Lazy, OutOfBounds::Nested)
            .unwrap();
        assert_eq!(values(&out), vec![None, Some(2.2), Some(5.5)]);
    }

    #[test]
    fn test_bytemask_and_project() {
        let Content::IndexedOption(a) = option() else { unreachable!() };
        assert_eq!(a.bytemask(), vec![0, 0, 1, 0, 1, 0, 0]);
        let projected = a.project().unwrap();
        assert_eq!(projected.len(), 5);
        assert_eq!(projected.getitem_at(4).unwrap().as_f64(), Some(4.4));
    }

    #[test]
    fn test_getitem_next_under_option() {
        // [[1, 2], None, [3]]
        let lists = ListOffsetArray::try_new(
            Index::from(vec![0i64, 1, 3]),
            NumpyArray::new(vec![3i64, 1, 2]),
        )
        .unwrap();
        let a = Content::from(
            IndexedOptionArray::try_new(Index::from(vec![1i64, -1, 0]), lists).unwrap(),
        );
        let out = a.getitem_next(Some(&SliceItem::Int(0)), &[], None).unwrap();
        assert!(matches!(out, Content::IndexedOption(_)));
        let got = (0..3)
            .map(|i| out.getitem_at(i).unwrap().as_scalar().and_then(|s| s.as_i64()))
            .collect::<Vec<_>>();
        assert_eq!(got, vec![Some(1), None, Some(3)]);
    }

    #[test]
    fn test_simplify_nested_option() {
        let inner = IndexedOptionArray::try_new(
            Index::from(vec![-1i64, 0, 1]),
            NumpyArray::new(vec![10i64, 20]),
        )
        .unwrap();
        let outer = IndexedOptionArray::try_new(Index::from(vec![2i32, 0, -1, 1]), inner).unwrap();
        let out = outer.simplify_optiontype().unwrap();
        let Content::IndexedOption(out) = &out else {
            panic!("expected IndexedOptionArray")
        };
        assert!(matches!(out.content(), Content::Numpy(_)));
        assert_eq!(out.index().to_index64().as_slice(), &[1, -1, -1, 0]);
    }

    #[test]
    fn test_simplify_over_indexed() {
        let inner = IndexedArray::try_new(Index::from(vec![1i64, 0]), NumpyArray::new(vec![1.5, 2.5]))
            .unwrap();
        let outer = IndexedOptionArray::try_new(Index::from(vec![0i64, -1, 1]), inner).unwrap();
        let out = Content::from(outer.clone());
        let simplified = outer.simplify_optiontype().unwrap();
        assert_eq!(values(&simplified), values(&out));
        assert_eq!(values(&simplified), vec![Some(2.5), None, Some(1.5)]);
    }
}
