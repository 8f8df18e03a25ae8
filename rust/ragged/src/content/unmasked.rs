use std::sync::Arc;

use ragged_common::Result;

use crate::{
    config::{CarryMode, OutOfBounds},
    content::{Content, IndexedOptionArray, node_common, normalize_carry},
    form::{Form, FormKind},
    index::{Index, Index64},
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem},
    value::Value,
};

/// An option type in which no element is missing.
#[derive(Debug, Clone)]
pub struct UnmaskedArray {
    content: Arc<Content>,
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(UnmaskedArray);

impl UnmaskedArray {
    pub fn new(content: impl Into<Arc<Content>>) -> UnmaskedArray {
        UnmaskedArray {
            content: content.into(),
            identifier: None,
            parameters: Parameters::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub(crate) fn content_arc(&self) -> &Arc<Content> {
        &self.content
    }

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::UnmaskedArray {
                content: Box::new(self.content.form()),
            },
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    /// All zeros: nothing is missing.
    pub fn bytemask(&self) -> Vec<i8> {
        vec![0; self.len()]
    }

    pub fn to_indexed_option_array(&self) -> Result<IndexedOptionArray> {
        let index: Vec<i64> = (0..self.len() as i64).collect();
        Ok(IndexedOptionArray::try_new(Index::from(index), self.content.clone())?
            .with_parameters(self.parameters.clone())
            .with_identifier(self.identifier.clone()))
    }

    /// Drops a redundant wrapper around content that is already an option
    /// type.
    pub fn simplify_optiontype(self) -> Content {
        match self.content.as_ref() {
            Content::IndexedOption(_)
            | Content::ByteMasked(_)
            | Content::BitMasked(_)
            | Content::Unmasked(_) => {
                log::debug!("simplify_optiontype: dropping {} over an option type", self.label());
                self.content.as_ref().clone()
            }
            _ => self.into(),
        }
    }

    fn wrap(&self, content: Content, identifier: Option<Identifier>) -> Content {
        let mut out = UnmaskedArray::new(content);
        out.parameters = self.parameters.clone();
        out.identifier = identifier;
        out.into()
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        self.content.getitem_at_unchecked(at)
    }

    pub(crate) fn getitem_range(&self, start: usize, stop: usize) -> Result<Content> {
        let content = self.content.getitem_range_unchecked(start, stop)?;
        Ok(self.wrap(content, self.range_identifier(start, stop)))
    }

    pub(crate) fn getitem_field(&self, name: &str, only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_field(name, only_fields)?;
        Ok(UnmaskedArray::new(content)
            .with_identifier(self.field_identifier(name))
            .into())
    }

    pub(crate) fn getitem_fields(&self, names: &[String], only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_fields(names, only_fields)?;
        Ok(UnmaskedArray::new(content)
            .with_identifier(self.identifier.clone())
            .into())
    }

    pub(crate) fn carry(
        &self,
        carry: Index64,
        mode: CarryMode,
        exception: OutOfBounds,
    ) -> Result<Content> {
        let carry = normalize_carry(carry, self.len(), mode, exception, || self.label())?;
        let identifier = self.carry_identifier(&carry);
        let content = self.content.carry64(carry, mode, exception)?;
        Ok(self.wrap(content, identifier))
    }

    pub(crate) fn getitem_next(
        &self,
        head: DimHead<'_>,
        tail: &[SliceItem],
        advanced: Option<&Index64>,
    ) -> Result<Content> {
        let content = self.content.getitem_next_dim(head, tail, advanced)?;
        let mut out = UnmaskedArray::new(content);
        out.parameters = self.parameters.clone();
        Ok(out.simplify_optiontype())
    }

    pub(crate) fn getitem_nothing(&self) -> Result<Content> {
        self.content.getitem_range_unchecked(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::UnmaskedArray;
    use crate::{
        config::{CarryMode, OutOfBounds},
        content::{Content, ListOffsetArray, NumpyArray},
        index::Index,
        selector::SliceItem,
    };

    #[test]
    fn test_identity_wrapper() {
        let a = Content::from(UnmaskedArray::new(NumpyArray::new(vec![1.1, 2.2, 3.3])));
        assert_eq!(a.len(), 3);
        assert_eq!(a.getitem_at(-1).unwrap().as_f64(), Some(3.3));
        let range = a.getitem_range(1, 3).unwrap();
        assert!(matches!(range, Content::Unmasked(_)));
        assert_eq!(range.getitem_at(0).unwrap().as_f64(), Some(2.2));
        let carried = a
            .carry(&Index::from(vec![2i64, -3]), CarryMode::Lazy, OutOfBounds::Nested)
            .unwrap();
        assert_eq!(carried.getitem_at(1).unwrap().as_f64(), Some(1.1));
    }

    #[test]
    fn test_getitem_next_keeps_wrapper() {
        let lists = ListOffsetArray::try_new(
            Index::from(vec![0i64, 2, 3]),
            NumpyArray::new(vec![1i64, 2, 3]),
        )
        .unwrap();
        let a = Content::from(UnmaskedArray::new(lists));
        let out = a.getitem_next(Some(&SliceItem::Int(0)), &[], None).unwrap();
        assert!(matches!(out, Content::Unmasked(_)));
        assert_eq!(out.getitem_at(1).unwrap().as_scalar().and_then(|s| s.as_i64()), Some(3));
    }

    #[test]
    fn test_to_indexed_option() {
        let Content::Unmasked(a) = Content::from(UnmaskedArray::new(NumpyArray::new(vec![5i64, 6])))
        else {
            unreachable!()
        };
        assert_eq!(a.bytemask(), vec![0, 0]);
        let option = a.to_indexed_option_array().unwrap();
        assert_eq!(option.index().to_index64().as_slice(), &[0, 1]);
    }
}
