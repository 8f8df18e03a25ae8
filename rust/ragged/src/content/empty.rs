use ragged_common::{Result, error::Error};

use crate::{
    config::{CarryMode, OutOfBounds},
    content::{Content, node_common, normalize_carry, not_records},
    form::{Form, FormKind},
    index::Index64,
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem},
    value::Value,
};

/// A node with no elements and no type.
#[derive(Debug, Clone, Default)]
pub struct EmptyArray {
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(EmptyArray);

impl EmptyArray {
    pub fn new() -> EmptyArray {
        EmptyArray::default()
    }

    pub fn len(&self) -> usize {
        0
    }

    pub fn is_empty(&self) -> bool {
        true
    }

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::EmptyArray,
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        Err(Error::nested_index(
            self.label(),
            at.to_string(),
            Some("array is empty".into()),
        ))
    }

    pub(crate) fn getitem_range(&self, _start: usize, _stop: usize) -> Result<Content> {
        Ok(self.clone().into())
    }

    pub(crate) fn getitem_field(&self, name: &str, _only_fields: &[SliceItem]) -> Result<Content> {
        Err(not_records(self.label(), format!("'{name}'")))
    }

    pub(crate) fn getitem_fields(&self, names: &[String], _only_fields: &[SliceItem]) -> Result<Content> {
        Err(not_records(self.label(), SliceItem::Fields(names.to_vec())))
    }

    pub(crate) fn carry(
        &self,
        carry: Index64,
        mode: CarryMode,
        exception: OutOfBounds,
    ) -> Result<Content> {
        normalize_carry(carry, 0, mode, exception, || self.label())?;
        Ok(self.clone().into())
    }

    pub(crate) fn getitem_next(
        &self,
        head: DimHead<'_>,
        _tail: &[SliceItem],
        _advanced: Option<&Index64>,
    ) -> Result<Content> {
        match head {
            DimHead::At(_) => Err(Error::nested_index(
                self.label(),
                head.to_string(),
                Some("array is empty".into()),
            )),
            DimHead::Range(_) | DimHead::Array(_) => Ok(self.clone().into()),
        }
    }

    pub(crate) fn getitem_nothing(&self) -> Result<Content> {
        Ok(self.clone().into())
    }
}

#[cfg(test)]
mod tests {
    use super::EmptyArray;
    use crate::{
        config::{CarryMode, OutOfBounds},
        content::Content,
        index::Index,
        selector::SliceItem,
    };

    #[test]
    fn test_empty() {
        let a = Content::from(EmptyArray::new());
        assert_eq!(a.len(), 0);
        let err = a.getitem_at(0).unwrap_err();
        assert!(err.is_index_error());
        assert!(err.to_string().contains("array is empty"));
        assert!(a.getitem_at(-1).is_err());
        assert!(matches!(a.getitem_range(0, 0).unwrap(), Content::Empty(_)));
        assert!(matches!(a.getitem_range(1, 100).unwrap(), Content::Empty(_)));
        assert!(a.getitem_field("x", &[]).is_err());
    }

    #[test]
    fn test_carry() {
        let a = Content::from(EmptyArray::new());
        let out = a
            .carry(&Index::from(Vec::<i64>::new()), CarryMode::Lazy, OutOfBounds::Nested)
            .unwrap();
        assert!(out.is_empty());
        assert!(a.carry(&Index::from(vec![0i64]), CarryMode::Lazy, OutOfBounds::Nested).is_err());
    }

    #[test]
    fn test_getitem_next() {
        let a = Content::from(EmptyArray::new());
        assert!(a.getitem_next(Some(&SliceItem::Int(0)), &[], None).is_err());
        let out = a.getitem_next(Some(&SliceItem::full()), &[], None).unwrap();
        assert!(matches!(out, Content::Empty(_)));
    }
}
