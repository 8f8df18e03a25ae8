use std::sync::Arc;

use ragged_common::{Result, error::Error, verify_arg};

use crate::{
    config::{CarryMode, OutOfBounds},
    content::{Content, IndexedArray, node_common, normalize_carry},
    form::{Form, FormKind},
    index::{Index, Index64},
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem, head_tail},
    value::{Record, Value},
};

/// Records stored as one child per field (structure of arrays).
///
/// Record `i` is the `i`-th element of every child. Children may be longer
/// than the record array; only the first `length` elements are reachable.
/// Without field names the records are tuples whose fields are named
/// `"0"`, `"1"`, ...
#[derive(Debug, Clone)]
pub struct RecordArray {
    contents: Vec<Arc<Content>>,
    fields: Option<Vec<String>>,
    length: usize,
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(RecordArray);

impl RecordArray {
    /// Builds a record array.
    ///
    /// `length` defaults to the length of the shortest child and is required
    /// when there are no children.
    pub fn try_new<C: Into<Arc<Content>>>(
        contents: Vec<C>,
        fields: Option<Vec<String>>,
        length: Option<usize>,
    ) -> Result<RecordArray> {
        let contents = contents.into_iter().map(Into::into).collect::<Vec<Arc<Content>>>();
        if let Some(fields) = &fields {
            verify_arg!(fields, fields.len() == contents.len());
        }
        let shortest = contents.iter().map(|c| c.len()).min();
        let length = match (length, shortest) {
            (Some(length), Some(shortest)) => {
                verify_arg!(length, length <= shortest);
                length
            }
            (Some(length), None) => length,
            (None, Some(shortest)) => shortest,
            (None, None) => {
                return Err(Error::invalid_arg(
                    "length",
                    "a RecordArray without contents needs an explicit length",
                ));
            }
        };
        Ok(RecordArray {
            contents,
            fields,
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

    pub fn is_tuple(&self) -> bool {
        self.fields.is_none()
    }

    pub fn num_fields(&self) -> usize {
        self.contents.len()
    }

    /// Field names; tuples are named by position.
    pub fn fields(&self) -> Vec<String> {
        match &self.fields {
            Some(fields) => fields.clone(),
            None => (0..self.contents.len()).map(|i| i.to_string()).collect(),
        }
    }

    pub fn contents(&self) -> &[Arc<Content>] {
        &self.contents
    }

    pub fn field_to_index(&self, name: &str) -> Option<usize> {
        match &self.fields {
            Some(fields) => fields.iter().position(|f| f == name),
            None => name.parse::<usize>().ok().filter(|&i| i < self.contents.len()),
        }
    }

    fn require_field(&self, name: &str) -> Result<usize> {
        self.field_to_index(name).ok_or_else(|| {
            Error::nested_index(
                self.label(),
                format!("'{name}'"),
                Some(format!("no field '{name}' in record")),
            )
        })
    }

    /// Child `i`, cut to the length of the record array.
    pub fn content(&self, i: usize) -> Result<Content> {
        let content = self.contents.get(i).ok_or_else(|| {
            Error::nested_index(self.label(), i.to_string(), Some("no such field".into()))
        })?;
        if content.len() == self.length {
            Ok(content.as_ref().clone())
        } else {
            content.getitem_range_unchecked(0, self.length)
        }
    }

    /// The child holding field `name`, cut to the length of the record array.
    pub fn field_content(&self, name: &str) -> Result<Content> {
        self.content(self.require_field(name)?)
    }

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::RecordArray {
                contents: self.contents.iter().map(|c| c.form()).collect(),
                fields: self.fields.clone(),
            },
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    fn rebuild(&self, contents: Vec<Content>, fields: Option<Vec<String>>, length: usize) -> Result<RecordArray> {
        RecordArray::try_new(contents, fields, Some(length))
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        Ok(Value::Record(Record::new(self.clone(), at)))
    }

    pub(crate) fn getitem_range(&self, start: usize, stop: usize) -> Result<Content> {
        let contents = self
            .contents
            .iter()
            .map(|c| c.getitem_range_unchecked(start, stop))
            .collect::<Result<Vec<_>>>()?;
        let mut out = self.rebuild(contents, self.fields.clone(), stop - start)?;
        out.parameters = self.parameters.clone();
        out.identifier = self.range_identifier(start, stop);
        Ok(out.into())
    }

    pub(crate) fn getitem_field(&self, name: &str, only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.field_content(name)?;
        match head_tail(only_fields) {
            (None, _) => Ok(content),
            (Some(SliceItem::Field(nested)), rest) => content.getitem_field(nested, rest),
            (Some(SliceItem::Fields(nested)), rest) => content.getitem_fields(nested, rest),
            (Some(other), _) => unreachable!("non-field unit {other} among only_fields"),
        }
    }

    pub(crate) fn getitem_fields(&self, names: &[String], only_fields: &[SliceItem]) -> Result<Content> {
        let indexes = names
            .iter()
            .map(|name| self.require_field(name))
            .collect::<Result<Vec<_>>>()?;

        let (nexthead, nexttail) = head_tail(only_fields);
        let mut contents = Vec::with_capacity(indexes.len());
        let mut kept = Vec::with_capacity(indexes.len());
        for &i in &indexes {
            let content = self.content(i)?;
            let projected = match nexthead {
                None => content,
                Some(SliceItem::Field(nested)) => {
                    if !content.form().has_field(nested) {
                        continue;
                    }
                    content.getitem_field(nested, nexttail)?
                }
                Some(SliceItem::Fields(nested)) => {
                    let form = content.form();
                    if !nested.iter().all(|n| form.has_field(n)) {
                        continue;
                    }
                    content.getitem_fields(nested, nexttail)?
                }
                Some(other) => unreachable!("non-field unit {other} among only_fields"),
            };
            contents.push(projected);
            kept.push(i);
        }

        if let Some(nexthead) = nexthead {
            if contents.is_empty() && !indexes.is_empty() {
                return Err(Error::nested_index(
                    self.label(),
                    nexthead.to_string(),
                    Some("none of the selected fields has this field".into()),
                ));
            }
            if kept.len() < indexes.len() {
                log::debug!(
                    "field projection on {} dropped {} fields lacking {nexthead}",
                    self.label(),
                    indexes.len() - kept.len()
                );
            }
        }

        let fields = self
            .fields
            .as_ref()
            .map(|fields| kept.iter().map(|&i| fields[i].clone()).collect());
        let mut out = self.rebuild(contents, fields, self.length)?;
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
        if mode.is_lazy() {
            let identifier = self.carry_identifier(&carry);
            let out = IndexedArray::try_new(Index::I64(carry), self.clone())?;
            return Ok(out.with_identifier(identifier).into());
        }
        let contents = self
            .contents
            .iter()
            .map(|c| c.carry64(carry.clone(), mode, exception))
            .collect::<Result<Vec<_>>>()?;
        let mut out = self.rebuild(contents, self.fields.clone(), carry.len())?;
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
        if self.contents.is_empty() {
            return Err(Error::nested_index(
                self.label(),
                head.to_string(),
                Some("too many dimensions in slice".into()),
            ));
        }
        let (nexthead, nexttail) = head_tail(tail);
        let contents = (0..self.contents.len())
            .map(|i| self.content(i)?.getitem_next_dim(head, &[], advanced))
            .collect::<Result<Vec<_>>>()?;
        let next = RecordArray::try_new(contents, self.fields.clone(), None)?;
        Content::from(next).getitem_next(nexthead, nexttail, advanced)
    }

    pub(crate) fn getitem_nothing(&self) -> Result<Content> {
        self.getitem_range(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::RecordArray;
    use crate::{
        config::{CarryMode, OutOfBounds},
        content::{Content, NumpyArray},
        index::Index,
        selector::SliceItem,
    };

    fn record() -> Content {
        RecordArray::try_new(
            vec![
                NumpyArray::new(vec![0i64, 1, 2, 3, 4]),
                NumpyArray::new(vec![0.0, 1.1, 2.2, 3.3, 4.4, 5.5]),
            ],
            Some(vec!["x".to_string(), "y".to_string()]),
            None,
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_length_is_shortest_field() {
        let a = record();
        assert_eq!(a.len(), 5);
        assert_eq!(a.getitem_field("y", &[]).unwrap().len(), 5);
        assert!(RecordArray::try_new(Vec::<Content>::new(), None, None).is_err());
        assert!(RecordArray::try_new(vec![NumpyArray::new(vec![1.0])], None, Some(2)).is_err());
    }

    #[test]
    fn test_record_values() {
        let a = record();
        let r = a.getitem_at(2).unwrap();
        let r = r.as_record().unwrap();
        assert_eq!(r.fields(), vec!["x", "y"]);
        assert_eq!(r.field("x").unwrap().as_scalar().and_then(|s| s.as_i64()), Some(2));
        assert_eq!(r.field("y").unwrap().as_f64(), Some(2.2));
        let err = r.field("z").unwrap_err();
        assert!(err.to_string().contains("no field 'z' in record"));
    }

    #[test]
    fn test_tuple_fields() {
        let t = Content::from(
            RecordArray::try_new(
                vec![NumpyArray::new(vec![1i64, 2, 3]), NumpyArray::new(vec![1.1, 2.2, 3.3])],
                None,
                None,
            )
            .unwrap(),
        );
        assert_eq!(t.getitem_field("1", &[]).unwrap().getitem_at(0).unwrap().as_f64(), Some(1.1));
        assert!(t.getitem_field("2", &[]).is_err());
        assert!(t.form().has_field("0"));
    }

    #[test]
    fn test_zero_fields() {
        let e = Content::from(RecordArray::try_new(Vec::<Content>::new(), None, Some(10)).unwrap());
        assert_eq!(e.len(), 10);
        assert_eq!(e.getitem_range(3, 7).unwrap().len(), 4);
        assert!(e.getitem_at(9).unwrap().as_record().is_some());
        assert!(e.getitem_at(10).is_err());
        assert!(e.getitem_next(Some(&SliceItem::Int(0)), &[], None).is_err());
    }

    #[test]
    fn test_lazy_and_eager_carry() {
        let a = record();
        let lazy = a
            .carry(&Index::from(vec![4i64, -5]), CarryMode::Lazy, OutOfBounds::Nested)
            .unwrap();
        assert!(matches!(lazy, Content::Indexed(_)));
        let eager = a
            .carry(&Index::from(vec![4i64, -5]), CarryMode::Eager, OutOfBounds::Nested)
            .unwrap();
        let Content::Record(eager) = &eager else {
            panic!("expected RecordArray")
        };
        assert_eq!(eager.len(), 2);
        assert_eq!(
            eager.field_content("y").unwrap().getitem_at(1).unwrap().as_f64(),
            Some(0.0)
        );
        assert!(a.carry(&Index::from(vec![5i64]), CarryMode::Eager, OutOfBounds::Nested).is_err());
    }

    #[test]
    fn test_getitem_fields_order() {
        let a = record();
        let out = a
            .getitem_fields(&["y".to_string(), "x".to_string()], &[])
            .unwrap();
        let Content::Record(out) = &out else {
            panic!("expected RecordArray")
        };
        assert_eq!(out.fields(), vec!["y", "x"]);
        assert!(a.getitem_fields(&["x".to_string(), "z".to_string()], &[]).is_err());
    }
}
