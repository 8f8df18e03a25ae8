//! Concatenation of two nodes of the same type.
//!
//! Used by union simplification to fold contents with equal forms into one.

use ragged_common::{Result, error::Error};

use crate::{
    buffer::Buffer,
    content::{
        ByteMaskedArray, Content, IndexedArray, IndexedOptionArray, ListOffsetArray, NumpyArray,
        RecordArray, UnionArray, UnmaskedArray,
    },
    index::{Index, Index64},
};

impl Content {
    /// Whether [`merge`](Content::merge) can concatenate `self` and `other`.
    ///
    /// An empty array merges with anything; otherwise the two forms must
    /// describe the same type.
    pub fn mergeable(&self, other: &Content) -> bool {
        matches!(self, Content::Empty(_))
            || matches!(other, Content::Empty(_))
            || self.form().same_type(&other.form())
    }

    /// The elements of `self` followed by the elements of `other`.
    pub fn merge(&self, other: &Content) -> Result<Content> {
        log::trace!("merge {} with {}", self.label(), other.label());
        let out = match (self, other) {
            (Content::Empty(_), _) => return Ok(other.clone()),
            (_, Content::Empty(_)) => return Ok(self.clone()),
            (Content::Numpy(a), Content::Numpy(b)) => merge_numpy(a, b)?,
            (Content::Regular(a), Content::Regular(b)) => a.merge(b)?,
            (Content::List(_) | Content::ListOffset(_), Content::List(_) | Content::ListOffset(_)) => {
                merge_lists(&as_list_offset(self)?, &as_list_offset(other)?)?
            }
            (Content::Record(a), Content::Record(b)) => merge_records(a, b)?,
            (Content::Indexed(a), Content::Indexed(b)) => {
                let index = concat_index(&a.index().to_index64(), &b.index().to_index64(), a.content().len());
                let content = a.content().merge(b.content())?;
                IndexedArray::try_new(Index::I64(index), content)?.into()
            }
            (Content::IndexedOption(a), Content::IndexedOption(b)) => {
                let index = concat_index(&a.index().to_index64(), &b.index().to_index64(), a.content().len());
                let content = a.content().merge(b.content())?;
                IndexedOptionArray::try_new(Index::I64(index), content)?.into()
            }
            (Content::ByteMasked(a), Content::ByteMasked(b)) => merge_byte_masked(a, b)?,
            (Content::BitMasked(a), Content::BitMasked(b)) => {
                merge_byte_masked(&a.to_byte_masked_array()?, &b.to_byte_masked_array()?)?
            }
            (Content::Unmasked(a), Content::Unmasked(b)) => {
                UnmaskedArray::new(a.content().merge(b.content())?).into()
            }
            (Content::Union(a), Content::Union(b)) => merge_unions(a, b)?,
            _ => {
                return Err(Error::invalid_operation(format!(
                    "cannot merge {} with {}",
                    self.label(),
                    other.label()
                )));
            }
        };
        Ok(out.with_parameters(self.parameters().clone()))
    }
}

fn merge_numpy(a: &NumpyArray, b: &NumpyArray) -> Result<Content> {
    if a.shape()[1..] != b.shape()[1..] {
        return Err(Error::invalid_operation(format!(
            "cannot merge NumpyArrays of inner shapes {:?} and {:?}",
            &a.shape()[1..],
            &b.shape()[1..]
        )));
    }
    let Some(data) = a.data().concat(b.data()) else {
        return Err(Error::invalid_operation(format!(
            "cannot merge {} data with {} data",
            a.primitive().name(),
            b.primitive().name()
        )));
    };
    let mut shape = a.shape().to_vec();
    shape[0] += b.len();
    Ok(NumpyArray::try_new(data, shape)?.into())
}

fn as_list_offset(content: &Content) -> Result<ListOffsetArray> {
    match content {
        Content::ListOffset(list) => Ok(list.clone()),
        Content::List(list) => list.to_list_offset_array64(),
        _ => unreachable!("as_list_offset on {}", content.kind_name()),
    }
}

fn merge_lists(a: &ListOffsetArray, b: &ListOffsetArray) -> Result<Content> {
    let (a_offsets, a_content) = a.trimmed()?;
    let (b_offsets, b_content) = b.trimmed()?;
    let shift = a_offsets[a_offsets.len() - 1];
    let offsets: Index64 = a_offsets
        .iter()
        .copied()
        .chain(b_offsets[1..].iter().map(|&o| o + shift))
        .collect();
    let content = a_content.merge(&b_content)?;
    Ok(ListOffsetArray::try_new(Index::I64(offsets), content)?.into())
}

fn merge_records(a: &RecordArray, b: &RecordArray) -> Result<Content> {
    let length = a.len() + b.len();
    let fields = a.fields();
    let mut contents = Vec::with_capacity(fields.len());
    for (i, name) in fields.iter().enumerate() {
        let Some(j) = b.field_to_index(name) else {
            return Err(Error::invalid_operation(format!(
                "cannot merge records: field '{name}' is missing on the right"
            )));
        };
        contents.push(a.content(i)?.merge(&b.content(j)?)?);
    }
    let fields = (!a.is_tuple()).then_some(fields);
    Ok(RecordArray::try_new(contents, fields, Some(length))?.into())
}

fn merge_byte_masked(a: &ByteMaskedArray, b: &ByteMaskedArray) -> Result<Content> {
    let mask: Buffer<i8> = valid_bytes(a).chain(valid_bytes(b)).collect();
    let content = a
        .content()
        .getitem_range_unchecked(0, a.len())?
        .merge(&b.content().getitem_range_unchecked(0, b.len())?)?;
    Ok(ByteMaskedArray::try_new(mask, content, true)?.into())
}

/// `1` where present, whatever the node's `valid_when`.
fn valid_bytes(masked: &ByteMaskedArray) -> impl Iterator<Item = i8> + '_ {
    let valid_when = masked.valid_when();
    masked.mask().iter().map(move |&m| ((m != 0) == valid_when) as i8)
}

fn merge_unions(a: &UnionArray, b: &UnionArray) -> Result<Content> {
    let shift = a.num_contents() as i8;
    let tags: Buffer<i8> = a
        .tags()
        .iter()
        .copied()
        .chain(b.tags().iter().map(|&t| t + shift))
        .collect();
    let a_index = a.index().to_index64();
    let b_index = b.index().to_index64();
    let index: Index64 = a_index[..a.len()]
        .iter()
        .chain(b_index[..b.len()].iter())
        .copied()
        .collect();
    let contents = a
        .contents()
        .iter()
        .chain(b.contents())
        .cloned()
        .collect::<Vec<_>>();
    UnionArray::try_new(tags, Index::I64(index), contents)?.simplify_uniontype()
}

/// `a` followed by `b` shifted by `shift`; negative entries of `b` stay
/// missing.
fn concat_index(a: &Index64, b: &Index64, shift: usize) -> Index64 {
    a.iter()
        .copied()
        .chain(b.iter().map(|&j| if j < 0 { -1 } else { j + shift as i64 }))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{
        content::{
            BitMaskedArray, ByteMaskedArray, Content, EmptyArray, IndexedOptionArray, ListArray,
            ListOffsetArray, NumpyArray, RecordArray,
        },
        index::Index,
    };

    fn ints(values: Vec<i64>) -> Content {
        NumpyArray::new(values).into()
    }

    fn as_i64(content: &Content, i: i64) -> Option<i64> {
        content.getitem_at(i).unwrap().as_scalar().and_then(|s| s.as_i64())
    }

    #[test]
    fn test_numpy_and_empty() {
        let a = ints(vec![1, 2]);
        let b = ints(vec![3]);
        assert!(a.mergeable(&b));
        assert!(!a.mergeable(&NumpyArray::new(vec![1.0]).into()));
        let out = a.merge(&b).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(as_i64(&out, 2), Some(3));
        let empty = Content::from(EmptyArray::new());
        assert!(empty.mergeable(&a));
        assert_eq!(empty.merge(&a).unwrap().len(), 2);
        assert!(a.merge(&NumpyArray::new(vec![1.0]).into()).is_err());
    }

    #[test]
    fn test_lists_rebase_offsets() {
        let a = Content::from(
            ListOffsetArray::try_new(Index::from(vec![1i64, 3]), ints(vec![0, 1, 2])).unwrap(),
        );
        let b = Content::from(
            ListArray::try_new(Index::from(vec![2i64, 0]), Index::from(vec![3i64, 1]), ints(vec![5, 6, 7]))
                .unwrap(),
        );
        let out = as_list_offset_merge(&a, &b);
        let Content::ListOffset(out) = &out else {
            panic!("expected ListOffsetArray")
        };
        assert_eq!(out.offsets().to_index64().as_slice(), &[0, 2, 3, 4]);
        let content = out.content();
        let values = (0..4).map(|i| as_i64(content, i).unwrap()).collect::<Vec<_>>();
        assert_eq!(values, vec![1, 2, 7, 5]);
    }

    fn as_list_offset_merge(a: &Content, b: &Content) -> Content {
        super::merge_lists(&super::as_list_offset(a).unwrap(), &super::as_list_offset(b).unwrap()).unwrap()
    }

    #[test]
    fn test_records_by_name() {
        let a = Content::from(
            RecordArray::try_new(
                vec![ints(vec![1, 2]), ints(vec![10, 20])],
                Some(vec!["x".into(), "y".into()]),
                None,
            )
            .unwrap(),
        );
        let b = Content::from(
            RecordArray::try_new(
                vec![ints(vec![3]), ints(vec![30])],
                Some(vec!["x".into(), "y".into()]),
                None,
            )
            .unwrap(),
        );
        let out = a.merge(&b).unwrap();
        assert_eq!(out.len(), 3);
        let y = out.getitem_field("y", &[]).unwrap();
        assert_eq!(as_i64(&y, 2), Some(30));
    }

    #[test]
    fn test_option_types() {
        let a = Content::from(
            IndexedOptionArray::try_new(Index::from(vec![1i64, -1]), ints(vec![4, 5])).unwrap(),
        );
        let b = Content::from(
            IndexedOptionArray::try_new(Index::from(vec![-1i64, 0]), ints(vec![6])).unwrap(),
        );
        let out = a.merge(&b).unwrap();
        let got = (0..4).map(|i| as_i64(&out, i)).collect::<Vec<_>>();
        assert_eq!(got, vec![Some(5), None, None, Some(6)]);

        let a = Content::from(ByteMaskedArray::try_new(vec![0i8, 1], ints(vec![1, 2]), false).unwrap());
        let b = Content::from(ByteMaskedArray::try_new(vec![0i8, 1], ints(vec![3, 4]), false).unwrap());
        let out = a.merge(&b).unwrap();
        let got = (0..4).map(|i| as_i64(&out, i)).collect::<Vec<_>>();
        assert_eq!(got, vec![Some(1), None, Some(3), None]);

        let a = Content::from(BitMaskedArray::try_new(vec![0b1000_0000u8], ints(vec![1, 2]), true, 2, false).unwrap());
        let out = a.merge(&a).unwrap();
        assert!(matches!(out, Content::ByteMasked(_)));
        let got = (0..4).map(|i| as_i64(&out, i)).collect::<Vec<_>>();
        assert_eq!(got, vec![Some(1), None, Some(1), None]);
    }
}
