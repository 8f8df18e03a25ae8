use std::sync::Arc;

use ragged_common::{Result, error::Error, verify_arg};
use ragged_kernels::IndexValue;
use ragged_kernels::list::{
    list_getitem_carry, list_getitem_next_array, list_getitem_next_array_advanced,
    list_getitem_next_at, list_getitem_next_range, list_getitem_next_range_carrylength,
    list_getitem_next_range_counts, list_getitem_next_range_spreadadvanced,
};

use crate::{
    config::{CarryMode, OutOfBounds},
    content::{
        Content, ListOffsetArray, getitem_next_array_wrap, kernel_error, node_common, normalize_carry,
        slice_error,
    },
    form::{Form, FormKind},
    index::{Index, Index64, IndexDType, with_index_pair},
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem, head_tail},
    value::Value,
};

pub(crate) const LIST_INDEX_TYPES: [IndexDType; 3] = [IndexDType::I32, IndexDType::U32, IndexDType::I64];

/// Variable-length lists: element `i` is `content[starts[i]..stops[i]]`.
///
/// Lists may overlap, appear in any order and leave parts of the content
/// unreachable. `stops` may be longer than `starts`; the extra entries are
/// ignored.
#[derive(Debug, Clone)]
pub struct ListArray {
    starts: Index,
    stops: Index,
    content: Arc<Content>,
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(ListArray);

impl ListArray {
    pub fn try_new(starts: Index, stops: Index, content: impl Into<Arc<Content>>) -> Result<ListArray> {
        starts.verify_dtype("starts", &LIST_INDEX_TYPES)?;
        verify_arg!(stops, stops.dtype() == starts.dtype());
        verify_arg!(stops, stops.len() >= starts.len());
        Ok(ListArray {
            starts,
            stops,
            content: content.into(),
            identifier: None,
            parameters: Parameters::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn starts(&self) -> &Index {
        &self.starts
    }

    /// The `stops` entries that belong to a list.
    pub fn stops(&self) -> Index {
        self.stops.slice(0, self.starts.len())
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::ListArray {
                starts: self.starts.dtype(),
                stops: self.stops.dtype(),
                content: Box::new(self.content.form()),
            },
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    /// Compacts the lists into an offsets-based node whose content holds
    /// exactly the reachable elements, in list order.
    pub fn to_list_offset_array64(&self) -> Result<ListOffsetArray> {
        let starts = self.starts.to_index64();
        let stops = self.stops().to_index64();
        let mut offsets = Vec::with_capacity(starts.len() + 1);
        let mut carry = Vec::new();
        offsets.push(0i64);
        for (i, (&start, &stop)) in starts.iter().zip(stops.iter()).enumerate() {
            if start == stop {
                offsets.push(carry.len() as i64);
                continue;
            }
            if start < 0 || stop < start || stop as usize > self.content.len() {
                return Err(Error::nested_index(
                    self.label(),
                    i.to_string(),
                    Some(format!("list {start}..{stop} is outside of the content")),
                ));
            }
            carry.extend(start..stop);
            offsets.push(carry.len() as i64);
        }
        let content = self
            .content
            .carry64(carry.into(), CarryMode::Lazy, OutOfBounds::Nested)?;
        let out = ListOffsetArray::from_valid_offsets(Index::from(offsets), content);
        Ok(out.with_parameters(self.parameters.clone()))
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        let start = self.starts.get(at);
        let stop = self.stops.get(at);
        let content = list_content(&self.label(), at, start, stop, &self.content)?;
        Ok(Value::Content(content))
    }

    pub(crate) fn getitem_range(&self, start: usize, stop: usize) -> Result<Content> {
        let mut out = ListArray::try_new(
            self.starts.slice(start, stop),
            self.stops.slice(start, stop),
            self.content.clone(),
        )?;
        out.parameters = self.parameters.clone();
        out.identifier = self.range_identifier(start, stop);
        Ok(out.into())
    }

    pub(crate) fn getitem_field(&self, name: &str, only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_field(name, only_fields)?;
        let mut out = ListArray::try_new(self.starts.clone(), self.stops.clone(), content)?;
        out.identifier = self.field_identifier(name);
        Ok(out.into())
    }

    pub(crate) fn getitem_fields(&self, names: &[String], only_fields: &[SliceItem]) -> Result<Content> {
        let content = self.content.getitem_fields(names, only_fields)?;
        let mut out = ListArray::try_new(self.starts.clone(), self.stops.clone(), content)?;
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
        let mut nextstarts = vec![0i64; carry.len()];
        let mut nextstops = vec![0i64; carry.len()];
        with_index_pair!(&self.starts, &self.stops, (starts, stops) => {
            list_getitem_carry(
                &mut nextstarts,
                &mut nextstops,
                starts.as_slice(),
                stops.as_slice(),
                &carry,
            )
        })
        .map_err(kernel_error)?;
        let mut out = ListArray::try_new(
            Index::from(nextstarts),
            Index::from(nextstops),
            self.content.clone(),
        )?;
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
        let stops = self.stops();
        with_index_pair!(&self.starts, &stops, (starts, stops) => {
            getitem_next_lists(
                || self.label(),
                starts.as_slice(),
                stops.as_slice(),
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

/// The content of one list, after checking its bounds.
pub(crate) fn list_content(
    label: &str,
    at: usize,
    start: i64,
    stop: i64,
    content: &Content,
) -> Result<Content> {
    if start == stop {
        return content.getitem_range_unchecked(0, 0);
    }
    if start < 0 || stop < start || stop as usize > content.len() {
        return Err(Error::nested_index(
            label,
            at.to_string(),
            Some(format!(
                "list {start}..{stop} is outside of a content of length {}",
                content.len()
            )),
        ));
    }
    content.getitem_range_unchecked(start as usize, stop as usize)
}

/// `getitem_next` for every starts/stops-based list node.
///
/// `starts` and `stops` have one entry per list.
pub(crate) fn getitem_next_lists<T: IndexValue>(
    label: impl Fn() -> String,
    starts: &[T],
    stops: &[T],
    content: &Content,
    head: DimHead<'_>,
    tail: &[SliceItem],
    advanced: Option<&Index64>,
) -> Result<Content> {
    let (nexthead, nexttail) = head_tail(tail);
    let lenstarts = starts.len();
    match head {
        DimHead::At(at) => {
            let mut nextcarry = vec![0i64; lenstarts];
            list_getitem_next_at(&mut nextcarry, starts, stops, at)
                .map_err(|e| slice_error(label(), head, e))?;
            let nextcontent = content.carry64(nextcarry.into(), CarryMode::Lazy, OutOfBounds::Nested)?;
            nextcontent.getitem_next(nexthead, nexttail, advanced)
        }

        DimHead::Range(slice) => {
            let step = slice.step_or_one();
            if step == 0 {
                return Err(Error::nested_index(
                    label(),
                    head.to_string(),
                    Some("slice step must not be 0".into()),
                ));
            }
            let carrylength =
                list_getitem_next_range_carrylength(starts, stops, slice.start, slice.stop, step)
                    .map_err(|e| slice_error(label(), head, e))?;
            let mut nextoffsets = vec![0i64; lenstarts + 1];
            let mut nextcarry = vec![0i64; carrylength];
            list_getitem_next_range(
                &mut nextoffsets,
                &mut nextcarry,
                starts,
                stops,
                slice.start,
                slice.stop,
                step,
            )
            .map_err(|e| slice_error(label(), head, e))?;
            let nextcontent = content.carry64(nextcarry.into(), CarryMode::Lazy, OutOfBounds::Nested)?;

            let out = match advanced {
                Some(advanced) if !advanced.is_empty() => {
                    let total = list_getitem_next_range_counts(&nextoffsets)
                        .map_err(|e| slice_error(label(), head, e))?;
                    let mut nextadvanced = vec![0i64; total];
                    list_getitem_next_range_spreadadvanced(&mut nextadvanced, advanced, &nextoffsets)
                        .map_err(|e| slice_error(label(), head, e))?;
                    let nextadvanced: Index64 = nextadvanced.into();
                    nextcontent.getitem_next(nexthead, nexttail, Some(&nextadvanced))?
                }
                _ => nextcontent.getitem_next(nexthead, nexttail, advanced)?,
            };
            Ok(ListOffsetArray::from_valid_offsets(Index::from(nextoffsets), out).into())
        }

        DimHead::Array(array) => {
            let flathead = array.flat();
            match advanced {
                Some(advanced) if !advanced.is_empty() => {
                    let mut nextcarry = vec![0i64; lenstarts];
                    let mut nextadvanced = vec![0i64; lenstarts];
                    list_getitem_next_array_advanced(
                        &mut nextcarry,
                        &mut nextadvanced,
                        starts,
                        stops,
                        flathead,
                        advanced,
                        content.len(),
                    )
                    .map_err(|e| slice_error(label(), head, e))?;
                    let nextcontent =
                        content.carry64(nextcarry.into(), CarryMode::Lazy, OutOfBounds::Nested)?;
                    let nextadvanced: Index64 = nextadvanced.into();
                    nextcontent.getitem_next(nexthead, nexttail, Some(&nextadvanced))
                }
                _ => {
                    let lenflat = flathead.len();
                    let mut nextcarry = vec![0i64; lenstarts * lenflat];
                    let mut nextadvanced = vec![0i64; lenstarts * lenflat];
                    list_getitem_next_array(
                        &mut nextcarry,
                        &mut nextadvanced,
                        starts,
                        stops,
                        flathead,
                        content.len(),
                    )
                    .map_err(|e| slice_error(label(), head, e))?;
                    let nextcontent =
                        content.carry64(nextcarry.into(), CarryMode::Lazy, OutOfBounds::Nested)?;
                    let nextadvanced: Index64 = nextadvanced.into();
                    let out = nextcontent.getitem_next(nexthead, nexttail, Some(&nextadvanced))?;
                    if advanced.is_none() {
                        getitem_next_array_wrap(out, array.shape(), lenstarts)
                    } else {
                        Ok(out)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ListArray;
    use crate::{
        config::{CarryMode, OutOfBounds},
        content::{Content, NumpyArray},
        index::Index,
        selector::SliceItem,
    };

    // 200 is unreachable in stops; 6.6, 7.7 and 8.8 are unreachable in content
    fn list() -> Content {
        ListArray::try_new(
            Index::from(vec![4i64, 100, 1]),
            Index::from(vec![7i64, 100, 3, 200]),
            NumpyArray::new(vec![6.6, 4.4, 5.5, 7.7, 1.1, 2.2, 3.3, 8.8]),
        )
        .unwrap()
        .into()
    }

    fn at(content: &Content, i: i64) -> Content {
        content.getitem_at(i).unwrap().into_content().unwrap()
    }

    #[test]
    fn test_try_new() {
        let content = NumpyArray::new(vec![1.0]);
        assert!(ListArray::try_new(Index::from(vec![0i64, 0]), Index::from(vec![1i64]), content.clone()).is_err());
        assert!(ListArray::try_new(Index::from(vec![0i32]), Index::from(vec![1i64]), content.clone()).is_err());
        assert!(ListArray::try_new(Index::from(vec![0u8]), Index::from(vec![1u8]), content).is_err());
    }

    #[test]
    fn test_getitem_at() {
        let a = list();
        assert_eq!(a.len(), 3);
        assert!(a.getitem_at(3).is_err());
        assert!(a.getitem_at(-4).is_err());
        assert!(matches!(at(&a, 2), Content::Numpy(_)));
        assert_eq!(at(&a, 0).len(), 3);
        assert_eq!(at(&a, 1).len(), 0);
        assert_eq!(at(&a, 2).len(), 2);
        assert_eq!(at(&a, -3).len(), 3);
        assert_eq!(at(&a, -2).len(), 0);
        assert_eq!(at(&a, -1).len(), 2);
        assert_eq!(at(&a, 0).getitem_at(-1).unwrap().as_f64(), Some(3.3));
        assert_eq!(at(&a, 2).getitem_at(-1).unwrap().as_f64(), Some(5.5));
    }

    #[test]
    fn test_getitem_range() {
        let a = list();
        let tail = a.getitem_range(1, i64::MAX).unwrap();
        assert!(matches!(tail, Content::List(_)));
        assert_eq!(tail.len(), 2);
        assert_eq!(a.getitem_range(-2, i64::MAX).unwrap().len(), 2);
        assert_eq!(a.getitem_range(1, 100).unwrap().len(), 2);
        assert_eq!(a.getitem_range(-2, 100).unwrap().len(), 2);
    }

    #[test]
    fn test_carry() {
        let a = list();
        let out = a
            .carry(&Index::from(vec![2i32, 0]), CarryMode::Lazy, OutOfBounds::Nested)
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(at(&out, 0).len(), 2);
        assert_eq!(at(&out, 1).getitem_at(0).unwrap().as_f64(), Some(1.1));
        assert!(a.carry(&Index::from(vec![3i64]), CarryMode::Lazy, OutOfBounds::Nested).is_err());
    }

    #[test]
    fn test_getitem_next_at_out_of_range_names_node() {
        let a = list();
        // list 1 is empty
        let err = a.getitem_next(Some(&SliceItem::Int(0)), &[], None).unwrap_err();
        assert!(err.is_index_error());
        assert!(err.to_string().starts_with("cannot slice ListArray of length 3 by 0"));
    }

    #[test]
    fn test_to_list_offset_array64() {
        let a = list();
        let Content::List(list) = &a else { unreachable!() };
        let compact = list.to_list_offset_array64().unwrap();
        assert_eq!(compact.offsets().to_index64().as_slice(), &[0, 3, 3, 5]);
        assert_eq!(compact.content().len(), 5);
        assert_eq!(compact.content().getitem_at(3).unwrap().as_f64(), Some(4.4));
    }

    #[test]
    fn test_narrow_starts_and_stops() {
        let a: Content = ListArray::try_new(
            Index::from(vec![4u32, 100, 1]),
            Index::from(vec![7u32, 100, 3, 200]),
            NumpyArray::new(vec![6.6, 4.4, 5.5, 7.7, 1.1, 2.2, 3.3, 8.8]),
        )
        .unwrap()
        .into();
        let out = a
            .carry(&Index::from(vec![2i64, 0]), CarryMode::Eager, OutOfBounds::Nested)
            .unwrap();
        assert_eq!(at(&out, 0).getitem_at(-1).unwrap().as_f64(), Some(5.5));
        assert_eq!(at(&out, 1).len(), 3);
        let tails = a
            .getitem(&[SliceItem::full(), SliceItem::range(Some(1), None)])
            .unwrap()
            .into_content()
            .unwrap();
        assert_eq!((0..3).map(|i| at(&tails, i).len()).collect::<Vec<_>>(), vec![2, 0, 1]);
        assert_eq!(at(&tails, 0).getitem_at(0).unwrap().as_f64(), Some(2.2));
    }

    #[test]
    fn test_empty_list_past_content() {
        let a = list();
        let empty = at(&a, 1);
        assert!(matches!(empty, Content::Numpy(_)));
        assert!(empty.is_empty());
        let none_taken = a
            .getitem(&[SliceItem::full(), SliceItem::array(vec![])])
            .unwrap()
            .into_content()
            .unwrap();
        assert_eq!(none_taken.len(), 3);
        assert!((0..3).all(|i| at(&none_taken, i).is_empty()));
        let tails = a
            .getitem(&[SliceItem::full(), SliceItem::range(Some(1), None)])
            .unwrap()
            .into_content()
            .unwrap();
        assert_eq!((0..3).map(|i| at(&tails, i).len()).collect::<Vec<_>>(), vec![2, 0, 1]);
    }
}
