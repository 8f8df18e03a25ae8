//! The selection entry point.

use ragged_common::{Result, error::Error};

use crate::{
    config::SliceConfig,
    content::{Content, RegularArray},
    selector::{SliceItem, broadcast_arrays, head_tail},
    value::Value,
};

/// Applies a selector tuple to `content` with the default [`SliceConfig`].
///
/// Each unit of `items` selects along one dimension (integers, ranges,
/// integer arrays), projects record fields, inserts a length-1 dimension
/// (`NewAxis`) or expands to the remaining dimensions (`Ellipsis`). An empty
/// tuple returns `content` itself.
pub fn getitem(content: &Content, items: &[SliceItem]) -> Result<Value> {
    getitem_with(content, items, &SliceConfig::default())
}

pub fn getitem_with(content: &Content, items: &[SliceItem], config: &SliceConfig) -> Result<Value> {
    config.validate()?;
    log::trace!(
        "getitem {} by ({})",
        content.label(),
        itertools::join(items, ", ")
    );
    match items {
        [] => return Ok(Value::Content(content.clone())),
        [SliceItem::Int(at)] => return content.getitem_at(*at),
        [SliceItem::Range(slice)] if slice.step.is_none() => {
            let start = slice.start.unwrap_or(0);
            let stop = slice.stop.unwrap_or(i64::MAX);
            return content.getitem_range(start, stop).map(Value::Content);
        }
        [SliceItem::Field(name)] => return content.getitem_field(name, &[]).map(Value::Content),
        _ => {}
    }

    let dims = items.iter().filter(|item| item.is_dimensional()).count();
    if dims > config.max_dims {
        return Err(Error::index(format!(
            "selector has {dims} dimensional units, more than the limit of {}",
            config.max_dims
        )));
    }
    let items = if config.broadcast_arrays {
        broadcast_arrays(items)?
    } else {
        items.to_vec()
    };

    // one outer row holding the whole array, so the first unit applies to
    // its first dimension
    let root = Content::from(RegularArray::try_new(content.clone(), content.len(), 1)?);
    let (head, tail) = head_tail(&items);
    let out = root.getitem_next(head, tail, None)?;
    if out.is_empty() {
        out.getitem_nothing().map(Value::Content)
    } else {
        out.getitem_at_unchecked(0)
    }
}

#[cfg(test)]
mod tests {
    use super::{getitem, getitem_with};
    use crate::{
        config::SliceConfig,
        content::{Content, NumpyArray, RegularArray},
        selector::SliceItem,
    };

    fn matrix() -> Content {
        // [[0, 1, 2], [3, 4, 5]]
        RegularArray::try_new(NumpyArray::new((0..6i64).collect::<Vec<_>>()), 3, 0)
            .unwrap()
            .into()
    }

    #[test]
    fn test_empty_tuple_is_identity() {
        let a = matrix();
        let out = getitem(&a, &[]).unwrap().into_content().unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_two_dimensions() {
        let a = matrix();
        let out = getitem(&a, &[SliceItem::Int(1), SliceItem::Int(-1)]).unwrap();
        assert_eq!(out.as_scalar().and_then(|s| s.as_i64()), Some(5));
        let column = getitem(&a, &[SliceItem::full(), SliceItem::Int(1)])
            .unwrap()
            .into_content()
            .unwrap();
        assert_eq!(column.len(), 2);
        assert_eq!(column.getitem_at(1).unwrap().as_scalar().and_then(|s| s.as_i64()), Some(4));
    }

    #[test]
    fn test_max_dims() {
        let a = matrix();
        let items = [SliceItem::Int(0), SliceItem::Int(0)];
        let config = SliceConfig::default().with_max_dims(1);
        assert!(getitem_with(&a, &items, &config).unwrap_err().is_index_error());
        let config = SliceConfig::default().with_max_dims(0);
        assert!(getitem_with(&a, &items, &config).is_err());
    }

    #[test]
    fn test_broadcast_toggle() {
        let a = matrix();
        let items = [SliceItem::array(vec![0, 1]), SliceItem::array(vec![2])];
        let out = getitem(&a, &items).unwrap().into_content().unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.getitem_at(1).unwrap().as_scalar().and_then(|s| s.as_i64()), Some(5));
        let config = SliceConfig::default().with_broadcast_arrays(false);
        assert!(getitem_with(&a, &items, &config).is_err());
    }

    #[test]
    fn test_single_unit_shortcuts() {
        let a = matrix();
        assert!(getitem(&a, &[SliceItem::Int(2)]).unwrap_err().is_index_error());
        let rows = getitem(&a, &[SliceItem::range(Some(-1), None)])
            .unwrap()
            .into_content()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(getitem(&a, &[SliceItem::field("x")]).is_err());
    }
}
