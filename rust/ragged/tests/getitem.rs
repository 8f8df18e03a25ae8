mod common;

use common::{content_to_list, floats, ints, jagged, list_offset, select, to_list};
use ragged::{
    CarryMode, Content, ErrorKind, Index, IndexedArray, ListArray, NumpyArray, OutOfBounds,
    RegularArray, Slice, SliceItem,
};

fn matrix() -> Content {
    // [[0, 1, 2], [3, 4, 5]]
    NumpyArray::try_new((0..6i64).collect::<Vec<_>>(), vec![2, 3])
        .unwrap()
        .into()
}

#[test]
fn test_jagged_rows() {
    let a = jagged();
    assert_eq!(a.len(), 5);
    assert_eq!(select(&a, &[SliceItem::Int(-2)]), "[5]");
    assert_eq!(
        select(&a, &[SliceItem::range(Some(1), None)]),
        "[[], [3, 4], [5], [6, 7, 8, 9]]"
    );
    assert_eq!(select(&a, &[SliceItem::Int(4), SliceItem::Int(-1)]), "9");
}

#[test]
fn test_inner_ranges() {
    let a = jagged();
    assert_eq!(
        select(&a, &[SliceItem::full(), SliceItem::range(None, Some(1))]),
        "[[0], [], [3], [5], [6]]"
    );
    assert_eq!(
        select(&a, &[SliceItem::full(), Slice::new(None, None, Some(-1)).into()]),
        "[[2, 1, 0], [], [4, 3], [5], [9, 8, 7, 6]]"
    );
    assert_eq!(
        select(&a, &[Slice::new(None, None, Some(2)).into()]),
        "[[0, 1, 2], [3, 4], [6, 7, 8, 9]]"
    );
}

#[test]
fn test_integer_in_empty_list_fails() {
    let a = jagged();
    let err = a
        .getitem(&[SliceItem::full(), SliceItem::Int(-1)])
        .unwrap_err();
    assert!(err.is_index_error());
    assert!(matches!(err.kind(), ErrorKind::NestedIndex { .. }));
}

#[test]
fn test_advanced_index() {
    let a = jagged();
    assert_eq!(
        select(&a, &[SliceItem::array(vec![4, 0, 3])]),
        "[[6, 7, 8, 9], [0, 1, 2], [5]]"
    );
    // arrays in two dimensions are paired
    assert_eq!(
        select(&a, &[SliceItem::array(vec![4, 0]), SliceItem::array(vec![1, 2])]),
        "[7, 2]"
    );
    assert_eq!(
        select(&a, &[SliceItem::array(vec![0, 2, 4]), SliceItem::Int(-1)]),
        "[2, 4, 9]"
    );
    assert!(a.getitem(&[SliceItem::array(vec![5])]).unwrap_err().is_index_error());
}

#[test]
fn test_list_array_agrees_with_offsets() {
    let starts = Index::from(vec![0i64, 3, 3, 5, 6]);
    let stops = Index::from(vec![3i64, 3, 5, 6, 10]);
    let a = Content::from(ListArray::try_new(starts, stops, ints(0..10)).unwrap());
    let b = jagged();
    for items in [
        vec![SliceItem::full(), SliceItem::range(Some(1), None)],
        vec![SliceItem::array(vec![3, 3, 0])],
        vec![SliceItem::range(Some(2), None), SliceItem::Int(0)],
    ] {
        assert_eq!(select(&a, &items), select(&b, &items));
    }
}

#[test]
fn test_numpy_dimensions() {
    let m = matrix();
    assert_eq!(content_to_list(&m), "[[0, 1, 2], [3, 4, 5]]");
    assert_eq!(select(&m, &[SliceItem::full(), SliceItem::Int(1)]), "[1, 4]");
    assert_eq!(
        select(&m, &[SliceItem::Ellipsis, SliceItem::Int(0)]),
        "[0, 3]"
    );
    assert_eq!(
        select(&m, &[SliceItem::Int(1), SliceItem::Ellipsis]),
        "[3, 4, 5]"
    );
    assert!(m
        .getitem(&[SliceItem::Int(0), SliceItem::Int(0), SliceItem::Int(0)])
        .is_err());
}

#[test]
fn test_newaxis() {
    let m = matrix();
    let out = m
        .getitem(&[SliceItem::NewAxis])
        .unwrap()
        .into_content()
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(content_to_list(&out), "[[[0, 1, 2], [3, 4, 5]]]");

    let column = m
        .getitem(&[SliceItem::full(), SliceItem::NewAxis, SliceItem::Int(2)])
        .unwrap();
    assert_eq!(to_list(&column), "[[2], [5]]");
}

#[test]
fn test_regular_over_lists() {
    // [[[0, 1, 2], []], [[3, 4], [5]]]
    let lists = list_offset(vec![0, 3, 3, 5, 6], ints(0..6));
    let a = Content::from(RegularArray::try_new(lists, 2, 0).unwrap());
    assert_eq!(
        select(&a, &[SliceItem::full(), SliceItem::Int(-1)]),
        "[[], [5]]"
    );
    assert_eq!(
        select(&a, &[SliceItem::Int(1), SliceItem::full(), SliceItem::Int(0)]),
        "[3, 5]"
    );
}

#[test]
fn test_indexed_array() {
    let a = Content::from(
        IndexedArray::try_new(
            Index::from(vec![2i64, 0, 1, 2]),
            floats(&[0.5, 1.5, 2.5]),
        )
        .unwrap(),
    );
    assert_eq!(content_to_list(&a), "[2.5, 0.5, 1.5, 2.5]");
    assert_eq!(select(&a, &[SliceItem::array(vec![3, 1])]), "[2.5, 0.5]");
    let carried = a
        .carry(&Index::from(vec![0i64, 0]), CarryMode::Eager, OutOfBounds::Plain)
        .unwrap();
    assert_eq!(content_to_list(&carried), "[2.5, 2.5]");
}

#[test]
fn test_carry_out_of_bounds_kinds() {
    let a = ints(0..3);
    let nested = a
        .carry(&Index::from(vec![3i64]), CarryMode::Lazy, OutOfBounds::Nested)
        .unwrap_err();
    assert!(matches!(nested.kind(), ErrorKind::NestedIndex { .. }));
    let plain = a
        .carry(&Index::from(vec![3i64]), CarryMode::Lazy, OutOfBounds::Plain)
        .unwrap_err();
    assert!(matches!(plain.kind(), ErrorKind::Index { .. }));
    let wrapped = a
        .carry(&Index::from(vec![-1i64]), CarryMode::Lazy, OutOfBounds::Plain)
        .unwrap();
    assert_eq!(content_to_list(&wrapped), "[2]");
}

#[test]
fn test_jagged_selector_unsupported() {
    let a = jagged();
    let err = a
        .getitem(&[SliceItem::full(), SliceItem::Jagged(Box::new(jagged()))])
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnsupportedSelector { .. }));
}
