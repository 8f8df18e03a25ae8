mod common;

use common::{content_to_list, floats, ints, list_offset, select};
use ragged::{
    Content, Index, RecordArray, RegularArray, SliceItem, UnionArray,
};

/// `[[4, 4, 4, 4, 4], [3, 3, 3, 3], [1.1, 2.2, 3.3], [], [2, 2, 2], [4.4, 5.5], [4, 4, 4, 4, 4]]`
fn mixed() -> Content {
    let float_lists = list_offset(vec![0, 3, 3, 5], floats(&[1.1, 2.2, 3.3, 4.4, 5.5]));
    let int_lists = list_offset(
        vec![0, 1, 3, 6, 10, 15],
        ints([0, 1, 1, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 4]),
    );
    UnionArray::try_new(
        vec![1i8, 1, 0, 0, 1, 0, 1],
        Index::from(vec![4i64, 3, 0, 1, 2, 2, 4, 100]),
        vec![float_lists, int_lists],
    )
    .unwrap()
    .into()
}

#[test]
fn test_elements() {
    let a = mixed();
    assert_eq!(a.len(), 7);
    assert_eq!(
        content_to_list(&a),
        "[[4, 4, 4, 4, 4], [3, 3, 3, 3], [1.1, 2.2, 3.3], [], [2, 2, 2], [4.4, 5.5], [4, 4, 4, 4, 4]]"
    );
    assert!(a.getitem_at(7).unwrap_err().is_index_error());
    assert_eq!(
        select(&a, &[SliceItem::range(Some(2), Some(4))]),
        "[[1.1, 2.2, 3.3], []]"
    );
}

#[test]
fn test_carry() {
    let a = mixed();
    assert_eq!(
        select(&a, &[SliceItem::array(vec![0, 2, 5])]),
        "[[4, 4, 4, 4, 4], [1.1, 2.2, 3.3], [4.4, 5.5]]"
    );
}

#[test]
fn test_inner_dimension_keeps_both_types() {
    let a = mixed();
    let out = a
        .getitem(&[SliceItem::full(), SliceItem::range(None, Some(1))])
        .unwrap()
        .into_content()
        .unwrap();
    assert!(matches!(out, Content::Union(_)));
    assert_eq!(content_to_list(&out), "[[4], [3], [1.1], [], [2], [4.4], [4]]");
    assert!(a
        .getitem(&[SliceItem::full(), SliceItem::Int(0)])
        .unwrap_err()
        .is_index_error());
    assert_eq!(
        select(&a, &[SliceItem::array(vec![0, 5]), SliceItem::Int(-1)]),
        "[4, 5.5]"
    );
}

#[test]
fn test_inner_dimension_merges_equal_types() {
    // [[1, 2], [10, 11], [3], [12, 13]]
    let lists = list_offset(vec![0, 2, 3], ints([1, 2, 3]));
    let regular = Content::from(RegularArray::try_new(ints(10..14), 2, 0).unwrap());
    let a = Content::from(
        UnionArray::try_new(
            vec![0i8, 1, 0, 1],
            Index::from(vec![0i64, 0, 1, 1]),
            vec![lists, regular],
        )
        .unwrap(),
    );
    let out = a
        .getitem(&[SliceItem::full(), SliceItem::Int(0)])
        .unwrap()
        .into_content()
        .unwrap();
    assert!(matches!(out, Content::Numpy(_)), "got {}", out.kind_name());
    assert_eq!(content_to_list(&out), "[1, 10, 3, 12]");
}

#[test]
fn test_union_of_records() {
    let left = RecordArray::try_new(vec![ints([1, 2])], Some(vec!["x".to_string()]), None).unwrap();
    let right = RecordArray::try_new(
        vec![floats(&[0.5]), ints([7])],
        Some(vec!["x".to_string(), "y".to_string()]),
        None,
    )
    .unwrap();
    let a = Content::from(
        UnionArray::try_new(
            vec![0i8, 1, 0],
            Index::from(vec![1i64, 0, 0]),
            vec![Content::from(left), Content::from(right)],
        )
        .unwrap(),
    );
    assert_eq!(select(&a, &[SliceItem::field("x")]), "[2, 0.5, 1]");
    assert!(a.getitem(&[SliceItem::field("y")]).is_err());
}
