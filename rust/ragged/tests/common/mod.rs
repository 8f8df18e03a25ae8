#![allow(dead_code)]

use itertools::Itertools;
use ragged::{Content, Index, ListOffsetArray, NumpyArray, SliceItem, Value};

/// Python-like rendering of a value, e.g. `[[1, 2], None, []]`.
pub fn to_list(value: &Value) -> String {
    match value {
        Value::Scalar(s) => s.to_string(),
        Value::Missing => "None".to_string(),
        Value::Record(r) => {
            let fields = r.fields();
            let items = fields
                .iter()
                .map(|name| format!("{name}: {}", to_list(&r.field(name).unwrap())))
                .join(", ");
            format!("{{{items}}}")
        }
        Value::Content(c) => content_to_list(c),
    }
}

pub fn content_to_list(content: &Content) -> String {
    let items = (0..content.len() as i64)
        .map(|i| to_list(&content.getitem_at(i).unwrap()))
        .join(", ");
    format!("[{items}]")
}

pub fn select(content: &Content, items: &[SliceItem]) -> String {
    to_list(&content.getitem(items).unwrap())
}

pub fn ints(values: impl IntoIterator<Item = i64>) -> Content {
    NumpyArray::new(values.into_iter().collect::<Vec<_>>()).into()
}

pub fn floats(values: &[f64]) -> Content {
    NumpyArray::new(values.to_vec()).into()
}

pub fn list_offset(offsets: Vec<i64>, content: Content) -> Content {
    ListOffsetArray::try_new(Index::from(offsets), content)
        .unwrap()
        .into()
}

/// `[[0, 1, 2], [], [3, 4], [5], [6, 7, 8, 9]]`
pub fn jagged() -> Content {
    list_offset(vec![0, 3, 3, 5, 6, 10], ints(0..10))
}
