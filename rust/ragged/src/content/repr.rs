//! XML-like rendering of a tree for debugging, e.g.
//!
//! ```text
//! <ListOffsetArray len='3'>
//!     <offsets>[0, 3, 3, 5]</offsets>
//!     <content><NumpyArray dtype='float64' len='5'>[1.1, 2.2, 3.3, 4.4, 5.5]</NumpyArray></content>
//! </ListOffsetArray>
//! ```

use std::fmt::{self, Write};

use itertools::Itertools;

use crate::{
    content::{Content, NumpyArray},
    index::Index,
    parameters::Parameters,
};

const STEP: &str = "    ";
const SHOWN: usize = 8;

pub(crate) fn repr(content: &Content, indent: &str, pre: &str, post: &str) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = render(&mut out, content, indent, pre, post);
    out
}

fn render(out: &mut String, content: &Content, indent: &str, pre: &str, post: &str) -> fmt::Result {
    let inner = format!("{indent}{STEP}");
    let kind = content.kind_name();
    write!(out, "{indent}{pre}<{kind}")?;
    match content {
        Content::Empty(_) => {
            return write!(out, "/>{post}");
        }
        Content::Numpy(node) => {
            write_numpy_open(out, node)?;
            if node.parameters().is_empty() {
                return write!(out, "{}</{kind}>{post}", numpy_values(node));
            }
            writeln!(out)?;
            writeln!(out, "{inner}{}", numpy_values(node))?;
        }
        Content::Regular(node) => {
            writeln!(out, " size='{}' len='{}'>", node.size(), node.len())?;
            render(out, node.content(), &inner, "<content>", "</content>\n")?;
        }
        Content::List(node) => {
            writeln!(out, " len='{}'>", node.len())?;
            writeln!(out, "{inner}<starts>{}</starts>", node.starts())?;
            writeln!(out, "{inner}<stops>{}</stops>", node.stops())?;
            render(out, node.content(), &inner, "<content>", "</content>\n")?;
        }
        Content::ListOffset(node) => {
            writeln!(out, " len='{}'>", node.len())?;
            writeln!(out, "{inner}<offsets>{}</offsets>", node.offsets())?;
            render(out, node.content(), &inner, "<content>", "</content>\n")?;
        }
        Content::Record(node) => {
            let class = if node.is_tuple() { " is_tuple='true'" } else { "" };
            writeln!(out, "{class} len='{}'>", node.len())?;
            for (i, (name, child)) in node.fields().iter().zip(node.contents()).enumerate() {
                let open = if node.is_tuple() {
                    format!("<field index='{i}'>")
                } else {
                    format!("<field index='{i}' key='{name}'>")
                };
                writeln!(out, "{inner}{open}")?;
                render(out, child, &format!("{inner}{STEP}"), "", "\n")?;
                writeln!(out, "{inner}</field>")?;
            }
        }
        Content::Indexed(node) => {
            writeln!(out, " len='{}'>", node.len())?;
            writeln!(out, "{inner}<index>{}</index>", node.index())?;
            render(out, node.content(), &inner, "<content>", "</content>\n")?;
        }
        Content::IndexedOption(node) => {
            writeln!(out, " len='{}'>", node.len())?;
            writeln!(out, "{inner}<index>{}</index>", node.index())?;
            render(out, node.content(), &inner, "<content>", "</content>\n")?;
        }
        Content::ByteMasked(node) => {
            writeln!(out, " valid_when='{}' len='{}'>", node.valid_when(), node.len())?;
            writeln!(out, "{inner}<mask>{}</mask>", Index::I8(node.mask().clone()))?;
            render(out, node.content(), &inner, "<content>", "</content>\n")?;
        }
        Content::BitMasked(node) => {
            writeln!(
                out,
                " valid_when='{}' lsb_order='{}' len='{}'>",
                node.valid_when(),
                node.lsb_order(),
                node.len()
            )?;
            writeln!(out, "{inner}<mask>{}</mask>", Index::U8(node.mask().clone()))?;
            render(out, node.content(), &inner, "<content>", "</content>\n")?;
        }
        Content::Unmasked(node) => {
            writeln!(out, " len='{}'>", node.len())?;
            render(out, node.content(), &inner, "<content>", "</content>\n")?;
        }
        Content::Union(node) => {
            writeln!(out, " len='{}'>", node.len())?;
            writeln!(out, "{inner}<tags>{}</tags>", Index::I8(node.tags().clone()))?;
            writeln!(out, "{inner}<index>{}</index>", node.index())?;
            for (i, child) in node.contents().iter().enumerate() {
                writeln!(out, "{inner}<content index='{i}'>")?;
                render(out, child, &format!("{inner}{STEP}"), "", "\n")?;
                writeln!(out, "{inner}</content>")?;
            }
        }
    }
    write_parameters(out, content.parameters(), &inner)?;
    write!(out, "{indent}</{kind}>{post}")
}

fn write_numpy_open(out: &mut String, node: &NumpyArray) -> fmt::Result {
    write!(out, " dtype='{}'", node.primitive())?;
    if node.ndim() > 1 {
        write!(out, " shape='({})'", node.shape().iter().join(", "))?;
    }
    write!(out, " len='{}'>", node.len())
}

fn numpy_values(node: &NumpyArray) -> String {
    let data = node.data();
    let shown = (0..data.len().min(SHOWN)).map(|i| data.scalar_at(i)).join(", ");
    if data.len() > SHOWN {
        format!("[{shown}, ...]")
    } else {
        format!("[{shown}]")
    }
}

fn write_parameters(out: &mut String, parameters: &Parameters, indent: &str) -> fmt::Result {
    for (key, value) in parameters.iter() {
        writeln!(out, "{indent}<parameter name='{key}'>{value}</parameter>")?;
    }
    Ok(())
}
