use std::sync::Arc;

use ragged_common::{Result, error::Error, verify_arg};
use ragged_kernels::{
    KernelResult,
    gather::gather,
    union::{
        union_project, union_project_positions, union_regular_index, union_regular_index_getsize,
        union_simplify_nested, union_simplify_one,
    },
};

use crate::{
    buffer::Buffer,
    config::{CarryMode, OutOfBounds},
    content::{Content, carry_error, kernel_error, node_common, normalize_carry, slice_error},
    form::{Form, FormKind},
    index::{Index, Index64, IndexDType, with_index},
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem},
    value::Value,
};

pub(crate) const UNION_INDEX_TYPES: [IndexDType; 3] = [IndexDType::I32, IndexDType::U32, IndexDType::I64];

/// A heterogeneous array: element `i` is `contents[tags[i]][index[i]]`.
///
/// Tags and index entries are validated when they are used.
#[derive(Debug, Clone)]
pub struct UnionArray {
    tags: Buffer<i8>,
    index: Index,
    contents: Vec<Arc<Content>>,
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(UnionArray);

impl UnionArray {
    pub fn try_new<C: Into<Arc<Content>>>(
        tags: impl Into<Buffer<i8>>,
        index: Index,
        contents: Vec<C>,
    ) -> Result<UnionArray> {
        let tags = tags.into();
        index.verify_dtype("index", &UNION_INDEX_TYPES)?;
        verify_arg!(contents, !contents.is_empty());
        verify_arg!(contents, contents.len() <= i8::MAX as usize);
        if tags.len() > index.len() {
            return Err(Error::invalid_arg(
                "index",
                format!("len(tags) ({}) must be <= len(index) ({})", tags.len(), index.len()),
            ));
        }
        Ok(UnionArray {
            tags,
            index,
            contents: contents.into_iter().map(Into::into).collect(),
            identifier: None,
            parameters: Parameters::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &Buffer<i8> {
        &self.tags
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn contents(&self) -> &[Arc<Content>] {
        &self.contents
    }

    pub fn content(&self, tag: usize) -> Option<&Content> {
        self.contents.get(tag).map(Arc::as_ref)
    }

    pub fn num_contents(&self) -> usize {
        self.contents.len()
    }

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::UnionArray {
                tags: IndexDType::I8,
                index: self.index.dtype(),
                contents: self.contents.iter().map(|c| c.form()).collect(),
            },
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    fn project_carry(&self, tag: usize) -> KernelResult<Index64> {
        let mut carry = vec![0i64; self.len()];
        let found = with_index!(&self.index, index => {
            union_project(&mut carry, &self.tags, index.as_slice(), tag as i8)
        })?;
        carry.truncate(found);
        Ok(carry.into())
    }

    /// Positions of the elements tagged `tag`.
    fn positions(&self, tag: usize) -> KernelResult<Index64> {
        let mut positions = vec![0i64; self.len()];
        let found = union_project_positions(&mut positions, &self.tags, tag as i8)?;
        positions.truncate(found);
        Ok(positions.into())
    }

    /// The elements tagged `tag`, in order, as a node of that content's type.
    pub fn project(&self, tag: usize) -> Result<Content> {
        let Some(content) = self.contents.get(tag) else {
            return Err(Error::invalid_arg(
                "tag",
                format!("{} has no content {tag}", self.label()),
            ));
        };
        let carry = self.project_carry(tag).map_err(kernel_error)?;
        content.carry64(carry, CarryMode::Eager, OutOfBounds::Nested)
    }

    /// Dense running position of every element within its tag.
    pub fn regular_index(tags: &[i8]) -> Result<Index64> {
        let size = union_regular_index_getsize(tags).map_err(kernel_error)?;
        let mut current = vec![0i64; size];
        let mut index = vec![0i64; tags.len()];
        union_regular_index(&mut index, &mut current, tags).map_err(kernel_error)?;
        Ok(index.into())
    }

    /// Flattens nested unions and merges contents of equal type.
    ///
    /// Identical children are reused as they are. A union left with a single
    /// content becomes that content carried by the index.
    pub fn simplify_uniontype(self) -> Result<Content> {
        let len = self.len();
        let mut tags = vec![0i8; len];
        let mut index = vec![0i64; len];
        let mut contents: Vec<Arc<Content>> = Vec::with_capacity(self.contents.len());
        let outer_index = self.index.to_index64();
        for (i, content) in self.contents.iter().enumerate() {
            if let Content::Union(inner) = content.as_ref() {
                let inner_index = inner.index.to_index64();
                for (j, inner_content) in inner.contents.iter().enumerate() {
                    let (towhich, base) = place_content(&mut contents, inner_content)?;
                    union_simplify_nested(
                        &mut tags,
                        &mut index,
                        &self.tags,
                        &outer_index,
                        &inner.tags,
                        &inner_index,
                        towhich as i8,
                        j as i8,
                        i as i8,
                        base,
                    )
                    .map_err(kernel_error)?;
                }
            } else {
                let (towhich, base) = place_content(&mut contents, content)?;
                union_simplify_one(
                    &mut tags,
                    &mut index,
                    &self.tags,
                    &outer_index,
                    towhich as i8,
                    i as i8,
                    base,
                )
                .map_err(kernel_error)?;
            }
        }
        log::debug!(
            "simplify_uniontype: {} with {} contents -> {} contents",
            self.label(),
            self.contents.len(),
            contents.len()
        );
        if contents.len() == 1 {
            return contents[0].carry64(index.into(), CarryMode::LazyCopied, OutOfBounds::Nested);
        }
        let mut out = UnionArray::try_new(tags, Index::from(index), contents)?;
        out.parameters = self.parameters;
        out.identifier = self.identifier;
        Ok(out.into())
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        let tag = self.tags[at];
        let Some(content) = usize::try_from(tag).ok().and_then(|t| self.contents.get(t)) else {
            return Err(Error::nested_index(
                self.label(),
                at.to_string(),
                Some(format!("tags[{at}] = {tag} is not a valid content")),
            ));
        };
        let j = self.index.get(at);
        if j < 0 || j as usize >= content.len() {
            return Err(Error::nested_index(
                self.label(),
                at.to_string(),
                Some(format!("index[{at}] = {j} is out of range for content {tag}")),
            ));
        }
        content.getitem_at_unchecked(j as usize)
    }

    pub(crate) fn getitem_range(&self, start: usize, stop: usize) -> Result<Content> {
        let mut out = UnionArray::try_new(
            self.tags.slice(start..stop),
            self.index.slice(start, stop),
            self.contents.clone(),
        )?;
        out.parameters = self.parameters.clone();
        out.identifier = self.range_identifier(start, stop);
        Ok(out.into())
    }

    pub(crate) fn getitem_field(&self, name: &str, only_fields: &[SliceItem]) -> Result<Content> {
        let contents = self
            .contents
            .iter()
            .map(|c| c.getitem_field(name, only_fields))
            .collect::<Result<Vec<_>>>()?;
        let mut out = UnionArray::try_new(self.tags.clone(), self.index.clone(), contents)?;
        out.identifier = self.field_identifier(name);
        Ok(out.into())
    }

    pub(crate) fn getitem_fields(&self, names: &[String], only_fields: &[SliceItem]) -> Result<Content> {
        let contents = self
            .contents
            .iter()
            .map(|c| c.getitem_fields(names, only_fields))
            .collect::<Result<Vec<_>>>()?;
        let mut out = UnionArray::try_new(self.tags.clone(), self.index.clone(), contents)?;
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
        let mut nexttags = vec![0i8; carry.len()];
        gather(&mut nexttags, &self.tags, &carry)
            .map_err(|e| carry_error(exception, self.label(), &carry, e))?;
        let index = self.index.to_index64();
        let mut nextindex = vec![0i64; carry.len()];
        gather(&mut nextindex, &index[..self.len()], &carry)
            .map_err(|e| carry_error(exception, self.label(), &carry, e))?;
        let mut out = UnionArray::try_new(nexttags, Index::from(nextindex), self.contents.clone())?;
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
        if let Some((i, tag)) = self
            .tags
            .iter()
            .enumerate()
            .find(|&(_, &tag)| usize::try_from(tag).map_or(true, |t| t >= self.contents.len()))
        {
            return Err(Error::nested_index(
                self.label(),
                head.to_string(),
                Some(format!("tags[{i}] = {tag} is not a valid content")),
            ));
        }
        let mut outcontents = Vec::with_capacity(self.contents.len());
        for (tag, content) in self.contents.iter().enumerate() {
            let carry = self
                .project_carry(tag)
                .map_err(|e| slice_error(self.label(), head, e))?;
            let projection = content.carry64(carry, CarryMode::Eager, OutOfBounds::Nested)?;
            let out = match advanced {
                Some(adv) if !adv.is_empty() => {
                    let positions = self
                        .positions(tag)
                        .map_err(|e| slice_error(self.label(), head, e))?;
                    let nextadvanced: Index64 = positions.iter().map(|&p| adv[p as usize]).collect();
                    projection.getitem_next_dim(head, tail, Some(&nextadvanced))?
                }
                _ => projection.getitem_next_dim(head, tail, advanced)?,
            };
            outcontents.push(out);
        }
        let outindex = UnionArray::regular_index(&self.tags)?;
        let mut out = UnionArray::try_new(self.tags.clone(), Index::I64(outindex), outcontents)?;
        out.parameters = self.parameters.clone();
        out.identifier = self.identifier.clone();
        out.simplify_uniontype()
    }

    pub(crate) fn getitem_nothing(&self) -> Result<Content> {
        self.getitem_range(0, 0)
    }
}

/// Finds the slot of `candidate` among the simplified contents, merging it
/// into an existing content of the same type. Returns the slot and the
/// offset of `candidate`'s elements within it.
fn place_content(contents: &mut Vec<Arc<Content>>, candidate: &Arc<Content>) -> Result<(usize, i64)> {
    for (k, existing) in contents.iter_mut().enumerate() {
        if Arc::ptr_eq(existing, candidate) {
            return Ok((k, 0));
        }
        if existing.mergeable(candidate) {
            let base = existing.len() as i64;
            *existing = Arc::new(existing.merge(candidate)?);
            return Ok((k, base));
        }
    }
    contents.push(candidate.clone());
    Ok((contents.len() - 1, 0))
}
