use ragged_common::{Result, error::Error, verify_arg};

use crate::{
    config::{CarryMode, OutOfBounds},
    content::{Content, RegularArray, carry_error, node_common, normalize_carry, not_records},
    data::{NumpyData, PrimitiveType},
    form::{Form, FormKind},
    index::Index64,
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem},
    value::Value,
};

/// A leaf node: a flat primitive buffer viewed as a C-contiguous array of
/// the given shape.
///
/// The first dimension is the node's length; further dimensions are regular
/// inner dimensions.
#[derive(Debug, Clone)]
pub struct NumpyArray {
    data: NumpyData,
    shape: Vec<usize>,
    identifier: Option<Identifier>,
    parameters: Parameters,
}

node_common!(NumpyArray);

impl NumpyArray {
    /// A one-dimensional array over `data`.
    pub fn new(data: impl Into<NumpyData>) -> NumpyArray {
        let data = data.into();
        let shape = vec![data.len()];
        NumpyArray {
            data,
            shape,
            identifier: None,
            parameters: Parameters::default(),
        }
    }

    pub fn try_new(data: impl Into<NumpyData>, shape: Vec<usize>) -> Result<NumpyArray> {
        let data = data.into();
        verify_arg!(shape, !shape.is_empty());
        verify_arg!(shape, shape.iter().product::<usize>() == data.len());
        Ok(NumpyArray {
            data,
            shape,
            identifier: None,
            parameters: Parameters::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.shape[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data(&self) -> &NumpyData {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn primitive(&self) -> PrimitiveType {
        self.data.primitive()
    }

    /// Number of flat elements in one element of the first dimension.
    fn inner_len(&self) -> usize {
        self.shape[1..].iter().product()
    }

    pub fn form(&self) -> Form {
        Form::new(
            FormKind::NumpyArray {
                primitive: self.primitive(),
                inner_shape: self.shape[1..].to_vec(),
            },
            self.identifier.is_some(),
            self.parameters.clone(),
        )
    }

    /// Views the inner dimensions as nested `RegularArray`s over a
    /// one-dimensional leaf.
    pub fn to_regular_array(&self) -> Result<Content> {
        if self.ndim() == 1 {
            return Ok(self.clone().into());
        }
        let flat = NumpyArray {
            data: self.data.clone(),
            shape: vec![self.data.len()],
            identifier: None,
            parameters: Parameters::default(),
        };
        let mut out = Content::from(flat);
        for i in (1..self.ndim()).rev() {
            let rows = self.shape[..i].iter().product::<usize>();
            out = RegularArray::try_new(out, self.shape[i], rows)?.into();
        }
        Ok(match out {
            Content::Regular(regular) => regular
                .with_identifier(self.identifier.clone())
                .with_parameters(self.parameters.clone())
                .into(),
            other => other,
        })
    }

    pub(crate) fn getitem_at(&self, at: usize) -> Result<Value> {
        if self.ndim() == 1 {
            return Ok(Value::Scalar(self.data.scalar_at(at)));
        }
        let inner = self.inner_len();
        Ok(Value::Content(
            NumpyArray {
                data: self.data.slice(at * inner, inner),
                shape: self.shape[1..].to_vec(),
                identifier: None,
                parameters: self.parameters.clone(),
            }
            .into(),
        ))
    }

    pub(crate) fn getitem_range(&self, start: usize, stop: usize) -> Result<Content> {
        let inner = self.inner_len();
        let mut shape = self.shape.clone();
        shape[0] = stop - start;
        Ok(NumpyArray {
            data: self.data.slice(start * inner, (stop - start) * inner),
            shape,
            identifier: self.range_identifier(start, stop),
            parameters: self.parameters.clone(),
        }
        .into())
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
        let carry = normalize_carry(carry, self.len(), mode, exception, || self.label())?;
        let data = self
            .data
            .gather_rows(&carry, self.inner_len())
            .map_err(|e| carry_error(exception, self.label(), &carry, e))?;
        let mut shape = self.shape.clone();
        shape[0] = carry.len();
        Ok(NumpyArray {
            data,
            shape,
            identifier: self.carry_identifier(&carry),
            parameters: self.parameters.clone(),
        }
        .into())
    }

    pub(crate) fn getitem_next(
        &self,
        head: DimHead<'_>,
        tail: &[SliceItem],
        advanced: Option<&Index64>,
    ) -> Result<Content> {
        if self.ndim() == 1 {
            return Err(Error::nested_index(
                self.label(),
                head.to_string(),
                Some("too many dimensions in slice".into()),
            ));
        }
        self.to_regular_array()?.getitem_next_dim(head, tail, advanced)
    }

    pub(crate) fn getitem_nothing(&self) -> Result<Content> {
        self.getitem_range(0, 0)
    }
}
