//! Shared, immutable, sliceable storage for the flat buffers of a tree.
//!
//! A `Buffer<T>` is a view (`offset`, `len`) into an `Arc<Vec<T>>`. Cloning
//! and slicing never copy elements, so sibling nodes and sliced nodes share
//! one allocation.

use std::fmt;
use std::ops::{Deref, RangeBounds};
use std::sync::Arc;

/// An immutable, cheaply cloneable view into shared vector storage.
#[derive(Clone)]
pub struct Buffer<T> {
    inner: Arc<Vec<T>>,
    offset: usize,
    len: usize,
}

impl<T> Buffer<T> {
    pub fn from_vec(vec: Vec<T>) -> Self {
        let len = vec.len();
        Buffer {
            inner: Arc::new(vec),
            offset: 0,
            len,
        }
    }

    pub fn empty() -> Self {
        Buffer::from_vec(Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.inner[self.offset..self.offset + self.len]
    }

    /// Returns a sub-view of this buffer.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn slice<R>(&self, range: R) -> Self
    where
        R: RangeBounds<usize>,
    {
        use std::ops::Bound::*;
        let start = match range.start_bound() {
            Included(&n) => n,
            Excluded(&n) => n + 1,
            Unbounded => 0,
        };
        let end = match range.end_bound() {
            Included(&n) => n + 1,
            Excluded(&n) => n,
            Unbounded => self.len,
        };
        assert!(start <= end && end <= self.len, "slice out of bounds");
        Buffer {
            inner: self.inner.clone(),
            offset: self.offset + start,
            len: end - start,
        }
    }

    /// Whether both buffers are views of the same allocation with the same
    /// window.
    pub fn ptr_eq(&self, other: &Buffer<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) && self.offset == other.offset && self.len == other.len
    }

    /// Whether this view is the sole owner of its whole allocation, so that
    /// [`make_mut`](Self::make_mut) can write in place.
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
            && Arc::weak_count(&self.inner) == 0
            && self.offset == 0
            && self.len == self.inner.len()
    }
}

impl<T: Clone> Buffer<T> {
    pub fn from_slice(slice: &[T]) -> Self {
        Buffer::from_vec(slice.to_vec())
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    /// Copy-on-write access to the elements of this view.
    ///
    /// Writes in place when the view is the unique owner of its whole
    /// allocation; otherwise the visible elements are first copied into a
    /// fresh allocation owned by this buffer.
    pub fn make_mut(&mut self) -> &mut [T] {
        if !self.is_unique() {
            *self = Buffer::from_vec(self.to_vec());
        }
        let len = self.len;
        match Arc::get_mut(&mut self.inner) {
            Some(vec) => &mut vec[..len],
            None => unreachable!("unique buffer is not uniquely owned"),
        }
    }

    /// Replaces the storage with a private copy of the visible elements.
    pub fn detach(&mut self) {
        *self = Buffer::from_vec(self.to_vec());
    }
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Buffer::empty()
    }
}

impl<T> Deref for Buffer<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsRef<[T]> for Buffer<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> From<Vec<T>> for Buffer<T> {
    fn from(vec: Vec<T>) -> Self {
        Buffer::from_vec(vec)
    }
}

impl<T> FromIterator<T> for Buffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Buffer::from_vec(iter.into_iter().collect())
    }
}

impl<T: PartialEq> PartialEq for Buffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice().iter()).finish()
    }
}
