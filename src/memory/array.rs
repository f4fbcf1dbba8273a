//! Lazy view over a remote `TArray`

use super::Session;
use crate::platform::Platform;
use bytemuck::Pod;
use std::fmt;
use std::marker::PhantomData;

/// A view, not a copy, over a remote dynamic array
///
/// Holds the header as it was when the view was opened. Elements are read
/// one at a time on access with no caching. The target may resize or free
/// the array at any moment, so the header is only a sanity check against
/// garbage, and element reads can be stale.
pub struct RemoteArrayView<T> {
    data: usize,
    count: i32,
    capacity: i32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for RemoteArrayView<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RemoteArrayView<T> {}

impl<T> fmt::Debug for RemoteArrayView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteArrayView")
            .field("data", &format_args!("{:#x}", self.data))
            .field("count", &self.count)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T: Pod> RemoteArrayView<T> {
    /// View over an already decoded header
    pub fn from_raw(data: usize, count: i32, capacity: i32) -> Self {
        Self {
            data,
            count,
            capacity,
            _marker: PhantomData,
        }
    }

    /// Element count as of when the view was opened
    #[inline]
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Allocated slots as read from the header
    #[inline]
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Remote address of element 0
    #[inline]
    pub fn data(&self) -> usize {
        self.data
    }

    /// `0 <= count <= capacity` and a non-null data pointer
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.count >= 0 && self.count <= self.capacity && self.data != 0
    }

    /// Number of elements safe to iterate, 0 for an invalid view
    #[inline]
    pub fn len(&self) -> usize {
        if self.is_valid() {
            self.count as usize
        } else {
            0
        }
    }

    /// Whether the view yields no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remote address of element `index`
    #[inline]
    pub fn element_address(&self, index: usize) -> usize {
        self.data
            .wrapping_add(index.wrapping_mul(std::mem::size_of::<T>()))
    }

    /// Read element `index` with one remote read
    ///
    /// `index` is not checked against `count`; check [`is_valid`] and
    /// [`count`] first or use [`try_get`]. An invalid view returns the zero
    /// element without reading.
    ///
    /// [`is_valid`]: Self::is_valid
    /// [`count`]: Self::count
    /// [`try_get`]: Self::try_get
    pub fn get<P: Platform>(&self, session: &Session<P>, index: usize) -> T {
        if !self.is_valid() {
            return T::zeroed();
        }

        session.read(self.element_address(index))
    }

    /// Bounds-checked read of element `index`
    ///
    /// `None` when the view is invalid, `index >= count`, or the read fails.
    pub fn try_get<P: Platform>(&self, session: &Session<P>, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }

        session.try_read(self.element_address(index))
    }

    /// Lazily read every element in `0..count`
    ///
    /// An invalid view iterates as empty.
    pub fn iter<'s, P: Platform>(
        &self,
        session: &'s Session<P>,
    ) -> impl Iterator<Item = T> + 's {
        let view = *self;
        (0..view.len()).map(move |i| view.get(session, i))
    }
}
