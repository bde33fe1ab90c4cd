use crate::error::RangeError;
use std::sync::Arc;

/// An immutable byte buffer with reference-counted sharing and cheap slicing.
///
/// Assigning or slicing a `SharedBuffer` adds a reference without copying the
/// backing storage. Mutation is explicit: [`make_unique`](SharedBuffer::make_unique)
/// guarantees exclusive ownership of the bytes, and
/// [`get_mut`](SharedBuffer::get_mut) forces it lazily. The reference count is
/// atomic, so independent slices may live on different threads.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    data: Arc<Vec<u8>>,
    start: usize,
    len: usize,
}

impl SharedBuffer {
    /// Create a buffer of `len` bytes. The contents are unspecified; use
    /// [`zero_filled`](SharedBuffer::zero_filled) when the initial bytes matter.
    pub fn new(len: usize) -> Self {
        Self::zero_filled(len)
    }

    /// Create a buffer of `len` zero bytes.
    pub fn zero_filled(len: usize) -> Self {
        Self {
            data: Arc::new(vec![0u8; len]),
            start: 0,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The full byte range this buffer refers to.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..self.start + self.len]
    }

    /// Immutable view of `[start, end)` within this buffer.
    pub fn get(&self, start: usize, end: usize) -> Result<&[u8], RangeError> {
        self.check_range(start, end)?;
        Ok(&self.data[self.start + start..self.start + end])
    }

    /// Mutable view of `[start, end)`. If the backing storage is shared, the
    /// referenced range is copied first so other holders are unaffected.
    pub fn get_mut(&mut self, start: usize, end: usize) -> Result<&mut [u8], RangeError> {
        self.check_range(start, end)?;
        self.make_unique();
        let base = self.start;
        let data = Arc::get_mut(&mut self.data).expect("buffer was made unique");
        Ok(&mut data[base + start..base + end])
    }

    /// Whether this buffer is the only holder of its backing storage. Writes
    /// on a unique buffer do not allocate.
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.data) == 1 && Arc::weak_count(&self.data) == 0
    }

    /// Copy the referenced range to freshly-owned storage unless this buffer
    /// is already the sole holder. Returns `true` if bytes were copied.
    pub fn make_unique(&mut self) -> bool {
        if self.is_unique() {
            return false;
        }
        let copied = self.as_slice().to_vec();
        self.len = copied.len();
        self.start = 0;
        self.data = Arc::new(copied);
        true
    }

    /// A sub-buffer referring to `[start, end)` of this buffer, sharing the
    /// backing storage.
    pub fn slice(&self, start: usize, end: usize) -> Result<SharedBuffer, RangeError> {
        self.check_range(start, end)?;
        Ok(Self {
            data: Arc::clone(&self.data),
            start: self.start + start,
            len: end - start,
        })
    }

    /// Byte-wise comparison of the referenced contents. Worst case O(len);
    /// [`eq`](PartialEq::eq) is the cheap identity check.
    pub fn contents_equal(&self, other: &SharedBuffer) -> bool {
        self.as_slice() == other.as_slice()
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), RangeError> {
        if start > end || end > self.len {
            Err(RangeError::new(format!(
                "range {}..{} out of bounds for buffer of {} bytes",
                start, end, self.len
            )))
        } else {
            Ok(())
        }
    }
}

/// Identity comparison: `true` when both buffers refer to the same range of
/// the same backing storage. Two buffers with equal contents in different
/// storage compare unequal; use [`contents_equal`](SharedBuffer::contents_equal)
/// for a byte-wise check.
impl PartialEq for SharedBuffer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.start == other.start && self.len == other.len
    }
}
impl Eq for SharedBuffer {}

impl From<&[u8]> for SharedBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self {
            len: bytes.len(),
            data: Arc::new(bytes.to_vec()),
            start: 0,
        }
    }
}

impl From<Vec<u8>> for SharedBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            len: bytes.len(),
            data: Arc::new(bytes),
            start: 0,
        }
    }
}

impl From<&str> for SharedBuffer {
    fn from(text: &str) -> Self {
        Self::from(text.as_bytes())
    }
}

impl From<String> for SharedBuffer {
    fn from(text: String) -> Self {
        Self::from(text.into_bytes())
    }
}
