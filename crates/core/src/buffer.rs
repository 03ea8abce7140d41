//! Typed buffer: an opaque memory region plus an ownership tag
//!
//! ## Ownership
//!
//! - **Owned** buffers are allocated or copied by this layer (numeric lists,
//!   engine results). The bytes are released when the last handle to them
//!   is dropped.
//! - **Borrowed** buffers reference memory owned by the caller. The bridge
//!   never frees that memory. A borrowed buffer is either a shared host
//!   handle (released, not freed, on drop) or raw foreign memory whose
//!   lifetime the caller guarantees (see [`TypedBuffer::from_raw_parts`]).
//!
//! Callers must not mutate borrowed memory while a submitted unit that
//! references it is still pending.

use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

/// Who is responsible for releasing a buffer's memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// Caller-owned memory; never freed by the bridge
    Borrowed,
    /// Allocated by the bridge; freed when the last owner drops
    Owned,
}

#[derive(Clone)]
enum Storage {
    Owned(Arc<[u8]>),
    Shared(Arc<dyn AsRef<[u8]> + Send + Sync>),
    Raw { ptr: NonNull<u8>, len: usize },
}

/// A byte region backing a tensor.
#[derive(Clone)]
pub struct TypedBuffer {
    storage: Storage,
}

// SAFETY: the Owned and Shared variants are Send + Sync on their own. The Raw
// variant is only constructible through `from_raw_parts`, whose contract
// requires the memory to stay valid and unmutated for every thread that can
// observe the buffer.
unsafe impl Send for TypedBuffer {}
unsafe impl Sync for TypedBuffer {}

impl TypedBuffer {
    /// Take ownership of `bytes`.
    pub fn owned(bytes: Vec<u8>) -> Self {
        Self {
            storage: Storage::Owned(Arc::from(bytes)),
        }
    }

    /// Allocate an owned, zero-filled buffer of `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        Self::owned(vec![0u8; len])
    }

    /// Copy `bytes` into a new owned buffer.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Self {
            storage: Storage::Owned(Arc::from(bytes)),
        }
    }

    /// Borrow a host-owned byte container without copying.
    ///
    /// The container is kept alive by this buffer and every clone of it; the
    /// bridge only releases its handle, it never frees the bytes itself.
    pub fn borrowed<B>(bytes: Arc<B>) -> Self
    where
        B: AsRef<[u8]> + Send + Sync + 'static,
    {
        Self {
            storage: Storage::Shared(bytes),
        }
    }

    /// Borrow raw foreign memory.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `len` bytes for as long as this
    /// buffer, any clone of it, or any tensor built on it is alive, and the
    /// memory must not be mutated during that time. The bridge never frees
    /// it.
    pub unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize) -> Self {
        Self {
            storage: Storage::Raw { ptr, len },
        }
    }

    /// Ownership mode
    pub fn ownership(&self) -> Ownership {
        match self.storage {
            Storage::Owned(_) => Ownership::Owned,
            Storage::Shared(_) | Storage::Raw { .. } => Ownership::Borrowed,
        }
    }

    /// Check if this buffer was allocated by the bridge.
    pub fn is_owned(&self) -> bool {
        self.ownership() == Ownership::Owned
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Check if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View the bytes
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(bytes) => bytes,
            Storage::Shared(handle) => (**handle).as_ref(),
            // SAFETY: guaranteed by the `from_raw_parts` contract.
            Storage::Raw { ptr, len } => unsafe {
                std::slice::from_raw_parts(ptr.as_ptr(), *len)
            },
        }
    }

    /// Deep-copy the bytes into a new owned buffer.
    pub fn to_owned_copy(&self) -> Self {
        Self::copy_from_slice(self.as_bytes())
    }
}

impl fmt::Debug for TypedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedBuffer")
            .field("ownership", &self.ownership())
            .field("len", &self.len())
            .finish()
    }
}
