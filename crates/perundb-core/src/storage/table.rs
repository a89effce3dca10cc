//! Memory-mapped column-major table storage.
//!
//! A [`TableFile`] maps one on-disk matrix of shape `(row_width, capacity)`
//! stored column-major: column `j` holds the `row_width` elements of slot
//! `j`, contiguously. The vector table uses the index element type with
//! `row_width = dim`; the adjacency table uses `i32` with
//! `row_width = max_degree`.
//!
//! # Safety guarantees
//!
//! All column access is bounds-checked, and alignment is verified at runtime
//! before pointer casting:
//! - the mapping itself is page-aligned
//! - each column occupies `row_width * size_of::<E>()` bytes, so every
//!   column offset is a multiple of the element size

use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Marker for element types that may live in a [`TableFile`].
///
/// # Safety
///
/// Implementors must be `Copy` types without padding for which every bit
/// pattern is a valid value, so that bytes read back from disk (including
/// the zero-fill of freshly grown regions) are always valid elements.
pub(crate) unsafe trait TableElement: Copy + 'static {}

// SAFETY: all four are plain scalars; any bit pattern is valid.
unsafe impl TableElement for half::f16 {}
unsafe impl TableElement for f32 {}
unsafe impl TableElement for f64 {}
unsafe impl TableElement for i32 {}

/// Memory-mapped column-major matrix file with on-demand growth.
pub(crate) struct TableFile<E: TableElement> {
    path: PathBuf,
    /// File handle kept open for resizing.
    file: File,
    mmap: MmapMut,
    /// Elements per column.
    row_width: usize,
    /// Number of columns the file currently holds.
    capacity: usize,
    _marker: PhantomData<E>,
}

impl<E: TableElement> TableFile<E> {
    /// Columns allocated when a table is first created, and the growth floor.
    const INITIAL_CAPACITY: usize = 1024;

    /// Creates a new table file, truncating any existing content.
    pub(crate) fn create<P: AsRef<Path>>(path: P, row_width: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let stride = row_width * std::mem::size_of::<E>();
        file.set_len((stride * Self::INITIAL_CAPACITY) as u64)?;

        // SAFETY: the file is open read/write and set_len() above allocated
        // the full mapping range.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            path,
            file,
            mmap,
            row_width,
            capacity: Self::INITIAL_CAPACITY,
            _marker: PhantomData,
        })
    }

    /// Opens an existing table file, deriving its capacity from the file
    /// length.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if the length is zero or not a whole number of
    /// columns for this element width.
    pub(crate) fn open<P: AsRef<Path>>(path: P, row_width: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        let stride = row_width * std::mem::size_of::<E>();
        let file_len = file.metadata()?.len();
        let len = usize::try_from(file_len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "file too large to map"))?;
        if len == 0 || len % stride != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("table length {len} is not a multiple of the column stride {stride}"),
            ));
        }

        // SAFETY: the file is open read/write and its length was just read.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            path,
            file,
            mmap,
            row_width,
            capacity: len / stride,
            _marker: PhantomData,
        })
    }

    /// Returns the number of columns the file currently holds.
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of elements per column.
    pub(crate) fn row_width(&self) -> usize {
        self.row_width
    }

    #[inline]
    fn stride(&self) -> usize {
        self.row_width * std::mem::size_of::<E>()
    }

    /// Returns a borrowed view of one column.
    ///
    /// The borrow ends before any growth can happen (growth takes
    /// `&mut self`), so a returned slice can never outlive a remap.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of bounds or the column offset is not
    /// element-aligned (the latter cannot happen with the layout above).
    pub(crate) fn column(&self, slot: usize) -> &[E] {
        assert!(
            slot < self.capacity,
            "column {slot} out of bounds (capacity {})",
            self.capacity
        );
        let offset = slot * self.stride();
        assert!(
            offset % std::mem::align_of::<E>() == 0,
            "column offset {offset} is not aligned for the element type"
        );

        // SAFETY: bounds and alignment were checked above; the mapping is
        // pinned for the lifetime of the returned borrow.
        unsafe {
            let ptr = self.mmap.as_ptr().add(offset).cast::<E>();
            std::slice::from_raw_parts(ptr, self.row_width)
        }
    }

    /// Overwrites one column with the given values.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of bounds or `values` is not exactly one
    /// column wide.
    pub(crate) fn write_column(&mut self, slot: usize, values: &[E]) {
        assert_eq!(
            values.len(),
            self.row_width,
            "column write width mismatch: expected {}, got {}",
            self.row_width,
            values.len()
        );
        assert!(
            slot < self.capacity,
            "column {slot} out of bounds (capacity {})",
            self.capacity
        );

        let stride = self.stride();
        let offset = slot * stride;
        // SAFETY: E is a TableElement (no padding, no invalid bit patterns),
        // so its bytes may be copied verbatim; the length matches one column.
        let bytes =
            unsafe { std::slice::from_raw_parts(values.as_ptr().cast::<u8>(), stride) };
        self.mmap[offset..offset + stride].copy_from_slice(bytes);
    }

    /// Zeroes one column in place.
    pub(crate) fn zero_column(&mut self, slot: usize) {
        assert!(
            slot < self.capacity,
            "column {slot} out of bounds (capacity {})",
            self.capacity
        );
        let stride = self.stride();
        let offset = slot * stride;
        self.mmap[offset..offset + stride].fill(0);
    }

    /// Grows the file so that `slot` is addressable.
    ///
    /// The new capacity is `max(slot + 1, capacity + max(1024, capacity))`,
    /// i.e. at least doubling with a floor of 1024 columns. Appended bytes
    /// are zero-filled by the filesystem; existing pages are untouched. The
    /// mapping is replaced, which is safe because callers cannot hold column
    /// borrows across this `&mut self` call.
    pub(crate) fn ensure_slot(&mut self, slot: usize) -> io::Result<()> {
        if slot < self.capacity {
            return Ok(());
        }

        let needed = slot + 1;
        let grown = self.capacity + self.capacity.max(Self::INITIAL_CAPACITY);
        let new_capacity = needed.max(grown);

        // Flush current pages before unmapping.
        self.mmap.flush()?;
        self.file.set_len((new_capacity * self.stride()) as u64)?;

        // SAFETY: set_len() above allocated the new mapping range; the old
        // mapping is dropped on assignment.
        self.mmap = unsafe { MmapMut::map_mut(&self.file)? };

        debug!(
            path = %self.path.display(),
            old_capacity = self.capacity,
            new_capacity,
            "table file grown"
        );
        self.capacity = new_capacity;

        Ok(())
    }

    /// Flushes mapped pages to disk.
    pub(crate) fn flush(&self) -> io::Result<()> {
        self.mmap.flush()
    }
}
