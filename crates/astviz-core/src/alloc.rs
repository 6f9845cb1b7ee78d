//! Allocation accounting for bounded pipeline runs.
//!
//! [`TrackingAllocator`] wraps the system allocator and keeps two per-thread
//! counters: bytes currently held and the high-water mark. [`measure`] runs a
//! closure on the calling thread and reports how far the high-water mark rose
//! above the level at entry, which is the peak heap growth attributable to
//! that call.
//!
//! The allocator must be installed by the final binary:
//!
//! ```rust,ignore
//! #[global_allocator]
//! static GLOBAL: astviz_core::alloc::TrackingAllocator = astviz_core::alloc::TrackingAllocator::new();
//! ```
//!
//! When it is not installed, [`is_installed`] returns `false` and
//! [`measure`] always reports zero growth.

use std::{
    alloc::{GlobalAlloc, Layout, System},
    cell::Cell,
    sync::atomic::{AtomicBool, Ordering},
};

thread_local! {
    static CURRENT: Cell<isize> = const { Cell::new(0) };
    static PEAK: Cell<isize> = const { Cell::new(0) };
}

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Global allocator that records per-thread heap usage.
///
/// Counters are thread-local, so concurrent pipeline runs on different
/// threads never observe each other's allocations. Memory freed on a thread
/// other than the one that allocated it lowers that other thread's counter;
/// [`measure`] only looks at growth on its own thread.
#[derive(Debug, Default)]
pub struct TrackingAllocator;

impl TrackingAllocator {
    /// Creates the allocator. Usable in a `static` initializer.
    pub const fn new() -> Self {
        Self
    }
}

// SAFETY: every method forwards to `System` unchanged; bookkeeping only
// touches const-initialized thread-locals and never allocates.
unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record(layout.size() as isize);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            record(layout.size() as isize);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        record(-(layout.size() as isize));
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            record(new_size as isize - layout.size() as isize);
        }
        new_ptr
    }
}

fn record(delta: isize) {
    if !INSTALLED.load(Ordering::Relaxed) {
        INSTALLED.store(true, Ordering::Relaxed);
    }
    // `try_with` keeps allocations during thread teardown from panicking.
    let _ = CURRENT.try_with(|current| {
        let now = current.get().saturating_add(delta);
        current.set(now);
        let _ = PEAK.try_with(|peak| {
            if now > peak.get() {
                peak.set(now);
            }
        });
    });
}

/// Returns `true` once a [`TrackingAllocator`] has served an allocation.
pub fn is_installed() -> bool {
    // Force at least one allocation through whatever allocator is global.
    drop(std::hint::black_box(Box::new(0u8)));
    INSTALLED.load(Ordering::Relaxed)
}

/// Bytes currently held by the calling thread, as seen by the tracker.
pub fn current_bytes() -> isize {
    CURRENT.try_with(Cell::get).unwrap_or(0)
}

/// Runs `f` and returns its result with the peak heap growth in bytes.
///
/// Growth is measured on the calling thread only, relative to the bytes held
/// when `f` starts. Nested calls are supported: the outer measurement still
/// sees the inner call's peak.
pub fn measure<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let baseline = current_bytes();
    let outer_peak = PEAK.try_with(|peak| peak.replace(baseline)).unwrap_or(0);

    let result = f();

    let peak = PEAK.try_with(Cell::get).unwrap_or(baseline);
    let _ = PEAK.try_with(|cell| cell.set(outer_peak.max(peak)));

    let growth = peak.saturating_sub(baseline).max(0) as usize;
    (result, growth)
}
