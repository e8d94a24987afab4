//! Writer-preferring reader/writer lock.
//!
//! Built from two binary semaphores (`service_queue`, `resource`) plus an
//! atomic reader count, following the classic writer-preference construction:
//! every arrival — reader or writer — funnels through `service_queue` single
//! file, so a writer waiting on `service_queue` blocks all readers that
//! arrive after it even though those readers would otherwise be free to
//! proceed concurrently.
//!
//! The reader count itself would classically be its own binary semaphore
//! (`reader_count_lock` in the original construction), but that only exists
//! to make the read-side `fetch_add`/`fetch_sub` atomic. `AtomicUsize`
//! provides the same guarantee natively and, unlike a semaphore, can be
//! decremented synchronously — which lets the read-unlock path live in a
//! `Drop` impl instead of requiring an async unlock call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;

struct Inner<T> {
    service_queue: Semaphore,
    resource: Semaphore,
    readers: AtomicUsize,
    data: tokio::sync::RwLock<T>,
}

/// A writer-preferring lock around `T`.
///
/// The actual exclusion is delegated to an internal `tokio::sync::RwLock`;
/// `service_queue` and the atomic reader count exist purely to enforce
/// writer-preference ordering before that lock is touched.
pub struct WriterPreferringLock<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for WriterPreferringLock<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> WriterPreferringLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                service_queue: Semaphore::new(1),
                resource: Semaphore::new(1),
                readers: AtomicUsize::new(0),
                data: tokio::sync::RwLock::new(value),
            }),
        }
    }

    /// Acquire for read. Any number of readers may hold this concurrently,
    /// but a reader arriving while a writer waits on `service_queue` blocks
    /// behind it.
    pub async fn read(&self) -> ReadGuard<'_, T> {
        let ticket = self
            .inner
            .service_queue
            .acquire()
            .await
            .expect("service_queue never closed");
        if self.inner.readers.fetch_add(1, Ordering::AcqRel) == 0 {
            self.inner
                .resource
                .acquire()
                .await
                .expect("resource never closed")
                .forget();
        }
        drop(ticket);

        ReadGuard {
            lock: self,
            guard: self.inner.data.read().await,
        }
    }

    /// Acquire for write. Blocks until no readers and no other writer hold
    /// the resource.
    pub async fn write(&self) -> WriteGuard<'_, T> {
        let ticket = self
            .inner
            .service_queue
            .acquire()
            .await
            .expect("service_queue never closed");
        self.inner
            .resource
            .acquire()
            .await
            .expect("resource never closed")
            .forget();
        drop(ticket);

        WriteGuard {
            lock: self,
            guard: self.inner.data.write().await,
        }
    }

    fn release_read(&self) {
        if self.inner.readers.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.resource.add_permits(1);
        }
    }

    fn release_write(&self) {
        self.inner.resource.add_permits(1);
    }
}

pub struct ReadGuard<'a, T> {
    lock: &'a WriterPreferringLock<T>,
    guard: tokio::sync::RwLockReadGuard<'a, T>,
}

impl<'a, T> std::ops::Deref for ReadGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<'a, T> Drop for ReadGuard<'a, T> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

pub struct WriteGuard<'a, T> {
    lock: &'a WriterPreferringLock<T>,
    guard: tokio::sync::RwLockWriteGuard<'a, T>,
}

impl<'a, T> std::ops::Deref for WriteGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<'a, T> std::ops::DerefMut for WriteGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<'a, T> Drop for WriteGuard<'a, T> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
