//! Kernel-object synchronization primitives: mutex, counting semaphore,
//! condition variable, reader-writer lock. All four are built directly on
//! [`super::queue::WaitQueue`] and `scheduler::schedule()` — there is no
//! separate spinlock layer underneath them, since the single hart already
//! makes "disable interrupts" a full critical section.
//!
//! Userspace sees these through small integer handles (the syscalls in the
//! 46-61 range: create / op / destroy). This module only implements the
//! objects themselves; the syscall layer allocates a handle from
//! [`table()`] and maps it back to one of these on every operation.

use super::{current_pid, Pid, WaitQueue};
use crate::lib::error::Errno;

pub const MAX_SYNC_OBJECTS: usize = 128;

pub struct Mutex {
    locked: bool,
    owner_pid: Pid,
    waiters: WaitQueue,
}

impl Mutex {
    pub const fn new() -> Self {
        Self { locked: false, owner_pid: 0, waiters: WaitQueue::new() }
    }

    /// If unlocked, take it immediately. Otherwise sleep on the mutex's own
    /// wait queue and re-check on every wake — `wake_one` only promises
    /// "try again", not "you now hold it".
    pub fn lock(&mut self) {
        loop {
            if !self.locked {
                self.locked = true;
                self.owner_pid = current_pid();
                return;
            }
            self.waiters.sleep();
        }
    }

    pub fn unlock(&mut self) -> Result<(), Errno> {
        if !self.locked || self.owner_pid != current_pid() {
            return Err(Errno::EPERM);
        }
        self.locked = false;
        self.owner_pid = 0;
        self.waiters.wake_one();
        Ok(())
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Semaphore {
    count: i32,
    waiters: WaitQueue,
}

impl Semaphore {
    pub const fn new(initial: i32) -> Self {
        Self { count: initial, waiters: WaitQueue::new() }
    }

    /// Decrement; if that would take the count negative, sleep instead and
    /// retry the decrement on wake.
    pub fn wait(&mut self) {
        loop {
            if self.count > 0 {
                self.count -= 1;
                return;
            }
            self.waiters.sleep();
        }
    }

    pub fn signal(&mut self) {
        self.count += 1;
        self.waiters.wake_one();
    }
}

/// Always paired with a caller-supplied mutex: the caller must hold it
/// before calling `wait`, which releases it across the sleep and reacquires
/// it before returning, mirroring the usual condvar contract.
pub struct CondVar {
    waiters: WaitQueue,
}

impl CondVar {
    pub const fn new() -> Self {
        Self { waiters: WaitQueue::new() }
    }

    pub fn wait(&mut self, mutex: &mut Mutex) -> Result<(), Errno> {
        mutex.unlock()?;
        self.waiters.sleep();
        mutex.lock();
        Ok(())
    }

    pub fn signal(&mut self) {
        self.waiters.wake_one();
    }

    pub fn broadcast(&mut self) {
        self.waiters.wake_all();
    }
}

impl Default for CondVar {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer-priority reader-writer lock: once a writer is queued, no new
/// reader may enter ahead of it, even if the lock is currently read-held.
pub struct RwLock {
    readers: u32,
    writer_active: bool,
    writers_waiting: u32,
    reader_queue: WaitQueue,
    writer_queue: WaitQueue,
}

impl RwLock {
    pub const fn new() -> Self {
        Self {
            readers: 0,
            writer_active: false,
            writers_waiting: 0,
            reader_queue: WaitQueue::new(),
            writer_queue: WaitQueue::new(),
        }
    }

    /// Blocks while a writer holds the lock or one is waiting for it.
    pub fn read_lock(&mut self) {
        loop {
            if !self.writer_active && self.writers_waiting == 0 {
                self.readers += 1;
                return;
            }
            self.reader_queue.sleep();
        }
    }

    pub fn read_unlock(&mut self) {
        self.readers = self.readers.saturating_sub(1);
        if self.readers == 0 {
            self.writer_queue.wake_one();
        }
    }

    pub fn write_lock(&mut self) {
        self.writers_waiting += 1;
        loop {
            if !self.writer_active && self.readers == 0 {
                self.writers_waiting -= 1;
                self.writer_active = true;
                return;
            }
            self.writer_queue.sleep();
        }
    }

    pub fn write_unlock(&mut self) {
        self.writer_active = false;
        if self.writers_waiting > 0 {
            self.writer_queue.wake_one();
        } else {
            self.reader_queue.wake_all();
        }
    }
}

impl Default for RwLock {
    fn default() -> Self {
        Self::new()
    }
}

pub enum SyncObject {
    Mutex(Mutex),
    Semaphore(Semaphore),
    CondVar(CondVar),
    RwLock(RwLock),
}

struct SyncTableCell(core::cell::UnsafeCell<[Option<SyncObject>; MAX_SYNC_OBJECTS]>);
unsafe impl Sync for SyncTableCell {}

static TABLE: SyncTableCell = SyncTableCell(core::cell::UnsafeCell::new([const { None }; MAX_SYNC_OBJECTS]));

/// Interrupts-disabled handle to the kernel-object table, mirroring
/// [`super::pid::ProcessTableGuard`].
pub struct SyncTableGuard {
    _critical: crate::lib::critical::Guard,
}

impl core::ops::Deref for SyncTableGuard {
    type Target = [Option<SyncObject>; MAX_SYNC_OBJECTS];
    fn deref(&self) -> &Self::Target {
        unsafe { &*TABLE.0.get() }
    }
}

impl core::ops::DerefMut for SyncTableGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *TABLE.0.get() }
    }
}

pub fn table() -> SyncTableGuard {
    SyncTableGuard { _critical: crate::lib::critical::enter() }
}

/// Install `obj` in the first free slot and hand back its handle.
pub fn create(obj: SyncObject) -> Result<i32, Errno> {
    let mut t = table();
    for (i, slot) in t.iter_mut().enumerate() {
        if slot.is_none() {
            *slot = Some(obj);
            return Ok(i as i32);
        }
    }
    Err(Errno::ENOMEM)
}

pub fn destroy(handle: i32) -> Result<(), Errno> {
    let mut t = table();
    let slot = t.get_mut(handle as usize).ok_or(Errno::EINVAL)?;
    if slot.is_none() {
        return Err(Errno::EINVAL);
    }
    *slot = None;
    Ok(())
}

/// Raw pointer to the object at `handle`, for callers about to invoke a
/// blocking operation on it (`lock`, `wait`, `read_lock`, ...).
///
/// Those operations call into [`WaitQueue::sleep`], which context-switches
/// away; the calling stack frame (and anything it's holding, including a
/// [`SyncTableGuard`]) stays suspended mid-call until this task is scheduled
/// back in. Holding the guard across that would leave interrupts disabled
/// for as long as some *other* task happens to run, which on a single hart
/// means the timer never ticks again. So: look the object up, get a raw
/// pointer, drop the guard, and only then call the blocking method on the
/// pointer. Sound because nothing else runs on this hart until this task
/// blocks or returns, and a handle is never reused while live.
pub fn object_ptr(handle: i32) -> Result<*mut SyncObject, Errno> {
    let mut t = table();
    let slot = t.get_mut(handle as usize).ok_or(Errno::EINVAL)?;
    match slot {
        Some(obj) => Ok(obj as *mut SyncObject),
        None => Err(Errno::EINVAL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutex_round_trips_uncontended() {
        let mut m = Mutex::new();
        m.lock();
        assert!(m.unlock().is_ok());
    }

    #[test]
    fn mutex_unlock_by_non_owner_fails() {
        let mut m = Mutex::new();
        m.locked = true;
        m.owner_pid = 99;
        assert_eq!(m.unlock(), Err(Errno::EPERM));
    }

    #[test]
    fn semaphore_wait_consumes_a_permit() {
        let mut s = Semaphore::new(1);
        s.wait();
        assert_eq!(s.count, 0);
        s.signal();
        assert_eq!(s.count, 1);
    }

    #[test]
    fn rwlock_blocks_new_readers_once_a_writer_is_waiting() {
        let mut l = RwLock::new();
        l.read_lock();
        l.read_lock();
        assert_eq!(l.readers, 2);
        l.writers_waiting = 1; // simulate a writer already queued
        // A third reader must not proceed past this point: readers only
        // increments inside the `!writer_active && writers_waiting == 0`
        // branch, which is now false.
        assert!(l.writer_active || l.writers_waiting > 0);
    }
}
