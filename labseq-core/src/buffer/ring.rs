//! Fixed-capacity ring buffer
//!
//! Head and tail are free-running counters. They are never wrapped
//! explicitly; slots are addressed by masking with `N - 1`, which is why
//! the capacity must be a power of two. `count = head - tail` stays correct
//! across counter overflow because both use wrapping arithmetic.

/// Outcome of [`RingBuffer::push`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pushed<T> {
    /// Inserted with room to spare
    Inserted,
    /// Buffer was full; the oldest element was evicted to make room
    Evicted(T),
}

/// Circular FIFO of `N` elements
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    head: usize,
    tail: usize,
    buf: [T; N],
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize> RingBuffer<T, N> {
    const MASK: usize = N - 1;

    const CAPACITY_IS_POWER_OF_TWO: () =
        assert!(N.is_power_of_two(), "ring buffer capacity must be a power of two");

    /// Create an empty buffer
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_POWER_OF_TWO;
        Self {
            head: 0,
            tail: 0,
            buf: [T::default(); N],
        }
    }

    #[inline]
    fn slot(counter: usize) -> usize {
        counter & Self::MASK
    }

    /// Number of queued elements
    pub fn count(&self) -> usize {
        self.head.wrapping_sub(self.tail)
    }

    /// Total number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of free slots
    pub fn available(&self) -> usize {
        N - self.count()
    }

    pub fn is_full(&self) -> bool {
        self.count() == N
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Append at the head
    ///
    /// Returns the item back if the buffer is full; nothing is overwritten.
    pub fn put(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.buf[Self::slot(self.head)] = item;
        self.head = self.head.wrapping_add(1);
        Ok(())
    }

    /// Append at the head, evicting the oldest element if full
    pub fn push(&mut self, item: T) -> Pushed<T> {
        let evicted = if self.is_full() { self.take_back() } else { None };
        // Cannot fail: there is room after the eviction above
        let _ = self.put(item);
        match evicted {
            Some(old) => Pushed::Evicted(old),
            None => Pushed::Inserted,
        }
    }

    /// Remove and return the oldest element
    pub fn take_back(&mut self) -> Option<T> {
        let item = self.last()?;
        self.tail = self.tail.wrapping_add(1);
        Some(item)
    }

    /// Read the element `index` places after the oldest
    pub fn get(&self, index: usize) -> Option<T> {
        if index < self.count() {
            Some(self.buf[Self::slot(self.tail.wrapping_add(index))])
        } else {
            None
        }
    }

    /// Overwrite the element `index` places after the oldest
    pub fn replace(&mut self, index: usize, item: T) -> Result<(), T> {
        if index < self.count() {
            self.buf[Self::slot(self.tail.wrapping_add(index))] = item;
            Ok(())
        } else {
            Err(item)
        }
    }

    /// Peek the newest element
    pub fn first(&self) -> Option<T> {
        if self.is_empty() {
            None
        } else {
            Some(self.buf[Self::slot(self.head.wrapping_sub(1))])
        }
    }

    /// Peek the oldest element
    pub fn last(&self) -> Option<T> {
        if self.is_empty() {
            None
        } else {
            Some(self.buf[Self::slot(self.tail)])
        }
    }

    /// Iterate queued elements from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.count()).map(move |i| self.buf[Self::slot(self.tail.wrapping_add(i))])
    }

    /// Empty the buffer
    ///
    /// With `full`, the backing storage is also cleared so stale elements
    /// can never be read back.
    pub fn reset(&mut self, full: bool) {
        self.head = 0;
        self.tail = 0;
        if full {
            self.buf = [T::default(); N];
        }
    }

    #[cfg(test)]
    fn with_counters(start: usize) -> Self {
        let mut rb = Self::new();
        rb.head = start;
        rb.tail = start;
        rb
    }
}
