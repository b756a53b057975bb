//! One-shot command sequences
//!
//! A [`ProcessVector`] holds a short, pre-loaded interrupt routine
//! ("open valve, wait, close valve"). It is filled with `put`, played once
//! front to back with `next`, then `reset` before it can be reused.
//! Commands are never removed individually.

use crate::command::CommandData;

/// Append-only list of up to `L` commands with a read cursor
#[derive(Debug, Clone)]
pub struct ProcessVector<const L: usize> {
    count: usize,
    next: usize,
    items: [CommandData; L],
}

impl<const L: usize> Default for ProcessVector<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const L: usize> ProcessVector<L> {
    /// Create an empty vector
    pub const fn new() -> Self {
        Self {
            count: 0,
            next: 0,
            items: [CommandData::EMPTY; L],
        }
    }

    /// Append a command
    ///
    /// Returns the command back if the vector is full.
    pub fn put(&mut self, cmd: CommandData) -> Result<(), CommandData> {
        if self.count < L {
            self.items[self.count] = cmd;
            self.count += 1;
            Ok(())
        } else {
            Err(cmd)
        }
    }

    /// Read the command under the cursor and advance
    ///
    /// Returns `None` once every written command has been played.
    pub fn next(&mut self) -> Option<CommandData> {
        if self.next < self.count {
            let cmd = self.items[self.next];
            self.next += 1;
            Some(cmd)
        } else {
            None
        }
    }

    /// Read any written command without moving the cursor
    pub fn get(&self, index: usize) -> Option<CommandData> {
        if index < self.count {
            Some(self.items[index])
        } else {
            None
        }
    }

    /// Number of commands written
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of commands not yet played
    pub fn remaining(&self) -> usize {
        self.count - self.next
    }

    pub const fn capacity(&self) -> usize {
        L
    }

    /// Number of free slots
    pub fn available(&self) -> usize {
        L - self.count
    }

    /// Check if every written command has been played
    pub fn is_exhausted(&self) -> bool {
        self.next >= self.count
    }

    /// Clear storage and counters so the vector can be loaded again
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(code: i8) -> CommandData {
        CommandData::new(code, 0)
    }

    #[test]
    fn test_put_until_full() {
        let mut v: ProcessVector<2> = ProcessVector::new();
        assert_eq!(v.put(cmd(1)), Ok(()));
        assert_eq!(v.put(cmd(2)), Ok(()));
        assert_eq!(v.put(cmd(3)), Err(cmd(3)));
        assert_eq!(v.count(), 2);
        assert_eq!(v.available(), 0);
    }

    #[test]
    fn test_next_plays_once_in_order() {
        let mut v: ProcessVector<4> = ProcessVector::new();
        v.put(cmd(1)).unwrap();
        v.put(cmd(2)).unwrap();

        assert_eq!(v.next(), Some(cmd(1)));
        assert_eq!(v.remaining(), 1);
        assert_eq!(v.next(), Some(cmd(2)));
        assert!(v.is_exhausted());
        assert_eq!(v.next(), None);
        assert_eq!(v.next(), None);
    }

    #[test]
    fn test_get_does_not_consume() {
        let mut v: ProcessVector<4> = ProcessVector::new();
        v.put(cmd(5)).unwrap();
        v.put(cmd(6)).unwrap();
        v.next();

        // Already-played commands stay visible
        assert_eq!(v.get(0), Some(cmd(5)));
        assert_eq!(v.get(1), Some(cmd(6)));
        assert_eq!(v.get(2), None);
        assert_eq!(v.remaining(), 1);
    }

    #[test]
    fn test_reset_makes_reusable() {
        let mut v: ProcessVector<2> = ProcessVector::new();
        v.put(cmd(1)).unwrap();
        v.put(cmd(2)).unwrap();
        v.next();
        v.next();

        v.reset();
        assert_eq!(v.count(), 0);
        assert!(v.is_exhausted());
        assert_eq!(v.get(0), None);

        v.put(cmd(9)).unwrap();
        assert_eq!(v.next(), Some(cmd(9)));
    }

    #[test]
    fn test_empty_vector_is_exhausted() {
        let mut v: ProcessVector<3> = ProcessVector::new();
        assert!(v.is_exhausted());
        assert_eq!(v.next(), None);
    }
}
