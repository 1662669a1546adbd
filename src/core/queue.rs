//! Fixed-Capacity Ring Buffer
//!
//! Backing store for the preview queue. Capacity is chosen at construction
//! (bounded by the const backing array) and the queue is kept full for its
//! whole lifetime: `take` hands out the head and writes the replacement
//! into the same slot. No allocation, ever.

use serde::{Deserialize, Serialize};

/// Ring buffer over a const-sized backing array.
///
/// Only the first `cap` slots are live. The queue never grows or shrinks
/// after `fill`; `take` is the sole mutator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de> + Copy + Default"
))]
pub struct FixedQueue<T: Copy + Default, const N: usize> {
    #[serde(with = "serde_arrays")]
    slots: [T; N],
    head: usize,
    cap: usize,
}

// serde does not derive for arrays behind a const generic; the queue is
// tiny so a seq round-trip through Vec is fine.
mod serde_arrays {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T, const N: usize>(arr: &[T; N], ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        arr.as_slice().serialize(ser)
    }

    pub fn deserialize<'de, D, T, const N: usize>(de: D) -> Result<[T; N], D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Copy + Default,
    {
        let v = Vec::<T>::deserialize(de)?;
        let mut arr = [T::default(); N];
        if v.len() != N {
            return Err(serde::de::Error::invalid_length(v.len(), &"backing array length"));
        }
        arr.copy_from_slice(&v);
        Ok(arr)
    }
}

impl<T: Copy + Default, const N: usize> FixedQueue<T, N> {
    /// Create an empty queue with the given live capacity (clamped to `N`).
    pub fn new(cap: usize) -> Self {
        Self {
            slots: [T::default(); N],
            head: 0,
            cap: cap.min(N),
        }
    }

    /// Live capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Fill every slot from the supplied generator. Called once at init;
    /// afterwards the queue is permanently full.
    pub fn fill(&mut self, mut next: impl FnMut() -> T) {
        for i in 0..self.cap {
            self.slots[i] = next();
        }
        self.head = 0;
    }

    /// Pop the head, write `replacement` into its slot, advance.
    ///
    /// Zero-capacity queues (preview disabled) pass `replacement` straight
    /// through.
    #[inline]
    pub fn take(&mut self, replacement: T) -> T {
        if self.cap == 0 {
            return replacement;
        }
        let out = self.slots[self.head];
        self.slots[self.head] = replacement;
        self.head = (self.head + 1) % self.cap;
        out
    }

    /// Read slot `i` ahead of the head without mutating.
    #[inline]
    pub fn peek(&self, i: usize) -> Option<T> {
        if i >= self.cap {
            return None;
        }
        Some(self.slots[(self.head + i) % self.cap])
    }

    /// Iterate the queued values front to back.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.cap).map(move |i| self.slots[(self.head + i) % self.cap])
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_and_take_rotates() {
        let mut q: FixedQueue<u8, 5> = FixedQueue::new(3);
        let mut n = 0u8;
        q.fill(|| {
            n += 1;
            n
        });

        assert_eq!(q.peek(0), Some(1));
        assert_eq!(q.peek(1), Some(2));
        assert_eq!(q.peek(2), Some(3));
        assert_eq!(q.peek(3), None);

        assert_eq!(q.take(4), 1);
        assert_eq!(q.take(5), 2);
        assert_eq!(q.peek(0), Some(3));
        assert_eq!(q.peek(1), Some(4));
        assert_eq!(q.peek(2), Some(5));
    }

    #[test]
    fn test_queue_stays_full() {
        let mut q: FixedQueue<u8, 5> = FixedQueue::new(4);
        q.fill(|| 9);
        for i in 0..100u8 {
            q.take(i);
            assert_eq!(q.iter().count(), 4);
        }
    }

    #[test]
    fn test_zero_capacity_passthrough() {
        let mut q: FixedQueue<u8, 5> = FixedQueue::new(0);
        assert_eq!(q.take(7), 7);
        assert_eq!(q.peek(0), None);
    }

    #[test]
    fn test_cap_clamped_to_backing() {
        let q: FixedQueue<u8, 5> = FixedQueue::new(12);
        assert_eq!(q.capacity(), 5);
    }
}
