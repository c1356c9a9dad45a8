/// Fixed-capacity FIFO over a caller buffer.
///
/// One slot always stays free to tell a full ring from an empty one, so a
/// buffer of `n` slots holds at most `n - 1` elements.
#[derive(Debug)]
pub struct Ring<'a, T: Copy> {
    buf: &'a mut [T],
    head: usize,
    tail: usize,
}

impl<'a, T: Copy> Ring<'a, T> {
    #[track_caller]
    pub fn new(buf: &'a mut [T]) -> Self {
        fail_if!(buf.len() < 2, "A ring needs at least two slots, got {}.", buf.len());
        Self {
            buf,
            head: 0,
            tail: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len() - 1
    }

    pub fn len(&self) -> usize {
        (self.head + self.buf.len() - self.tail) % self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        (self.head + 1) % self.buf.len() == self.tail
    }

    /// Hands `value` back when the ring is full.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        self.buf[self.head] = value;
        self.head = (self.head + 1) % self.buf.len();
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = self.buf[self.tail];
        self.tail = (self.tail + 1) % self.buf.len();
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::catch_exception;

    #[test]
    fn test_push_pop() {
        let mut buf = [0; 4];
        let mut ring = Ring::new(&mut buf);
        assert_eq!(ring.capacity(), 3);
        assert!(ring.is_empty());
        assert_eq!(ring.pop(), None);

        for i in 1..=3 {
            ring.push(i).unwrap();
        }
        assert!(ring.is_full());
        assert_eq!(ring.push(4), Err(4));
        assert_eq!(ring.len(), 3);

        assert_eq!(ring.pop(), Some(1));
        ring.push(4).unwrap();
        assert_eq!(ring.len(), 3);

        let drained: Vec<_> = std::iter::from_fn(|| ring.pop()).collect();
        assert_eq!(drained, [2, 3, 4]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_wraps_around() {
        let mut buf = [0u16; 3];
        let mut ring = Ring::new(&mut buf);
        for i in 0..100 {
            ring.push(i).unwrap();
            ring.push(i + 1).unwrap();
            assert_eq!(ring.pop(), Some(i));
            assert_eq!(ring.pop(), Some(i + 1));
        }
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn test_needs_two_slots() {
        let mut buf = [0u8; 1];
        let e = catch_exception(|| {
            Ring::new(&mut buf);
        });
        assert_eq!(e.msg, "A ring needs at least two slots, got 1.");
    }
}
