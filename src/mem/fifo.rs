use std::collections::VecDeque;

/// Bounded FIFO of resident frame indices, in insertion order. The oldest
/// entry is the next eviction victim. Capacity equals the frame count, so
/// under correct use the queue is never full when a frame is enqueued.
pub struct FifoQueue {
    queue: VecDeque<usize>,
    capacity: usize,
}

impl FifoQueue {
    pub fn new(capacity: usize) -> Self {
        FifoQueue {
            queue: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a frame at the tail. A full queue is left untouched.
    pub fn enqueue(&mut self, frame: usize) {
        if self.queue.len() == self.capacity {
            return;
        }
        self.queue.push_back(frame);
    }

    /// Pop the oldest frame, or `None` if the queue is empty.
    pub fn dequeue(&mut self) -> Option<usize> {
        self.queue.pop_front()
    }

    /// Put a just-dequeued frame back at the head, so a failed eviction
    /// leaves the queue exactly as it was.
    pub fn restore(&mut self, frame: usize) {
        self.queue.push_front(frame);
    }

    /// Drop every entry for `frame`, preserving the relative order of the
    /// remaining entries.
    pub fn remove(&mut self, frame: usize) {
        self.queue.retain(|&f| f != frame);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, frame: usize) -> bool {
        self.queue.contains(&frame)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.queue.iter().copied()
    }
}
