/// A VM thread: a pc and its own copy of the capture slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub pc: usize,
    pub slots: Box<[Option<usize>]>,
}

/// The threads alive at one input offset, in priority order.
///
/// Every pc reached while building the list is recorded in `visited`, and a
/// pc is only ever expanded once per offset. A later (and therefore lower
/// priority) thread arriving at a visited pc is dropped, which keeps the list
/// no longer than the program.
#[derive(Debug)]
pub struct ThreadList {
    visited: bit_set::BitSet,
    threads: Vec<Thread>,
}

impl ThreadList {
    pub fn new(program_size: usize) -> Self {
        ThreadList {
            visited: bit_set::BitSet::with_capacity(program_size),
            threads: Vec::with_capacity(program_size),
        }
    }

    /// Marks `pc` as reached at this offset. Returns `false` if it already
    /// was.
    pub fn visit(&mut self, pc: usize) -> bool {
        self.visited.insert(pc)
    }

    pub fn push(&mut self, thread: Thread) {
        self.threads.push(thread);
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Removes the threads in priority order. Threads not yet taken when the
    /// iterator is dropped are discarded.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Thread> {
        self.threads.drain(..)
    }

    pub fn clear(&mut self) {
        self.visited.clear();
        self.threads.clear();
    }
}
