use crate::vm::instruction::{Inst, Program};
use crate::vm::threads::{Thread, ThreadList};

/// Groups captured by a successful match. Offsets are byte offsets into the
/// subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures<'h> {
    haystack: &'h str,
    slots: Box<[Option<usize>]>,
}

impl<'h> Captures<'h> {
    /// Span of group `group`; group 0 is the whole match. `None` when the
    /// group did not take part in the match.
    pub fn span(&self, group: usize) -> Option<std::ops::Range<usize>> {
        let start = self.slots.get(2 * group).copied().flatten()?;
        let end = self.slots.get(2 * group + 1).copied().flatten()?;
        Some(start..end)
    }

    pub fn get(&self, group: usize) -> Option<&'h str> {
        self.haystack.get(self.span(group)?)
    }

    /// The whole match.
    pub fn as_str(&self) -> &'h str {
        self.get(0).unwrap_or_default()
    }

    /// Number of groups, the whole match included.
    pub fn len(&self) -> usize {
        self.slots.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Capturing groups 1.., in order.
    pub fn groups(&self) -> Vec<Option<&'h str>> {
        (1..self.len()).map(|group| self.get(group)).collect()
    }
}

/// A [Pike VM](https://swtch.com/~rsc/regexp/regexp2.html) executing a
/// finalized [`Program`].
///
/// All live threads advance in lock-step over the input, so a match costs at
/// most `program.len()` thread steps per input character. Matches are
/// anchored at the start of the input: the VM reports the highest-priority
/// thread that reached `Match`, however much input it consumed.
#[derive(Debug)]
pub struct PikeVm<'p> {
    program: &'p Program,
    current: ThreadList,
    next: ThreadList,
    stack: Vec<Thread>,
    peak_threads: usize,
}

impl<'p> PikeVm<'p> {
    pub fn new(program: &'p Program) -> Self {
        PikeVm {
            program,
            current: ThreadList::new(program.len()),
            next: ThreadList::new(program.len()),
            stack: Vec::new(),
            peak_threads: 0,
        }
    }

    /// Largest number of threads alive at one offset during the last run.
    pub fn peak_threads(&self) -> usize {
        self.peak_threads
    }

    pub fn captures<'h>(&mut self, input: &'h str) -> Option<Captures<'h>> {
        self.current.clear();
        self.next.clear();
        self.peak_threads = 0;

        let seed = Thread {
            pc: 0,
            slots: vec![None; self.program.slot_count()].into_boxed_slice(),
        };
        add_thread(self.program, &mut self.current, &mut self.stack, seed, 0);

        let mut matched = None;
        let mut at = 0;

        loop {
            self.peak_threads = self.peak_threads.max(self.current.len());
            let c = input[at..].chars().next();
            let next_at = at + c.map_or(0, char::len_utf8);

            log::trace!("offset {at}: {} threads", self.current.len());

            for thread in self.current.drain() {
                match self.program[thread.pc] {
                    Inst::Match => {
                        // threads after this one have lower priority
                        matched = Some(thread.slots);
                        break;
                    }
                    Inst::Char(expected) if c == Some(expected) => {
                        let thread = Thread {
                            pc: thread.pc + 1,
                            slots: thread.slots,
                        };
                        add_thread(
                            self.program,
                            &mut self.next,
                            &mut self.stack,
                            thread,
                            next_at,
                        );
                    }
                    // mismatched chars die here; add_thread parks nothing else
                    Inst::Char(_)
                    | Inst::Jump(_)
                    | Inst::Split(_, _)
                    | Inst::Save(_)
                    | Inst::Nop => {}
                }
            }

            std::mem::swap(&mut self.current, &mut self.next);
            self.next.clear();

            if c.is_none() || self.current.is_empty() {
                break;
            }
            at = next_at;
        }

        matched.map(|slots| Captures {
            haystack: input,
            slots,
        })
    }
}

/// Follows the non-consuming instructions reachable from `thread` and parks
/// every thread that lands on `Char` or `Match` in `list`. The first target
/// of a split is explored completely before the second, so `list` ends up in
/// priority order.
fn add_thread(
    program: &Program,
    list: &mut ThreadList,
    stack: &mut Vec<Thread>,
    thread: Thread,
    at: usize,
) {
    stack.push(thread);

    while let Some(mut thread) = stack.pop() {
        while list.visit(thread.pc) {
            match program[thread.pc] {
                Inst::Jump(target) => thread.pc = target,
                Inst::Split(first, second) => {
                    stack.push(Thread {
                        pc: second,
                        slots: thread.slots.clone(),
                    });
                    thread.pc = first;
                }
                Inst::Save(slot) => {
                    thread.slots[slot] = Some(at);
                    thread.pc += 1;
                }
                Inst::Nop => thread.pc += 1,
                Inst::Char(_) | Inst::Match => {
                    list.push(thread);
                    break;
                }
            }
        }
    }
}

/// Runs `program` against `input`. Returns whether it matched and, if so,
/// the text of each capturing group (the whole match excluded).
pub fn run<'h>(program: &Program, input: &'h str) -> (bool, Vec<Option<&'h str>>) {
    match PikeVm::new(program).captures(input) {
        Some(captures) => (true, captures.groups()),
        None => (false, vec![]),
    }
}
