use crate::mem::error::{MemError, MemResult};
use crate::mem::fifo::FifoQueue;
use crate::mem::page_table::{PageTable, Residency};
use crate::mem::pool::{PageOwner, SlotPool};
use crate::mem::process::{Pid, Process, ProcessTable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

pub const MAX_PROCESSES: usize = 200;
pub const MAX_PAGES_PER_PROCESS: usize = 1000;

/// Sizing inputs, fixed at startup. Frame count is derived from physical
/// capacity, swap slot count from the virtual capacity beyond it.
#[derive(Debug, Clone, Copy)]
pub struct MemoryConfig {
    pub physical_bytes: u64,
    pub page_bytes: u64,
    pub virtual_bytes: u64,
}

/// Result of a simulated access to a byte offset of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// Page was resident; no state changed.
    Hit { frame: usize },
    /// Page fault resolved; the page now lives in `frame`.
    FaultResolved { frame: usize },
    /// Offset maps past the process's last page.
    OutOfRange,
    /// No free frame and no swap slot to evict into: the terminal state.
    Exhausted,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessSnapshot {
    pub pid: Pid,
    pub size_bytes: u64,
    pub page_count: usize,
}

/// Read-only view of memory usage for the reporting layer.
#[derive(Debug, Clone, Serialize)]
pub struct MemorySnapshot {
    pub total_frames: usize,
    pub used_frames: usize,
    pub free_frames: usize,
    pub total_swap: usize,
    pub used_swap: usize,
    pub free_swap: usize,
    pub processes: Vec<ProcessSnapshot>,
}

/// The memory manager: frame table, swap area, FIFO eviction queue and
/// process registry as one owned aggregate. Every operation runs to
/// completion on `&mut self`; there is no shared or ambient state.
pub struct MemoryManager {
    page_bytes: u64,
    frames: SlotPool,
    swap: SlotPool,
    fifo: FifoQueue,
    procs: ProcessTable,
    rng: StdRng,
}

impl MemoryManager {
    pub fn new(config: MemoryConfig) -> Self {
        assert!(config.page_bytes > 0, "page size must be non-zero");
        let frame_count = config.physical_bytes.div_ceil(config.page_bytes) as usize;
        let virtual_pages = config.virtual_bytes.div_ceil(config.page_bytes) as usize;
        let swap_count = virtual_pages.saturating_sub(frame_count);
        MemoryManager {
            page_bytes: config.page_bytes,
            frames: SlotPool::new(frame_count),
            swap: SlotPool::new(swap_count),
            fifo: FifoQueue::new(frame_count),
            procs: ProcessTable::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a process with a size sampled uniformly in `[min, max]`
    /// bytes. `min` must not exceed `max`.
    pub fn create_process(&mut self, min_bytes: u64, max_bytes: u64) -> MemResult<Pid> {
        let size = self.rng.gen_range(min_bytes..=max_bytes);
        self.create_process_sized(size)
    }

    /// Create a process of an exact byte size. Either every page is
    /// placed (RAM first, then swap) and the process registers under the
    /// next pid, or nothing is left allocated and creation fails.
    pub fn create_process_sized(&mut self, size_bytes: u64) -> MemResult<Pid> {
        if self.procs.len() >= MAX_PROCESSES {
            debug!(size_bytes, "creation refused: process table full");
            return Err(MemError::AllocationFailure);
        }
        let pid = self.procs.next_pid();
        let num_pages = (size_bytes.div_ceil(self.page_bytes) as usize).clamp(1, MAX_PAGES_PER_PROCESS);

        let mut pages = PageTable::new();
        for vpn in 0..num_pages {
            let owner = PageOwner { pid, vpn };
            if let Some(frame) = self.frames.find_free() {
                self.frames.acquire(frame, owner);
                self.fifo.enqueue(frame);
                pages.push(Residency::InFrame(frame));
            } else if let Some(slot) = self.swap.find_free() {
                self.swap.acquire(slot, owner);
                pages.push(Residency::InSwap(slot));
            } else {
                self.rollback(&pages);
                debug!(pid, vpn, num_pages, "creation rolled back: RAM and swap exhausted");
                return Err(MemError::AllocationFailure);
            }
        }

        info!(pid, size_bytes, pages = num_pages, "process created");
        self.procs.register(Process { pid, size_bytes, pages });
        Ok(pid)
    }

    /// Undo the placements of a creation that could not complete.
    fn rollback(&mut self, pages: &PageTable) {
        for (_, residency) in pages.iter() {
            match residency {
                Residency::InFrame(frame) => {
                    self.fifo.remove(frame);
                    self.frames.release(frame);
                }
                Residency::InSwap(slot) => {
                    self.swap.release(slot);
                }
            }
        }
    }

    /// Release everything `pid` owns: frames (purged from the FIFO
    /// queue), swap slots, and the registry entry itself.
    pub fn terminate(&mut self, pid: Pid) -> MemResult<()> {
        let Some(process) = self.procs.remove(pid) else {
            return Err(MemError::NotFound(pid));
        };
        let mut freed_frames = 0usize;
        let mut freed_slots = 0usize;
        for (_, residency) in process.pages.iter() {
            match residency {
                Residency::InFrame(frame) => {
                    self.fifo.remove(frame);
                    self.frames.release(frame);
                    freed_frames += 1;
                }
                Residency::InSwap(slot) => {
                    self.swap.release(slot);
                    freed_slots += 1;
                }
            }
        }
        info!(pid, freed_frames, freed_slots, "process terminated");
        Ok(())
    }

    /// Classify an access to `byte_offset` within `pid`'s address space,
    /// resolving a fault if the page is not resident.
    pub fn access(&mut self, pid: Pid, byte_offset: u64) -> MemResult<AccessOutcome> {
        let vpn = (byte_offset / self.page_bytes) as usize;
        let residency = {
            let process = self.procs.get(pid)?;
            if vpn >= process.page_count() {
                debug!(pid, byte_offset, vpn, "access out of range");
                return Ok(AccessOutcome::OutOfRange);
            }
            process.pages.get(vpn)
        };
        if let Some(Residency::InFrame(frame)) = residency {
            debug!(pid, vpn, frame, "hit");
            return Ok(AccessOutcome::Hit { frame });
        }
        match self.resolve_fault(pid, vpn) {
            Ok(frame) => Ok(AccessOutcome::FaultResolved { frame }),
            Err(MemError::EvictionExhausted) => Ok(AccessOutcome::Exhausted),
            Err(e) => Err(e),
        }
    }

    /// Bring `(pid, vpn)` into RAM: take a free frame, or evict the
    /// oldest resident page to make one, then install the page.
    fn resolve_fault(&mut self, pid: Pid, vpn: usize) -> MemResult<usize> {
        let residency = self.procs.get(pid)?.pages.get(vpn);
        if let Some(Residency::InFrame(frame)) = residency {
            return Ok(frame);
        }
        let frame = match self.frames.find_free() {
            Some(frame) => frame,
            None => self.evict_one()?,
        };
        // The victim above can only have claimed a free slot, so the
        // faulting page's own slot is still its to release.
        if let Some(Residency::InSwap(slot)) = residency {
            self.swap.release(slot);
        }
        self.frames.acquire(frame, PageOwner { pid, vpn });
        self.procs.get_mut(pid)?.pages.set(vpn, Residency::InFrame(frame));
        self.fifo.enqueue(frame);
        debug!(pid, vpn, frame, "page fault resolved");
        Ok(frame)
    }

    /// Evict the oldest resident page to swap and return its frame. On
    /// swap exhaustion the dequeued frame goes back to the head of the
    /// queue, leaving occupancy and queue membership untouched.
    fn evict_one(&mut self) -> MemResult<usize> {
        let frame = self.fifo.dequeue().ok_or(MemError::EvictionExhausted)?;
        let Some(owner) = self.frames.owner(frame) else {
            warn!(frame, "queued frame had no owner; handing it out as free");
            return Ok(frame);
        };
        let owner_live = self
            .procs
            .get(owner.pid)
            .map(|p| owner.vpn < p.page_count())
            .unwrap_or(false);
        if !owner_live {
            self.frames.release(frame);
            warn!(frame, pid = owner.pid, "freed frame whose owner no longer exists");
            return Ok(frame);
        }
        let Some(slot) = self.swap.find_free() else {
            self.fifo.restore(frame);
            return Err(MemError::EvictionExhausted);
        };
        self.swap.acquire(slot, owner);
        self.procs.get_mut(owner.pid)?.pages.set(owner.vpn, Residency::InSwap(slot));
        self.frames.release(frame);
        info!(frame, pid = owner.pid, vpn = owner.vpn, slot, "evicted to swap");
        Ok(frame)
    }

    /// True when nothing can move any more: no free frame, no free swap
    /// slot, and nothing left in the eviction queue.
    pub fn exhausted(&self) -> bool {
        self.frames.free_count() == 0 && self.swap.free_count() == 0 && self.fifo.is_empty()
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        let mut processes: Vec<ProcessSnapshot> = self
            .procs
            .iter()
            .map(|p| ProcessSnapshot {
                pid: p.pid,
                size_bytes: p.size_bytes,
                page_count: p.page_count(),
            })
            .collect();
        processes.sort_by_key(|p| p.pid);
        MemorySnapshot {
            total_frames: self.frames.capacity(),
            used_frames: self.frames.used_count(),
            free_frames: self.frames.free_count(),
            total_swap: self.swap.capacity(),
            used_swap: self.swap.used_count(),
            free_swap: self.swap.free_count(),
            processes,
        }
    }

    pub fn page_bytes(&self) -> u64 {
        self.page_bytes
    }

    pub fn frames(&self) -> &SlotPool {
        &self.frames
    }

    pub fn swap(&self) -> &SlotPool {
        &self.swap
    }

    pub fn fifo(&self) -> &FifoQueue {
        &self.fifo
    }

    pub fn process_count(&self) -> usize {
        self.procs.len()
    }

    pub fn contains_process(&self, pid: Pid) -> bool {
        self.procs.contains(pid)
    }

    pub fn live_pids(&self) -> Vec<Pid> {
        self.procs.pids()
    }

    pub fn process_size(&self, pid: Pid) -> MemResult<u64> {
        Ok(self.procs.get(pid)?.size_bytes)
    }

    pub fn page_residency(&self, pid: Pid, vpn: usize) -> Option<Residency> {
        self.procs.get(pid).ok().and_then(|p| p.pages.get(vpn))
    }
}
