use crate::mem::process::Pid;
use std::fmt;

/// Failures surfaced by the memory manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemError {
    /// Process creation could not place every page; all partial
    /// allocations have been rolled back.
    AllocationFailure,
    /// Operation referenced a process id that is not registered.
    NotFound(Pid),
    /// No evictable frame and no free swap slot; the simulation has no
    /// path forward.
    EvictionExhausted,
}

pub type MemResult<T> = Result<T, MemError>;

impl fmt::Display for MemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemError::AllocationFailure => {
                write!(f, "no space in RAM or swap to place every page")
            }
            MemError::NotFound(pid) => write!(f, "process P{} not found", pid),
            MemError::EvictionExhausted => {
                write!(f, "no evictable frame and no free swap slot")
            }
        }
    }
}

impl std::error::Error for MemError {}
