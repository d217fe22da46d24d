use crate::cli::prompt::SimConfig;
use crate::cli::report;
use crate::mem::error::MemError;
use crate::mem::manager::{AccessOutcome, MemoryConfig, MemoryManager};
use anyhow::Result;
use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Duration;
use tracing::{info, warn};

const TICK: Duration = Duration::from_secs(1);
/// A new process every 2 ticks.
const CREATE_INTERVAL: i64 = 2;
/// Random terminations and accesses start after 30 ticks.
const WARMUP_TICKS: i64 = 30;
/// One termination + one access every 5 ticks after warm-up.
const PERIODIC_INTERVAL: i64 = 5;

/// Run the interactive simulation until memory is exhausted or a creation
/// can no longer be placed.
pub async fn run_simulation(config: SimConfig) -> Result<()> {
    let mut mgr = MemoryManager::new(MemoryConfig {
        physical_bytes: config.physical_bytes,
        page_bytes: config.page_bytes,
        virtual_bytes: config.virtual_bytes,
    });

    let snapshot = mgr.snapshot();
    println!(
        "physical memory: {} bytes ({} frames)",
        config.physical_bytes, snapshot.total_frames
    );
    println!(
        "virtual memory: {} bytes ({} pages)",
        config.virtual_bytes,
        snapshot.total_frames + snapshot.total_swap
    );
    println!("swap slots: {}", snapshot.total_swap);
    println!("replacement policy: FIFO");
    println!(
        "process creation every {CREATE_INTERVAL}s; terminations and accesses every \
         {PERIODIC_INTERVAL}s after the first {WARMUP_TICKS}s"
    );

    let mut rng = rand::thread_rng();
    let mut interval = tokio::time::interval(TICK);
    let mut tick: i64 = 0;
    let mut last_creation = -CREATE_INTERVAL;
    let mut last_periodic = -PERIODIC_INTERVAL;

    loop {
        interval.tick().await;
        tick += 1;
        println!("\n--- tick {tick} ---");

        if tick - last_creation >= CREATE_INTERVAL {
            last_creation = tick;
            match mgr.create_process(config.min_proc_bytes, config.max_proc_bytes) {
                Ok(pid) => info!(pid, "created"),
                Err(MemError::AllocationFailure) => {
                    warn!("could not place a new process in RAM or swap; ending simulation");
                    break;
                }
                Err(e) => return Err(e.into()),
            }
            report::print_status(&mgr.snapshot());
        }

        if tick >= WARMUP_TICKS && tick - last_periodic >= PERIODIC_INTERVAL {
            last_periodic = tick;
            let keep_going = run_periodic_round(&mut mgr, &mut rng)?;
            report::print_status(&mgr.snapshot());
            if !keep_going {
                warn!("ending simulation: access could not be completed");
                break;
            }
        }

        if mgr.exhausted() {
            warn!("RAM and swap exhausted with nothing evictable; ending simulation");
            break;
        }
    }

    println!("{}", report::render_json(&mgr.snapshot())?);
    println!("simulation finished");
    Ok(())
}

/// One periodic round: terminate a random live process, then probe a
/// random byte offset of a random live process.
fn run_periodic_round(mgr: &mut MemoryManager, rng: &mut impl Rng) -> Result<bool> {
    match mgr.live_pids().choose(rng) {
        Some(&victim) => {
            info!(pid = victim, "random termination");
            mgr.terminate(victim)?;
        }
        None => info!("no live process to terminate"),
    }

    let Some(&pid) = mgr.live_pids().choose(rng) else {
        info!("no live process to access");
        return Ok(true);
    };
    let size = mgr.process_size(pid)?;
    let offset = if size == 0 { 0 } else { rng.gen_range(0..size) };
    match mgr.access(pid, offset)? {
        AccessOutcome::Hit { frame } => info!(pid, offset, frame, "hit"),
        AccessOutcome::FaultResolved { frame } => info!(pid, offset, frame, "page fault resolved"),
        AccessOutcome::OutOfRange => warn!(pid, offset, "access out of range"),
        AccessOutcome::Exhausted => {
            warn!(pid, offset, "no swap space left to evict into");
            return Ok(false);
        }
    }
    Ok(true)
}
