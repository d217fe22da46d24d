use crate::mem::manager::MemorySnapshot;
use anyhow::Result;

/// Print the memory status table the way the interactive run shows it.
pub fn print_status(snapshot: &MemorySnapshot) {
    println!("=== memory status ===");
    println!(
        "frames: {} total, {} used, {} free",
        snapshot.total_frames, snapshot.used_frames, snapshot.free_frames
    );
    println!(
        "swap:   {} total, {} used, {} free",
        snapshot.total_swap, snapshot.used_swap, snapshot.free_swap
    );
    println!("processes: {}", snapshot.processes.len());
    for p in &snapshot.processes {
        println!("  P{}: size={} bytes, pages={}", p.pid, p.size_bytes, p.page_count);
    }
    println!("=====================");
}

/// The same snapshot as pretty-printed JSON, for the end-of-run dump.
pub fn render_json(snapshot: &MemorySnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}
