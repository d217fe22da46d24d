use anyhow::{Context, Result, bail};
use rand::Rng;
use rustyline::Editor;

/// Everything the simulation needs, collected up front: pool sizing plus
/// the process size range for creations.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub physical_bytes: u64,
    pub page_bytes: u64,
    pub virtual_bytes: u64,
    pub min_proc_bytes: u64,
    pub max_proc_bytes: u64,
}

/// Interactively collect the four configuration inputs. Virtual memory is
/// oversubscribed by a random factor in [1.5, 4.5] of physical capacity.
pub fn read_config() -> Result<SimConfig> {
    let mut rl = Editor::<()>::new()?;

    let phys_mb = read_number(&mut rl, "physical memory (MB)> ")?;
    let page_kb = read_number(&mut rl, "page size (KB)> ")?;
    let min_kb = read_number(&mut rl, "min process size (KB)> ")?;
    let max_kb = read_number(&mut rl, "max process size (KB)> ")?;

    if max_kb < min_kb {
        bail!("max process size ({max_kb} KB) is below the minimum ({min_kb} KB)");
    }

    let physical_bytes = (phys_mb * 1024.0 * 1024.0 + 0.5) as u64;
    let page_bytes = (page_kb * 1024.0 + 0.5) as u64;
    if page_bytes == 0 {
        bail!("page size must be at least one byte");
    }

    let factor = rand::thread_rng().gen_range(1.5..=4.5);
    let virtual_bytes = (physical_bytes as f64 * factor + 0.5) as u64;
    println!("virtual memory: {virtual_bytes} bytes (factor {factor:.2})");

    Ok(SimConfig {
        physical_bytes,
        page_bytes,
        virtual_bytes,
        min_proc_bytes: (min_kb * 1024.0 + 0.5) as u64,
        max_proc_bytes: (max_kb * 1024.0 + 0.5) as u64,
    })
}

fn read_number(rl: &mut Editor<()>, prompt: &str) -> Result<f64> {
    let line = rl.readline(prompt)?;
    let value: f64 = line
        .trim()
        .parse()
        .with_context(|| format!("invalid number: {:?}", line.trim()))?;
    if value < 0.0 {
        bail!("value must not be negative: {value}");
    }
    Ok(value)
}
