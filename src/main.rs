use pagesim::{cli::prompt::read_config, sim::driver::run_simulation};
use tokio::runtime::Runtime;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    println!("FIFO paging simulator (interactive)");
    let config = read_config()?;
    let rt = Runtime::new()?;
    rt.block_on(run_simulation(config))
}
