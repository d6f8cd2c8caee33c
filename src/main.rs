// src/main.rs

use stemshift::{cli, logging, run};

// No #[tokio::main]: the window owns the main thread and every job gets its
// own runtime.
fn main() {
    if let Err(err) = run_main() {
        eprintln!("stemshift error: {err:?}");
        std::process::exit(1);
    }
}

fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args)
}
