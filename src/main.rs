use std::env;
use std::process;

use clap::Parser;

use bluehid::cli::device::list_devices;
use bluehid::cli::Args;
use bluehid::daemon;

fn main() {
    let args = Args::parse();

    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) if args.debug => "info,bluehid=trace".to_string(),
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();

    if args.list {
        list_devices();
        return;
    }

    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting bluehid v{}", VERSION);

    if let Err(e) = daemon::run(&args) {
        log::error!("{e}");
        process::exit(e.exit_code());
    }
    log::info!("Shutting down");
}
