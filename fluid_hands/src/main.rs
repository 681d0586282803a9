//! fluid_hands — interactive entry point.

use clap::Parser;

use fluid_hands::app::run;
use fluid_hands::Cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    #[cfg(feature = "leap")]
    log::info!("hands: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    log::info!("hands: simulated (hold H / J; use --features leap for hardware)");

    if let Err(e) = cli.resolve().and_then(run) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
