use std::io;

use campaign_pacing::{cli::run_cli, init_with_directive};

fn main() {
    let config = campaign_pacing::cli::load_config().unwrap_or_default();
    init_with_directive(&config.log_directive);

    let stdout = io::stdout();
    if let Err(err) = run_cli(std::env::args().skip(1), &mut stdout.lock()) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
