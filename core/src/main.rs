use std::process::exit;
use zk_relay_core::{cli, utils};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let args = match cli::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    };
    utils::initialize_logger(utils::level_filter_from_verbosity(args.verbose))?;

    let stdout = std::io::stdout();
    cli::run(args, &mut stdout.lock())?;

    Ok(())
}
