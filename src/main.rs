use anyhow::Context;
use themekeeper::{command::USAGE, AppError, Command};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        println!("{USAGE}");
        return Ok(());
    }

    let command = match Command::parse(args) {
        Ok(command) => command,
        Err(err @ AppError::Usage(_)) => {
            eprintln!("{err}\n\n{USAGE}");
            std::process::exit(2);
        }
        Err(err) => return Err(err).context("invalid command"),
    };

    let report = themekeeper::run(command).context("theme command failed")?;
    print!("{report}");
    Ok(())
}
