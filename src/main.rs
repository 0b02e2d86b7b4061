#![warn(rust_2018_idioms)]

use makepmafile::FIXTURE_NAME;

fn program_name() -> String {
    std::env::args_os()
        .next()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned())
}

fn usage(e: i32) -> ! {
    eprintln!(
r"Create a 4 MiB sparse file named {1} in the current directory

Usage: {0}
",
    program_name(), FIXTURE_NAME);

    std::process::exit(e)
}

// NOTE: we don't use a `Result` return because it uses debug formatting and we want display
// formatting for our errors.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        usage(0)
    }

    if let Err(e) = makepmafile::generate() {
        eprintln!("{}: {}", program_name(), e);
        std::process::exit(1);
    }
}
