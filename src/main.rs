//! fgate - command-line front end for forgegate

fn main() {
    if let Err(err) = forgegate::cli::run() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
