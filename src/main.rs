//! dsync binary entry point.

fn main() {
    if let Err(err) = dashsync::cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
