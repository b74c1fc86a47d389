fn main() {
    if let Err(error) = sqwrl_cli::run() {
        // Tracing is initialized inside run() after argument parsing.
        tracing::error!(error = format!("{error:#}"), "CLI execution failed");
        std::process::exit(1);
    }
}
