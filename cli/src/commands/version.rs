//! Version command

/// Run the version command.
pub fn run() {
    println!("qabox {}", env!("CARGO_PKG_VERSION"));
}
