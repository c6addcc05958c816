//! Version command.

use console::style;

/// Print version information.
pub fn execute() {
    println!(
        "{} {}",
        style("skinfaxi").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
}
