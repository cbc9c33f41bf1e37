//! resunpack - extract sprites and JSON assets from packed resource bundles

use std::process::ExitCode;

use resunpack::cli;

fn main() -> ExitCode {
    cli::run()
}
