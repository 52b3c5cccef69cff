// CLI module
// Command-line interface and argument parsing

mod args;

pub use args::CliArgs;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// Unlike `CliArgs::parse`, this does not exit the process on bad input, so
/// the caller can map failures to the configuration exit code. `--help` and
/// `--version` also come back as errors; call `exit()` on them to print and
/// exit successfully.
pub fn parse_args() -> Result<CliArgs, clap::Error> {
    CliArgs::try_parse()
}
