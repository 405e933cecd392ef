//! Determine the frequency of file dates under a path.

use std::process::ExitCode;

use toolshed::script;
use toolshed::tools::datespread::DateSpread;

fn main() -> ExitCode {
    script::main(DateSpread)
}
