//! Merge and inspect association pool files.

use std::process::ExitCode;

use toolshed::script;
use toolshed::tools::pool::PoolTools;

fn main() -> ExitCode {
    script::main(PoolTools)
}
