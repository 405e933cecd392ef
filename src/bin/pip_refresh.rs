//! Update pip installed packages in a conda environment.

use std::process::ExitCode;

use toolshed::script;
use toolshed::tools::pipup::PipRefresh;

fn main() -> ExitCode {
    script::main(PipRefresh)
}
