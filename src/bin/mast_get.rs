//! Retrieve a named JWST file from MAST using token authentication.

use std::process::ExitCode;

use toolshed::script;
use toolshed::tools::mast::MastGet;

fn main() -> ExitCode {
    script::main(MastGet)
}
