//! Generate artifactory upload commands for recently modified files.

use std::process::ExitCode;

use toolshed::script;
use toolshed::tools::artifactory::ArtifactoryUp;

fn main() -> ExitCode {
    script::main(ArtifactoryUp)
}
