//! The three-stage compile pipeline.
//!
//! Generate → Compile → Execute, strictly sequential: the first failing
//! stage aborts the rest and tags the outcome with its stage. The runner
//! stays toolchain-agnostic; [`toolchain`] supplies the commands and
//! [`process`] spawns them. The caller owns workspace teardown.

pub mod process;
pub mod toolchain;

use crate::types::{CompileRequest, Result, Stage};
use crate::workspace::Workspace;
use process::run_stage;
use toolchain::PlatformSpec;

/// Drive all three stages inside `workspace` and return captured stdout.
///
/// Writes the request files, then runs the generator, the compiler, and the
/// built program in order. Any error carries the stage it occurred in.
pub async fn run(
    workspace: &Workspace,
    platform: &PlatformSpec,
    request: &CompileRequest,
) -> Result<String> {
    workspace.write_grammar(&request.source)?;
    if let Some(input) = &request.input {
        workspace.write_input(input)?;
    }

    let dir = workspace.dir();

    run_stage(Stage::Generation, &toolchain::generate_args(dir), dir, None).await?;

    run_stage(
        Stage::Compilation,
        &toolchain::compile_args(dir, platform),
        dir,
        None,
    )
    .await?;

    let stdin = match request.input {
        Some(_) => Some(std::fs::File::open(workspace.input_path())?),
        None => None,
    };
    run_stage(
        Stage::Execution,
        &toolchain::run_args(dir, platform),
        dir,
        stdin,
    )
    .await
}
