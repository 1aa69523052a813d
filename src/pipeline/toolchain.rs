//! Command construction for the three pipeline stages.
//!
//! Commands are pure data: a function of the workspace path and a platform
//! row, with no shell involved. Spawning lives in [`super::process`], so
//! these builders are testable without invoking real toolchains.

use crate::workspace::{GENERATED_FILE, GRAMMAR_FILE};
use std::path::Path;

/// Lexer generator, resolved by name on the execution PATH.
pub const GENERATOR: &str = "flex";

/// C compiler/linker, resolved by name on the execution PATH.
pub const COMPILER: &str = "gcc";

/// Platform-dependent toolchain parameters, resolved once per process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlatformSpec {
    /// Name of the built executable inside the workspace.
    pub exe_name: &'static str,
    /// Extra linker flags for the compile stage.
    pub link_flags: &'static [&'static str],
}

/// POSIX hosts link the lex runtime support library.
pub const POSIX: PlatformSpec = PlatformSpec {
    exe_name: "a.out",
    link_flags: &["-lfl"],
};

/// Windows toolchains carry the scanner runtime themselves.
pub const WINDOWS: PlatformSpec = PlatformSpec {
    exe_name: "a.exe",
    link_flags: &[],
};

impl PlatformSpec {
    /// Row for the platform this process is running on.
    pub fn host() -> Self {
        if cfg!(windows) {
            WINDOWS
        } else {
            POSIX
        }
    }
}

/// argv for the generate stage: the generator on the grammar file. Run with
/// the workspace as cwd so the scanner source lands there.
pub fn generate_args(dir: &Path) -> Vec<String> {
    vec![
        GENERATOR.to_string(),
        dir.join(GRAMMAR_FILE).to_string_lossy().to_string(),
    ]
}

/// argv for the compile stage: the compiler on the generated scanner,
/// linking the support library where the platform requires it.
pub fn compile_args(dir: &Path, platform: &PlatformSpec) -> Vec<String> {
    let mut args = vec![
        COMPILER.to_string(),
        dir.join(GENERATED_FILE).to_string_lossy().to_string(),
        "-o".to_string(),
        dir.join(platform.exe_name).to_string_lossy().to_string(),
    ];
    args.extend(platform.link_flags.iter().map(|flag| flag.to_string()));
    args
}

/// argv for the execute stage: the freshly built binary.
pub fn run_args(dir: &Path, platform: &PlatformSpec) -> Vec<String> {
    vec![dir.join(platform.exe_name).to_string_lossy().to_string()]
}
