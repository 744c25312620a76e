use crate::env::Environment;
use crate::error::Result;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Something that can run a program to completion.
///
/// The interpreter only relies on this contract: an argument vector whose
/// first element names the program goes in, the exit code comes out. A
/// program that can not be started yields [`Error::Launch`], one that does
/// not exit normally yields [`Error::Process`].
///
/// [`Error::Launch`]: crate::Error::Launch
/// [`Error::Process`]: crate::Error::Process
pub trait ProgramRunner {
    fn run(&mut self, argv: &[String], env: &Environment) -> Result<ExitCode>;
}
