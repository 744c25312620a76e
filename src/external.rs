use crate::command::{ExitCode, ProgramRunner};
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::stack::Stack;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Pop a program name, then the rest of the stack as its arguments, run it
/// and push its exit code.
///
/// Arguments are taken in pop order, so the cell just below the program name
/// becomes the first argument and the bottom cell the last. Everything
/// popped stays consumed when the program can not be run.
pub fn execute(stack: &mut Stack, env: &Environment, runner: &mut dyn ProgramRunner) -> Result<()> {
    let program = stack.pop()?;
    let mut argv = vec![program];
    while let Ok(arg) = stack.pop() {
        argv.push(arg);
    }
    log::info!("running {:?}", argv);
    let code = runner.run(&argv, env)?;
    log::debug!("{} exited with {}", argv[0], code);
    stack.push(code.to_string())
}

/// Runs programs as child processes that share the terminal.
///
/// The program is looked up in the `PATH` of the given [`Environment`], and
/// the child receives exactly that environment and its working directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExternalRunner;

impl ProgramRunner for ExternalRunner {
    fn run(&mut self, argv: &[String], env: &Environment) -> Result<ExitCode> {
        let Some((program, args)) = argv.split_first() else {
            return Err(Error::Launch {
                program: String::new(),
                reason: "no program given".to_string(),
            });
        };
        let launch_error = |reason: String| Error::Launch {
            program: program.clone(),
            reason,
        };

        let search_paths = env.get_var("PATH").unwrap_or_default();
        let executable = resolve_program(OsStr::new(&search_paths), &env.current_dir, program)
            .ok_or_else(|| launch_error("command not found".to_string()))?;

        let mut cmd = Command::new(&executable);
        preserve_arg0(&mut cmd, program);
        cmd.args(args)
            .env_clear()
            .envs(env.child_vars())
            .current_dir(&env.current_dir);

        let mut child = cmd.spawn().map_err(|e| launch_error(e.to_string()))?;
        let status = child.wait().map_err(|e| Error::Process {
            program: program.clone(),
            status: e.to_string(),
        })?;
        match status.code() {
            Some(code) => Ok(code),
            None => Err(Error::Process {
                program: program.clone(),
                status: abnormal_exit(status),
            }),
        }
    }
}

#[cfg(unix)]
fn preserve_arg0(cmd: &mut Command, name: &str) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(name);
}

#[cfg(not(unix))]
fn preserve_arg0(_cmd: &mut Command, _name: &str) {}

#[cfg(unix)]
fn abnormal_exit(status: ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = status.signal() {
        if status.core_dumped() {
            format!("terminated by signal {} (core dumped)", signal)
        } else {
            format!("terminated by signal {}", signal)
        }
    } else if let Some(signal) = status.stopped_signal() {
        format!("stopped by signal {}", signal)
    } else {
        status.to_string()
    }
}

#[cfg(not(unix))]
fn abnormal_exit(status: ExitStatus) -> String {
    status.to_string()
}

/// Resolve a program name to the file to execute.
///
/// A name containing a `/` is a path, taken relative to `current_dir` unless
/// it is absolute. A bare name is looked up in `search_paths`; relative
/// entries there are relative to `current_dir` as well, empty ones are
/// skipped. Only regular files (or links to them) match.
pub fn resolve_program(search_paths: &OsStr, current_dir: &Path, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        let path = current_dir.join(name);
        return path.is_file().then_some(path);
    }
    std::env::split_paths(search_paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| current_dir.join(dir).join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Records every argument vector and answers with a fixed result.
    struct Recorder {
        calls: Vec<Vec<String>>,
        answer: fn(&[String]) -> Result<ExitCode>,
    }

    impl ProgramRunner for Recorder {
        fn run(&mut self, argv: &[String], _env: &Environment) -> Result<ExitCode> {
            self.calls.push(argv.to_vec());
            (self.answer)(argv)
        }
    }

    fn stack_of(cells: &[&str]) -> Stack {
        let mut stack = Stack::default();
        for c in cells {
            stack.push(*c).unwrap();
        }
        stack
    }

    #[test]
    fn test_whole_stack_becomes_arguments() {
        let env = Environment::new();
        let mut runner = Recorder {
            calls: Vec::new(),
            answer: |_| Ok(0),
        };
        let mut stack = stack_of(&["last", "first", "echo"]);
        execute(&mut stack, &env, &mut runner).unwrap();
        assert_eq!(runner.calls, vec![vec!["echo", "first", "last"]]);
        assert_eq!(stack.cells(), &["0"]);
    }

    #[test]
    fn test_exit_code_is_pushed() {
        let env = Environment::new();
        let mut runner = Recorder {
            calls: Vec::new(),
            answer: |_| Ok(42),
        };
        let mut stack = stack_of(&["prog"]);
        execute(&mut stack, &env, &mut runner).unwrap();
        assert_eq!(stack.cells(), &["42"]);
    }

    #[test]
    fn test_launch_failure_consumes_arguments() {
        let env = Environment::new();
        let mut runner = Recorder {
            calls: Vec::new(),
            answer: |argv| {
                Err(Error::Launch {
                    program: argv[0].clone(),
                    reason: "command not found".to_string(),
                })
            },
        };
        let mut stack = stack_of(&["a", "b", "nope"]);
        assert!(matches!(
            execute(&mut stack, &env, &mut runner),
            Err(Error::Launch { .. })
        ));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_execute_on_empty_stack() {
        let env = Environment::new();
        let mut runner = Recorder {
            calls: Vec::new(),
            answer: |_| Ok(0),
        };
        let mut stack = Stack::default();
        assert!(matches!(
            execute(&mut stack, &env, &mut runner),
            Err(Error::Underflow)
        ));
        assert!(runner.calls.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_real_exit_status() {
        let env = Environment::new();
        let mut stack = stack_of(&["exit 3", "-c", "sh"]);
        execute(&mut stack, &env, &mut ExternalRunner).unwrap();
        assert_eq!(stack.cells(), &["3"]);

        stack.clear_all();
        stack.push("true").unwrap();
        execute(&mut stack, &env, &mut ExternalRunner).unwrap();
        assert_eq!(stack.cells(), &["0"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_child_sees_environment_store() {
        let mut env = Environment::new();
        env.set_var("STACK_SHELL_MARKER", "7");
        env.remove_var("HOME");
        let argv: Vec<String> = ["sh", "-c", "[ \"$STACK_SHELL_MARKER\" = 7 ] && [ -z \"$HOME\" ]"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(ExternalRunner.run(&argv, &env).unwrap(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn test_signal_is_process_error() {
        let env = Environment::new();
        let argv: Vec<String> = ["sh", "-c", "kill -9 $$"].iter().map(|s| s.to_string()).collect();
        match ExternalRunner.run(&argv, &env) {
            Err(Error::Process { program, status }) => {
                assert_eq!(program, "sh");
                assert!(status.contains("signal 9"), "unexpected status {}", status);
            }
            other => panic!("expected process error, got {:?}", other),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_relative_program_uses_environment_dir() {
        let mut env = Environment::new();
        env.current_dir = PathBuf::from("/bin");
        let argv: Vec<String> = ["./sh", "-c", "exit 5"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ExternalRunner.run(&argv, &env).unwrap(), 5);
    }

    #[test]
    fn test_unknown_program_is_launch_error() {
        let env = Environment::new();
        let argv = vec!["definitely-not-a-program-4711".to_string()];
        assert!(matches!(
            ExternalRunner.run(&argv, &env),
            Err(Error::Launch { .. })
        ));
    }

    #[test]
    fn test_empty_path_variable_finds_nothing() {
        let env = Environment {
            vars: HashMap::new(),
            opaque: Vec::new(),
            current_dir: std::env::current_dir().unwrap(),
        };
        let argv = vec!["sh".to_string()];
        assert!(matches!(
            ExternalRunner.run(&argv, &env),
            Err(Error::Launch { .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_absolute() {
        let found = resolve_program(OsStr::new("/nowhere"), Path::new("/tmp"), "/bin/sh");
        assert_eq!(found.as_deref(), Some(Path::new("/bin/sh")));
        assert!(resolve_program(OsStr::new("/bin"), Path::new("/"), "/bin/nonexisting").is_none());
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_bare_name_in_search_path() {
        let found = resolve_program(OsStr::new("/nowhere:/bin"), Path::new("/tmp"), "sh");
        assert_eq!(found.as_deref(), Some(Path::new("/bin/sh")));
        assert!(resolve_program(OsStr::new("/bin"), Path::new("/"), "nonexisting").is_none());
        // a bare name never falls back to the working directory
        assert!(resolve_program(OsStr::new("/nowhere"), Path::new("/bin"), "sh").is_none());
        assert!(resolve_program(OsStr::new(":/nowhere:"), Path::new("/bin"), "sh").is_none());
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_paths_against_working_directory() {
        let found = resolve_program(OsStr::new(""), Path::new("/bin"), "./sh");
        assert_eq!(found.as_deref(), Some(Path::new("/bin/sh")));
        let found = resolve_program(OsStr::new(""), Path::new("/"), "bin/sh");
        assert_eq!(found.as_deref(), Some(Path::new("/bin/sh")));
        let found = resolve_program(OsStr::new("bin"), Path::new("/"), "sh");
        assert_eq!(found.as_deref(), Some(Path::new("/bin/sh")));
        // directories are not programs
        assert!(resolve_program(OsStr::new(""), Path::new("/"), "./bin").is_none());
    }

    #[test]
    fn test_resolve_empty_is_none() {
        assert!(resolve_program(OsStr::new("/bin"), Path::new("/"), "").is_none());
    }
}
