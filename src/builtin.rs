use crate::env::Environment;
use crate::error::{Error, Result};
use crate::stack::Stack;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Error code pushed when the OS does not report one.
const ENOENT: i32 = 2;

/// Status pushed by `.cd` when there is no path to pop.
const NO_PATH_STATUS: &str = "255";

/// `.cd`: pop a path and make it the working directory.
///
/// Relative paths are taken from the environment's current directory. The
/// outcome is always left on the stack: `"0"` on success, otherwise the OS
/// error code, and the error is returned for reporting.
pub fn change_dir(stack: &mut Stack, env: &mut Environment) -> Result<()> {
    let target = match stack.pop() {
        Ok(target) => target,
        Err(e) => {
            stack.push(NO_PATH_STATUS)?;
            return Err(e);
        }
    };

    let path = PathBuf::from(&target);
    let new_dir = if path.is_absolute() {
        path
    } else {
        env.current_dir.join(path)
    };

    let changed = fs::canonicalize(&new_dir).and_then(|canonical| {
        env::set_current_dir(&canonical)?;
        Ok(canonical)
    });
    match changed {
        Ok(canonical) => {
            log::debug!("cd {}", canonical.display());
            env.current_dir = canonical;
            stack.push("0")
        }
        Err(e) => {
            let code = e.raw_os_error().unwrap_or(ENOENT);
            stack.push(code.to_string())?;
            Err(Error::ChangeDir {
                path: target,
                reason: e.to_string(),
            })
        }
    }
}

/// Serializes tests that change the process working directory.
#[cfg(test)]
pub(crate) fn lock_current_dir() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
