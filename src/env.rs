use crate::error::Result;
use crate::stack::Stack;
use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Value pushed for an unset variable; storing it unsets the variable.
pub const UNSET: &str = "()";

/// Variables and working directory seen by the interpreter and by every
/// program it launches.
///
/// The map is the only store: lookups do not fall back to the process
/// environment, so an unset variable stays unset for launched programs too.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// Inherited variables whose name or value is not valid Unicode. Words
    /// can't read them, but launched programs still get them.
    pub opaque: Vec<(OsString, OsString)>,
    /// The working directory for launched programs.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process environment.
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        let mut opaque = Vec::new();
        for (k, v) in stdenv::vars_os() {
            match (k.into_string(), v.into_string()) {
                (Ok(k), Ok(v)) => {
                    vars.insert(k, v);
                }
                (k, v) => {
                    let k = k.map_or_else(|k| k, OsString::from);
                    let v = v.map_or_else(|v| v, OsString::from);
                    log::debug!("passing through non-Unicode variable {:?}", k);
                    opaque.push((k, v));
                }
            }
        }
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            opaque,
            current_dir,
        }
    }

    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        let key = key.into();
        self.forget_opaque(&key);
        self.vars.insert(key, val.into());
    }

    pub fn remove_var(&mut self, key: &str) {
        self.forget_opaque(key);
        self.vars.remove(key);
    }

    /// Every variable a launched program receives.
    pub fn child_vars(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars
            .iter()
            .map(|(k, v)| (OsStr::new(k), OsStr::new(v)))
            .chain(self.opaque.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str())))
    }

    fn forget_opaque(&mut self, key: &str) {
        self.opaque.retain(|(k, _)| k.as_os_str() != OsStr::new(key));
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Pop a name and push its value, or [`UNSET`] if there is none.
pub fn get_variable(stack: &mut Stack, env: &Environment) -> Result<()> {
    let name = stack.pop()?;
    let value = env.get_var(&name).unwrap_or_else(|| UNSET.to_string());
    log::debug!("get {} -> {}", name, value);
    stack.push(value)
}

/// Pop a name, then a value, and bind them. Storing [`UNSET`] removes the
/// binding. A name popped before a failing second pop is not put back.
pub fn set_variable(stack: &mut Stack, env: &mut Environment) -> Result<()> {
    let name = stack.pop()?;
    let value = stack.pop()?;
    if value == UNSET {
        log::debug!("unset {}", name);
        env.remove_var(&name);
    } else {
        log::debug!("set {}={}", name, value);
        env.set_var(name, value);
    }
    Ok(())
}
