//! Process environment snapshots.

use std::collections::HashMap;

/// A read-only copy of a process environment.
///
/// # Example
///
/// ```
/// use loginenv::environment::ProcessEnvironment;
///
/// let env = ProcessEnvironment::from_pairs([("SHELL", "/bin/zsh")]);
/// assert_eq!(env.get("SHELL"), Some("/bin/zsh"));
/// assert_eq!(env.get("HOME"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessEnvironment {
    vars: HashMap<String, String>,
}

impl ProcessEnvironment {
    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build a snapshot from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Look up a variable, treating an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// All variables.
    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }
}

impl From<HashMap<String, String>> for ProcessEnvironment {
    fn from(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}
