use anyhow::{Result, bail};
use std::collections::BTreeMap;
use crate::handler::{ls::Ls, mv::Mv, rm::Rm, zip::Zip};
use crate::pipes::Pipes;
use crate::util::{PipableCliUtil, invoke};

/// Parses a call into a fresh command object and executes it.
pub type Invoker = fn(&[String], &mut Pipes<'_>) -> Result<()>;

/// Name → invoker mapping. Built once at startup, read-only afterwards.
#[derive(Clone)]
pub struct Registry {
    utils: BTreeMap<&'static str, Invoker>,
}

impl Registry {
    pub fn empty() -> Self {
        Self { utils: BTreeMap::new() }
    }

    /// Registry holding every util this crate ships.
    pub fn new() -> Self {
        Self::empty()
            .register::<Rm>()
            .register::<Ls>()
            .register::<Mv>()
            .register::<Zip>()
    }

    pub fn register<U: PipableCliUtil>(mut self) -> Self {
        self.utils.insert(U::NAME, invoke::<U>);
        self
    }

    pub fn get(&self, name: &str) -> Option<Invoker> {
        self.utils.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.utils.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.utils.keys().copied()
    }

    /// Runs util `name`. `call` is its full argv, util name first.
    pub fn call(&self, name: &str, call: &[String], pipes: &mut Pipes<'_>) -> Result<()> {
        match self.get(name) {
            Some(invoker) => invoker(call, pipes),
            None => bail!("Unknown util: {}", name),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_registry_names() {
        let registry = Registry::new();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["ls", "mv", "rm", "zip"]);
        assert!(registry.contains("rm"));
        assert!(!registry.contains("cp"));
    }

    #[test]
    fn test_registry_unknown_util() {
        let registry = Registry::new();
        let mut inp = io::empty();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut pipes = Pipes::new(&mut inp, &mut out, &mut err);

        let res = registry.call("cp", &["cp".to_string()], &mut pipes);
        assert!(res.unwrap_err().to_string().contains("Unknown util"));
    }

    #[test]
    fn test_registry_call_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.txt"), "x").unwrap();

        let registry = Registry::new();
        let mut inp = io::empty();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut pipes = Pipes::new(&mut inp, &mut out, &mut err);
        let call = vec!["ls".to_string(), dir.path().display().to_string()];
        registry.call("ls", &call, &mut pipes).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "x.txt\n");
    }
}
