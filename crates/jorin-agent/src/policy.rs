use std::path::{Path, PathBuf};

/// Execution rules gating every tool call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Policy {
    /// Blocks mutating tools such as `write_file`.
    pub readonly: bool,
    /// Reports shell commands instead of running them.
    pub dry_run: bool,
    pub allow: Vec<String>,
    pub deny: Vec<String>,
    pub working_directory: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandVerdict {
    Allowed,
    Denied,
    NotAllowed,
}

impl Policy {
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn allow(mut self, substring: impl Into<String>) -> Self {
        self.allow.push(substring.into());
        self
    }

    pub fn deny(mut self, substring: impl Into<String>) -> Self {
        self.deny.push(substring.into());
        self
    }

    pub fn working_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(directory.into());
        self
    }

    /// Deny substrings win over allow substrings. An empty allow list allows everything.
    pub fn check_command(&self, command: &str) -> CommandVerdict {
        if self
            .deny
            .iter()
            .any(|pattern| !pattern.is_empty() && command.contains(pattern.as_str()))
        {
            return CommandVerdict::Denied;
        }
        if !self.allow.is_empty()
            && !self
                .allow
                .iter()
                .any(|pattern| command.contains(pattern.as_str()))
        {
            return CommandVerdict::NotAllowed;
        }
        CommandVerdict::Allowed
    }

    /// Resolves a tool-supplied path against the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        match &self.working_directory {
            Some(base) if candidate.is_relative() => base.join(candidate),
            _ => candidate.to_path_buf(),
        }
    }
}
