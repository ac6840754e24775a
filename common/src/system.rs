use std::fmt;

/// One running process, as seen by a [`ProcessSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDescriptor {
    pub pid: u32,
    pub name: String,
    pub command: String,
}

impl ProcessDescriptor {
    pub fn new(pid: u32, name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            command: command.into(),
        }
    }
}

/// Renders the descriptor as a single listing line, the text keyword rules run against.
impl fmt::Display for ProcessDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.command.is_empty() {
            write!(f, "{} {}", self.pid, self.name)
        } else {
            write!(f, "{} {} {}", self.pid, self.name, self.command)
        }
    }
}

/// Defines the contract for listing running processes.
pub trait ProcessSource {
    fn list(&self) -> anyhow::Result<Vec<ProcessDescriptor>>;
}
