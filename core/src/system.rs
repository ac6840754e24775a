use anyhow::bail;
use selfcheck_common::system::{ProcessDescriptor, ProcessSource};
use sysinfo::{PidExt, ProcessExt, System, SystemExt};

/// Lists running processes through `sysinfo`.
pub struct SysinfoProcesses;

impl ProcessSource for SysinfoProcesses {
    fn list(&self) -> anyhow::Result<Vec<ProcessDescriptor>> {
        if !System::IS_SUPPORTED {
            bail!("process listing is not supported on this platform");
        }

        let mut system = System::new();
        system.refresh_processes();

        let mut processes: Vec<ProcessDescriptor> = system
            .processes()
            .iter()
            .map(|(pid, process)| {
                ProcessDescriptor::new(pid.as_u32(), process.name(), process.cmd().join(" "))
            })
            .collect();

        processes.sort_by_key(|p| p.pid);
        Ok(processes)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
