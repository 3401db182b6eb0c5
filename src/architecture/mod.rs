//! Target architectures for multi-platform builds
//!
//! Only an image built for the host's own CPU can be loaded into the local
//! docker image store, so every architecture knows how to compare itself
//! against the machine running the tool.

use std::fmt;

use crate::constants::platform;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    LinuxArm64,
    LinuxAmd64,
}

impl Architecture {
    /// Every supported architecture, in build order
    pub const ALL: [Architecture; 2] = [Architecture::LinuxArm64, Architecture::LinuxAmd64];

    /// Platform string passed to `--platform`
    pub fn platform(&self) -> &'static str {
        match self {
            Architecture::LinuxArm64 => platform::LINUX_ARM64,
            Architecture::LinuxAmd64 => platform::LINUX_AMD64,
        }
    }

    /// CPU half of the platform string (`arm64`, `amd64`)
    pub fn cpu(&self) -> &'static str {
        let platform = self.platform();
        platform
            .split_once('/')
            .map(|(_, cpu)| cpu)
            .unwrap_or(platform)
    }

    /// Names the kernel reports for this CPU besides the docker one
    fn machine_aliases(&self) -> &'static [&'static str] {
        match self {
            Architecture::LinuxArm64 => &["aarch64"],
            Architecture::LinuxAmd64 => &["x86_64"],
        }
    }

    /// Whether `machine` (as reported by `uname -m`) is this architecture's CPU
    pub fn matches_machine(&self, machine: &str) -> bool {
        machine == self.cpu() || self.machine_aliases().contains(&machine)
    }

    pub fn is_current_architecture(&self) -> bool {
        self.matches_machine(host_machine())
    }

    /// All architectures when `all` is set, otherwise only those runnable on `machine`
    pub fn selected(all: bool, machine: &str) -> Vec<Architecture> {
        Self::ALL
            .into_iter()
            .filter(|arch| all || arch.matches_machine(machine))
            .collect()
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.platform())
    }
}

/// Machine identifier of the running host
pub fn host_machine() -> &'static str {
    std::env::consts::ARCH
}
