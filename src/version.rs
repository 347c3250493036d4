//! Build information embedded by `build.rs`.

use std::fmt;

/// Compile-time facts about this binary
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Short git revision, or "unknown" outside a checkout
    pub git_hash: &'static str,
    git_dirty: &'static str,
    pub build_timestamp: &'static str,
    pub target: &'static str,
    /// "debug" or "release"
    pub profile: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            git_hash: env!("SURGE_GIT_HASH"),
            git_dirty: env!("SURGE_GIT_DIRTY"),
            build_timestamp: env!("SURGE_BUILD_TIMESTAMP"),
            target: env!("SURGE_TARGET"),
            profile: env!("SURGE_PROFILE"),
        }
    }

    pub fn git_dirty(&self) -> bool {
        self.git_dirty == "true"
    }

    /// Version plus revision, e.g. `0.1.0-1a2b3c4d` or `0.1.0-1a2b3c4d-dirty`
    pub fn full_version(&self) -> String {
        let dirty = if self.git_dirty() { "-dirty" } else { "" };
        format!("{}-{}{}", self.version, self.git_hash, dirty)
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.name, self.full_version())?;
        writeln!(f)?;
        writeln!(f, "  Version:  {}", self.version)?;
        writeln!(f, "  Git:      {}", self.git_hash)?;
        writeln!(f, "  Built:    {}", self.build_timestamp)?;
        writeln!(f, "  Target:   {}", self.target)?;
        writeln!(f, "  Profile:  {}", self.profile)
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::current()
}

/// Print version information to stdout
pub fn print_version() {
    print!("{}", build_info());
}
