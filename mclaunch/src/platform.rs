//! Operating system abstraction, the platform is an explicit value given to every part
//! of the pipeline that depends on it, rather than a compile-time constant.

use std::str::FromStr;
use std::{env, fmt};

use crate::launch::LaunchMode;


/// An operating system as named by the rules of version descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    Osx,
    FreeBsd,
    OpenBsd,
    NetBsd,
}

impl Platform {

    /// All known platforms.
    pub const ALL: [Platform; 6] = [
        Self::Windows,
        Self::Linux,
        Self::Osx,
        Self::FreeBsd,
        Self::OpenBsd,
        Self::NetBsd,
    ];

    /// Return the platform the binary has been compiled for, defaulting to Linux for
    /// unknown operating systems.
    pub fn current() -> Self {
        match env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::Osx,
            "freebsd" => Self::FreeBsd,
            "openbsd" => Self::OpenBsd,
            "netbsd" => Self::NetBsd,
            _ => Self::Linux,
        }
    }

    /// The name of this platform in descriptor rules (`os.name`).
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Osx => "osx",
            Self::FreeBsd => "freebsd",
            Self::OpenBsd => "openbsd",
            Self::NetBsd => "netbsd",
        }
    }

    /// The separator between class path entries.
    #[inline]
    pub fn classpath_separator(self) -> char {
        match self {
            Self::Windows => ';',
            _ => ':',
        }
    }

    /// The JVM executable name, resolved through the PATH when no full path is known.
    #[inline]
    pub fn java_exec_name(self) -> &'static str {
        match self {
            Self::Windows => "javaw.exe",
            _ => "java",
        }
    }

    /// The default launch mode: Windows blocks on the child without streaming, other
    /// platforms stream the child's output line by line.
    #[inline]
    pub fn default_launch_mode(self) -> LaunchMode {
        match self {
            Self::Windows => LaunchMode::Wait,
            _ => LaunchMode::Stream,
        }
    }

}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {

    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
            .find(|platform| platform.name() == s)
            .ok_or(())
    }

}
