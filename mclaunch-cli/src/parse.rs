//! Implementation of the command line parser, using clap struct derivation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use mclaunch::acquire::RulePolicy;
use mclaunch::{LaunchMode, Platform};


// ================= //
//    MAIN COMMAND   //
// ================= //

/// Command line utility for installing and launching Minecraft versions listed in the
/// Mojang version manifest.
#[derive(Debug, Parser)]
#[command(name = "mclaunch", version, disable_help_subcommand = true, max_term_width = 140)]
pub struct CliArgs {
    #[command(subcommand)]
    pub cmd: CliCmd,
    /// Enable verbose output, the more -v argument you put, the more verbose the
    /// launcher will be. This also raises the level of the diagnostic logs written on
    /// stderr, unless RUST_LOG is set.
    #[arg(short, env = "MCL_VERBOSE", action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Change the default output format of the launcher.
    #[arg(long, env = "MCL_OUTPUT", default_value = "human")]
    pub output: CliOutput,
    /// Set the directory where the version manifest cache, versions, assets and game
    /// profiles are stored.
    ///
    /// If left unspecified, this argument defaults to the directory of the launcher's
    /// executable. If the launcher fails to find this directory then it will abort any
    /// command with a failure telling you to specify it.
    #[arg(long, env = "MCL_MAIN_DIR", value_name = "PATH")]
    pub main_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum CliCmd {
    Start(StartArgs),
    Search(SearchArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliOutput {
    /// Human readable output, it depends on the actual command being used and is not
    /// guaranteed to be stable across releases, for that you should prefer using
    /// 'machine' output. With this format, the verbosity is used to show more
    /// informative data.
    Human,
    /// Machine output mode to allow parsing by other programs, using tab ('\t', 0x09)
    /// separated values where the first value defines which kind of data to follow on
    /// the line, a line return ('\n', 0x0A) is used to split every line. If any line
    /// return or tab is encoded into a value within the line, it is escaped with the
    /// two characters '\n' (for line return) or '\t' (for tab). If the launcher exit
    /// with a failure code, you should expect finding a log message prefixed with
    /// `error_`, describing the error causing the exit.
    Machine,
}

// ================= //
//   START COMMAND   //
// ================= //

/// Start the game.
///
/// This command resolves the version from the version manifest, installs its client,
/// libraries and assets if missing, and then launches it.
#[derive(Debug, Args)]
pub struct StartArgs {
    /// The version to launch, 'release' (default if absent) or 'snapshot' to launch the
    /// latest version of that type, or any version id listed in the version manifest
    /// (you can search for them using the 'mclaunch search' command).
    pub version: Option<String>,
    /// The player name given to the game.
    #[arg(short, long, env = "MCL_USERNAME", default_value = "Player")]
    pub username: String,
    /// Path to the JVM executable to launch the game with.
    ///
    /// When unspecified, the JVM is searched in 'JAVA_HOME/bin' and then in the PATH,
    /// falling back to 'java' ('javaw.exe' on Windows) resolved when launching.
    #[arg(long, env = "MCL_JAVA", value_name = "PATH")]
    pub java: Option<PathBuf>,
    /// The maximum heap size of the JVM, such as '2G' or '512M'.
    #[arg(long, default_value = "2G")]
    pub memory: String,
    /// The platform used to evaluate library rules and build the class path, defaults
    /// to the current platform.
    #[arg(long)]
    pub platform: Option<StartPlatform>,
    /// Evaluate all the rules of libraries in order, the last matching rule deciding
    /// if the library is allowed. By default, only the operating system of the first
    /// rule is checked.
    #[arg(long)]
    pub ordered_rules: bool,
    /// How the game process is waited, 'wait' on Windows and 'stream' on other
    /// platforms by default.
    #[arg(long)]
    pub launch_mode: Option<StartLaunchMode>,
    /// Only ensures that the game is installed, the command line is printed but the
    /// game is not launched.
    #[arg(long)]
    pub dry: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StartPlatform {
    Windows,
    Linux,
    Osx,
    Freebsd,
    Openbsd,
    Netbsd,
}

impl From<StartPlatform> for Platform {
    fn from(value: StartPlatform) -> Self {
        match value {
            StartPlatform::Windows => Platform::Windows,
            StartPlatform::Linux => Platform::Linux,
            StartPlatform::Osx => Platform::Osx,
            StartPlatform::Freebsd => Platform::FreeBsd,
            StartPlatform::Openbsd => Platform::OpenBsd,
            StartPlatform::Netbsd => Platform::NetBsd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StartLaunchMode {
    /// The game's output is streamed line by line through the launcher.
    Stream,
    /// The game inherits the launcher's output and the launcher only waits.
    Wait,
}

impl From<StartLaunchMode> for LaunchMode {
    fn from(value: StartLaunchMode) -> Self {
        match value {
            StartLaunchMode::Stream => LaunchMode::Stream,
            StartLaunchMode::Wait => LaunchMode::Wait,
        }
    }
}

impl StartArgs {

    /// The rule policy selected by the arguments.
    pub fn rule_policy(&self) -> RulePolicy {
        if self.ordered_rules {
            RulePolicy::Ordered
        } else {
            RulePolicy::FirstRule
        }
    }

}

// ================= //
//  SEARCH COMMAND   //
// ================= //

/// Search for versions in the version manifest.
///
/// The manifest is fetched and cached in the main directory, the cached copy is used
/// if the manifest can't be fetched.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Only show versions whose id contains this string.
    pub filter: Option<String>,
    /// Only show versions of the given type, such as 'release' or 'snapshot'.
    #[arg(long = "type", value_name = "TYPE")]
    pub r#type: Option<String>,
}


#[cfg(test)]
mod tests {

    use clap::{CommandFactory, Parser};

    use super::{CliArgs, CliCmd, StartPlatform};

    #[test]
    fn verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parse_start() {

        let args = CliArgs::try_parse_from(["mclaunch", "-vv", "--main-dir", "/games", "start", "1.19.4", "-u", "alice", "--platform", "osx", "--dry"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.main_dir.as_deref(), Some(std::path::Path::new("/games")));

        let CliCmd::Start(start) = args.cmd else { panic!() };
        assert_eq!(start.version.as_deref(), Some("1.19.4"));
        assert_eq!(start.username, "alice");
        assert_eq!(start.platform, Some(StartPlatform::Osx));
        assert_eq!(start.memory, "2G");
        assert!(start.dry);
        assert!(!start.ordered_rules);

    }

}
