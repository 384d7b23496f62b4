//! Command line synthesis and launching of the game process.

use std::process::{Command, ExitStatus, Stdio};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::fmt::Write as _;
use std::env;

use crate::acquire::Logger;
use crate::platform::Platform;
use crate::template::substitute;


/// Description of all installed resources needed for running an installed game version.
#[derive(Debug, Clone)]
pub struct Game {
    /// Path to the JVM executable file, or just its name to be resolved from the PATH.
    pub java_file: PathBuf,
    /// Working directory where the JVM process should be running.
    pub work_dir: PathBuf,
    /// The main class that contains the JVM entrypoint.
    pub main_class: String,
    /// List of JVM arguments (before the main class in the command line).
    pub jvm_args: Vec<String>,
    /// List of game arguments (after the main class in the command line).
    pub game_args: Vec<String>,
}

/// How the game process is waited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// The standard output is piped and streamed line by line to the caller while
    /// being captured, the standard error is inherited.
    Stream,
    /// Both outputs are inherited and the launcher only waits for the process.
    Wait,
}

/// A terminated game process.
#[derive(Debug)]
pub struct Launched {
    pub status: ExitStatus,
    /// The captured standard output, always empty in [`LaunchMode::Wait`].
    pub output: String,
}

impl Game {

    /// Create a command to launch the process, this command can be modified if you wish.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.java_file);
        command
            .current_dir(&self.work_dir)
            .args(&self.jvm_args)
            .arg(&self.main_class)
            .args(&self.game_args);
        command
    }

    /// Render the full command line, arguments containing whitespace are quoted. This
    /// is only intended for display.
    pub fn command_line(&self) -> String {

        let mut buf = String::new();
        push_quoted(&mut buf, &self.java_file.to_string_lossy());
        for arg in self.jvm_args.iter().chain([&self.main_class]).chain(&self.game_args) {
            buf.push(' ');
            push_quoted(&mut buf, arg);
        }

        buf

    }

    /// Spawn the process and block until it terminates. In [`LaunchMode::Stream`], each
    /// line written by the game on its standard output is given to the callback.
    pub fn launch<F>(&self, mode: LaunchMode, mut on_line: F) -> io::Result<Launched>
    where
        F: FnMut(&str),
    {

        let mut command = self.command();

        log::debug!("launch: {}", self.command_line());

        if mode == LaunchMode::Wait {
            let status = command.spawn()?.wait()?;
            return Ok(Launched { status, output: String::new() });
        }

        command.stdout(Stdio::piped());
        command.stderr(Stdio::inherit());

        let mut child = command.spawn()?;
        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(io::Error::other("missing child stdout"));
        };

        let mut output = String::new();
        if let Err(e) = stream_lines(stdout, &mut output, &mut on_line) {
            // The child must not be left running unreaped.
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }

        let status = child.wait()?;
        Ok(Launched { status, output })

    }

}

/// Read raw lines because the output is not guaranteed to be UTF-8, each line is
/// given to the callback and appended to the output.
fn stream_lines<R, F>(reader: R, output: &mut String, mut on_line: F) -> io::Result<()>
where
    R: io::Read,
    F: FnMut(&str),
{

    let mut pipe = BufReader::new(reader);
    let mut buffer = Vec::new();

    while pipe.read_until(b'\n', &mut buffer)? != 0 {
        let line = String::from_utf8_lossy(&buffer);
        on_line(line.trim_end_matches(['\r', '\n']));
        output.push_str(&line);
        buffer.clear();
    }

    Ok(())

}

fn push_quoted(buf: &mut String, arg: &str) {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        let _ = write!(buf, "\"{arg}\"");
    } else {
        buf.push_str(arg);
    }
}

/// Options for building the JVM arguments.
#[derive(Debug, Clone)]
pub struct JvmOptions<'a> {
    pub natives_dir: &'a Path,
    pub launcher_name: &'a str,
    pub launcher_version: &'a str,
    pub logger: Option<&'a Logger>,
    /// Maximum heap size, such as "2G".
    pub memory: &'a str,
    pub classpath: String,
}

/// Build the JVM arguments, in order: stack size, natives path, launcher identity,
/// logger configuration, heap size, garbage collector tuning and the class path.
pub fn jvm_args(opts: JvmOptions<'_>) -> Vec<String> {

    let mut args = vec![
        "-Xss1M".to_string(),
        format!("-Djava.library.path={}", opts.natives_dir.display()),
        format!("-Dminecraft.launcher.brand={}", opts.launcher_name),
        format!("-Dminecraft.launcher.version={}", opts.launcher_version),
    ];

    if let Some(logger) = opts.logger {
        args.push(substitute(&logger.argument, "path", &logger.file.to_string_lossy()));
    }

    args.push(format!("-Xmx{}", opts.memory));
    args.extend([
        "-XX:+UnlockExperimentalVMOptions",
        "-XX:+UseG1GC",
        "-XX:G1NewSizePercent=20",
        "-XX:G1ReservePercent=20",
        "-XX:MaxGCPauseMillis=50",
        "-XX:G1HeapRegionSize=32M",
        "-cp",
    ].map(str::to_string));
    args.push(opts.classpath);

    args

}

/// Search for the JVM executable, in `JAVA_HOME/bin` and then in every directory of the
/// PATH. The returned path is canonicalized.
pub fn find_java(platform: Platform) -> Option<PathBuf> {

    let exec_name = platform.java_exec_name();

    let java_home = env::var_os("JAVA_HOME")
        .map(|home| PathBuf::from(home).join("bin"));

    let path_dirs = env::var_os("PATH")
        .map(|path| env::split_paths(&path).collect::<Vec<_>>())
        .unwrap_or_default();

    java_home.into_iter()
        .chain(path_dirs)
        .map(|dir| dir.join(exec_name))
        .find(|file| file.is_file())
        .map(|file| dunce::canonicalize(&file).unwrap_or(file))

}
