//! Class path construction from the acquired library files.

use std::path::Path;

use crate::path::PathExt;
use crate::platform::Platform;


/// Join the given class path entries and the version JAR with the platform separator,
/// the JAR always comes last and there is no trailing separator. Backslashes are
/// normalized to forward slashes.
pub fn join_classpath<I, P>(entries: I, jar: &Path, platform: Platform) -> String
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{

    let sep = platform.classpath_separator();
    let mut buf = String::new();

    for entry in entries {
        buf.push_str(&entry.as_ref().to_forward_slashes());
        buf.push(sep);
    }

    buf.push_str(&jar.to_forward_slashes());
    buf

}

/// Build the class path from the library files that exist on disk, libraries that have
/// not been acquired are excluded.
pub fn build_classpath<I, P>(files: I, jar: &Path, platform: Platform) -> String
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    join_classpath(files.into_iter().filter(|file| file.as_ref().is_file()), jar, platform)
}
