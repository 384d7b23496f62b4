//! Path utilities used for deriving the launcher layout.

use std::path::{Component, Path, PathBuf};
use std::ffi::OsStr;


/// Extension to the standard [`Path`].
pub trait PathExt {

    /// A shortcut method to join a file name with its extension to the current path.
    /// This shortcut avoids a temporary allocation of a formatted string when joining.
    fn join_with_extension<P: AsRef<Path>, S: AsRef<OsStr>>(&self, name: P, extension: S) -> PathBuf;

    /// Render this path as a string where every backslash is a forward slash, this is
    /// the form used in class paths.
    fn to_forward_slashes(&self) -> String;

    /// Return true if this path is relative and only made of normal components, so it
    /// always stays under the directory it is joined to.
    fn is_confined(&self) -> bool;

    /// Return true if this path is a single normal component.
    fn is_file_name(&self) -> bool;

}

impl PathExt for Path {

    #[inline]
    fn join_with_extension<P: AsRef<Path>, S: AsRef<OsStr>>(&self, name: P, extension: S) -> PathBuf {
        self.join(name).appended(".").appended(extension)
    }

    fn to_forward_slashes(&self) -> String {
        self.to_string_lossy().replace('\\', "/")
    }

    fn is_confined(&self) -> bool {
        let mut components = self.components().peekable();
        components.peek().is_some()
            && components.all(|component| matches!(component, Component::Normal(_)))
    }

    fn is_file_name(&self) -> bool {
        let mut components = self.components();
        matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
    }

}


/// Extension to the standard [`PathBuf`], mainly to ease joining and raw appending
/// without reallocating on each join.
pub trait PathBufExt {

    /// Return this path joined with another one, this is different from [`Path::join`]
    /// in that is doesn't reallocate a new path on each join.
    fn joined<P: AsRef<Path>>(self, path: P) -> Self;

    /// Return this path appended with another string, this doesn't add any path separator.
    fn appended<S: AsRef<OsStr>>(self, s: S) -> Self;

}

impl PathBufExt for PathBuf {

    #[inline]
    fn joined<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.push(path);
        self
    }

    #[inline]
    fn appended<S: AsRef<OsStr>>(mut self, s: S) -> Self {
        self.as_mut_os_string().push(s);
        self
    }

}
