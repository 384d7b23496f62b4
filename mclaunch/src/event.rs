//! Events emitted while installing a version, used by frontends to report progress.

use std::path::Path;

use crate::http::FetchError;


/// Events happening when installing.
#[derive(Debug)]
#[non_exhaustive]
pub enum Event<'a> {
    /// The version manifest has been loaded, `cached` is true if it was read from the
    /// cache file because the remote one could not be fetched.
    LoadedManifest { latest_release: Option<&'a str>, cached: bool },
    /// The version manifest can't be fetched and no cached copy exists.
    ManifestUnavailable,
    /// The given version will be loaded.
    LoadVersion { version: &'a str },
    /// The version descriptor has been loaded, `cached` is true if it was read from the
    /// version directory instead of being fetched.
    LoadedVersion { version: &'a str, file: &'a Path, cached: bool },
    /// The version JAR file is present at the given path.
    LoadedClient { file: &'a Path },
    /// No logger configuration will be loaded because version doesn't specify any.
    NoLogger,
    /// Logger configuration is present at the given path.
    LoadedLogger { id: &'a str, file: &'a Path },
    /// Libraries will be checked and fetched if missing.
    LoadLibraries { count: usize },
    /// A single library is being fetched, the index starts at 1.
    FetchLibrary { index: usize, total: usize, file: &'a Path },
    /// All libraries have been checked.
    LoadedLibraries { fetched: usize, skipped: usize, failed: usize },
    /// Assets will not be loaded because version doesn't specify any index.
    NoAssets,
    /// The asset index has been loaded, its objects will be checked.
    LoadAssets { id: &'a str, count: usize },
    /// A single asset object is being fetched, the index starts at 1.
    FetchAsset { index: usize, total: usize, hash: &'a str },
    /// All asset objects have been checked.
    LoadedAssets { id: &'a str, fetched: usize, skipped: usize, failed: usize },
    /// A resource could not be fetched, an empty file has been left in place.
    FetchFailed { url: &'a str, file: &'a Path, error: &'a FetchError },
    /// The OpenAL configuration file has been created because it was missing.
    CreatedOpenAlConfig { file: &'a Path },
}

/// A handle for watching an installation.
pub trait Handler {
    /// Handle a single event.
    fn on_event(&mut self, event: Event);
}

// Mutable implementation.
impl<H: Handler + ?Sized> Handler for &mut H {
    #[inline]
    fn on_event(&mut self, event: Event) {
        (**self).on_event(event)
    }
}

impl Handler for () {
    fn on_event(&mut self, event: Event) {
        let _ = event;
    }
}
