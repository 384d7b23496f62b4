//! Resolution of the version manifest and of version descriptors.

pub mod serde;

use std::path::Path;

use crate::event::{Event, Handler};
use crate::http::Fetch;
use crate::store;

pub use self::serde::{VersionManifest, VersionManifestVersion, VersionDescriptor};


/// The default URL of the Mojang version manifest.
pub const VERSION_MANIFEST_URL: &str = "https://launchermeta.mojang.com/mc/game/version_manifest.json";

/// A parsed document with the raw bytes it has been parsed from, the raw bytes are
/// the ones persisted as cache so no field is lost.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub raw: Vec<u8>,
}

/// The reason why a version could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// The version id is not listed in the manifest.
    NotListed,
    /// The version is listed but its descriptor can't be fetched or parsed.
    Unavailable,
}

/// Fetch the version manifest from the given URL. When successfully fetched, the raw
/// manifest is persisted to the cache file before being used; when the fetch fails the
/// cache file is read instead. None is returned if neither is available.
pub fn resolve_manifest(
    mut fetch: impl Fetch,
    mut handler: impl Handler,
    url: &str,
    cache_file: &Path,
) -> Option<VersionManifest> {

    match fetch.fetch(url) {
        Ok(raw) => {
            match store::parse_json::<VersionManifest>(&raw) {
                Ok(manifest) => {

                    if store::ensure_parent_dir(cache_file) {
                        store::write_file(cache_file, &raw);
                    }

                    handler.on_event(Event::LoadedManifest {
                        latest_release: manifest.latest.release.as_deref(),
                        cached: false,
                    });

                    return Some(manifest);

                }
                Err(e) => log::warn!("parse manifest: {url}: {e}"),
            }
        }
        Err(e) => log::warn!("fetch manifest: {url}: {e}"),
    }

    match store::read_json::<VersionManifest>(cache_file) {
        Ok(manifest) => {
            log::debug!("manifest read from cache: {}", cache_file.display());
            handler.on_event(Event::LoadedManifest {
                latest_release: manifest.latest.release.as_deref(),
                cached: true,
            });
            Some(manifest)
        }
        Err(e) => {
            if let store::ReadJsonError::Json(e) = e {
                log::warn!("parse cached manifest: {}: {e}", cache_file.display());
            }
            handler.on_event(Event::ManifestUnavailable);
            None
        }
    }

}

/// Find the first version in the manifest with the given id, in manifest order.
pub fn find_version<'a>(manifest: &'a VersionManifest, id: &str) -> Option<&'a VersionManifestVersion> {
    manifest.versions.iter().find(|version| version.id == id)
}

/// Resolve the descriptor of the given version, by scanning the manifest for the first
/// matching id and then fetching its descriptor.
pub fn resolve_version(
    mut fetch: impl Fetch,
    manifest: &VersionManifest,
    id: &str,
) -> Result<Fetched<VersionDescriptor>, Unresolved> {

    let Some(version) = find_version(manifest, id) else {
        log::warn!("version not listed in manifest: {id}");
        return Err(Unresolved::NotListed);
    };

    let raw = match fetch.fetch(&version.url) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("fetch version: {}: {e}", version.url);
            return Err(Unresolved::Unavailable);
        }
    };

    match store::parse_json::<VersionDescriptor>(&raw) {
        Ok(value) => Ok(Fetched { value, raw }),
        Err(e) => {
            log::warn!("parse version: {}: {e}", version.url);
            Err(Unresolved::Unavailable)
        }
    }

}
