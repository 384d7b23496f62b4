//! Acquisition of the files declared by a version descriptor: the client JAR, the
//! logger configuration, the libraries, the asset index and the asset objects.
//!
//! Every file is only fetched if missing from the disk, so running the acquisition on
//! a fully populated tree issues no request at all. A failed fetch never aborts a pass,
//! it is logged, reported with [`Event::FetchFailed`] and an empty file is left at the
//! file's path.

use std::path::{Path, PathBuf};

use crate::manifest::serde::{AssetIndex, Library, Rule, RuleAction, VersionDescriptor};
use crate::event::{Event, Handler};
use crate::path::{PathExt, PathBufExt};
use crate::http::Fetch;
use crate::platform::Platform;
use crate::store;


/// Base URL for downloading game's assets.
pub const RESOURCES_URL: &str = "https://resources.download.minecraft.net/";

/// The policy used to decide if a library with rules is allowed on a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RulePolicy {
    /// Only the first rule is consulted: the library is allowed if the first rule has
    /// no OS constraint or if its OS name is the platform's name. The rule's action is
    /// not considered.
    #[default]
    FirstRule,
    /// All rules are evaluated in order, starting from disallowed, and the action of
    /// the last matching rule wins. A rule requiring any feature never matches.
    Ordered,
}

/// Return true if the library should be installed on the given platform. A library
/// without rules is always allowed.
pub fn library_allowed(library: &Library, platform: Platform, policy: RulePolicy) -> bool {

    let rules = match library.rules.as_deref() {
        None | Some([]) => return true,
        Some(rules) => rules,
    };

    match policy {
        RulePolicy::FirstRule => rule_os_matches(&rules[0], platform),
        RulePolicy::Ordered => {
            let mut allowed = false;
            for rule in rules {
                if rule_os_matches(rule, platform) && !rule_requires_features(rule) {
                    allowed = rule.action == RuleAction::Allow;
                }
            }
            allowed
        }
    }

}

/// Architecture constraints are not evaluated.
fn rule_os_matches(rule: &Rule, platform: Platform) -> bool {
    match rule.os.name.as_deref() {
        Some(name) => name == platform.name(),
        None => true,
    }
}

#[inline]
fn rule_requires_features(rule: &Rule) -> bool {
    rule.features.values().any(|&enabled| enabled)
}

/// Return the local path of the library's artifact under the given directory, none if
/// the library has no artifact, if its path is the "null" sentinel or if it would
/// escape the directory.
pub fn library_file(libraries_dir: &Path, library: &Library) -> Option<PathBuf> {

    let path = library.downloads.artifact.as_ref()?.path.as_deref()?;
    if path.is_empty() || path == "null" || path.ends_with("/null") {
        return None;
    }

    if !Path::new(path).is_confined() {
        log::warn!("library path outside of libraries: {path}");
        return None;
    }

    Some(libraries_dir.join(path))

}

/// Return the content-addressed path of an asset object, `<objects>/<xx>/<hash>` where
/// `xx` is the first two characters of the hash. None if the hash is too short or is
/// not hexadecimal.
pub fn asset_object_file(objects_dir: &Path, hash: &str) -> Option<PathBuf> {
    let prefix = asset_object_prefix(hash)?;
    Some(objects_dir.join(prefix).joined(hash))
}

/// Return the URL of an asset object on the given resources origin.
pub fn asset_object_url(resources_url: &str, hash: &str) -> Option<String> {
    let prefix = asset_object_prefix(hash)?;
    Some(format!("{}/{prefix}/{hash}", resources_url.trim_end_matches('/')))
}

fn asset_object_prefix(hash: &str) -> Option<&str> {
    if !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    hash.get(..2)
}

/// The id of the asset index declared by the descriptor, falling back to the legacy
/// `assets` field.
pub fn asset_index_id(descriptor: &VersionDescriptor) -> Option<&str> {
    descriptor.asset_index.as_ref()
        .map(|index| index.id.as_str())
        .or(descriptor.assets.as_deref())
}

/// Counters of a single acquisition pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquireReport {
    /// Files that have been fetched successfully.
    pub fetched: usize,
    /// Files already present, or not required on this platform.
    pub skipped: usize,
    /// Files that could not be fetched.
    pub failed: usize,
}

/// The logger configuration of a version, once acquired.
#[derive(Debug, Clone)]
pub struct Logger {
    /// The JVM argument with a `${path}` placeholder.
    pub argument: String,
    pub file: PathBuf,
}

/// The acquisition engine, all requests are made sequentially through the fetcher.
pub struct Acquisition<'a> {
    fetch: &'a mut dyn Fetch,
    handler: &'a mut dyn Handler,
}

impl<'a> Acquisition<'a> {

    pub fn new(fetch: &'a mut dyn Fetch, handler: &'a mut dyn Handler) -> Self {
        Self { fetch, handler }
    }

    /// Ensure that the version JAR file exists, fetching it from the 'client' download
    /// if missing. False is returned if the file is missing and has no download.
    pub fn acquire_client(&mut self, descriptor: &VersionDescriptor, file: &Path) -> bool {

        if !file.is_file() {
            let Some(download) = descriptor.downloads.get("client") else {
                log::warn!("client not found: {}", file.display());
                return false;
            };
            self.fetch_file(&download.url, file);
        }

        self.handler.on_event(Event::LoadedClient { file });
        true

    }

    /// Ensure that the client logger configuration exists in the version directory, as
    /// `logging-<id>`. None is returned if the version has no logger.
    pub fn acquire_logger(&mut self, descriptor: &VersionDescriptor, version_dir: &Path) -> Option<Logger> {

        let Some(logging) = descriptor.logging.get("client") else {
            self.handler.on_event(Event::NoLogger);
            return None;
        };

        if !Path::new(&logging.file.id).is_file_name() {
            log::warn!("invalid logger id: {}", logging.file.id);
            self.handler.on_event(Event::NoLogger);
            return None;
        }

        let file = version_dir.join(format!("logging-{}", logging.file.id));
        if !file.is_file() {
            self.fetch_file(&logging.file.url, &file);
        }

        self.handler.on_event(Event::LoadedLogger { id: &logging.file.id, file: &file });

        Some(Logger {
            argument: logging.argument.clone(),
            file,
        })

    }

    /// Library pass: every allowed library missing from the disk is fetched.
    pub fn acquire_libraries(&mut self,
        libraries: &[Library],
        libraries_dir: &Path,
        platform: Platform,
        policy: RulePolicy,
    ) -> AcquireReport {

        let mut report = AcquireReport::default();
        let total = libraries.len();

        self.handler.on_event(Event::LoadLibraries { count: total });

        for (index, library) in libraries.iter().enumerate() {

            let Some(file) = library_file(libraries_dir, library) else {
                report.skipped += 1;
                continue;
            };

            if file.exists() || !library_allowed(library, platform, policy) {
                report.skipped += 1;
                continue;
            }

            let Some(url) = library.downloads.artifact.as_ref().and_then(|a| a.url.as_deref()) else {
                log::warn!("library has no url: {}", library.name.as_deref().unwrap_or("?"));
                report.failed += 1;
                continue;
            };

            self.handler.on_event(Event::FetchLibrary { index: index + 1, total, file: &file });

            if self.fetch_file(url, &file).is_some() {
                report.fetched += 1;
            } else {
                report.failed += 1;
            }

        }

        self.handler.on_event(Event::LoadedLibraries {
            fetched: report.fetched,
            skipped: report.skipped,
            failed: report.failed,
        });

        report

    }

    /// Load the asset index declared by the descriptor, from `<indexes>/<id>.json`,
    /// fetching it if missing. The raw index is kept on disk as fetched.
    pub fn acquire_asset_index(&mut self,
        descriptor: &VersionDescriptor,
        indexes_dir: &Path,
    ) -> Option<(String, AssetIndex)> {

        let Some(id) = asset_index_id(descriptor) else {
            self.handler.on_event(Event::NoAssets);
            return None;
        };

        if !Path::new(id).is_file_name() {
            log::warn!("invalid asset index id: {id}");
            self.handler.on_event(Event::NoAssets);
            return None;
        }

        let file = indexes_dir.join_with_extension(id, "json");
        let url = descriptor.asset_index.as_ref().and_then(|index| index.url.as_deref());

        if file.is_file() {
            match store::read_json::<AssetIndex>(&file) {
                Ok(index) => return Some(self.loaded_asset_index(id, index)),
                Err(store::ReadJsonError::Json(e)) => log::warn!("parse asset index: {}: {e}", file.display()),
                Err(store::ReadJsonError::Io(e)) => log::warn!("read asset index: {}: {e}", file.display()),
            }
        }

        let Some(url) = url else {
            log::warn!("asset index not found: {id}");
            return None;
        };

        let raw = self.fetch_file(url, &file)?;
        match store::parse_json::<AssetIndex>(&raw) {
            Ok(index) => Some(self.loaded_asset_index(id, index)),
            Err(e) => {
                log::warn!("parse asset index: {url}: {e}");
                None
            }
        }

    }

    fn loaded_asset_index(&mut self, id: &str, index: AssetIndex) -> (String, AssetIndex) {
        self.handler.on_event(Event::LoadAssets { id, count: index.objects.len() });
        (id.to_string(), index)
    }

    /// Asset pass: every object missing from its content-addressed path is fetched from
    /// the resources origin.
    pub fn acquire_assets(&mut self,
        id: &str,
        index: &AssetIndex,
        objects_dir: &Path,
        resources_url: &str,
    ) -> AcquireReport {

        let mut report = AcquireReport::default();
        let total = index.objects.len();

        for (i, (name, object)) in index.objects.iter().enumerate() {

            let (Some(file), Some(url)) = (
                asset_object_file(objects_dir, &object.hash),
                asset_object_url(resources_url, &object.hash),
            ) else {
                log::warn!("invalid asset hash: {name}: {}", object.hash);
                report.failed += 1;
                continue;
            };

            if file.exists() {
                report.skipped += 1;
                continue;
            }

            self.handler.on_event(Event::FetchAsset { index: i + 1, total, hash: &object.hash });

            if self.fetch_file(&url, &file).is_some() {
                report.fetched += 1;
            } else {
                report.failed += 1;
            }

        }

        self.handler.on_event(Event::LoadedAssets {
            id,
            fetched: report.fetched,
            skipped: report.skipped,
            failed: report.failed,
        });

        report

    }

    /// Fetch a single file: the parent directory is created, then an empty file, then
    /// the fetched content is written. On failure the empty file is left in place and
    /// none is returned.
    fn fetch_file(&mut self, url: &str, file: &Path) -> Option<Vec<u8>> {

        store::ensure_parent_dir(file);
        store::ensure_file(file);

        match self.fetch.fetch(url) {
            Ok(bytes) => {
                log::debug!("fetched: {url} -> {}", file.display());
                store::write_file(file, &bytes).then_some(bytes)
            }
            Err(error) => {
                log::warn!("fetch: {url}: {error}");
                self.handler.on_event(Event::FetchFailed { url, file, error: &error });
                store::write_file(file, b"");
                None
            }
        }

    }

}

impl std::fmt::Debug for Acquisition<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Acquisition").finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {

    use std::path::Path;

    use crate::manifest::serde::Library;
    use crate::platform::Platform;

    use super::RulePolicy;

    fn library(json: &str) -> Library {
        crate::store::parse_json(json.as_bytes()).unwrap()
    }

    #[test]
    fn library_allowed_first_rule() {

        use super::library_allowed;

        let no_rules = library(r#"{"name": "a:b:1"}"#);
        let empty_rules = library(r#"{"name": "a:b:1", "rules": []}"#);
        let linux = library(r#"{"rules": [{"action": "allow", "os": {"name": "linux"}}]}"#);
        let osx_then_linux = library(r#"{"rules": [
            {"action": "allow", "os": {"name": "osx"}},
            {"action": "allow", "os": {"name": "linux"}}
        ]}"#);
        let any = library(r#"{"rules": [{"action": "allow"}, {"action": "disallow", "os": {"name": "osx"}}]}"#);

        for platform in Platform::ALL {
            assert!(library_allowed(&no_rules, platform, RulePolicy::FirstRule));
            assert!(library_allowed(&empty_rules, platform, RulePolicy::FirstRule));
            assert!(library_allowed(&any, platform, RulePolicy::FirstRule));
            assert_eq!(library_allowed(&linux, platform, RulePolicy::FirstRule), platform == Platform::Linux);
            assert_eq!(library_allowed(&osx_then_linux, platform, RulePolicy::FirstRule), platform == Platform::Osx);
        }

    }

    #[test]
    fn library_allowed_ordered() {

        use super::library_allowed;

        let any_but_osx = library(r#"{"rules": [{"action": "allow"}, {"action": "disallow", "os": {"name": "osx"}}]}"#);
        let osx_then_linux = library(r#"{"rules": [
            {"action": "allow", "os": {"name": "osx"}},
            {"action": "allow", "os": {"name": "linux"}}
        ]}"#);
        let feature = library(r#"{"rules": [{"action": "allow", "features": {"is_demo_user": true}}]}"#);

        assert!(library_allowed(&any_but_osx, Platform::Linux, RulePolicy::Ordered));
        assert!(library_allowed(&any_but_osx, Platform::Windows, RulePolicy::Ordered));
        assert!(!library_allowed(&any_but_osx, Platform::Osx, RulePolicy::Ordered));

        assert!(library_allowed(&osx_then_linux, Platform::Linux, RulePolicy::Ordered));
        assert!(library_allowed(&osx_then_linux, Platform::Osx, RulePolicy::Ordered));
        assert!(!library_allowed(&osx_then_linux, Platform::Windows, RulePolicy::Ordered));

        assert!(!library_allowed(&feature, Platform::Linux, RulePolicy::Ordered));

    }

    #[test]
    fn library_file() {

        use super::library_file;

        let dir = Path::new("versions/1.19.4/libraries");
        let lib = library(r#"{"downloads": {"artifact": {"path": "org/lwjgl/lwjgl.jar", "url": "http://lib"}}}"#);
        assert_eq!(library_file(dir, &lib).unwrap(), dir.join("org/lwjgl/lwjgl.jar"));

        let null = library(r#"{"downloads": {"artifact": {"path": "null", "url": "http://lib"}}}"#);
        assert!(library_file(dir, &null).is_none());
        let root_null = library(r#"{"downloads": {"artifact": {"path": "/null", "url": "http://lib"}}}"#);
        assert!(library_file(dir, &root_null).is_none());

        let absolute = library(r#"{"downloads": {"artifact": {"path": "/tmp/evil.jar", "url": "http://lib"}}}"#);
        assert!(library_file(dir, &absolute).is_none());
        let parent = library(r#"{"downloads": {"artifact": {"path": "../../../evil.jar", "url": "http://lib"}}}"#);
        assert!(library_file(dir, &parent).is_none());
        let no_artifact = library(r#"{"name": "a:b:1"}"#);
        assert!(library_file(dir, &no_artifact).is_none());

    }

    #[test]
    fn acquire_libraries_confined() {

        use std::fs;

        use crate::http::{Fetch, FetchError};

        use super::{Acquisition, AcquireReport};

        struct LibFetch;
        impl Fetch for LibFetch {
            fn fetch(&mut self, _url: &str) -> Result<Vec<u8>, FetchError> {
                Ok(b"lib".to_vec())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let libraries_dir = dir.path().join("libraries");
        let outside = dir.path().join("evil.jar");

        let libraries = [
            library(&format!(r#"{{"downloads": {{"artifact": {{"path": "{}", "url": "http://evil"}}}}}}"#,
                outside.to_string_lossy().replace('\\', "/"))),
            library(r#"{"downloads": {"artifact": {"path": "../evil.jar", "url": "http://evil"}}}"#),
            library(r#"{"downloads": {"artifact": {"path": "a/b.jar", "url": "http://lib"}}}"#),
        ];

        let mut fetch = LibFetch;
        let mut handler = ();
        let report = Acquisition::new(&mut fetch, &mut handler)
            .acquire_libraries(&libraries, &libraries_dir, Platform::Linux, RulePolicy::FirstRule);

        assert_eq!(report, AcquireReport { fetched: 1, skipped: 2, failed: 0 });
        assert!(!outside.exists());
        assert_eq!(fs::read(libraries_dir.join("a/b.jar")).unwrap(), b"lib");

    }

    #[test]
    fn asset_object_file() {

        use super::{asset_object_file, asset_object_url};

        let objects = Path::new("assets/objects");
        assert_eq!(asset_object_file(objects, "abcdef123"), Some(objects.join("ab").join("abcdef123")));
        assert_eq!(asset_object_file(objects, "ab"), Some(objects.join("ab").join("ab")));
        assert_eq!(asset_object_file(objects, "a"), None);
        assert_eq!(asset_object_file(objects, ""), None);
        assert_eq!(asset_object_file(objects, "../../../../tmp/x"), None);
        assert_eq!(asset_object_file(objects, "zz11"), None);

        assert_eq!(asset_object_url("https://res/", "abcdef123").as_deref(), Some("https://res/ab/abcdef123"));
        assert_eq!(asset_object_url("https://res", "abcdef123").as_deref(), Some("https://res/ab/abcdef123"));
        assert_eq!(asset_object_url("https://res/", "a"), None);

    }

}
