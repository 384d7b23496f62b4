//! The installation procedure: resolve the version from the manifest, acquire all of
//! its files and build the game command line.

use std::path::{Path, PathBuf};
use std::{env, io};

use crate::acquire::{self, Acquisition, RulePolicy, RESOURCES_URL};
use crate::manifest::{self, Unresolved, VersionDescriptor, VersionManifest, VERSION_MANIFEST_URL};
use crate::launch::{self, Game, JvmOptions};
use crate::template::{self, LaunchContext};
use crate::http::{Fetch, HttpFetch};
use crate::event::{Event, Handler};
use crate::classpath::build_classpath;
use crate::path::PathExt;
use crate::platform::Platform;
use crate::store;


/// File name of the version manifest cache, in the main directory.
pub const MANIFEST_CACHE_FILE: &str = "manifest_cache.json";

/// The default maximum heap size of the game.
pub const DEFAULT_MEMORY: &str = "2G";

/// The default player name.
pub const DEFAULT_USERNAME: &str = "Player";

/// The version to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Version {
    /// The latest release, as given by the manifest.
    Release,
    /// The latest snapshot, as given by the manifest.
    Snapshot,
    /// A specific version id.
    Name(String),
}

impl From<String> for Version {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

/// The installer, resolving a version from the version manifest and installing its
/// client, logger configuration, libraries and assets in the main directory. Every
/// file is fetched only if missing, so installing an installed version is cheap.
///
/// The main directory layout is the following:
///
/// - `manifest_cache.json`, the last fetched version manifest;
/// - `versions/<id>/`, the descriptor `<id>.json`, its cache marker `<id>.config`, the
///   `<id>.jar` client, the `logging-<file>` configuration and the `libraries/` dir;
/// - `assets/indexes/<index>.json` and `assets/objects/<xx>/<hash>`;
/// - `profiles/<id>/`, the working directory of the game.
#[derive(Debug, Clone)]
pub struct Installer {
    version: Version,
    main_dir: PathBuf,
    username: String,
    platform: Platform,
    rule_policy: RulePolicy,
    manifest_url: String,
    resources_url: String,
    java_file: Option<PathBuf>,
    memory: String,
    launcher_name: Option<String>,
    launcher_version: Option<String>,
    openal_config: bool,
}

impl Installer {

    /// Create a new installer with default configuration and the given version, the
    /// main directory is the given one.
    pub fn new(version: impl Into<Version>, main_dir: impl Into<PathBuf>) -> Self {
        Self {
            version: version.into(),
            main_dir: main_dir.into(),
            username: DEFAULT_USERNAME.to_string(),
            platform: Platform::current(),
            rule_policy: RulePolicy::default(),
            manifest_url: VERSION_MANIFEST_URL.to_string(),
            resources_url: RESOURCES_URL.to_string(),
            java_file: None,
            memory: DEFAULT_MEMORY.to_string(),
            launcher_name: None,
            launcher_version: None,
            openal_config: true,
        }
    }

    /// The version to install.
    #[inline]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// See [`Self::version`].
    #[inline]
    pub fn set_version(&mut self, version: impl Into<Version>) -> &mut Self {
        self.version = version.into();
        self
    }

    /// The main directory where every file is installed, see [`Installer`].
    #[inline]
    pub fn main_dir(&self) -> &Path {
        &self.main_dir
    }

    /// See [`Self::main_dir`].
    #[inline]
    pub fn set_main_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.main_dir = dir.into();
        self
    }

    /// The player name given to the game.
    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// See [`Self::username`].
    #[inline]
    pub fn set_username(&mut self, username: impl Into<String>) -> &mut Self {
        self.username = username.into();
        self
    }

    /// The platform used to evaluate library rules and build the class path, defaults
    /// to the current one.
    #[inline]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// See [`Self::platform`].
    #[inline]
    pub fn set_platform(&mut self, platform: Platform) -> &mut Self {
        self.platform = platform;
        self
    }

    /// The policy used to evaluate library rules.
    #[inline]
    pub fn rule_policy(&self) -> RulePolicy {
        self.rule_policy
    }

    /// See [`Self::rule_policy`].
    #[inline]
    pub fn set_rule_policy(&mut self, policy: RulePolicy) -> &mut Self {
        self.rule_policy = policy;
        self
    }

    /// The URL of the version manifest.
    #[inline]
    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }

    /// See [`Self::manifest_url`].
    #[inline]
    pub fn set_manifest_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.manifest_url = url.into();
        self
    }

    /// The base URL for asset objects.
    #[inline]
    pub fn resources_url(&self) -> &str {
        &self.resources_url
    }

    /// See [`Self::resources_url`].
    #[inline]
    pub fn set_resources_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.resources_url = url.into();
        self
    }

    /// The JVM executable to launch the game with, when not set the host's executable
    /// name is used and resolved from the PATH at launch.
    #[inline]
    pub fn java_file(&self) -> Option<&Path> {
        self.java_file.as_deref()
    }

    /// See [`Self::java_file`].
    #[inline]
    pub fn set_java_file(&mut self, file: impl Into<PathBuf>) -> &mut Self {
        self.java_file = Some(file.into());
        self
    }

    /// The maximum heap size of the JVM, such as "2G".
    #[inline]
    pub fn memory(&self) -> &str {
        &self.memory
    }

    /// See [`Self::memory`].
    #[inline]
    pub fn set_memory(&mut self, memory: impl Into<String>) -> &mut Self {
        self.memory = memory.into();
        self
    }

    /// A specific launcher name to put on the command line, defaults to "mclaunch".
    pub fn launcher_name(&self) -> &str {
        self.launcher_name.as_deref().unwrap_or(env!("CARGO_PKG_NAME"))
    }

    /// See [`Self::launcher_name`].
    #[inline]
    pub fn set_launcher_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.launcher_name = Some(name.into());
        self
    }

    /// A specific launcher version to put on the command line, defaults to the crate
    /// version.
    pub fn launcher_version(&self) -> &str {
        self.launcher_version.as_deref().unwrap_or(env!("CARGO_PKG_VERSION"))
    }

    /// See [`Self::launcher_version`].
    #[inline]
    pub fn set_launcher_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.launcher_version = Some(version.into());
        self
    }

    /// On Linux, create an empty OpenAL configuration file in the user's configuration
    /// directory if missing. Enabled by default.
    #[inline]
    pub fn openal_config(&self) -> bool {
        self.openal_config
    }

    /// See [`Self::openal_config`].
    #[inline]
    pub fn set_openal_config(&mut self, enabled: bool) -> &mut Self {
        self.openal_config = enabled;
        self
    }

    /// Ensure that the version is fully installed, fetching files over HTTP, and return
    /// a game instance that can be used to launch it.
    pub fn install(&mut self, handler: impl Handler) -> Result<Game> {
        let fetch = HttpFetch::new()
            .map_err(|e| Error::new_boxed(Box::new(e), "http client"))?;
        self.install_with(fetch, handler)
    }

    /// Same as [`Self::install`] but with a custom fetcher.
    #[inline]
    pub fn install_with(&mut self, mut fetch: impl Fetch, mut handler: impl Handler) -> Result<Game> {
        self.install_dyn(&mut fetch, &mut handler)
    }

    /// Inner install function to force dyn dispatch.
    #[inline(never)]
    fn install_dyn(&mut self, fetch: &mut dyn Fetch, handler: &mut dyn Handler) -> Result<Game> {

        // All paths given to the game are absolute because it runs in its profile dir.
        let main_dir = dunce::canonicalize(&self.main_dir)
            .map_err(|e| Error::new_io_file(e, &self.main_dir))?;

        let versions_dir = main_dir.join("versions");
        let assets_dir = main_dir.join("assets");
        let indexes_dir = assets_dir.join("indexes");
        let objects_dir = assets_dir.join("objects");
        let profiles_dir = main_dir.join("profiles");

        for dir in [&profiles_dir, &indexes_dir, &objects_dir, &versions_dir] {
            store::ensure_dir(dir);
        }

        // The OpenAL configuration and the JVM concern the host, not the target platform.
        if self.openal_config && Platform::current() == Platform::Linux {
            ensure_openal_config(&mut *handler);
        }

        let manifest_cache_file = main_dir.join(MANIFEST_CACHE_FILE);
        let manifest = manifest::resolve_manifest(&mut *fetch, &mut *handler, &self.manifest_url, &manifest_cache_file);

        let id = self.resolve_id(manifest.as_ref())?;

        let version_dir = versions_dir.join(&id);
        let libraries_dir = version_dir.join("libraries");
        let profile_dir = profiles_dir.join(&id);

        for dir in [&version_dir, &libraries_dir, &profile_dir] {
            store::ensure_dir(dir);
        }

        let descriptor = load_descriptor(&mut *fetch, &mut *handler, manifest.as_ref(), &id, &version_dir)?;

        let mut acquisition = Acquisition::new(&mut *fetch, &mut *handler);

        let jar_file = version_dir.join_with_extension(&id, "jar");
        acquisition.acquire_client(&descriptor, &jar_file);

        let logger = acquisition.acquire_logger(&descriptor, &version_dir);

        acquisition.acquire_libraries(&descriptor.libraries, &libraries_dir, self.platform, self.rule_policy);

        if let Some((index_id, index)) = acquisition.acquire_asset_index(&descriptor, &indexes_dir) {
            acquisition.acquire_assets(&index_id, &index, &objects_dir, &self.resources_url);
        }

        let Some(main_class) = descriptor.main_class.clone() else {
            return Err(Error::MainClassNotFound {  });
        };

        let library_files = descriptor.libraries.iter()
            .filter_map(|library| acquire::library_file(&libraries_dir, library));
        let classpath = build_classpath(library_files, &jar_file, self.platform);

        let ctx = LaunchContext {
            username: self.username.clone(),
            version_id: id.clone(),
            game_dir: profile_dir.to_string_lossy().into_owned(),
            assets_root: assets_dir.to_string_lossy().into_owned(),
            assets_index_id: acquire::asset_index_id(&descriptor).unwrap_or_default().to_string(),
        };

        let jvm_args = launch::jvm_args(JvmOptions {
            natives_dir: &version_dir.join("natives"),
            launcher_name: self.launcher_name(),
            launcher_version: self.launcher_version(),
            logger: logger.as_ref(),
            memory: &self.memory,
            classpath,
        });

        Ok(Game {
            java_file: self.java_file.clone()
                .unwrap_or_else(|| PathBuf::from(Platform::current().java_exec_name())),
            work_dir: profile_dir,
            main_class,
            jvm_args,
            game_args: template::expand_game_args(&descriptor, &ctx),
        })

    }

    /// Resolve the version id to install, the latest release or snapshot require the
    /// manifest.
    fn resolve_id(&self, manifest: Option<&VersionManifest>) -> Result<String> {

        let (latest, alias) = match &self.version {
            Version::Name(id) => return checked_id(id.clone()),
            Version::Release => (manifest.and_then(|m| m.latest.release.clone()), "release"),
            Version::Snapshot => (manifest.and_then(|m| m.latest.snapshot.clone()), "snapshot"),
        };

        checked_id(latest.ok_or_else(|| Error::VersionNotFound { version: alias.to_string() })?)

    }

}

/// The version id is used as a directory name, so it must be a single file name.
fn checked_id(id: String) -> Result<String> {
    if Path::new(&id).is_file_name() {
        Ok(id)
    } else {
        Err(Error::VersionNotFound { version: id })
    }
}

/// Load the version descriptor from the version directory if its cache marker exists,
/// or resolve it from the manifest. A freshly resolved descriptor is written to
/// `<id>.json` and only then the `<id>.config` marker is created.
fn load_descriptor(
    fetch: &mut dyn Fetch,
    handler: &mut dyn Handler,
    manifest: Option<&VersionManifest>,
    id: &str,
    version_dir: &Path,
) -> Result<VersionDescriptor> {

    let file = version_dir.join_with_extension(id, "json");
    let marker_file = version_dir.join_with_extension(id, "config");

    handler.on_event(Event::LoadVersion { version: id });

    if marker_file.is_file() {
        match store::read_json::<VersionDescriptor>(&file) {
            Ok(descriptor) => {
                handler.on_event(Event::LoadedVersion { version: id, file: &file, cached: true });
                return Ok(descriptor);
            }
            Err(store::ReadJsonError::Io(e)) => log::warn!("read cached version: {}: {e}", file.display()),
            Err(store::ReadJsonError::Json(e)) => log::warn!("parse cached version: {}: {e}", file.display()),
        }
    }

    let Some(manifest) = manifest else {
        return Err(Error::DescriptorUnavailable { version: id.to_string() });
    };

    let resolved = match manifest::resolve_version(&mut *fetch, manifest, id) {
        Ok(resolved) => resolved,
        Err(Unresolved::NotListed) => return Err(Error::VersionNotFound { version: id.to_string() }),
        Err(Unresolved::Unavailable) => return Err(Error::DescriptorUnavailable { version: id.to_string() }),
    };

    if store::write_file(&file, &resolved.raw) {
        store::write_file(&marker_file, b"");
    }

    handler.on_event(Event::LoadedVersion { version: id, file: &file, cached: false });
    Ok(resolved.value)

}

/// Create the OpenAL configuration file if missing.
fn ensure_openal_config(handler: &mut dyn Handler) {

    let Some(config_dir) = dirs::config_dir() else {
        return;
    };

    let file = config_dir.join("alsoft.conf");
    if file.exists() {
        return;
    }

    if store::ensure_dir(&config_dir) && store::ensure_file(&file) {
        handler.on_event(Event::CreatedOpenAlConfig { file: &file });
    }

}

/// Return the directory of the running executable, used as the default main directory.
pub fn default_main_dir() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let exe = dunce::canonicalize(&exe).unwrap_or(exe);
    exe.parent().map(Path::to_path_buf)
}


/// The installer could not proceed to the installation of a version.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The given version is not listed in the version manifest, or the latest version
    /// is requested but the manifest is unavailable.
    #[error("version not found: {version}")]
    VersionNotFound {
        version: String,
    },
    /// The version descriptor is not cached and can't be fetched.
    #[error("version descriptor unavailable: {version}")]
    DescriptorUnavailable {
        version: String,
    },
    /// The version descriptor has no main class.
    #[error("main class not found")]
    MainClassNotFound {  },
    /// A generic error that originates from internal or third-party dependencies, with
    /// an origin string that helps knowing the location of the issue. Currently these
    /// are [`std::io::Error`] and [`crate::http::FetchError`].
    #[error("internal: {error} @ {origin}")]
    Internal {
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
        origin: Box<str>,
    },
}

/// Type alias for a result with the installer error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {

    #[inline]
    pub(crate) fn new_boxed(error: Box<dyn std::error::Error + Send + Sync>, origin: impl Into<Box<str>>) -> Self {
        Self::Internal { error, origin: origin.into() }
    }

    #[inline]
    pub(crate) fn new_io_file(error: io::Error, file: impl AsRef<Path>) -> Self {
        Self::new_boxed(Box::new(error), file.as_ref().display().to_string())
    }

}
