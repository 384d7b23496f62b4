//! Full installation against a mocked remote, checking the resulting tree on disk and
//! the synthesized command line.

use std::path::{Path, PathBuf};
use std::fs;

use mclaunch::http::{Fetch, FetchError, HttpFetch};
use mclaunch::{Error, Event, Game, Handler, Installer, Platform};

use mockito::{Mock, Server, ServerGuard};
use tempfile::TempDir;


const HASH: &str = "aa11bb22cc33dd44ee55ff66aa77bb88cc99dd00";
const LIBRARY_PATH: &str = "com/example/lib/1.0/lib-1.0.jar";

/// A mocked remote with a manifest listing a single version.
struct Remote {
    server: ServerGuard,
    dir: TempDir,
}

impl Remote {

    fn new() -> Self {
        fs::create_dir_all(env!("CARGO_TARGET_TMPDIR")).unwrap();
        Self {
            server: Server::new(),
            dir: tempfile::Builder::new()
                .prefix("")
                .suffix(".pipeline")
                .tempdir_in(env!("CARGO_TARGET_TMPDIR"))
                .unwrap(),
        }
    }

    fn main_dir(&self) -> PathBuf {
        dunce::canonicalize(self.dir.path()).unwrap()
    }

    fn mock(&mut self, path: &str, body: impl AsRef<[u8]>, hits: usize) -> Mock {
        self.server.mock("GET", path)
            .with_status(200)
            .with_body(body)
            .expect(hits)
            .create()
    }

    fn mock_status(&mut self, path: &str, status: usize) -> Mock {
        self.server.mock("GET", path)
            .with_status(status)
            .create()
    }

    fn manifest(&self) -> String {
        let url = self.server.url();
        format!(r#"{{
            "latest": {{"release": "1.19.4", "snapshot": "23w13a"}},
            "versions": [
                {{"id": "23w13a", "type": "snapshot", "url": "{url}/v/23w13a.json"}},
                {{"id": "1.19.4", "type": "release", "url": "{url}/v/1.19.4.json"}}
            ]
        }}"#)
    }

    fn descriptor(&self) -> String {
        let url = self.server.url();
        format!(r#"{{
            "id": "1.19.4",
            "type": "release",
            "mainClass": "net.minecraft.client.main.Main",
            "assetIndex": {{"id": "3", "url": "{url}/indexes/3.json"}},
            "assets": "3",
            "downloads": {{"client": {{"url": "{url}/client.jar"}}}},
            "logging": {{"client": {{
                "argument": "-Dlog4j.configurationFile=${{path}}",
                "file": {{"id": "client-1.12.xml", "url": "{url}/logging.xml"}}
            }}}},
            "minecraftArguments": "--username ${{auth_player_name}} --version ${{version_name}} --gameDir ${{game_directory}} --assetsDir ${{assets_root}} --assetIndex ${{assets_index_name}} --accessToken ${{auth_access_token}}",
            "libraries": [
                {{"name": "com.example:lib:1.0", "downloads": {{"artifact": {{"path": "{LIBRARY_PATH}", "url": "{url}/lib.jar"}}}}}},
                {{"name": "com.example:osx:1.0", "downloads": {{"artifact": {{"path": "com/example/osx/1.0/osx-1.0.jar", "url": "{url}/osx.jar"}}}}, "rules": [{{"action": "allow", "os": {{"name": "osx"}}}}]}}
            ]
        }}"#)
    }

    fn asset_index(&self) -> String {
        format!(r#"{{"objects": {{"minecraft/sounds/a.ogg": {{"hash": "{HASH}", "size": 5}}}}}}"#)
    }

    fn installer(&self, version: &str) -> Installer {
        let url = self.server.url();
        let mut installer = Installer::new(version, self.dir.path());
        installer
            .set_manifest_url(format!("{url}/manifest.json"))
            .set_resources_url(format!("{url}/res/"))
            .set_platform(Platform::Linux)
            .set_username("alice")
            .set_openal_config(false);
        installer
    }

}

/// A fetcher that is always offline, counting the requests.
#[derive(Default)]
struct OfflineFetch {
    count: usize,
}

impl Fetch for OfflineFetch {
    fn fetch(&mut self, _url: &str) -> Result<Vec<u8>, FetchError> {
        self.count += 1;
        Err(FetchError::InvalidStatus(503))
    }
}

/// A handler recording a short code for each event.
#[derive(Default)]
struct RecordHandler {
    events: Vec<String>,
}

impl Handler for RecordHandler {
    fn on_event(&mut self, event: Event) {
        self.events.push(match event {
            Event::LoadedManifest { cached, .. } => format!("loaded_manifest:{cached}"),
            Event::LoadedVersion { version, cached, .. } => format!("loaded_version:{version}:{cached}"),
            Event::FetchLibrary { index, total, .. } => format!("fetch_library:{index}/{total}"),
            Event::FetchAsset { index, total, hash } => format!("fetch_asset:{index}/{total}:{hash}"),
            Event::FetchFailed { url, .. } => format!("fetch_failed:{}", url.rsplit('/').next().unwrap()),
            Event::LoadedLibraries { fetched, skipped, failed } => format!("loaded_libraries:{fetched}:{skipped}:{failed}"),
            Event::LoadedAssets { fetched, skipped, failed, .. } => format!("loaded_assets:{fetched}:{skipped}:{failed}"),
            _ => return,
        });
    }
}

fn classpath(game: &Game) -> &str {
    let index = game.jvm_args.iter().position(|arg| arg == "-cp").unwrap();
    &game.jvm_args[index + 1]
}

fn forward(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}


#[test]
fn install() {

    let mut remote = Remote::new();

    let manifest = remote.manifest();
    let descriptor = remote.descriptor();
    let asset_index = remote.asset_index();

    let m_manifest = remote.mock("/manifest.json", manifest, 2);
    let m_descriptor = remote.mock("/v/1.19.4.json", &descriptor, 1);
    let m_index = remote.mock("/indexes/3.json", &asset_index, 1);
    let m_client = remote.mock("/client.jar", "client", 1);
    let m_logging = remote.mock("/logging.xml", "<xml/>", 1);
    let m_lib = remote.mock("/lib.jar", "lib", 1);
    let m_osx = remote.mock("/osx.jar", "osx", 0);
    let m_asset = remote.mock(&format!("/res/aa/{HASH}"), "sound", 1);

    let main_dir = remote.main_dir();
    let version_dir = main_dir.join("versions").join("1.19.4");
    let lib_file = version_dir.join("libraries").join(LIBRARY_PATH);
    let jar_file = version_dir.join("1.19.4.jar");
    let asset_file = main_dir.join("assets").join("objects").join("aa").join(HASH);
    let profile_dir = main_dir.join("profiles").join("1.19.4");

    let mut handler = RecordHandler::default();
    let game = remote.installer("1.19.4")
        .install_with(HttpFetch::new().unwrap(), &mut handler)
        .unwrap();

    assert_eq!(handler.events, [
        "loaded_manifest:false",
        "loaded_version:1.19.4:false",
        "fetch_library:1/2",
        "loaded_libraries:1:1:0",
        format!("fetch_asset:1/1:{HASH}").as_str(),
        "loaded_assets:1:0:0",
    ]);

    assert_eq!(fs::read_to_string(main_dir.join("manifest_cache.json")).unwrap(), remote.manifest());
    assert_eq!(fs::read_to_string(version_dir.join("1.19.4.json")).unwrap(), descriptor);
    assert!(version_dir.join("1.19.4.config").is_file());
    assert_eq!(fs::read_to_string(&jar_file).unwrap(), "client");
    assert_eq!(fs::read_to_string(version_dir.join("logging-client-1.12.xml")).unwrap(), "<xml/>");
    assert_eq!(fs::read_to_string(&lib_file).unwrap(), "lib");
    assert!(!version_dir.join("libraries").join("com/example/osx/1.0/osx-1.0.jar").exists());
    assert_eq!(fs::read_to_string(main_dir.join("assets").join("indexes").join("3.json")).unwrap(), asset_index);
    assert_eq!(fs::read_to_string(&asset_file).unwrap(), "sound");
    assert!(profile_dir.is_dir());

    assert_eq!(classpath(&game), format!("{}:{}", forward(&lib_file), forward(&jar_file)));
    assert_eq!(game.main_class, "net.minecraft.client.main.Main");
    assert_eq!(game.work_dir, profile_dir);
    assert_eq!(game.java_file, Path::new(Platform::current().java_exec_name()));
    assert!(game.jvm_args.contains(&format!(
        "-Dlog4j.configurationFile={}",
        version_dir.join("logging-client-1.12.xml").display()
    )));
    assert!(game.jvm_args.contains(&"-Xmx2G".to_string()));

    assert_eq!(game.game_args, [
        "--username".to_string(), "alice".to_string(),
        "--version".to_string(), "1.19.4".to_string(),
        "--gameDir".to_string(), profile_dir.to_string_lossy().into_owned(),
        "--assetsDir".to_string(), main_dir.join("assets").to_string_lossy().into_owned(),
        "--assetIndex".to_string(), "3".to_string(),
        "--accessToken".to_string(), "0".to_string(),
    ]);

    // Installing again must only refresh the manifest.
    let mut handler = RecordHandler::default();
    let again = remote.installer("1.19.4")
        .install_with(HttpFetch::new().unwrap(), &mut handler)
        .unwrap();

    assert_eq!(handler.events, [
        "loaded_manifest:false",
        "loaded_version:1.19.4:true",
        "loaded_libraries:0:2:0",
        "loaded_assets:0:1:0",
    ]);
    assert_eq!(again.jvm_args, game.jvm_args);
    assert_eq!(again.game_args, game.game_args);

    for mock in [m_manifest, m_descriptor, m_index, m_client, m_logging, m_lib, m_osx, m_asset] {
        mock.assert();
    }

    // Fully offline, everything is read from the disk.
    let mut fetch = OfflineFetch::default();
    let mut handler = RecordHandler::default();
    let offline = remote.installer("1.19.4")
        .install_with(&mut fetch, &mut handler)
        .unwrap();

    assert_eq!(fetch.count, 1);
    assert_eq!(handler.events[..2], ["loaded_manifest:true", "loaded_version:1.19.4:true"]);
    assert!(!handler.events.iter().any(|event| event.starts_with("fetch_")));
    assert_eq!(classpath(&offline), classpath(&game));

}

#[test]
fn install_latest_release() {

    let mut remote = Remote::new();

    let manifest = remote.manifest();
    let descriptor = remote.descriptor();
    let asset_index = remote.asset_index();

    let _mocks = [
        remote.mock("/manifest.json", manifest, 1),
        remote.mock("/v/1.19.4.json", descriptor, 1),
        remote.mock("/indexes/3.json", asset_index, 1),
        remote.mock("/client.jar", "client", 1),
        remote.mock("/logging.xml", "<xml/>", 1),
        remote.mock("/lib.jar", "lib", 1),
        remote.mock(&format!("/res/aa/{HASH}"), "sound", 1),
    ];

    let game = remote.installer("")
        .set_version(mclaunch::Version::Release)
        .set_platform(Platform::Windows)
        .set_memory("4G")
        .install_with(HttpFetch::new().unwrap(), ())
        .unwrap();

    let version_dir = remote.main_dir().join("versions").join("1.19.4");
    assert!(classpath(&game).ends_with(&format!(";{}", forward(&version_dir.join("1.19.4.jar")))));
    // The JVM is resolved on the host, whatever the target platform.
    assert_eq!(game.java_file, Path::new(Platform::current().java_exec_name()));
    assert!(game.jvm_args.contains(&"-Xmx4G".to_string()));

}

#[test]
fn install_soft_failures() {

    let mut remote = Remote::new();

    let manifest = remote.manifest();
    let descriptor = remote.descriptor();
    let asset_index = remote.asset_index();

    let _mocks = [
        remote.mock("/manifest.json", manifest, 1),
        remote.mock("/v/1.19.4.json", descriptor, 1),
        remote.mock("/indexes/3.json", asset_index, 1),
        remote.mock("/client.jar", "client", 1),
        remote.mock("/logging.xml", "<xml/>", 1),
        remote.mock_status("/lib.jar", 404),
        remote.mock("/osx.jar", "osx", 1),
        remote.mock_status(&format!("/res/aa/{HASH}"), 500),
    ];

    let mut handler = RecordHandler::default();
    let game = remote.installer("1.19.4")
        .set_platform(Platform::Osx)
        .install_with(HttpFetch::new().unwrap(), &mut handler)
        .unwrap();

    assert_eq!(handler.events, [
        "loaded_manifest:false",
        "loaded_version:1.19.4:false",
        "fetch_library:1/2",
        "fetch_failed:lib.jar",
        "fetch_library:2/2",
        "loaded_libraries:1:0:1",
        format!("fetch_asset:1/1:{HASH}").as_str(),
        format!("fetch_failed:{HASH}").as_str(),
        "loaded_assets:0:0:1",
    ]);

    let main_dir = remote.main_dir();
    let libraries_dir = main_dir.join("versions").join("1.19.4").join("libraries");
    let lib_file = libraries_dir.join(LIBRARY_PATH);
    let osx_file = libraries_dir.join("com/example/osx/1.0/osx-1.0.jar");

    // Failed files are left empty.
    assert_eq!(fs::read(&lib_file).unwrap(), b"");
    assert_eq!(fs::read(main_dir.join("assets").join("objects").join("aa").join(HASH)).unwrap(), b"");
    assert_eq!(fs::read_to_string(&osx_file).unwrap(), "osx");

    assert!(classpath(&game).starts_with(&format!("{}:{}:", forward(&lib_file), forward(&osx_file))));

}

#[test]
fn install_unresolved() {

    let mut remote = Remote::new();

    let manifest = remote.manifest();
    let _m_manifest = remote.mock("/manifest.json", manifest, 2);
    let m_unavailable = remote.mock_status("/v/23w13a.json", 404);

    let err = remote.installer("0.0.0")
        .install_with(HttpFetch::new().unwrap(), ())
        .unwrap_err();
    assert!(matches!(err, Error::VersionNotFound { version } if version == "0.0.0"));

    let err = remote.installer("23w13a")
        .install_with(HttpFetch::new().unwrap(), ())
        .unwrap_err();
    assert!(matches!(err, Error::DescriptorUnavailable { version } if version == "23w13a"));
    m_unavailable.assert();

    // No marker has been written for unresolved versions.
    let versions_dir = remote.main_dir().join("versions");
    assert!(!versions_dir.join("0.0.0").join("0.0.0.config").exists());
    assert!(!versions_dir.join("23w13a").join("23w13a.config").exists());

    // Offline without any cache.
    let empty = Remote::new();
    let err = empty.installer("1.19.4")
        .install_with(OfflineFetch::default(), ())
        .unwrap_err();
    assert!(matches!(err, Error::DescriptorUnavailable { .. }));

}

#[test]
fn install_corrupted_cache() {

    let mut remote = Remote::new();

    let manifest = remote.manifest();
    let descriptor = remote.descriptor();
    let asset_index = remote.asset_index();

    let m_descriptor = remote.mock("/v/1.19.4.json", &descriptor, 1);
    let _mocks = [
        remote.mock("/manifest.json", manifest, 1),
        remote.mock("/indexes/3.json", asset_index, 1),
        remote.mock("/client.jar", "client", 1),
        remote.mock("/logging.xml", "<xml/>", 1),
        remote.mock("/lib.jar", "lib", 1),
        remote.mock(&format!("/res/aa/{HASH}"), "sound", 1),
    ];

    // The marker is present but the cached descriptor is garbage.
    let version_dir = remote.main_dir().join("versions").join("1.19.4");
    fs::create_dir_all(&version_dir).unwrap();
    fs::write(version_dir.join("1.19.4.config"), b"").unwrap();
    fs::write(version_dir.join("1.19.4.json"), b"{not json").unwrap();

    let mut handler = RecordHandler::default();
    let game = remote.installer("1.19.4")
        .install_with(HttpFetch::new().unwrap(), &mut handler)
        .unwrap();

    m_descriptor.assert();
    assert_eq!(handler.events[..2], ["loaded_manifest:false", "loaded_version:1.19.4:false"]);
    assert_eq!(fs::read_to_string(version_dir.join("1.19.4.json")).unwrap(), descriptor);
    assert!(version_dir.join("1.19.4.config").is_file());
    assert_eq!(game.main_class, "net.minecraft.client.main.Main");

}
