//! JSON schemas of the version manifest, version descriptors and asset indexes.
//! Unknown fields are ignored, optional fields are only those that are known to be
//! absent on some versions.

use std::collections::HashMap;

use indexmap::IndexMap;


// ================== //
//  VERSION MANIFEST  //
// ================== //

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VersionManifest {
    #[serde(default)]
    pub latest: VersionManifestLatest,
    pub versions: Vec<VersionManifestVersion>,
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VersionManifestLatest {
    pub release: Option<String>,
    pub snapshot: Option<String>,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VersionManifestVersion {
    pub id: String,
    /// URL of the version descriptor.
    pub url: String,
    /// The version type, such as 'release' or 'snapshot'.
    pub r#type: Option<String>,
}

// ================== //
// VERSION DESCRIPTOR //
// ================== //

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    #[serde(default)]
    pub id: String,
    pub r#type: Option<String>,
    /// The asset index to use when launching the game, with its download URL.
    pub asset_index: Option<VersionAssetIndex>,
    /// Legacy asset index id, used when no asset index is given.
    pub assets: Option<String>,
    pub main_class: Option<String>,
    #[serde(default)]
    pub libraries: Vec<Library>,
    /// Known downloads are 'client' and 'server'.
    #[serde(default)]
    pub downloads: HashMap<String, Download>,
    /// Known logging configuration is 'client'.
    #[serde(default)]
    pub logging: HashMap<String, VersionLogging>,
    /// Modern structured arguments.
    pub arguments: Option<VersionArguments>,
    /// Legacy single-string game arguments.
    #[serde(rename = "minecraftArguments")]
    pub legacy_arguments: Option<String>,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VersionAssetIndex {
    pub id: String,
    pub url: Option<String>,
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VersionArguments {
    #[serde(default)]
    pub game: Vec<VersionArgument>,
    #[serde(default)]
    pub jvm: Vec<VersionArgument>,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum VersionArgument {
    Raw(String),
    Conditional(VersionConditionalArgument),
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VersionConditionalArgument {
    pub value: SingleOrVec<String>,
    pub rules: Option<Vec<Rule>>,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VersionLogging {
    /// The JVM argument, with a `${path}` placeholder for the configuration file.
    pub argument: String,
    pub file: VersionLoggingFile,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VersionLoggingFile {
    pub id: String,
    pub url: String,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    pub name: Option<String>,
    #[serde(default)]
    pub downloads: LibraryDownloads,
    pub rules: Option<Vec<Rule>>,
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDownloads {
    pub artifact: Option<LibraryArtifact>,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LibraryArtifact {
    /// Path relative to the libraries directory.
    pub path: Option<String>,
    pub url: Option<String>,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: RuleOs,
    #[serde(default)]
    pub features: HashMap<String, bool>,
}

#[derive(serde::Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RuleOs {
    pub name: Option<String>,
    pub arch: Option<String>,
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Download {
    pub url: String,
    pub size: Option<u32>,
}

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum SingleOrVec<T> {
    Single(T),
    Vec(Vec<T>)
}

// ================== //
//    ASSET INDEX     //
// ================== //

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AssetIndex {
    /// Mapping of assets from their logical path to their object, in document order.
    pub objects: IndexMap<String, AssetObject>,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AssetObject {
    pub hash: String,
    pub size: Option<u32>,
}
