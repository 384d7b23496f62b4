//! Placeholder substitution in the game arguments of a version.

use crate::manifest::serde::{VersionArgument, VersionDescriptor};


/// Replace every occurrence of the literal `${key}` in the template by the value. The
/// replacement is purely textual.
pub fn substitute(template: &str, key: &str, value: &str) -> String {
    template.replace(&format!("${{{key}}}"), value)
}

/// Runtime values used to expand the game arguments, never persisted.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub username: String,
    pub version_id: String,
    /// The game working directory.
    pub game_dir: String,
    pub assets_root: String,
    pub assets_index_id: String,
}

impl LaunchContext {

    /// The fixed, ordered list of substitutions. Authentication is not supported, so
    /// the related values are "0".
    pub fn substitutions(&self) -> [(&'static str, &str); 11] {
        [
            ("auth_player_name", self.username.as_str()),
            ("version_name", self.version_id.as_str()),
            ("game_directory", self.game_dir.as_str()),
            ("assets_root", self.assets_root.as_str()),
            ("auth_xuid", "0"),
            ("auth_uuid", "0"),
            ("auth_access_token", "0"),
            ("clientid", "0"),
            ("user_type", "legacy"),
            ("version_type", "release"),
            ("assets_index_name", self.assets_index_id.as_str()),
        ]
    }

    /// Apply all substitutions, in order, to the given template.
    pub fn expand(&self, template: &str) -> String {
        let mut buf = template.to_string();
        for (key, value) in self.substitutions() {
            buf = substitute(&buf, key, value);
        }
        buf
    }

}

/// Return the game arguments template of the descriptor, as a list of tokens. The
/// legacy single string is used if present, split on whitespace, otherwise the plain
/// string entries of the structured game arguments are used; conditional entries are
/// skipped without evaluating their rules.
pub fn game_template(descriptor: &VersionDescriptor) -> Vec<String> {

    if let Some(legacy) = descriptor.legacy_arguments.as_deref() {
        return legacy.split_whitespace().map(str::to_string).collect();
    }

    let Some(arguments) = &descriptor.arguments else {
        return Vec::new();
    };

    arguments.game.iter()
        .filter_map(|arg| match arg {
            VersionArgument::Raw(raw) => Some(raw.clone()),
            VersionArgument::Conditional(_) => None,
        })
        .collect()

}

/// Expand every token of the template with the context, each token stays a single
/// argument even if a substituted value contains whitespace.
pub fn expand_game_args(descriptor: &VersionDescriptor, ctx: &LaunchContext) -> Vec<String> {
    game_template(descriptor).iter()
        .map(|token| ctx.expand(token))
        .collect()
}
