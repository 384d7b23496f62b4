//! Implementation of the 'search' command.

use std::process::ExitCode;

use mclaunch::http::HttpFetch;
use mclaunch::install::MANIFEST_CACHE_FILE;
use mclaunch::manifest;

use crate::parse::SearchArgs;

use super::{Cli, LogHandler};


pub fn search(cli: &mut Cli, args: &SearchArgs) -> ExitCode {

    let fetch = match HttpFetch::new() {
        Ok(fetch) => fetch,
        Err(e) => {
            cli.out.log("error_http_client")
                .arg(&e)
                .error("Failed to create the HTTP client")
                .additional(&e);
            return ExitCode::FAILURE;
        }
    };

    let cache_file = cli.main_dir.join(MANIFEST_CACHE_FILE);
    let Some(manifest) = manifest::resolve_manifest(fetch, LogHandler::new(&mut cli.out), manifest::VERSION_MANIFEST_URL, &cache_file) else {
        cli.out.log("error_manifest_unavailable")
            .error("Version manifest can't be fetched and no cached copy exists");
        return ExitCode::FAILURE;
    };

    let latest_release = manifest.latest.release.as_deref();
    let latest_snapshot = manifest.latest.snapshot.as_deref();

    let mut count = 0usize;
    for version in &manifest.versions {

        if let Some(filter) = args.filter.as_deref() {
            if !version.id.contains(filter) {
                continue;
            }
        }

        let version_type = version.r#type.as_deref().unwrap_or("unknown");
        if let Some(wanted_type) = args.r#type.as_deref() {
            if version_type != wanted_type {
                continue;
            }
        }

        let mut flags = String::new();
        if Some(version.id.as_str()) == latest_release {
            flags.push_str(" (latest release)");
        } else if Some(version.id.as_str()) == latest_snapshot {
            flags.push_str(" (latest snapshot)");
        }

        cli.out.log("version")
            .arg(&version.id)
            .arg(version_type)
            .raw(format_args!("{:<24} {version_type}{flags}", version.id));

        count += 1;

    }

    cli.out.log("search_count")
        .arg(count)
        .info(format_args!("{count} versions found"));

    ExitCode::SUCCESS

}
