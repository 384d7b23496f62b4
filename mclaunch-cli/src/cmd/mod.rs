//! Implementing the logic for the different CLI commands.

mod start;
mod search;

use std::process::ExitCode;
use std::path::PathBuf;
use std::io;

use mclaunch::http::FetchError;
use mclaunch::{install, Event, Handler};

use crate::parse::{CliArgs, CliCmd, CliOutput};
use crate::output::{Output, LogLevel};


pub fn main(args: &CliArgs) -> ExitCode {

    // Create the adequate output handle depending on the output and verbose options.
    let mut out = match args.output {
        CliOutput::Human => Output::human(match args.verbose {
            0 => LogLevel::Pending,
            1.. => LogLevel::Info,
        }),
        CliOutput::Machine => Output::tab_separated(),
    };

    // Ensure that we can have a main directory, needed for all commands.
    let Some(main_dir) = args.main_dir.clone()
        .or_else(install::default_main_dir) else {

        out.log("error_missing_main_dir")
            .error("There is no default main directory, please specify it using --main-dir")
            .additional("This directory is where versions, assets and profiles are installed");

        return ExitCode::FAILURE;

    };

    log::debug!("main dir: {}", main_dir.display());

    let mut cli = Cli {
        out,
        main_dir,
    };

    match &args.cmd {
        CliCmd::Start(start_args) => start::start(&mut cli, start_args),
        CliCmd::Search(search_args) => search::search(&mut cli, search_args),
    }

}


/// Shared CLI data.
#[derive(Debug)]
pub struct Cli {
    pub out: Output,
    pub main_dir: PathBuf,
}

/// Handler for installation events, rendering them to the output.
#[derive(Debug)]
pub struct LogHandler<'a> {
    /// Handle to the output.
    out: &'a mut Output,
}

impl<'a> LogHandler<'a> {

    pub fn new(out: &'a mut Output) -> Self {
        Self { out }
    }

}

impl Handler for LogHandler<'_> {

    fn on_event(&mut self, event: Event) {
        match event {
            Event::LoadedManifest { latest_release, cached } => {

                let mut log = self.out.log("loaded_manifest");
                log.arg(cached);
                log.args(latest_release.into_iter());

                if cached {
                    log.warning("Version manifest can't be fetched, using the cached one");
                } else {
                    log.info("Version manifest fetched");
                }

                if let Some(latest_release) = latest_release {
                    log.info(format_args!("Latest release: {latest_release}"));
                }

            }
            Event::ManifestUnavailable => {
                self.out.log("warn_manifest_unavailable")
                    .warning("Version manifest can't be fetched and no cached copy exists");
            }
            Event::LoadVersion { version } => {
                self.out.log("load_version")
                    .arg(version)
                    .pending(format_args!("Loading version {version}"));
            }
            Event::LoadedVersion { version, file, cached } => {
                self.out.log("loaded_version")
                    .arg(version)
                    .arg(file.display())
                    .arg(cached)
                    .success(format_args!("Loaded version {version}"))
                    .info(format_args!("Version metadata: {}", file.display()));
            }
            Event::LoadedClient { file } => {
                self.out.log("loaded_client")
                    .arg(file.display())
                    .success("Loaded client");
            }
            Event::NoLogger => {
                self.out.log("no_logger")
                    .success("No logger");
            }
            Event::LoadedLogger { id, file } => {
                self.out.log("loaded_logger")
                    .arg(id)
                    .arg(file.display())
                    .success(format_args!("Loaded logger {id}"));
            }
            Event::LoadLibraries { count } => {
                self.out.log("load_libraries")
                    .arg(count)
                    .pending(format_args!("Loading {count} libraries"));
            }
            Event::FetchLibrary { index, total, file } => {
                self.out.log("fetch_library")
                    .arg(format_args!("{index}/{total}"))
                    .arg(file.display())
                    .pending(format_args!("Downloading libraries: {index} out of {total}"));
            }
            Event::LoadedLibraries { fetched, skipped, failed } => {
                self.out.log("loaded_libraries")
                    .arg(fetched)
                    .arg(skipped)
                    .arg(failed)
                    .success(format_args!("Loaded libraries ({fetched} downloaded, {skipped} skipped, {failed} failed)"));
            }
            Event::NoAssets => {
                self.out.log("no_assets")
                    .success("No assets");
            }
            Event::LoadAssets { id, count } => {
                self.out.log("load_assets")
                    .arg(id)
                    .arg(count)
                    .pending(format_args!("Loading {count} assets {id}"));
            }
            Event::FetchAsset { index, total, hash } => {
                self.out.log("fetch_asset")
                    .arg(format_args!("{index}/{total}"))
                    .arg(hash)
                    .pending(format_args!("Downloading assets: {index} out of {total}"));
            }
            Event::LoadedAssets { id, fetched, skipped, failed } => {
                self.out.log("loaded_assets")
                    .arg(id)
                    .arg(fetched)
                    .arg(skipped)
                    .arg(failed)
                    .success(format_args!("Loaded assets {id} ({fetched} downloaded, {skipped} skipped, {failed} failed)"));
            }
            Event::FetchFailed { url, file, error } => {

                let mut log = self.out.log("warn_fetch_failed");
                log.arg(url)
                    .arg(file.display())
                    .arg(error)
                    .warning(format_args!("Failed to download {url}"))
                    .additional(format_args!("{error}"));

                if let FetchError::InvalidStatus(status) = error {
                    log.info(format_args!("Server answered with status {status}"));
                }

            }
            Event::CreatedOpenAlConfig { file } => {
                self.out.log("created_openal_config")
                    .arg(file.display())
                    .info(format_args!("Created OpenAL configuration: {}", file.display()));
            }
            _ => {}
        }
    }

}

/// Log an installation error.
pub fn log_install_error(cli: &mut Cli, error: &install::Error) {

    use install::Error;

    log::error!("install: {error}");

    let out = &mut cli.out;

    match error {
        Error::VersionNotFound { version } => {
            out.log("error_version_not_found")
                .arg(version)
                .error(format_args!("Version {version} not found"))
                .additional("You can search for available versions using 'mclaunch search'");
        }
        Error::DescriptorUnavailable { version } => {
            out.log("error_descriptor_unavailable")
                .arg(version)
                .error(format_args!("Version {version} metadata can't be fetched and isn't cached"));
        }
        Error::MainClassNotFound {  } => {
            out.log("error_main_class_not_found")
                .error("No main class specified by the version");
        }
        Error::Internal { error, origin } => {

            let mut log = out.log("error_internal");
            log.arg(origin);

            if let Some(io_error) = error.downcast_ref::<io::Error>() {
                log.arg(format_args!("io:{:?}", io_error.kind()));
            } else {
                log.arg(error);
            }

            log.error(format_args!("Internal error: {error}"))
                .additional(format_args!("At: {origin}"));

        }
        _ => {
            out.log("error_unknown")
                .arg(error)
                .error(format_args!("Unknown error: {error}"));
        }
    }

}
