//! Implementation of the 'start' command.

use std::process::ExitCode;

use mclaunch::{launch, Game, Installer, LaunchMode, Platform, Version};

use crate::parse::StartArgs;

use super::{log_install_error, Cli, LogHandler};


pub fn start(cli: &mut Cli, args: &StartArgs) -> ExitCode {

    let version = match args.version.as_deref() {
        None | Some("release") => Version::Release,
        Some("snapshot") => Version::Snapshot,
        Some(id) => Version::Name(id.to_string()),
    };

    let platform = args.platform.map(Platform::from).unwrap_or_default();
    let host = Platform::current();

    let mut installer = Installer::new(version, cli.main_dir.clone());
    installer
        .set_username(args.username.clone())
        .set_platform(platform)
        .set_rule_policy(args.rule_policy())
        .set_memory(args.memory.clone());

    if let Some(java_file) = args.java.as_deref() {
        installer.set_java_file(java_file);
    } else if let Some(java_file) = launch::find_java(host) {
        cli.out.log("found_java")
            .arg(java_file.display())
            .info(format_args!("Found JVM at {}", java_file.display()));
        installer.set_java_file(java_file);
    } else {
        cli.out.log("warn_java_not_found")
            .arg(host.java_exec_name())
            .warning(format_args!("JVM not found, '{}' will be resolved when launching", host.java_exec_name()));
    }

    let game = match installer.install(LogHandler::new(&mut cli.out)) {
        Ok(game) => game,
        Err(e) => {
            log_install_error(cli, &e);
            return ExitCode::FAILURE;
        }
    };

    let mode = args.launch_mode
        .map(LaunchMode::from)
        .unwrap_or_else(|| host.default_launch_mode());

    start_game(cli, &game, mode, args.dry)

}

fn start_game(cli: &mut Cli, game: &Game, mode: LaunchMode, dry: bool) -> ExitCode {

    {
        let command_line = game.command_line();
        let mut log = cli.out.log("command_line");
        log.arg(&command_line);
        if dry {
            log.raw(&command_line);
        } else {
            log.info("Command line:")
                .additional(&command_line);
        }
    }

    if dry {
        return ExitCode::SUCCESS;
    }

    cli.out.log("launching")
        .arg(game.work_dir.display())
        .pending("Launching...");

    let out = &mut cli.out;
    let res = game.launch(mode, |line| {
        out.log("game_output")
            .arg(line)
            .raw(line);
    });

    match res {
        Ok(launched) => {

            let mut log = cli.out.log("terminated");
            log.args(launched.status.code().into_iter());

            if launched.status.success() {
                log.success("Game terminated");
            } else {
                log.warning(format_args!("Game terminated ({})", launched.status));
            }

            ExitCode::SUCCESS

        }
        Err(e) => {

            log::error!("launch: {}: {e}", game.java_file.display());

            cli.out.log("error_launch")
                .arg(format_args!("io:{:?}", e.kind()))
                .arg(&e)
                .error("Failed to launch the game")
                .additional(&e);

            ExitCode::FAILURE

        }
    }

}
