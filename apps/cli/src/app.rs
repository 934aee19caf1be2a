//! Subcommand handlers.

use std::path::Path;

use anyhow::{Context, bail};
use clap::ArgMatches;
use gameshelf_game::{GameRecord, normalize, scan_installed_games};
use gameshelf_launcher::{LauncherResolver, forward_stderr, list_install_files};
use tokio::task::JoinHandle;

use crate::config::Config;

pub async fn run(mut config: Config, matches: ArgMatches) -> anyhow::Result<()> {
    let Some((name, sub)) = matches.subcommand() else {
        bail!("no subcommand given");
    };
    if let Some(dir) = sub.get_one::<String>("install_dir") {
        config.install_dir = dir.clone();
    }

    match name {
        "list" => list(&config),
        "info" => info(&config, game_name(sub)?),
        "dlc" => dlc(
            &config,
            game_name(sub)?,
            sub.get_one::<String>("title").map(String::as_str).unwrap_or_default(),
            sub.get_one::<String>("remote_version").map(String::as_str),
        ),
        "launch" => {
            let mut resolver = LauncherResolver::new().with_wine_command(&config.wine_command);
            if let Some(wine) = sub.get_one::<String>("wine") {
                resolver = resolver.with_wine_command(wine);
            }
            launch(&config, &resolver, game_name(sub)?).await
        }
        "config" => update_config(config, sub),
        other => bail!("unknown subcommand {other}"),
    }
}

fn game_name(sub: &ArgMatches) -> anyhow::Result<&str> {
    sub.get_one::<String>("game")
        .map(String::as_str)
        .context("missing game name")
}

/// Finds an installed game, or derives its directory from the games root.
///
/// An exact normalized name wins over partial matches; several partial
/// matches are an error.
fn find_game(config: &Config, name: &str) -> anyhow::Result<GameRecord> {
    let root = config.install_root();
    let wanted = GameRecord::new(name);

    let mut matches: Vec<GameRecord> = scan_installed_games(&root)?
        .into_iter()
        .filter(|game| *game == wanted)
        .collect();

    let exact = normalize(name);
    if let Some(pos) = matches.iter().position(|game| normalize(&game.name) == exact) {
        return Ok(matches.swap_remove(pos));
    }
    match matches.len() {
        0 => {}
        1 => return Ok(matches.swap_remove(0)),
        _ => {
            let names: Vec<&str> = matches.iter().map(|g| g.name.as_str()).collect();
            bail!("{name} matches several games: {}", names.join(", "));
        }
    }

    let mut game = wanted;
    game.set_install_dir(config)?;
    match game.install_dir.as_deref() {
        Some(dir) if dir.is_dir() => Ok(game),
        _ => bail!("{name} is not installed under {}", root.display()),
    }
}

fn list(config: &Config) -> anyhow::Result<()> {
    let root = config.install_root();
    let games = scan_installed_games(&root)
        .with_context(|| format!("failed to scan {}", root.display()))?;

    if games.is_empty() {
        println!("No games installed in {}", root.display());
        return Ok(());
    }
    for game in &games {
        let dir = game.install_dir.as_deref().unwrap_or(Path::new(""));
        println!("{}\t{}\t{}", game.name, game.installed_version, dir.display());
    }
    Ok(())
}

fn info(config: &Config, name: &str) -> anyhow::Result<()> {
    let mut game = find_game(config, name)?;
    game.read_installed_version()?;

    let dir = game.install_dir.clone().unwrap_or_default();
    println!("Name:       {}", game.name);
    if let Some(id) = game.store_id {
        println!("Store id:   {id}");
    }
    println!("Directory:  {}", dir.display());
    println!("Version:    {}", game.installed_version);

    let files = list_install_files(&dir)?;
    let launcher = LauncherResolver::new().determine_launcher_type(&files);
    println!("Launcher:   {launcher}");

    let info = game.load_minigalaxy_info_json()?;
    if let Some(dlcs) = info.get("dlcs").and_then(|d| d.as_object()) {
        for (title, entry) in dlcs {
            let version = entry.get("version").and_then(|v| v.as_str()).unwrap_or("?");
            println!("DLC:        {title} ({version})");
        }
    }
    Ok(())
}

fn dlc(
    config: &Config,
    name: &str,
    title: &str,
    remote_version: Option<&str>,
) -> anyhow::Result<()> {
    let game = find_game(config, name)?;

    let installed = game.is_installed(Some(title))?;
    let status = game.dlc_status(title, remote_version.unwrap_or_default())?;
    let update = match remote_version {
        Some(remote) => game.is_update_available(remote, Some(title))?,
        None => false,
    };

    println!("{title}: {status}");
    if installed {
        if let Some(version) = game.get_dlc_info("version", title)? {
            println!("Installed version: {version}");
        }
    }
    if update {
        println!("Update available");
    }
    Ok(())
}

async fn launch(config: &Config, resolver: &LauncherResolver, name: &str) -> anyhow::Result<()> {
    let game = find_game(config, name)?;

    let mut child = resolver.run_game_subprocess(&game)?;
    resolver
        .check_if_game_started_correctly(&mut child, &game)
        .await
        .with_context(|| format!("{} failed to start", game.name))?;

    tracing::info!(game = %game.name, "game started");
    let forwarder = forward_stderr(&mut child, &game.name);
    let status = child.wait().await?;
    if let Some(handle) = forwarder {
        join_forwarder(handle, &game.name).await;
    }

    tracing::info!(game = %game.name, %status, "game exited");
    Ok(())
}

/// Waits for the stderr forwarder. Returns false if it panicked or was cancelled.
async fn join_forwarder(handle: JoinHandle<()>, game_name: &str) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(game = %game_name, error = %e, "stderr forwarder failed");
            false
        }
    }
}

fn update_config(mut config: Config, sub: &ArgMatches) -> anyhow::Result<()> {
    let mut changed = false;
    if let Some(dir) = sub.get_one::<String>("set_install_dir") {
        config.install_dir = dir.clone();
        changed = true;
    }
    if let Some(wine) = sub.get_one::<String>("set_wine") {
        config.wine_command = wine.clone();
        changed = true;
    }

    if changed {
        config.save()?;
        tracing::info!(path = %config.file_path().display(), "configuration updated");
    }
    if sub.get_flag("show") || !changed {
        println!("Config file:  {}", config.file_path().display());
        println!("Install dir:  {}", config.install_dir);
        println!("Wine command: {}", config.wine_command);
    }
    Ok(())
}
