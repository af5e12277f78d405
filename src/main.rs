use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;

use focus_catcher::app::game::{GamePlugin, StartupLevel};
use focus_catcher::core::config::{ConfigWarnings, GameConfig};

#[derive(Parser, Debug)]
#[command(name = "focus_catcher", about = "Visual attention training game")]
struct Cli {
    /// Jump straight into this level, skipping the menus.
    #[arg(long)]
    level: Option<u32>,
    /// Extra config layer(s) merged over assets/config/game.ron.
    #[arg(long = "config")]
    config_layers: Vec<PathBuf>,
    /// Directory the progress/session files are stored in (overrides config).
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let mut layers = vec![
        PathBuf::from("assets/config/game.ron"),
        PathBuf::from("assets/config/game.local.ron"),
    ];
    layers.extend(cli.config_layers.iter().cloned());
    let (mut cfg, used, errors) = GameConfig::load_layered(&layers);
    for e in &errors {
        eprintln!("config: {e}");
    }
    if used.is_empty() {
        eprintln!("config: no config layers found; using built-in defaults");
    }
    if let Some(dir) = cli.data_dir {
        cfg.persistence.data_dir = dir;
    }
    let warnings = cfg.validate();

    App::new()
        .insert_resource(cfg.clone())
        .insert_resource(ConfigWarnings(warnings))
        .insert_resource(StartupLevel(cli.level))
        .add_plugins(
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: cfg.window.title.clone(),
                    resolution: (cfg.window.width, cfg.window.height).into(),
                    resizable: true,
                    ..default()
                }),
                ..default()
            }),
        )
        .add_plugins(GamePlugin)
        .run();
}
