use std::path::PathBuf;
use std::process;

use clap::{Arg, Command};
use tracing::{error, info};

use media_player::app;
use media_player::config::PlayerConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let mut command = Command::new("mplayer")
        .version("1.0")
        .about("Plays an audio resource with scripted skip-ahead and speed-up")
        .arg(
            Arg::new("uri")
                .value_name("URI")
                .help("Resource to play, e.g. file:///tmp/song.ogg")
                .required(false),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file")
                .default_value("mplayer.toml"),
        );
    let usage = command.render_usage();
    let matches = command.get_matches_mut();

    let Some(uri) = matches.get_one::<String>("uri") else {
        eprintln!("{}", usage);
        process::exit(-1);
    };

    // 加载配置
    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("mplayer.toml"));
    let config = match PlayerConfig::load(&config_path)
        .await
        .and_then(PlayerConfig::with_env_overrides)
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(-1);
        }
    };

    // 初始化日志
    common::logging::init_logging(&config.logging);

    match app::launch(uri, &config).await {
        Ok(summary) => {
            info!(session_id = %summary.session_id, exit = ?summary.exit, "Player finished");
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            process::exit(-1);
        }
    }
}
