use std::path::PathBuf;
use std::process;

use clap::{Arg, Command};
use tracing::{error, info};

use camera_recorder::app;
use camera_recorder::config::RecorderConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let mut command = Command::new("record")
        .version("1.0")
        .about("Records camera and microphone into an AVI file")
        .arg(
            Arg::new("output")
                .value_name("OUTPUT")
                .help("Output file, e.g. capture.avi")
                .required(false),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file")
                .default_value("record.toml"),
        );
    let usage = command.render_usage();
    let matches = command.get_matches_mut();

    let Some(output) = matches.get_one::<String>("output").map(PathBuf::from) else {
        eprintln!("{}", usage);
        process::exit(-1);
    };

    // 加载配置
    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("record.toml"));
    let config = match RecorderConfig::load(&config_path)
        .await
        .and_then(RecorderConfig::with_env_overrides)
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(-1);
        }
    };

    // 初始化日志
    common::logging::init_logging(&config.logging);

    match app::launch(&output, &config).await {
        Ok(summary) => {
            info!(
                session_id = %summary.session_id,
                exit = ?summary.exit,
                finalized = summary.state.is_finalized(),
                "Recorder finished"
            );
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            process::exit(-1);
        }
    }
}
