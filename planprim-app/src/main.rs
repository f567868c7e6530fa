use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use planprim_config::{AppConfig, ConfigError};
use planprim_frontend::ConvertStatus;
use planprim_frontend::convert::{ConvertOverrides, ConvertRequest};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// 把平面图矢量页面转换为固定格式的图元集合。
#[derive(Parser)]
#[command(name = "planprim")]
#[command(about = "Convert floor-plan vector pages into normalized primitive sets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one page dump into the primitive JSON format
    Convert {
        /// Page dump produced by the renderer
        input: PathBuf,
        /// Output path (defaults to `<input stem>_s2.json` beside the input)
        output: Option<PathBuf>,
        /// Configuration file (overrides discovery)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Page index to process
        #[arg(long)]
        page: Option<usize>,
        /// Canvas size of the longer page side
        #[arg(long)]
        target_size: Option<f64>,
        /// Keep geometry under text blocks
        #[arg(long)]
        no_exclude_text: bool,
        /// Keep title block and legend areas
        #[arg(long)]
        no_crop: bool,
        /// Also print the result JSON to stdout
        #[arg(long)]
        print: bool,
    },

    /// Report pages, layers and draw items of a page dump
    Inspect {
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

const EXIT_FAILURE: u8 = 1;
const EXIT_FILTERED_EMPTY: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            page,
            target_size,
            no_exclude_text,
            no_crop,
            print,
        } => {
            let config = configure(config);
            let request = ConvertRequest {
                input,
                output,
                overrides: ConvertOverrides {
                    page,
                    target_size,
                    no_exclude_text,
                    no_crop,
                },
            };
            match planprim_frontend::run_convert(&request, &config, print) {
                Ok(ConvertStatus::Written) => ExitCode::SUCCESS,
                Ok(ConvertStatus::FilteredEmpty) => ExitCode::from(EXIT_FILTERED_EMPTY),
                Err(err) => {
                    error!(stage = err.stage(), error = %err, "转换失败");
                    eprintln!("错误（{}）：{err}", err.stage());
                    ExitCode::from(EXIT_FAILURE)
                }
            }
        }
        Commands::Inspect { input, config } => {
            let config = configure(config);
            info!(input = %input.display(), "检查文档");
            match planprim_frontend::run_inspect(&input, &config) {
                Ok(_) => ExitCode::SUCCESS,
                Err(err) => {
                    error!(stage = err.stage(), error = %err, "检查失败");
                    eprintln!("错误（{}）：{err}", err.stage());
                    ExitCode::from(EXIT_FAILURE)
                }
            }
        }
    }
}

/// 先加载配置再初始化日志，回退警告在订阅者就绪后补发。
fn configure(override_path: Option<PathBuf>) -> AppConfig {
    let (config, fallback) = load_configuration(override_path);
    init_logging(&config);
    if let Some(fallback) = fallback {
        fallback.report();
    }
    config
}

/// 配置加载失败、已回退到默认值的原因。
enum ConfigFallback {
    Explicit { path: PathBuf, error: ConfigError },
    Discovered(ConfigError),
}

impl ConfigFallback {
    fn report(&self) {
        match self {
            ConfigFallback::Explicit { path, error } => {
                warn!(path = %path.display(), error = %error, "加载指定配置失败，使用默认配置");
            }
            ConfigFallback::Discovered(error) => match error {
                ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                    warn!(path = %path.display(), error = %error, "加载默认配置失败，使用内建默认值");
                }
                ConfigError::Context { .. } => {
                    warn!(error = %error, "加载默认配置失败，使用内建默认值");
                }
            },
        }
    }
}

fn load_configuration(override_path: Option<PathBuf>) -> (AppConfig, Option<ConfigFallback>) {
    match override_path {
        Some(path) => match AppConfig::from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(error) => (
                AppConfig::default(),
                Some(ConfigFallback::Explicit { path, error }),
            ),
        },
        None => match AppConfig::discover() {
            Ok(cfg) => (cfg, None),
            Err(error) => (AppConfig::default(), Some(ConfigFallback::Discovered(error))),
        },
    }
}

/// 日志写到标准错误，标准输出留给摘要与 `--print` 的 JSON。
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
