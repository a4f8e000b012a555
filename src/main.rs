mod config;
mod http;
mod ip;
mod logging;
mod report;
mod services;
mod updater;
mod util;

use std::path::PathBuf;

use clap::Parser;
use log::{error, info, warn, LevelFilter};

use report::LogReporter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Opt {
    /// Sets a custom config file. Otherwise ./config.toml, then
    /// /etc/update-ip/config.toml are tried.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level for both the console and the log file
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn check_http_backend() {
    #[cfg(feature = "curl")]
    {
        if let Err(e) = http::check_curl_version() {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let opt = Opt::parse();

    let config = match config::load(opt.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            if logging::init_console(opt.log_level).is_err() {
                eprintln!("{}", e);
            }
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(opt.log_level, &config.general) {
        // Only the file appender can fail here, nothing has been installed yet.
        if logging::init_console(opt.log_level).is_ok() {
            warn!("{}, logging to the console only", e);
        } else {
            eprintln!("{}", e);
        }
    }

    check_http_backend();

    info!("update-ip v{} started", env!("CARGO_PKG_VERSION"));

    let client = http::Client::new(&config.general.user_agent);
    let status = updater::run(&config, &client, &LogReporter);

    if status > 0 {
        error!("at least one update failed (status {})", status);
    } else {
        info!("all services are up to date");
    }

    std::process::exit(updater::exit_code(status));
}
