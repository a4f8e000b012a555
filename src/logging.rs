use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::delete::DeleteRoller;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::roll::Roll;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use thiserror::Error;

use crate::config::General;

const CONSOLE_PATTERN: &str = "{l} {m}{n}";
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l} {m}{n}";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unable to open log file {0}: {1}")]
    File(Box<str>, std::io::Error),

    #[error("invalid log rotation settings: {0}")]
    Rotation(Box<str>),

    #[error("invalid logging configuration: {0}")]
    Config(Box<str>),

    #[error("unable to install the logger: {0}")]
    Install(#[from] log::SetLoggerError),
}

fn console() -> Appender {
    let stdout = ConsoleAppender::builder()
        .target(Target::Stdout)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    Appender::builder().build("stdout", Box::new(stdout))
}

fn rolling_file(path: &str, general: &General) -> Result<Appender, LoggingError> {
    // With no backups kept, a full file is simply thrown away.
    let roller: Box<dyn Roll> = match general.log_backups {
        0 => Box::new(DeleteRoller::new()),
        count => Box::new(
            FixedWindowRoller::builder()
                .base(1)
                .build(&format!("{}.{{}}", path), count)
                .map_err(|e| LoggingError::Rotation(e.to_string().into()))?,
        ),
    };

    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(general.log_max_size)), roller);

    let file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(path, Box::new(policy))
        .map_err(|e| LoggingError::File(path.into(), e))?;

    Ok(Appender::builder().build("file", Box::new(file)))
}

/// Console output always, plus the rotating log file when `log_file` is set.
pub fn build(level: LevelFilter, general: &General) -> Result<Config, LoggingError> {
    let mut config = Config::builder().appender(console());
    let mut root = Root::builder().appender("stdout");

    if let Some(path) = &general.log_file {
        config = config.appender(rolling_file(path, general)?);
        root = root.appender("file");
    }

    config
        .build(root.build(level))
        .map_err(|e| LoggingError::Config(e.to_string().into()))
}

pub fn init(level: LevelFilter, general: &General) -> Result<(), LoggingError> {
    log4rs::init_config(build(level, general)?)?;
    Ok(())
}

/// Used before a config is available, or when the log file cannot be opened.
pub fn init_console(level: LevelFilter) -> Result<(), LoggingError> {
    init(level, &General::default())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_log(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("update-ip-{}-{}.log", name, std::process::id()))
    }

    fn appender_names(config: &Config) -> Vec<&str> {
        config.appenders().iter().map(|a| a.name()).collect()
    }

    #[test]
    fn console_only_by_default() {
        let config = build(LevelFilter::Info, &General::default()).unwrap();

        assert_eq!(appender_names(&config), ["stdout"]);
        assert_eq!(config.root().level(), LevelFilter::Info);
    }

    #[test]
    fn log_file_is_written_next_to_the_console() {
        let path = temp_log("rolling");
        let general = General {
            log_file: Some(path.to_string_lossy().into()),
            ..General::default()
        };

        let config = build(LevelFilter::Warn, &general).unwrap();

        assert_eq!(appender_names(&config), ["stdout", "file"]);
        assert_eq!(config.root().appenders(), ["stdout", "file"]);
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn zero_backups_is_accepted() {
        let path = temp_log("no-backups");
        let general = General {
            log_file: Some(path.to_string_lossy().into()),
            log_backups: 0,
            ..General::default()
        };

        assert!(build(LevelFilter::Info, &general).is_ok());
        let _ = std::fs::remove_file(&path);
    }
}
