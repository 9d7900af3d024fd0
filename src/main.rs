mod app_logic;
mod console_host;
mod core;

use crate::app_logic::handler::{APP_NAME, OutlineAppLogic};
use crate::console_host::ConsoleIo;
use crate::core::{
    CoreConfigManager, CoreDocumentFiles, CoreStateStore, StateStoreOperations, path_utils,
};
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

const LOG_FILE_NAME: &str = "outline_keeper.log";

#[derive(Debug)]
struct CliOptions {
    data_dir: Option<PathBuf>,
    log_level: LevelFilter,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        data_dir: None,
        log_level: LevelFilter::Info,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                let dir = args.next().ok_or("--data-dir needs a directory")?;
                options.data_dir = Some(PathBuf::from(dir));
            }
            "--log-level" => {
                let level = args.next().ok_or("--log-level needs a level")?;
                options.log_level = level
                    .parse()
                    .map_err(|_| format!("unknown log level '{level}'"))?;
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(options)
}

/*
 * Warnings and errors go to the terminal; everything at `file_level` and above
 * goes to a log file in the data directory. Without a data directory only the
 * terminal logger is installed.
 */
fn init_logging(data_dir: Option<&PathBuf>, file_level: LevelFilter) {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(dir) = data_dir {
        match fs::create_dir_all(dir).and_then(|_| File::create(dir.join(LOG_FILE_NAME))) {
            Ok(file) => loggers.push(WriteLogger::new(file_level, Config::default(), file)),
            Err(e) => eprintln!("Could not open log file in {dir:?}: {e}"),
        }
    }
    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Logging was already initialized: {e}");
    }
}

#[cfg(test)]
pub(crate) fn initialize_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = simplelog::TestLogger::init(LevelFilter::Debug, Config::default());
    });
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = parse_args(std::env::args().skip(1))?;
    let data_dir = options
        .data_dir
        .clone()
        .or_else(|| path_utils::get_base_app_config_local_dir(APP_NAME));
    init_logging(data_dir.as_ref(), options.log_level);
    log::info!("Starting {APP_NAME} with data directory {data_dir:?}");

    let (state_store, config_manager) = match &data_dir {
        Some(dir) => (
            CoreStateStore::with_directory(dir.clone()),
            CoreConfigManager::with_directory(dir.clone()),
        ),
        None => {
            log::warn!("No data directory available; changes will not be saved.");
            (CoreStateStore::new(APP_NAME), CoreConfigManager::new(APP_NAME))
        }
    };

    log::info!("Outline is stored at {:?}", state_store.storage_path());

    let mut logic = OutlineAppLogic::new(
        Arc::new(state_store),
        Arc::new(config_manager),
        Arc::new(CoreDocumentFiles::new()),
    );
    logic.on_startup();

    let stdin = io::stdin();
    let mut console = ConsoleIo::new(stdin.lock(), io::stdout());
    console_host::run_console(&mut logic, &mut console)?;
    log::info!("{APP_NAME} exiting.");
    Ok(())
}
