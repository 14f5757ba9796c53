use std::ffi::OsStr;
use std::fs::File;

use justconfig::item::ValueExtractor;
use justconfig::processors::Trim;
use justconfig::sources::env::Env;
use justconfig::sources::text::ConfigText;
use justconfig::ConfPath;
use justconfig::Config;

use crate::config_processors::Unquote;
use crate::error::RoomError;
use crate::recommend::DEFAULT_NUM_ROOMS_TO_RECOMMEND;
use crate::search::{DEFAULT_FUZZY_RATIO_THRESHOLD, DEFAULT_MAX_EDIT_DISTANCE};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: usize = 8080;
const DEFAULT_DB_PATH: &str = "./rooms.db";
const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;
const DEFAULT_NEARBY_LIMIT: usize = 10;

pub struct AppConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub data: DataConfig,
    pub recommend: RecommendConfig,
    pub search: SearchConfig,
}

pub struct ServerConfig {
    pub host: String,
    pub port: usize,
    pub num_workers: usize,
}

pub struct LogConfig {
    pub level: String,
}

pub struct DataConfig {
    pub db_path: String,
    pub seed_listings_path: Option<String>,
}

pub struct RecommendConfig {
    pub num_rooms_to_recommend: usize,
}

pub struct SearchConfig {
    pub fuzzy_ratio_threshold: u32,
    pub max_edit_distance: usize,
    pub nearby_radius_km: f64,
    pub nearby_limit: usize,
}

impl AppConfig {
    /// Reads the optional config file at `config_path`, then applies environment overrides.
    pub fn new(config_path: &str) -> Result<AppConfig, RoomError> {
        let mut conf = Config::default();

        if let Ok(config_file) = File::open(config_path) {
            let config_text = ConfigText::new(config_file, config_path).map_err(config_error)?;
            conf.add_source(config_text);
        }

        let config_env = Env::new(&[
            (
                ConfPath::from(&["data", "db_path"]),
                OsStr::new("ROOMS_DB_PATH"),
            ),
            (
                ConfPath::from(&["data", "seed_listings_path"]),
                OsStr::new("SEED_LISTINGS"),
            ),
            (
                ConfPath::from(&["server", "num_workers"]),
                OsStr::new("NUM_WORKERS"),
            ),
            (ConfPath::from(&["log", "level"]), OsStr::new("LOG_LEVEL")),
        ]);
        conf.add_source(config_env);

        AppConfig::parse(&conf)
    }

    fn parse(conf: &Config) -> Result<AppConfig, RoomError> {
        Ok(AppConfig {
            server: ServerConfig::parse(conf, ConfPath::from(&["server"]))?,
            log: LogConfig::parse(conf, ConfPath::from(&["log"]))?,
            data: DataConfig::parse(conf, ConfPath::from(&["data"]))?,
            recommend: RecommendConfig::parse(conf, ConfPath::from(&["recommend"]))?,
            search: SearchConfig::parse(conf, ConfPath::from(&["search"]))?,
        })
    }
}

impl ServerConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<ServerConfig, RoomError> {
        Ok(ServerConfig {
            host: conf
                .get(path.push("host"))
                .unquote()
                .try_value()
                .map_err(config_error)?
                .unwrap_or_else(|| String::from(DEFAULT_HOST)),
            port: conf
                .get(path.push("port"))
                .trim()
                .try_value()
                .map_err(config_error)?
                .unwrap_or(DEFAULT_PORT),
            num_workers: conf
                .get(path.push("num_workers"))
                .trim()
                .try_value()
                .map_err(config_error)?
                // Detect number of CPUs
                .unwrap_or_else(|| sys_info::cpu_num().map(|cpus| cpus as usize).unwrap_or(1)),
        })
    }
}

impl LogConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<LogConfig, RoomError> {
        Ok(LogConfig {
            level: conf
                .get(path.push("level"))
                .unquote()
                .try_value()
                .map_err(config_error)?
                .unwrap_or_default(),
        })
    }
}

impl DataConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<DataConfig, RoomError> {
        let seed_listings_path: Option<String> = conf
            .get(path.push("seed_listings_path"))
            .unquote()
            .try_value()
            .map_err(config_error)?;
        Ok(DataConfig {
            db_path: conf
                .get(path.push("db_path"))
                .unquote()
                .try_value()
                .map_err(config_error)?
                .unwrap_or_else(|| String::from(DEFAULT_DB_PATH)),
            seed_listings_path: seed_listings_path.filter(|path| !path.trim().is_empty()),
        })
    }
}

impl RecommendConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<RecommendConfig, RoomError> {
        Ok(RecommendConfig {
            num_rooms_to_recommend: conf
                .get(path.push("num_rooms_to_recommend"))
                .trim()
                .try_value()
                .map_err(config_error)?
                .unwrap_or(DEFAULT_NUM_ROOMS_TO_RECOMMEND),
        })
    }
}

impl SearchConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<SearchConfig, RoomError> {
        let fuzzy_ratio_threshold: u32 = conf
            .get(path.push("fuzzy_ratio_threshold"))
            .trim()
            .try_value()
            .map_err(config_error)?
            .unwrap_or(DEFAULT_FUZZY_RATIO_THRESHOLD);
        if fuzzy_ratio_threshold > 100 {
            return Err(RoomError::Config(format!(
                "search.fuzzy_ratio_threshold must be within 0..=100, got {}",
                fuzzy_ratio_threshold
            )));
        }
        let nearby_radius_km: f64 = conf
            .get(path.push("nearby_radius_km"))
            .trim()
            .try_value()
            .map_err(config_error)?
            .unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
        if !(nearby_radius_km.is_finite() && nearby_radius_km > 0.0) {
            return Err(RoomError::Config(format!(
                "search.nearby_radius_km must be positive, got {}",
                nearby_radius_km
            )));
        }

        Ok(SearchConfig {
            fuzzy_ratio_threshold,
            max_edit_distance: conf
                .get(path.push("max_edit_distance"))
                .trim()
                .try_value()
                .map_err(config_error)?
                .unwrap_or(DEFAULT_MAX_EDIT_DISTANCE),
            nearby_radius_km,
            nearby_limit: conf
                .get(path.push("nearby_limit"))
                .trim()
                .try_value()
                .map_err(config_error)?
                .unwrap_or(DEFAULT_NEARBY_LIMIT),
        })
    }
}

fn config_error(err: impl std::fmt::Display) -> RoomError {
    RoomError::Config(err.to_string())
}
