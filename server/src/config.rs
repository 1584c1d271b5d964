//! Server configuration
//!
//! Configuration is loaded from environment variables. Unset or unparsable values keep their
//! defaults.

use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Class names the pixel service reports for points without a meaningful classification
pub const DEFAULT_NO_DATA_LABELS: &[&str] = &["No Data", "Unknown"];

/// Main server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,

    /// Remote pixel classification service
    pub pixel_service: PixelServiceConfig,

    /// Hover query behaviour
    pub hover: HoverConfig,

    /// Area-of-interest boundary
    pub aoi: AoiConfig,

    /// Precomputed statistics
    pub stats: StatsConfig,

    /// Static frontend files
    pub static_files: StaticFilesConfig,

    /// Pre-rendered map tiles
    pub tiles: TilesConfig,
}

/// Pixel service configuration
#[derive(Debug, Clone)]
pub struct PixelServiceConfig {
    /// Base URL; lookups go to `{base_url}/api/pixel`
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

/// Hover query configuration
#[derive(Debug, Clone)]
pub struct HoverConfig {
    /// Minimum spacing between two issued pixel lookups
    pub throttle_interval: Duration,
    /// Sentinel class names treated as "no result" when rendering
    pub no_data_labels: BTreeSet<String>,
}

/// AOI configuration
#[derive(Debug, Clone, Default)]
pub struct AoiConfig {
    /// GeoJSON Feature describing the dashboard's area of interest
    pub boundary_path: Option<PathBuf>,
}

/// Statistics configuration
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Directory holding `summary_stats.json` and `transition_matrix.json`
    pub stats_dir: PathBuf,
}

/// Static file serving configuration
#[derive(Debug, Clone, Default)]
pub struct StaticFilesConfig {
    /// Built frontend directory (serving disabled when unset)
    pub dir: Option<PathBuf>,
}

/// Map tile configuration
#[derive(Debug, Clone)]
pub struct TilesConfig {
    /// Root of the `{layer}/{z}/{x}/{y}.png` tile pyramids, served under `/tiles`
    pub dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            pixel_service: PixelServiceConfig::default(),
            hover: HoverConfig::default(),
            aoi: AoiConfig::default(),
            stats: StatsConfig::default(),
            static_files: StaticFilesConfig::default(),
            tiles: TilesConfig::default(),
        }
    }
}

impl Default for PixelServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8001".to_string(),
            request_timeout: Duration::from_millis(2000),
        }
    }
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            throttle_interval: Duration::from_millis(100),
            no_data_labels: DEFAULT_NO_DATA_LABELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            stats_dir: PathBuf::from("data/processed/stats"),
        }
    }
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("backend/static/tiles"),
        }
    }
}

/// Parse a comma separated label list, ignoring blank entries
fn parse_labels(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Server config
        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("PORT")
            && let Ok(p) = port.parse()
        {
            config.port = p;
        }

        // Pixel service config
        if let Ok(url) = env::var("PIXEL_SERVICE_URL")
            && !url.is_empty()
        {
            config.pixel_service.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(val) = env::var("PIXEL_REQUEST_TIMEOUT_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            config.pixel_service.request_timeout = Duration::from_millis(ms);
        }

        // Hover config
        if let Ok(val) = env::var("HOVER_THROTTLE_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            config.hover.throttle_interval = Duration::from_millis(ms);
        }
        if let Ok(val) = env::var("NO_DATA_LABELS") {
            let labels = parse_labels(&val);
            if !labels.is_empty() {
                config.hover.no_data_labels = labels;
            }
        }

        // AOI config
        if let Ok(path) = env::var("AOI_BOUNDARY_PATH")
            && !path.is_empty()
        {
            config.aoi.boundary_path = Some(PathBuf::from(path));
        }

        // Stats config
        if let Ok(path) = env::var("STATS_DIR")
            && !path.is_empty()
        {
            config.stats.stats_dir = PathBuf::from(path);
        }

        // Static files
        if let Ok(path) = env::var("STATIC_FILES_DIR")
            && !path.is_empty()
        {
            config.static_files.dir = Some(PathBuf::from(path));
        }

        // Map tiles
        if let Ok(path) = env::var("TILES_DIR")
            && !path.is_empty()
        {
            config.tiles.dir = PathBuf::from(path);
        }

        config
    }
}
