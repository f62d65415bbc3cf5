use std::path::PathBuf;

/// Client configuration, loaded from environment variables.
pub struct Config {
    /// Base URL of the recognition service.
    pub base_url: String,
    /// Upload size ceiling in bytes, checked before compression/encoding.
    pub max_upload_bytes: u64,
    /// Fixed canvas footprint for the preview overlay.
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Optional TTF font for overlay labels.
    pub font_path: Option<PathBuf>,
    /// JSON key-value store backing the usage log and cached profile data.
    pub store_path: PathBuf,
}

impl Config {
    /// Load configuration from `EMOTISYNC_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("emotisync");

        Self {
            base_url: std::env::var("EMOTISYNC_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string()),
            max_upload_bytes: env_u64("EMOTISYNC_MAX_UPLOAD_BYTES", 4 * 1024 * 1024),
            canvas_width: env_u32("EMOTISYNC_CANVAS_WIDTH", 300),
            canvas_height: env_u32("EMOTISYNC_CANVAS_HEIGHT", 300),
            font_path: std::env::var("EMOTISYNC_FONT_PATH").map(PathBuf::from).ok(),
            store_path: std::env::var("EMOTISYNC_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("store.json")),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
