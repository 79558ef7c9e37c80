mod platform;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from(platform::config::DEFAULT_CONFIG_FILE));
    platform::run_app(&config_path)
}
