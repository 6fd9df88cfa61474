use chrono::{DateTime, Local};
use std::sync::OnceLock;

fn build_time_str(format: &str) -> String {
    let build_timestamp: i64 = env!("BUILD_TIME").parse().unwrap_or(0);
    let build_datetime: DateTime<Local> = DateTime::from_timestamp(build_timestamp, 0)
        .map(|utc| utc.with_timezone(&Local))
        .unwrap_or_else(Local::now);
    build_datetime.format(format).to_string()
}

pub fn get_version_info() -> &'static str {
    static INFO: OnceLock<String> = OnceLock::new();
    INFO.get_or_init(|| {
        format!(
            "faultline {}\n\
         Build Time: {}\n\
         Git Commit: {}",
            env!("CARGO_PKG_VERSION"),
            build_time_str("%Y-%m-%d %H:%M:%S %Z"),
            env!("GIT_COMMIT_HASH"),
        )
    })
}

pub fn get_short_version() -> &'static str {
    static SHORT: OnceLock<String> = OnceLock::new();
    SHORT.get_or_init(|| format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("GIT_COMMIT_HASH")))
}

pub fn get_useragent() -> String {
    format!(
        "faultline/{} (built {})",
        env!("CARGO_PKG_VERSION"),
        build_time_str("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_strings() {
        assert!(get_short_version().starts_with(env!("CARGO_PKG_VERSION")));
        assert!(get_version_info().starts_with("faultline "));
        assert!(get_useragent().starts_with("faultline/"));
    }
}
