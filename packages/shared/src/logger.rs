//! Logging setup utilities.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the quadchat library crates and the calling binary.
/// It can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "quadchat-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use quadchat_shared::logger::setup_logger;
///
/// setup_logger("quadchat-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the filter directive used when `RUST_LOG` is not set.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "quadchat_server={level},quadchat_client={level},{bin}={level},tower_http=info",
        level = default_log_level,
        bin = binary_name.replace('-', "_"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_crates_and_binary() {
        // テスト項目: デフォルトフィルタにライブラリとバイナリの両方が含まれる
        // given (前提条件):
        let binary_name = "quadchat-server";

        // when (操作):
        let filter = default_filter(binary_name, "debug");

        // then (期待する結果):
        assert!(filter.contains("quadchat_server=debug"));
        assert!(filter.contains("quadchat_client=debug"));
        // ハイフンはアンダースコアに置換される
        assert!(!filter.contains("quadchat-server"));
        assert!(filter.contains("tower_http=info"));
    }
}
