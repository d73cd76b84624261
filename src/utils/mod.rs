use anyhow::Result;
use std::path::Path;
use url::Url;

/// Longest stem produced by [`sanitize_title`]
pub const MAX_TITLE_LEN: usize = 25;

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Turn a media title into a short, lower-case, filesystem-safe stem.
///
/// Every character that is not alphanumeric, `_` or `-` becomes `_`, and the
/// result is cut to [`MAX_TITLE_LEN`] characters. Lower-casing happens first
/// because it can change the character count.
pub fn sanitize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == '_' || c == '-' => c,
            _ => '_',
        })
        .take(MAX_TITLE_LEN)
        .collect()
}

/// File name for a fetched artifact: sanitized title plus a short unique suffix
pub fn artifact_file_name(title: Option<&str>, extension: &str) -> String {
    let stem = title
        .map(sanitize_title)
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "media".to_string());
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..8];

    format!("{}_{}.{}", stem, suffix, extension)
}

/// Extract domain from URL for display purposes
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Read a scheme-less link such as `youtu.be/abc` as an https URL.
///
/// Returns `None` when the input already has a scheme, names an existing
/// path, or does not start with something shaped like a host name.
pub fn with_assumed_scheme(input: &str) -> Option<String> {
    if input.contains("://") || Path::new(input).exists() {
        return None;
    }

    let (host, _) = input.split_once('/')?;
    let tld = host.rsplit('.').next()?;
    let host_like = host.contains('.')
        && !host.starts_with('.')
        && host.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic());
    if !host_like {
        return None;
    }

    let url = format!("https://{}", input);
    Url::parse(&url).ok()?;
    Some(url)
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!("{} - required for YouTube and X/Twitter sources", yt_dlp_path));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
