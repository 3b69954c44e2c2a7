use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the asset directory.
pub const DATA_PATH_ENV: &str = "BLITKIT_DATA_PATH";
/// Environment variable selecting the swapchain present mode.
pub const PRESENT_MODE_ENV: &str = "BLITKIT_PRESENT_MODE";
/// Environment variable enabling per-command draw logging.
pub const DEBUG_DRAW_ENV: &str = "BLITKIT_DEBUG_DRAW";

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Initial width in logical pixels.
    pub width: u32,
    /// Initial height in logical pixels.
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "blitkit demo".to_string(),
            width: 640,
            height: 480,
            resizable: true,
        }
    }
}

impl WindowConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }
}

/// Frame loop pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Sleep after each presented frame, so the loop does not spin a full core.
    pub frame_delay: Duration,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_delay: Duration::from_millis(1),
        }
    }
}

/// Directory the lessons load their images and fonts from.
///
/// `BLITKIT_DATA_PATH` wins when set and non-empty; otherwise `data/` next to
/// this crate's manifest.
pub fn data_dir() -> PathBuf {
    data_dir_from(std::env::var_os(DATA_PATH_ENV).map(PathBuf::from))
}

/// Full path of an asset file inside [`data_dir`].
pub fn data_path(file: &str) -> PathBuf {
    data_dir().join(file)
}

fn data_dir_from(over: Option<PathBuf>) -> PathBuf {
    match over {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"),
    }
}

pub(crate) fn parse_present_mode(value: &str) -> Option<wgpu::PresentMode> {
    let v = value.trim().to_ascii_lowercase();
    match v.as_str() {
        "immediate" => Some(wgpu::PresentMode::Immediate),
        "mailbox" => Some(wgpu::PresentMode::Mailbox),
        "fifo" => Some(wgpu::PresentMode::Fifo),
        "auto" | "auto_vsync" => Some(wgpu::PresentMode::AutoVsync),
        "auto_no_vsync" => Some(wgpu::PresentMode::AutoNoVsync),
        _ => None,
    }
}

pub(crate) fn present_mode_from_env() -> Option<wgpu::PresentMode> {
    let v = std::env::var(PRESENT_MODE_ENV).ok()?;
    let mode = parse_present_mode(&v);
    if mode.is_none() && !v.trim().is_empty() {
        log::warn!("ignoring unknown {PRESENT_MODE_ENV}={v:?}");
    }
    mode
}

pub(crate) fn flag_from_env(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| {
            let v = v.trim().to_ascii_lowercase();
            !v.is_empty() && v != "0" && v != "false" && v != "off"
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_matches_lessons() {
        let cfg = WindowConfig::default();
        assert_eq!((cfg.width, cfg.height), (640, 480));
        assert!(cfg.resizable);
        assert_eq!(FrameConfig::default().frame_delay, Duration::from_millis(1));
    }

    #[test]
    fn data_dir_override() {
        assert_eq!(
            data_dir_from(Some(PathBuf::from("/srv/assets"))),
            PathBuf::from("/srv/assets")
        );
        let fallback = data_dir_from(Some(PathBuf::new()));
        assert!(fallback.ends_with("data"));
        assert_eq!(fallback, data_dir_from(None));
    }

    #[test]
    fn present_mode_names() {
        assert_eq!(parse_present_mode("Fifo"), Some(wgpu::PresentMode::Fifo));
        assert_eq!(parse_present_mode(" mailbox "), Some(wgpu::PresentMode::Mailbox));
        assert_eq!(parse_present_mode("auto"), Some(wgpu::PresentMode::AutoVsync));
        assert_eq!(parse_present_mode("vsync-please"), None);
    }
}
