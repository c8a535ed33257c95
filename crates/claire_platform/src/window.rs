use std::sync::Arc;
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

const MIN_WIDTH: u32 = 320;
const MIN_HEIGHT: u32 = 240;

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Claire Face Demo".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

impl PlatformConfig {
    /// Requested size, never below the minimum window size.
    pub fn inner_size(&self) -> LogicalSize<u32> {
        LogicalSize::new(self.width.max(MIN_WIDTH), self.height.max(MIN_HEIGHT))
    }
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, String> {
    log::debug!(
        "Creating window '{}' ({}x{})",
        config.title,
        config.width,
        config.height
    );
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(config.inner_size())
        .with_min_inner_size(LogicalSize::new(MIN_WIDTH, MIN_HEIGHT));

    let window = event_loop
        .create_window(attrs)
        .map_err(|e| format!("Failed to create window '{}': {e}", config.title))?;
    Ok(Arc::new(window))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_size_clamps_to_minimum() {
        let config = PlatformConfig {
            title: "tiny".to_string(),
            width: 10,
            height: 900,
        };
        let size = config.inner_size();
        assert_eq!((size.width, size.height), (MIN_WIDTH, 900));
    }

    #[test]
    fn default_matches_demo_window() {
        let size = PlatformConfig::default().inner_size();
        assert_eq!((size.width, size.height), (1280, 720));
    }
}
