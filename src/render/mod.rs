//! Page rendering collaborator
//!
//! The crawler never fetches page content itself; it asks a [`Renderer`] for the
//! rendered page and its ad geometry. [`HttpRenderer`] is the bundled
//! implementation: it fetches static HTML with `reqwest` and estimates geometry from
//! markup and inline styles (see [`layout`]).

mod http;
pub mod layout;

pub use http::HttpRenderer;

use crate::model::AdElement;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while rendering a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Render timed out: {0}")]
    Timeout(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for RenderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RenderError::Timeout(e.to_string())
        } else if e.is_body() || e.is_decode() {
            RenderError::Body(e.to_string())
        } else {
            RenderError::Transport(e.to_string())
        }
    }
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const DESKTOP: Viewport = Viewport {
        width: 1366,
        height: 768,
    };

    pub const MOBILE: Viewport = Viewport {
        width: 390,
        height: 844,
    };

    pub fn area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }
}

/// An axis-aligned box in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Area of the intersection with `other`
    pub fn overlap_area(&self, other: &Rect) -> f64 {
        let x_overlap =
            ((self.x + self.width).min(other.x + other.width) - self.x.max(other.x)).max(0.0);
        let y_overlap =
            ((self.y + self.height).min(other.y + other.height) - self.y.max(other.y)).max(0.0);
        x_overlap * y_overlap
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlap_area(other) > 0.0
    }
}

/// A run of visible text with its position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub rect: Rect,
}

/// An ad disclosure label ("Advertisement", "Sponsored") with its styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelBlock {
    pub text: String,
    pub rect: Rect,
    /// Font size in pixels
    pub font_size: f64,
    pub opacity: f64,
}

/// Render side-channel data consumed by the detectors
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderExtras {
    /// Response headers, lowercase names
    pub headers: BTreeMap<String, String>,
    pub has_noindex_meta: bool,
    pub has_google_ad_client: bool,
    /// Modal overlays covering most of the viewport
    pub overlays: Vec<Rect>,
    pub text_blocks: Vec<TextBlock>,
    pub label_blocks: Vec<LabelBlock>,
}

/// Everything a render produces
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedPage {
    pub final_url: String,
    pub status: u16,
    pub html: String,
    pub visible_text: String,
    pub request_counts: BTreeMap<String, u32>,
    pub ad_elements: Vec<AdElement>,
    pub extras: RenderExtras,
}

/// Mobile abusive-experience heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MobileFlags {
    pub autoplay_audio: bool,
    pub sticky_elements: bool,
    pub popup_on_load: bool,
}

impl MobileFlags {
    pub fn any(&self) -> bool {
        self.autoplay_audio || self.sticky_elements || self.popup_on_load
    }
}

/// Renders pages for the crawler
///
/// Implementations bound their own concurrency; a worker may wait inside
/// `render` for admission.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Renders `url` at `viewport`
    async fn render(&self, url: &str, viewport: Viewport) -> Result<RenderedPage, RenderError>;

    /// Evaluates the mobile heuristics for `url` at `viewport`
    async fn collect_mobile_flags(
        &self,
        url: &str,
        viewport: Viewport,
    ) -> Result<MobileFlags, RenderError>;
}
