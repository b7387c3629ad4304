//! Static layout estimation
//!
//! Without a browser engine, element boxes are estimated by a single block-flow
//! pass over the DOM: every element stacks vertically inside its parent, text
//! wraps at a fixed character width and line height, and inline `style` lengths
//! (`width`, `height`, `top`, `left`, `position`) override the estimate.
//! Absolutely positioned and fixed elements leave the flow.

use super::{LabelBlock, MobileFlags, Rect, TextBlock, Viewport};
use crate::model::AdElement;
use scraper::{ElementRef, Html, Selector};

/// Selectors identifying ad-bearing nodes
pub const AD_SELECTORS: [&str; 5] = [
    "iframe[src*='googlesyndication']",
    "iframe[id*='google_ads']",
    "ins.adsbygoogle",
    "[data-ad-client]",
    "[data-ad-slot]",
];

const LINE_HEIGHT: f64 = 20.0;
const CHAR_WIDTH: f64 = 8.0;
const DEFAULT_FONT_SIZE: f64 = 16.0;
const NAV_BAND_HEIGHT: f64 = 120.0;
const OVERLAY_COVERAGE: f64 = 0.6;
const STICKY_COVERAGE: f64 = 0.3;
/// Subtrees nested deeper than this are not laid out and take no space
const MAX_LAYOUT_DEPTH: usize = 256;

const SKIPPED_TAGS: [&str; 9] = [
    "head", "script", "style", "noscript", "template", "meta", "link", "title", "svg",
];
const CLICKABLE_TAGS: [&str; 4] = ["a", "button", "input", "select"];
const CONTENT_TAGS: [&str; 4] = ["main", "article", "section", "div"];
const AD_LABELS: [&str; 7] = [
    "ad",
    "ads",
    "advertisement",
    "advertisements",
    "sponsored",
    "sponsored links",
    "paid content",
];

/// Geometry and signals extracted from one document at one viewport
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub ads: Vec<AdElement>,
    pub overlays: Vec<Rect>,
    pub text_blocks: Vec<TextBlock>,
    pub label_blocks: Vec<LabelBlock>,
    pub has_noindex_meta: bool,
    pub has_google_ad_client: bool,
    pub mobile_flags: MobileFlags,
}

/// Analyzes `html` as laid out in `viewport`
pub fn analyze(html: &str, viewport: Viewport) -> PageLayout {
    let document = Html::parse_document(html);
    let mut walker = Walker::new(viewport);

    walker.walk(
        document.root_element(),
        0.0,
        0.0,
        f64::from(viewport.width),
        0,
    );

    let mut layout = walker.finish();
    layout.has_noindex_meta = has_noindex_meta(&document);
    layout.has_google_ad_client = has_google_ad_client(&document);
    layout
}

/// Returns true if a robots meta tag carries `noindex`
pub fn has_noindex_meta(document: &Html) -> bool {
    let Ok(selector) = Selector::parse("meta[name][content]") else {
        return false;
    };

    document.select(&selector).any(|meta| {
        let name = meta.value().attr("name").unwrap_or("");
        let content = meta.value().attr("content").unwrap_or("");
        name.eq_ignore_ascii_case("robots") && content.to_lowercase().contains("noindex")
    })
}

fn has_google_ad_client(document: &Html) -> bool {
    let Ok(selector) = Selector::parse("script") else {
        return false;
    };

    document
        .select(&selector)
        .any(|script| script.text().any(|t| t.contains("google_ad_client")))
}

/// A CSS length from an inline style
#[derive(Debug, Clone, Copy, PartialEq)]
enum Length {
    Px(f64),
    Percent(f64),
    Vw(f64),
    Vh(f64),
}

impl Length {
    fn parse(value: &str) -> Option<Length> {
        let value = value.trim().trim_end_matches("!important").trim();
        if let Some(n) = value.strip_suffix("px") {
            n.trim().parse().ok().map(Length::Px)
        } else if let Some(n) = value.strip_suffix('%') {
            n.trim().parse().ok().map(Length::Percent)
        } else if let Some(n) = value.strip_suffix("vw") {
            n.trim().parse().ok().map(Length::Vw)
        } else if let Some(n) = value.strip_suffix("vh") {
            n.trim().parse().ok().map(Length::Vh)
        } else {
            value.parse().ok().map(Length::Px)
        }
    }

    fn resolve(self, reference: f64, viewport: Viewport) -> f64 {
        match self {
            Length::Px(v) => v,
            Length::Percent(p) => reference * p / 100.0,
            Length::Vw(v) => f64::from(viewport.width) * v / 100.0,
            Length::Vh(v) => f64::from(viewport.height) * v / 100.0,
        }
    }
}

/// The subset of inline style the estimator understands
#[derive(Debug, Clone, Default)]
struct InlineStyle {
    width: Option<Length>,
    height: Option<Length>,
    top: Option<Length>,
    left: Option<Length>,
    position: Option<String>,
    hidden: bool,
    font_size: Option<f64>,
    opacity: Option<f64>,
}

impl InlineStyle {
    fn parse(style: &str) -> Self {
        let mut parsed = InlineStyle::default();

        for declaration in style.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let property = property.trim().to_lowercase();
            let value = value.trim().to_lowercase();

            match property.as_str() {
                "width" => parsed.width = Length::parse(&value),
                "height" => parsed.height = Length::parse(&value),
                "top" => parsed.top = Length::parse(&value),
                "left" => parsed.left = Length::parse(&value),
                "position" => parsed.position = Some(value),
                "display" => parsed.hidden |= value == "none",
                "visibility" => parsed.hidden |= value == "hidden",
                "font-size" => {
                    parsed.font_size = match Length::parse(&value) {
                        Some(Length::Px(px)) => Some(px),
                        Some(Length::Percent(p)) => Some(DEFAULT_FONT_SIZE * p / 100.0),
                        _ => None,
                    }
                }
                "opacity" => parsed.opacity = value.parse().ok(),
                _ => {}
            }
        }

        parsed
    }

    fn is_out_of_flow(&self) -> bool {
        matches!(self.position.as_deref(), Some("absolute") | Some("fixed"))
    }

    fn is_pinned(&self) -> bool {
        matches!(self.position.as_deref(), Some("fixed") | Some("sticky"))
    }
}

/// Preorder span of an element's subtree, used for ancestry checks
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.start <= self.end
    }
}

struct Walker {
    viewport: Viewport,
    ad_selectors: Vec<(&'static str, Selector)>,
    overlay_selector: Option<Selector>,
    popup_selector: Option<Selector>,
    counter: usize,
    text_chars: usize,
    ads: Vec<(AdElement, Span)>,
    clickables: Vec<Rect>,
    content_candidates: Vec<(usize, Rect, Span)>,
    overlays: Vec<Rect>,
    text_blocks: Vec<TextBlock>,
    label_blocks: Vec<LabelBlock>,
    flags: MobileFlags,
}

impl Walker {
    fn new(viewport: Viewport) -> Self {
        let ad_selectors = AD_SELECTORS
            .iter()
            .filter_map(|s| Selector::parse(s).ok().map(|sel| (*s, sel)))
            .collect();

        Self {
            viewport,
            ad_selectors,
            overlay_selector: Selector::parse("[role='dialog'], .modal, .overlay").ok(),
            popup_selector: Selector::parse("[role='dialog'], .modal, .popup").ok(),
            counter: 0,
            text_chars: 0,
            ads: Vec::new(),
            clickables: Vec::new(),
            content_candidates: Vec::new(),
            overlays: Vec::new(),
            text_blocks: Vec::new(),
            label_blocks: Vec::new(),
            flags: MobileFlags::default(),
        }
    }

    /// Lays out `element` at (`x`, `y`) and returns the vertical space it
    /// consumes in its parent's flow
    fn walk(
        &mut self,
        element: ElementRef<'_>,
        x: f64,
        y: f64,
        available_width: f64,
        depth: usize,
    ) -> f64 {
        let name = element.value().name();
        if SKIPPED_TAGS.contains(&name) || depth >= MAX_LAYOUT_DEPTH {
            return 0.0;
        }

        let style = element
            .value()
            .attr("style")
            .map(InlineStyle::parse)
            .unwrap_or_default();
        if style.hidden || element.value().attr("hidden").is_some() {
            return 0.0;
        }

        self.counter += 1;
        let start = self.counter;
        let chars_before = self.text_chars;
        let viewport_height = f64::from(self.viewport.height);

        let bx = x + style
            .left
            .map(|l| l.resolve(available_width, self.viewport))
            .unwrap_or(0.0);
        let by = if style.is_out_of_flow() {
            style
                .top
                .map(|t| t.resolve(viewport_height, self.viewport))
                .unwrap_or(y)
        } else {
            y
        };
        let width = style
            .width
            .map(|w| w.resolve(available_width, self.viewport))
            .or_else(|| attr_px(element, "width"))
            .unwrap_or(available_width)
            .max(0.0);

        let mut cursor = by;
        let mut own_text = String::new();
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                cursor += self.walk(child_element, bx, cursor, width, depth + 1);
            } else if let Some(text) = child.value().as_text() {
                let collapsed = collapse_whitespace(text);
                if collapsed.is_empty() {
                    continue;
                }
                self.text_chars += collapsed.chars().count();
                cursor += text_height(&collapsed, width);
                if !own_text.is_empty() {
                    own_text.push(' ');
                }
                own_text.push_str(&collapsed);
            }
        }

        let content_height = cursor - by;
        let height = style
            .height
            .map(|h| h.resolve(viewport_height, self.viewport))
            .or_else(|| attr_px(element, "height"))
            .or_else(|| replaced_default_height(name, content_height))
            .unwrap_or(content_height)
            .max(0.0);

        let rect = Rect::new(bx, by, width, height);
        let span = Span {
            start,
            end: self.counter,
        };
        let text_len = self.text_chars - chars_before;
        self.record(element, name, &style, rect, span, text_len, own_text);

        if style.is_out_of_flow() {
            0.0
        } else {
            height
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &mut self,
        element: ElementRef<'_>,
        name: &str,
        style: &InlineStyle,
        rect: Rect,
        span: Span,
        text_len: usize,
        own_text: String,
    ) {
        if let Some((selector, _)) = self
            .ad_selectors
            .iter()
            .find(|(_, sel)| sel.matches(&element))
        {
            let ad = AdElement::new(*selector, rect.x, rect.y, rect.width, rect.height);
            self.ads.push((ad, span));
        }

        if CLICKABLE_TAGS.contains(&name) {
            self.clickables.push(rect);
        }

        if CONTENT_TAGS.contains(&name) {
            self.content_candidates.push((text_len, rect, span));
        }

        if let Some(selector) = &self.overlay_selector {
            if selector.matches(&element)
                && rect.area() > self.viewport.area() * OVERLAY_COVERAGE
            {
                self.overlays.push(rect);
            }
        }

        if let Some(selector) = &self.popup_selector {
            if selector.matches(&element) && rect.area() > 0.0 {
                self.flags.popup_on_load = true;
            }
        }

        if style.is_pinned() && rect.height > f64::from(self.viewport.height) * STICKY_COVERAGE {
            self.flags.sticky_elements = true;
        }

        if name == "video"
            && element.value().attr("autoplay").is_some()
            && element.value().attr("muted").is_none()
        {
            self.flags.autoplay_audio = true;
        }

        if own_text.is_empty() {
            return;
        }

        if is_ad_label(&own_text) {
            self.label_blocks.push(LabelBlock {
                text: own_text.clone(),
                rect,
                font_size: style.font_size.unwrap_or(DEFAULT_FONT_SIZE),
                opacity: style.opacity.unwrap_or(1.0),
            });
        }

        self.text_blocks.push(TextBlock {
            text: own_text,
            rect,
        });
    }

    fn finish(self) -> PageLayout {
        let nav_band = Rect::new(0.0, 0.0, f64::from(self.viewport.width), NAV_BAND_HEIGHT);

        // Candidates are recorded in post-order; on ties the enclosing container wins
        let primary = self
            .content_candidates
            .iter()
            .fold(None::<&(usize, Rect, Span)>, |best, candidate| match best {
                Some(b) if b.0 > candidate.0 => Some(b),
                _ => Some(candidate),
            })
            .filter(|(len, _, _)| *len > 0);

        let ads = self
            .ads
            .into_iter()
            .map(|(mut ad, span)| {
                let rect = Rect::new(ad.x, ad.y, ad.width, ad.height);
                ad.overlaps_clickable = self.clickables.iter().any(|c| rect.overlaps(c));
                ad.overlaps_nav = rect.overlaps(&nav_band);
                ad.overlaps_content = primary
                    .map(|(_, content, content_span)| {
                        !content_span.contains(&span) && rect.overlaps(content)
                    })
                    .unwrap_or(false);
                ad
            })
            .collect();

        PageLayout {
            ads,
            overlays: self.overlays,
            text_blocks: self.text_blocks,
            label_blocks: self.label_blocks,
            has_noindex_meta: false,
            has_google_ad_client: false,
            mobile_flags: self.flags,
        }
    }
}

fn attr_px(element: ElementRef<'_>, attr: &str) -> Option<f64> {
    element
        .value()
        .attr(attr)
        .and_then(|v| v.trim().trim_end_matches("px").parse().ok())
}

fn replaced_default_height(name: &str, content_height: f64) -> Option<f64> {
    match name {
        "iframe" | "video" if content_height <= 0.0 => Some(150.0),
        _ => None,
    }
}

fn text_height(text: &str, width: f64) -> f64 {
    let chars_per_line = (width / CHAR_WIDTH).floor().max(1.0);
    let lines = (text.chars().count() as f64 / chars_per_line).ceil().max(1.0);
    lines * LINE_HEIGHT
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_ad_label(text: &str) -> bool {
    let normalized = text.trim().trim_end_matches(':').trim().to_lowercase();
    AD_LABELS.contains(&normalized.as_str())
}
