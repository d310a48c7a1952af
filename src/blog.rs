//! Page enhancements for the blog theme: same-page scroll targets, one-shot
//! fade-in of content blocks, debounced resize handling and image preloading.

use std::{
    collections::{HashMap, HashSet},
    sync::OnceLock,
    time::Duration,
};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum visible share of an element before it is revealed.
pub const REVEAL_THRESHOLD: f64 = 0.1;

pub const RESIZE_QUIET_PERIOD: Duration = Duration::from_millis(250);

// elements that never have a closing tag
const VOID_ELEMENTS: [&str; 8] = ["area", "br", "hr", "img", "input", "link", "meta", "source"];

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("valid markup pattern"))
}

fn anchor_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    pattern(&CELL, r#"<a\b[^>]*\bhref\s*=\s*["']#([^"']*)["']"#)
}

fn id_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    pattern(&CELL, r#"\sid\s*=\s*["']([^"']+)["']"#)
}

fn img_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    pattern(&CELL, r#"<img\b[^>]*\bsrc\s*=\s*["']([^"']+)["']"#)
}

fn tag_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    pattern(&CELL, r#"<(/?)([a-zA-Z][a-zA-Z0-9-]*)([^>]*)>"#)
}

fn class_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    pattern(&CELL, r#"\bclass\s*=\s*["']([^"']*)["']"#)
}

/// Ids of every element the page's `#fragment` links point at. Links whose
/// target does not exist are skipped.
pub fn scroll_targets(html: &str) -> Vec<String> {
    let ids: HashSet<&str> = id_pattern()
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    anchor_pattern()
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .filter(|target| ids.contains(target))
        .map(str::to_string)
        .collect()
}

/// Image sources in document order, each once.
pub fn preload_sources(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    img_pattern()
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .filter(|src| seen.insert(src.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RevealStyle {
    /// Slides up 20px over 0.6s.
    SlideUp,
    /// Slides in from 20px left over 0.4s.
    SlideRight,
}

impl RevealStyle {
    pub fn transition_ms(self) -> u32 {
        match self {
            RevealStyle::SlideUp => 600,
            RevealStyle::SlideRight => 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealBlock {
    /// Position among the page's content blocks.
    pub index: usize,
    pub style: RevealStyle,
    pub transition_ms: u32,
    pub revealed: bool,
}

#[derive(Debug)]
struct OpenTag {
    name: String,
    // (position among cards, content already taken)
    card: Option<(usize, bool)>,
}

#[derive(Debug, Default)]
struct BlockScan {
    // (card position, element position)
    post: Vec<(usize, usize)>,
    recent: Vec<usize>,
}

impl BlockScan {
    fn run(html: &str) -> Self {
        let mut scan = Self::default();
        let mut open: Vec<OpenTag> = Vec::new();
        let mut cards = 0;

        for (element, tag) in tag_pattern().captures_iter(html).enumerate() {
            let name = tag[2].to_ascii_lowercase();

            if !tag[1].is_empty() {
                if let Some(at) = open.iter().rposition(|o| o.name == name) {
                    open.truncate(at);
                }
                continue;
            }

            let attrs = &tag[3];
            let classes: Vec<&str> = class_pattern()
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().split_whitespace().collect())
                .unwrap_or_default();

            // each card takes its first .post-content descendant
            if classes.contains(&"post-content") {
                let first_card = open
                    .iter_mut()
                    .filter_map(|o| o.card.as_mut())
                    .filter(|card| !card.1)
                    .map(|card| {
                        card.1 = true;
                        card.0
                    })
                    .min();
                if let Some(card) = first_card {
                    scan.post.push((card, element));
                }
            }
            if classes.contains(&"recent-post-content") {
                scan.recent.push(element);
            }

            let self_closing = attrs.trim_end().ends_with('/');
            if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
                continue;
            }

            let card = classes.contains(&"post-card").then(|| {
                cards += 1;
                (cards - 1, false)
            });
            open.push(OpenTag { name, card });
        }

        scan
    }
}

/// Content blocks that fade in: the first `.post-content` inside each
/// `.post-card`, in card order, then every `.recent-post-content`.
pub fn reveal_blocks(html: &str) -> Vec<RevealBlock> {
    let BlockScan { mut post, recent } = BlockScan::run(html);
    post.sort_unstable();

    let recent_set: HashSet<usize> = recent.iter().copied().collect();
    let post_set: HashSet<usize> = post.iter().map(|&(_, element)| element).collect();

    let post = post.into_iter().map(|(_, element)| {
        if recent_set.contains(&element) {
            RevealStyle::SlideRight
        } else {
            RevealStyle::SlideUp
        }
    });
    let recent = recent
        .into_iter()
        .filter(|element| !post_set.contains(element))
        .map(|_| RevealStyle::SlideRight);

    post.chain(recent)
        .enumerate()
        .map(|(index, style)| RevealBlock {
            index,
            style,
            transition_ms: style.transition_ms(),
            revealed: false,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Observed,
    Revealed,
}

/// Tracks observed blocks by index; each one is revealed at most once.
#[derive(Debug, Default)]
pub struct RevealTracker {
    blocks: HashMap<usize, Visibility>,
}

impl RevealTracker {
    pub fn observe(&mut self, block: usize) {
        self.blocks.entry(block).or_insert(Visibility::Observed);
    }

    /// Returns true only for the report that reveals the block.
    pub fn intersect(&mut self, block: usize, ratio: f64) -> bool {
        match self.blocks.get_mut(&block) {
            Some(state) if *state == Visibility::Observed && ratio >= REVEAL_THRESHOLD => {
                *state = Visibility::Revealed;
                true
            }
            _ => false,
        }
    }

    pub fn is_revealed(&self, block: usize) -> bool {
        self.blocks.get(&block) == Some(&Visibility::Revealed)
    }
}

/// One visibility report for a reveal block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub block: usize,
    pub ratio: f64,
}

/// Times (ms) at which a debounced handler runs for the given trigger times:
/// once per burst, `wait` after the burst's last trigger.
pub fn debounce(triggers: &[u64], wait: u64) -> Vec<u64> {
    let mut triggers = triggers.to_vec();
    triggers.sort_unstable();

    let mut runs = Vec::new();
    for (i, &at) in triggers.iter().enumerate() {
        let fire = at + wait;
        match triggers.get(i + 1) {
            Some(&next) if next < fire => {}
            _ => runs.push(fire),
        }
    }
    runs
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementPlan {
    pub scroll_targets: Vec<String>,
    pub reveal: Vec<RevealBlock>,
    pub preload: Vec<String>,
    pub resize_debounce_ms: u64,
    /// When the layout adjusts for the reported resizes.
    pub layout_passes: Vec<u64>,
}

/// Plans the page's enhancements, replaying visibility reports against its
/// reveal blocks and resize events through the debounce window.
pub fn enhance(html: &str, intersections: &[Intersection], resizes: &[u64]) -> EnhancementPlan {
    let mut reveal = reveal_blocks(html);

    let mut tracker = RevealTracker::default();
    for block in &reveal {
        tracker.observe(block.index);
    }
    for report in intersections {
        tracker.intersect(report.block, report.ratio);
    }
    for block in &mut reveal {
        block.revealed = tracker.is_revealed(block.index);
    }

    let wait = RESIZE_QUIET_PERIOD.as_millis() as u64;

    EnhancementPlan {
        scroll_targets: scroll_targets(html),
        reveal,
        preload: preload_sources(html),
        resize_debounce_ms: wait,
        layout_passes: debounce(resizes, wait),
    }
}
