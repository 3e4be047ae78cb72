// Formatting utilities

use image::Rgba;

/// Fill a welcome message template.
/// Every `{user}` and `{server}` occurrence is replaced.
pub fn render_template(template: &str, user_mention: &str, server_name: &str) -> String {
    template
        .replace("{user}", user_mention)
        .replace("{server}", server_name)
}

/// Parse a `#rrggbb` (or `rrggbb`) color into an opaque pixel
pub fn parse_hex_color(hex: &str) -> Option<Rgba<u8>> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

/// Truncate to at most `max_chars` characters with an ellipsis
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a unix timestamp like a UTC date string ("Tue, 15 Oct 2024 10:00:00 GMT")
pub fn format_utc(unix_seconds: i64) -> String {
    chrono::DateTime::from_timestamp(unix_seconds, 0)
        .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_else(|| "غير متوفر".to_string())
}

fn is_rtl(c: char) -> bool {
    matches!(c as u32,
        0x0590..=0x08FF | 0xFB1D..=0xFDFF | 0xFE70..=0xFEFF)
}

fn is_combining_mark(c: char) -> bool {
    matches!(c as u32,
        0x0300..=0x036F | 0x0591..=0x05C7 | 0x0610..=0x061A | 0x064B..=0x065F | 0x0670 | 0x06D6..=0x06ED)
}

#[derive(Clone, Copy, PartialEq)]
enum Direction {
    Ltr,
    Rtl,
    Neutral,
}

fn direction(c: char) -> Direction {
    if is_rtl(c) {
        Direction::Rtl
    } else if c.is_alphanumeric() {
        Direction::Ltr
    } else {
        Direction::Neutral
    }
}

/// Reorder text into visual (left-to-right drawing) order.
///
/// The glyph renderer only walks left to right, so right-to-left runs have to be
/// flipped first. Combining marks stay attached to the letter they follow, and
/// neutral characters take the direction of their surrounding strong characters
/// (or the paragraph direction when those disagree).
pub fn visual_order(text: &str) -> String {
    if !text.chars().any(is_rtl) {
        return text.to_string();
    }

    // Clusters: a base character followed by its combining marks
    let mut clusters: Vec<String> = Vec::new();
    for c in text.chars() {
        match clusters.last_mut() {
            Some(last) if is_combining_mark(c) => last.push(c),
            _ => clusters.push(c.to_string()),
        }
    }

    let strong: Vec<Direction> = clusters
        .iter()
        .map(|cl| cl.chars().next().map(direction).unwrap_or(Direction::Neutral))
        .collect();

    let base = strong
        .iter()
        .copied()
        .find(|d| *d != Direction::Neutral)
        .unwrap_or(Direction::Ltr);

    let resolved: Vec<Direction> = (0..strong.len())
        .map(|i| {
            if strong[i] != Direction::Neutral {
                return strong[i];
            }
            let before = strong[..i].iter().rev().copied().find(|d| *d != Direction::Neutral);
            let after = strong[i + 1..].iter().copied().find(|d| *d != Direction::Neutral);
            match (before, after) {
                (Some(b), Some(a)) if a == b => a,
                _ => base,
            }
        })
        .collect();

    // Group into directional runs
    let mut runs: Vec<(Direction, Vec<&str>)> = Vec::new();
    for (cluster, dir) in clusters.iter().zip(resolved) {
        match runs.last_mut() {
            Some((d, items)) if *d == dir => items.push(cluster.as_str()),
            _ => runs.push((dir, vec![cluster.as_str()])),
        }
    }

    for (dir, items) in runs.iter_mut() {
        if *dir == Direction::Rtl {
            items.reverse();
        }
    }
    if base == Direction::Rtl {
        runs.reverse();
    }

    runs.into_iter().flat_map(|(_, items)| items).collect()
}

/// Prepare text for the left-to-right glyph renderer: Arabic letters become
/// their joined presentation forms (lam-alef ligatures included), then the
/// result is put in visual order.
pub fn shape_for_display(text: &str) -> String {
    if !text.chars().any(is_rtl) {
        return text.to_string();
    }
    visual_order(&ar_reshaper::reshape_line(text))
}
