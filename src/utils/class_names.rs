//! Conditional class-name composition with Tailwind-style conflict resolution.
//!
//! Fragments are flattened into whitespace-separated tokens, then merged so
//! that for every conflict group only the last class survives. A class is
//! scoped by its variant prefix (`hover:`, `md:` ...) and its important flag,
//! so `hover:p-2` never overrides `p-4`.

use std::collections::HashSet;

/// Anything that can contribute class tokens to [`cn`].
pub trait ClassFragment {
    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>);
}

impl ClassFragment for str {
    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.extend(self.split_whitespace());
    }
}

impl ClassFragment for String {
    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>) {
        self.as_str().collect_into(out);
    }
}

impl<T: ClassFragment + ?Sized> ClassFragment for &T {
    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>) {
        (**self).collect_into(out);
    }
}

impl<T: ClassFragment> ClassFragment for Option<T> {
    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(fragment) = self {
            fragment.collect_into(out);
        }
    }
}

/// `("class", condition)` contributes the class only when the condition holds.
impl<T: ClassFragment> ClassFragment for (T, bool) {
    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.1 {
            self.0.collect_into(out);
        }
    }
}

impl<T: ClassFragment> ClassFragment for [T] {
    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>) {
        for fragment in self {
            fragment.collect_into(out);
        }
    }
}

impl<T: ClassFragment, const N: usize> ClassFragment for [T; N] {
    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>) {
        self.as_slice().collect_into(out);
    }
}

impl<T: ClassFragment> ClassFragment for Vec<T> {
    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>) {
        self.as_slice().collect_into(out);
    }
}

/// Merge heterogeneous class fragments: `cn!("px-2 py-1", ("p-3", active))`.
#[macro_export]
macro_rules! cn {
    ($($fragment:expr),* $(,)?) => {
        $crate::utils::cn(&[$(&$fragment as &dyn $crate::utils::ClassFragment),*])
    };
}

/// Flatten fragments into tokens and merge them. See [`merge_classes`].
pub fn cn(fragments: &[&dyn ClassFragment]) -> String {
    let mut tokens = Vec::new();
    for fragment in fragments {
        fragment.collect_into(&mut tokens);
    }
    merge_classes(&tokens)
}

/// Resolve conflicts between class tokens, later tokens winning.
///
/// Walks the tokens back to front: the first class seen for a group claims it
/// (plus any narrower groups it covers), and earlier classes of a claimed group
/// are dropped. Unknown classes are kept; exact duplicates collapse to the
/// last occurrence.
pub fn merge_classes(tokens: &[&str]) -> String {
    let mut claimed: HashSet<String> = HashSet::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut kept: Vec<&str> = Vec::with_capacity(tokens.len());

    for &token in tokens.iter().rev() {
        if !seen.insert(token) {
            continue;
        }

        let parsed = ParsedClass::parse(token);
        if let Some(group) = class_group(parsed.base) {
            let scope = parsed.scope();
            if !claimed.insert(format!("{}/{}", scope, group)) {
                continue;
            }
            for conflict in conflicting_groups(&group) {
                claimed.insert(format!("{}/{}", scope, conflict));
            }
        }

        kept.push(token);
    }

    kept.reverse();
    kept.join(" ")
}

struct ParsedClass<'a> {
    modifiers: Vec<&'a str>,
    important: bool,
    base: &'a str,
}

impl<'a> ParsedClass<'a> {
    fn parse(token: &'a str) -> Self {
        let mut modifiers = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;

        // Colons inside arbitrary values (`bg-[url(a:b)]`) are not variant separators
        for (i, c) in token.char_indices() {
            match c {
                '[' | '(' => depth += 1,
                ']' | ')' => depth = depth.saturating_sub(1),
                ':' if depth == 0 => {
                    modifiers.push(&token[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
        }

        let mut base = &token[start..];
        let mut important = false;
        if let Some(rest) = base.strip_prefix('!') {
            base = rest;
            important = true;
        } else if let Some(rest) = base.strip_suffix('!') {
            base = rest;
            important = true;
        }

        Self {
            modifiers,
            important,
            base,
        }
    }

    fn scope(&self) -> String {
        let mut modifiers = self.modifiers.clone();
        modifiers.sort_unstable();
        let mut scope = modifiers.join(":");
        if self.important {
            scope.push('!');
        }
        scope
    }
}

const PREFIX_GROUPS: &[&str] = &[
    "p", "px", "py", "pt", "pr", "pb", "pl", "ps", "pe", //
    "m", "mx", "my", "mt", "mr", "mb", "ml", "ms", "me", //
    "gap", "gap-x", "gap-y", "space-x", "space-y", //
    "w", "h", "min-w", "min-h", "max-w", "max-h", "size", //
    "inset", "inset-x", "inset-y", "top", "right", "bottom", "left", "start", "end", //
    "z", "order", "basis", "grow", "shrink", "opacity", //
    "justify", "justify-items", "justify-self", "items", "self", "content", //
    "place-content", "place-items", "place-self", //
    "grid-cols", "grid-rows", "col-span", "row-span", //
    "leading", "tracking", "line-clamp", "whitespace", "break", //
    "overflow", "overflow-x", "overflow-y", //
    "cursor", "select", "pointer-events", //
    "blur", "backdrop-blur", "transition", "duration", "ease", "delay", "animate", //
    "aspect", "scale", "rotate", "translate-x", "translate-y", "fill", "stroke",
];

const FONT_SIZES: &[&str] = &[
    "xs", "sm", "base", "lg", "xl", "2xl", "3xl", "4xl", "5xl", "6xl", "7xl", "8xl", "9xl",
];

const FONT_WEIGHTS: &[&str] = &[
    "thin",
    "extralight",
    "light",
    "normal",
    "medium",
    "semibold",
    "bold",
    "extrabold",
    "black",
];

const BORDER_SIDES: &[&str] = &["t", "r", "b", "l", "x", "y", "s", "e"];

const CORNERS: &[&str] = &[
    "t", "r", "b", "l", "s", "e", "tl", "tr", "br", "bl", "ss", "se", "es", "ee",
];

fn class_group(base: &str) -> Option<String> {
    let base = base.strip_prefix('-').unwrap_or(base);

    if let Some(group) = keyword_group(base) {
        return Some(group.to_string());
    }

    if let Some(value) = base.strip_prefix("text-") {
        return Some(text_group(value).to_string());
    }
    if let Some(value) = base.strip_prefix("font-") {
        let group = if FONT_WEIGHTS.contains(&value) {
            "font-weight"
        } else {
            "font-family"
        };
        return Some(group.to_string());
    }
    if let Some(value) = base.strip_prefix("bg-") {
        return Some(bg_group(value).to_string());
    }
    if base == "border" {
        return Some("border-w".to_string());
    }
    if let Some(value) = base.strip_prefix("border-") {
        return Some(border_group(value));
    }
    if base == "rounded" {
        return Some("rounded".to_string());
    }
    if let Some(value) = base.strip_prefix("rounded-") {
        let corner = value.split_once('-').map_or(value, |(corner, _)| corner);
        return Some(if CORNERS.contains(&corner) {
            format!("rounded-{}", corner)
        } else {
            "rounded".to_string()
        });
    }
    if base == "shadow" {
        return Some("shadow".to_string());
    }
    if let Some(value) = base.strip_prefix("shadow-") {
        let group = match value {
            "sm" | "md" | "lg" | "xl" | "2xl" | "inner" | "none" => "shadow",
            _ => "shadow-color",
        };
        return Some(group.to_string());
    }
    if base == "ring" {
        return Some("ring-w".to_string());
    }
    if let Some(value) = base.strip_prefix("ring-") {
        let group = if value.starts_with("offset-") {
            "ring-offset"
        } else if is_width(value) || value == "inset" {
            "ring-w"
        } else {
            "ring-color"
        };
        return Some(group.to_string());
    }

    PREFIX_GROUPS
        .iter()
        .filter(|prefix| {
            base == **prefix
                || base
                    .strip_prefix(**prefix)
                    .is_some_and(|rest| rest.starts_with('-'))
        })
        .max_by_key(|prefix| prefix.len())
        .map(|prefix| prefix.to_string())
}

fn keyword_group(base: &str) -> Option<&'static str> {
    let group = match base {
        "block" | "inline-block" | "inline" | "flex" | "inline-flex" | "grid" | "inline-grid"
        | "hidden" | "contents" | "table" | "flow-root" | "list-item" => "display",
        "static" | "fixed" | "absolute" | "relative" | "sticky" => "position",
        "visible" | "invisible" | "collapse" => "visibility",
        "flex-row" | "flex-row-reverse" | "flex-col" | "flex-col-reverse" => "flex-direction",
        "flex-wrap" | "flex-wrap-reverse" | "flex-nowrap" => "flex-wrap",
        "flex-1" | "flex-auto" | "flex-initial" | "flex-none" => "flex",
        "italic" | "not-italic" => "font-style",
        "uppercase" | "lowercase" | "capitalize" | "normal-case" => "text-transform",
        "underline" | "overline" | "line-through" | "no-underline" => "text-decoration",
        "truncate" => "text-overflow",
        "antialiased" | "subpixel-antialiased" => "font-smoothing",
        "sr-only" | "not-sr-only" => "sr",
        _ => return None,
    };
    Some(group)
}

fn text_group(value: &str) -> &'static str {
    // `text-sm/6` carries a line height after the size
    let size = value.split_once('/').map_or(value, |(size, _)| size);
    if FONT_SIZES.contains(&size) || is_arbitrary_length(value) || is_arbitrary_length(size) {
        return "font-size";
    }
    match value {
        "left" | "center" | "right" | "justify" | "start" | "end" => "text-align",
        "ellipsis" | "clip" => "text-overflow",
        "wrap" | "nowrap" | "balance" | "pretty" => "text-wrap",
        _ => "text-color",
    }
}

fn bg_group(value: &str) -> &'static str {
    match value {
        "fixed" | "local" | "scroll" => "bg-attachment",
        "auto" | "cover" | "contain" => "bg-size",
        "repeat" | "no-repeat" | "repeat-x" | "repeat-y" | "repeat-round" | "repeat-space" => {
            "bg-repeat"
        }
        "center" | "top" | "bottom" | "left" | "right" | "left-top" | "left-bottom"
        | "right-top" | "right-bottom" => "bg-position",
        "none" => "bg-image",
        _ if value.starts_with("gradient-") => "bg-image",
        _ => "bg-color",
    }
}

fn border_group(value: &str) -> String {
    if let Some(spacing) = value.strip_prefix("spacing-") {
        let group = if spacing.starts_with("x-") {
            "border-spacing-x"
        } else if spacing.starts_with("y-") {
            "border-spacing-y"
        } else {
            "border-spacing"
        };
        return group.to_string();
    }

    let (head, rest) = value.split_once('-').unwrap_or((value, ""));
    if BORDER_SIDES.contains(&head) {
        let kind = if is_width(rest) { "w" } else { "color" };
        return format!("border-{}-{}", kind, head);
    }

    let group = match value {
        "solid" | "dashed" | "dotted" | "double" | "hidden" | "none" => "border-style",
        "collapse" | "separate" => "border-collapse",
        _ if is_width(value) => "border-w",
        _ => "border-color",
    };
    group.to_string()
}

fn is_width(value: &str) -> bool {
    value.is_empty() || value.chars().all(|c| c.is_ascii_digit()) || is_arbitrary_length(value)
}

fn is_arbitrary_length(value: &str) -> bool {
    let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) else {
        return false;
    };
    inner.starts_with("length:")
        || inner
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
}

fn conflicting_groups(group: &str) -> &'static [&'static str] {
    match group {
        "p" => &["px", "py", "pt", "pr", "pb", "pl", "ps", "pe"],
        "px" => &["pr", "pl", "ps", "pe"],
        "py" => &["pt", "pb"],
        "m" => &["mx", "my", "mt", "mr", "mb", "ml", "ms", "me"],
        "mx" => &["mr", "ml", "ms", "me"],
        "my" => &["mt", "mb"],
        "gap" => &["gap-x", "gap-y"],
        "size" => &["w", "h"],
        "inset" => &[
            "inset-x", "inset-y", "top", "right", "bottom", "left", "start", "end",
        ],
        "inset-x" => &["right", "left"],
        "inset-y" => &["top", "bottom"],
        "overflow" => &["overflow-x", "overflow-y"],
        "rounded" => &[
            "rounded-t",
            "rounded-r",
            "rounded-b",
            "rounded-l",
            "rounded-s",
            "rounded-e",
            "rounded-tl",
            "rounded-tr",
            "rounded-br",
            "rounded-bl",
            "rounded-ss",
            "rounded-se",
            "rounded-es",
            "rounded-ee",
        ],
        "rounded-t" => &["rounded-tl", "rounded-tr"],
        "rounded-r" => &["rounded-tr", "rounded-br"],
        "rounded-b" => &["rounded-br", "rounded-bl"],
        "rounded-l" => &["rounded-tl", "rounded-bl"],
        "border-w" => &[
            "border-w-t",
            "border-w-r",
            "border-w-b",
            "border-w-l",
            "border-w-x",
            "border-w-y",
            "border-w-s",
            "border-w-e",
        ],
        "border-w-x" => &["border-w-r", "border-w-l"],
        "border-w-y" => &["border-w-t", "border-w-b"],
        "border-color" => &[
            "border-color-t",
            "border-color-r",
            "border-color-b",
            "border-color-l",
            "border-color-x",
            "border-color-y",
            "border-color-s",
            "border-color-e",
        ],
        "border-spacing" => &["border-spacing-x", "border-spacing-y"],
        "border-color-x" => &["border-color-r", "border-color-l"],
        "border-color-y" => &["border-color-t", "border-color-b"],
        _ => &[],
    }
}
