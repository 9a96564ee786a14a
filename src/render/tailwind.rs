//! Tailwind utility classes compiled to CSS declarations
//!
//! Covers the subset of the Tailwind 2 utility set used by the built-in
//! components, with the default palette plus the theme's `code-*` and
//! `amazon-*` colours.

/// Responsive breakpoints, smallest first
pub const BREAKPOINTS: &[(&str, &str)] = &[
    ("sm", "640px"),
    ("md", "768px"),
    ("lg", "1024px"),
    ("xl", "1280px"),
];

type Declarations = Vec<(String, String)>;

fn decls(pairs: &[(&str, &str)]) -> Declarations {
    pairs
        .iter()
        .map(|(p, v)| (p.to_string(), v.to_string()))
        .collect()
}

/// Media query for a responsive variant such as `md`
pub fn breakpoint(name: &str) -> Option<String> {
    BREAKPOINTS
        .iter()
        .find(|(bp, _)| *bp == name)
        .map(|(_, width)| format!("(min-width: {})", width))
}

/// Resolve a colour name like `gray-600`
pub fn color(name: &str) -> Option<&'static str> {
    let hex = match name {
        "white" => "#ffffff",
        "black" => "#000000",
        "transparent" => "transparent",
        "current" => "currentColor",
        "gray-100" => "#f3f4f6",
        "gray-200" => "#e5e7eb",
        "gray-300" => "#d1d5db",
        "gray-400" => "#9ca3af",
        "gray-500" => "#6b7280",
        "gray-600" => "#4b5563",
        "gray-700" => "#374151",
        "gray-800" => "#1f2937",
        "gray-900" => "#111827",
        "blue-300" => "#93c5fd",
        "blue-500" => "#3b82f6",
        "blue-600" => "#2563eb",
        "purple-300" => "#c4b5fd",
        "purple-600" => "#7c3aed",
        "green-200" => "#a7f3d0",
        "green-600" => "#059669",
        "green-800" => "#065f46",
        "code-light" => "#f6f8fa",
        "code-dark" => "#24292e",
        "amazon-20" => "#d5e8df",
        _ => return None,
    };
    Some(hex)
}

fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Spacing scale: `4` -> `1rem`
fn spacing(value: &str) -> Option<String> {
    match value {
        "0" => Some("0px".to_string()),
        "px" => Some("1px".to_string()),
        "auto" => Some("auto".to_string()),
        _ => {
            let n: f64 = value.parse().ok()?;
            Some(format!("{}rem", n / 4.0))
        }
    }
}

fn spacing_utility(name: &str) -> Option<Declarations> {
    let (prefix, value) = name.split_once('-')?;
    let properties: &[&str] = match prefix {
        "p" => &["padding"],
        "px" => &["padding-left", "padding-right"],
        "py" => &["padding-top", "padding-bottom"],
        "pt" => &["padding-top"],
        "pr" => &["padding-right"],
        "pb" => &["padding-bottom"],
        "pl" => &["padding-left"],
        "m" => &["margin"],
        "mx" => &["margin-left", "margin-right"],
        "my" => &["margin-top", "margin-bottom"],
        "mt" => &["margin-top"],
        "mr" => &["margin-right"],
        "mb" => &["margin-bottom"],
        "ml" => &["margin-left"],
        "gap" => &["gap"],
        _ => return None,
    };
    let value = spacing(value)?;
    Some(
        properties
            .iter()
            .map(|p| (p.to_string(), value.clone()))
            .collect(),
    )
}

fn color_utility(name: &str) -> Option<Declarations> {
    let (prefix, rest) = name.split_once('-')?;
    let value = color(rest)?;
    let declarations = match (prefix, rgb(value)) {
        ("text", _) => decls(&[("color", value)]),
        ("border", _) => decls(&[("border-color", value)]),
        ("bg", Some((r, g, b))) => vec![
            ("--tw-bg-opacity".to_string(), "1".to_string()),
            (
                "background-color".to_string(),
                format!("rgba({}, {}, {}, var(--tw-bg-opacity))", r, g, b),
            ),
        ],
        ("bg", None) => decls(&[("background-color", value)]),
        ("from", rgb_value) => {
            let (r, g, b) = rgb_value.unwrap_or((255, 255, 255));
            vec![
                ("--tw-gradient-from".to_string(), value.to_string()),
                (
                    "--tw-gradient-stops".to_string(),
                    format!(
                        "var(--tw-gradient-from), var(--tw-gradient-to, rgba({}, {}, {}, 0))",
                        r, g, b
                    ),
                ),
            ]
        }
        ("to", _) => decls(&[("--tw-gradient-to", value)]),
        _ => return None,
    };
    Some(declarations)
}

/// CSS declarations for a single utility class, without variants
pub fn utility(name: &str) -> Option<Declarations> {
    let fixed: &[(&str, &str)] = match name {
        // Typography
        "text-left" => &[("text-align", "left")],
        "text-center" => &[("text-align", "center")],
        "text-right" => &[("text-align", "right")],
        "text-sm" => &[("font-size", "0.875rem"), ("line-height", "1.25rem")],
        "text-base" => &[("font-size", "1rem"), ("line-height", "1.5rem")],
        "text-lg" => &[("font-size", "1.125rem"), ("line-height", "1.75rem")],
        "text-xl" => &[("font-size", "1.25rem"), ("line-height", "1.75rem")],
        "text-2xl" => &[("font-size", "1.5rem"), ("line-height", "2rem")],
        "text-3xl" => &[("font-size", "1.875rem"), ("line-height", "2.25rem")],
        "font-thin" => &[("font-weight", "100")],
        "font-light" => &[("font-weight", "300")],
        "font-semibold" => &[("font-weight", "600")],
        "font-bold" => &[("font-weight", "700")],
        "font-mono" => &[(
            "font-family",
            "ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, monospace",
        )],
        "italic" => &[("font-style", "italic")],
        "underline" => &[("text-decoration", "underline")],
        "line-through" => &[("text-decoration", "line-through")],
        "leading-none" => &[("line-height", "1")],
        "list-disc" => &[("list-style-type", "disc")],
        "list-decimal" => &[("list-style-type", "decimal")],

        // Layout
        "block" => &[("display", "block")],
        "inline-block" => &[("display", "inline-block")],
        "flex" => &[("display", "flex")],
        "grid" => &[("display", "grid")],
        "flex-col" => &[("flex-direction", "column")],
        "items-center" => &[("align-items", "center")],
        "justify-center" => &[("justify-content", "center")],
        "mx-auto" => &[("margin-left", "auto"), ("margin-right", "auto")],
        "min-h-full" => &[("min-height", "100%")],
        "min-h-screen" => &[("min-height", "100vh")],
        "sr-only" => &[
            ("position", "absolute"),
            ("width", "1px"),
            ("height", "1px"),
            ("padding", "0"),
            ("margin", "-1px"),
            ("overflow", "hidden"),
            ("clip", "rect(0, 0, 0, 0)"),
            ("white-space", "nowrap"),
            ("border-width", "0"),
        ],

        // Tables
        "table-auto" => &[("table-layout", "auto")],
        "border-collapse" => &[("border-collapse", "collapse")],

        // Borders and effects
        "border" => &[("border-width", "1px")],
        "rounded" => &[("border-radius", "0.25rem")],
        "rounded-md" => &[("border-radius", "0.375rem")],
        "shadow-xl" => &[(
            "box-shadow",
            "0 20px 25px -5px rgba(0, 0, 0, 0.1), 0 10px 10px -5px rgba(0, 0, 0, 0.04)",
        )],

        // Backgrounds
        "bg-center" => &[("background-position", "center")],
        "bg-cover" => &[("background-size", "cover")],
        "bg-fixed" => &[("background-attachment", "fixed")],
        "bg-gradient-to-tr" => &[(
            "background-image",
            "linear-gradient(to top right, var(--tw-gradient-stops))",
        )],

        _ => &[],
    };
    if !fixed.is_empty() {
        return Some(decls(fixed));
    }

    if let Some(n) = name.strip_prefix("grid-cols-") {
        let n: u32 = n.parse().ok()?;
        return Some(vec![(
            "grid-template-columns".to_string(),
            format!("repeat({}, minmax(0, 1fr))", n),
        )]);
    }

    if let Some(opacity) = name.strip_prefix("bg-opacity-") {
        let n: u32 = opacity.parse().ok()?;
        return Some(vec![(
            "--tw-bg-opacity".to_string(),
            format!("{}", f64::from(n) / 100.0),
        )]);
    }

    spacing_utility(name).or_else(|| color_utility(name))
}
