use plotters::style::RGBColor;

/// Default series color when the caller picks none (teal, matching the
/// chart.js convention `rgba(75, 192, 192, 0.2)`).
pub const DEFAULT_SERIES_COLOR: &str = "rgba(75, 192, 192, 0.2)";

/// Categorical palette used for multi-slice kinds (pie, doughnut).
const SERIES_PALETTE: [RGBColor; 8] = [
    RGBColor(75, 192, 192),
    RGBColor(255, 99, 132),
    RGBColor(54, 162, 235),
    RGBColor(255, 206, 86),
    RGBColor(153, 102, 255),
    RGBColor(255, 159, 64),
    RGBColor(99, 255, 132),
    RGBColor(201, 203, 207),
];

/// Color for the i-th slice/series, cycling the palette.
pub fn series_color(index: usize) -> RGBColor {
    SERIES_PALETTE[index % SERIES_PALETTE.len()]
}

/// Parse a color string to an RGB color plus alpha.
///
/// Accepts `#rrggbb`, `rgb(r, g, b)`, `rgba(r, g, b, a)` and a few CSS names;
/// anything unparseable falls back to the default teal, fully opaque.
pub fn parse_color(color: &str) -> (RGBColor, f64) {
    let color = color.trim();

    if let Some(hex) = color.strip_prefix('#') {
        if let Some(rgb) = parse_hex(hex) {
            return (rgb, 1.0);
        }
    }

    if let Some(args) = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        if let Some(parsed) = parse_channels(args) {
            return parsed;
        }
    }

    let named = match color {
        "red" => RGBColor(255, 0, 0),
        "green" => RGBColor(0, 128, 0),
        "blue" => RGBColor(0, 0, 255),
        "black" => RGBColor(0, 0, 0),
        "white" => RGBColor(255, 255, 255),
        "yellow" => RGBColor(255, 255, 0),
        "cyan" => RGBColor(0, 255, 255),
        "magenta" => RGBColor(255, 0, 255),
        _ => RGBColor(75, 192, 192),
    };
    (named, 1.0)
}

fn parse_hex(hex: &str) -> Option<RGBColor> {
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(RGBColor(r, g, b))
}

fn parse_channels(args: &str) -> Option<(RGBColor, f64)> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    let alpha = if parts.len() == 4 {
        parts[3].parse::<f64>().ok()?.clamp(0.0, 1.0)
    } else {
        1.0
    };
    Some((RGBColor(r, g, b), alpha))
}
