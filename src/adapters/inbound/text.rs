//! Plain-Text Renderer
//!
//! Terminal-friendly output for the root endpoint. Lines end with CRLF and
//! labels are right-aligned.

use crate::domain::entities::CanonicalResponse;
use colored::Colorize;
use std::fmt::Write;

/// Format an offset in minutes as `UTC+HHMM`, `UTC-HHMM` or `UTC0`.
pub fn format_utc_offset(minutes: i32) -> String {
    if minutes == 0 {
        return "UTC0".to_string();
    }

    let sign = if minutes > 0 { '+' } else { '-' };
    let abs = minutes.unsigned_abs();
    format!("UTC{}{:02}{:02}", sign, abs / 60, abs % 60)
}

/// Render a successful lookup.
pub fn render_success(colorful: bool, addr: &str, resp: &CanonicalResponse) -> String {
    let bullet = if colorful {
        "\u{25cf}".bright_green().to_string()
    } else {
        "\u{25cf}".to_string()
    };

    let mut rows: Vec<(&str, String)> = vec![
        (
            "Location: ",
            format!("{}, {} ({})", resp.region, resp.country, resp.country_code),
        ),
        (
            "Timezone: ",
            format!("{} {}", resp.timezone, format_utc_offset(resp.utc_offset_minutes)),
        ),
    ];
    if resp.organization.is_empty() {
        rows.push(("Org: ", "<Unavailable>".to_string()));
    } else {
        rows.push(("Org: ", resp.organization.clone()));
    }
    if !resp.isp.is_empty() {
        rows.push(("ISP: ", resp.isp.clone()));
    }
    rows.push(("ASN: ", resp.asn.clone()));

    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    let mut out = String::new();
    let _ = write!(out, "{} {} - {}\r\n", bullet, addr, resp.data_source);
    for (label, value) in rows {
        let _ = write!(out, "{:>width$}{}\r\n", label, value, width = width);
    }
    out
}

/// Render a failed lookup.
pub fn render_failure(colorful: bool, message: &str) -> String {
    let title = if colorful {
        "\u{d7} FAILURE".bright_red().to_string()
    } else {
        "\u{d7} FAILURE".to_string()
    };
    format!("{}\r\n{}\r\n", title, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CanonicalResponse {
        CanonicalResponse {
            data_source: "ip-api.com".to_string(),
            country: "Australia".to_string(),
            country_code: "AU".to_string(),
            region: "Queensland".to_string(),
            timezone: "Australia/Brisbane".to_string(),
            utc_offset_minutes: 600,
            organization: "APNIC and Cloudflare DNS Resolver project".to_string(),
            isp: "Cloudflare, Inc".to_string(),
            asn: "AS13335".to_string(),
            ..Default::default()
        }
    }

    // ===== Offset Formatting Tests =====

    #[test]
    fn test_format_utc_offset() {
        let tests = vec![
            (0, "UTC0"),
            (600, "UTC+1000"),
            (330, "UTC+0530"),
            (345, "UTC+0545"),
            (-210, "UTC-0330"),
            (-600, "UTC-1000"),
            (840, "UTC+1400"),
            (-720, "UTC-1200"),
        ];

        for (minutes, expected) in tests {
            assert_eq!(format_utc_offset(minutes), expected, "Failed for minutes: {}", minutes);
        }
    }

    // ===== Render Tests =====

    #[test]
    fn test_render_success_plain() {
        let text = render_success(false, "1.1.1.1", &sample());

        assert_eq!(
            text,
            "\u{25cf} 1.1.1.1 - ip-api.com\r\n\
             Location: Queensland, Australia (AU)\r\n\
             Timezone: Australia/Brisbane UTC+1000\r\n\
             \x20    Org: APNIC and Cloudflare DNS Resolver project\r\n\
             \x20    ISP: Cloudflare, Inc\r\n\
             \x20    ASN: AS13335\r\n"
        );
    }

    #[test]
    fn test_render_success_without_isp_or_org() {
        let mut resp = sample();
        resp.isp = String::new();
        resp.organization = String::new();

        let text = render_success(false, "1.1.1.1", &resp);

        assert!(text.contains("     Org: <Unavailable>\r\n"));
        assert!(!text.contains("ISP:"));
    }

    #[test]
    fn test_render_success_colorful() {
        colored::control::set_override(true);

        let text = render_success(true, "1.1.1.1", &sample());

        assert!(text.starts_with("\x1b["));
        assert!(text.contains(" 1.1.1.1 - ip-api.com\r\n"));
    }

    #[test]
    fn test_render_failure_plain() {
        assert_eq!(
            render_failure(false, "Upstream error"),
            "\u{d7} FAILURE\r\nUpstream error\r\n"
        );
    }
}
