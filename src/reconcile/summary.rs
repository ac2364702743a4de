//! Human-readable change summary.

use crate::types::Track;
use std::fmt::Write;

/// Render an artist list as a bracketed list of quoted names: `['A', 'B']`.
///
/// Names containing a single quote (and no double quote) are wrapped in
/// double quotes instead.
pub fn format_artists(artists: &[String]) -> String {
    let quoted: Vec<String> = artists
        .iter()
        .map(|name| {
            if name.contains('\'') && !name.contains('"') {
                format!("\"{}\"", name)
            } else {
                format!("'{}'", name.replace('\'', "\\'"))
            }
        })
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Summary lines for removed then added tracks, each newline-terminated.
pub fn summarize(removed: &[Track], added: &[Track]) -> String {
    let mut out = String::new();

    for track in removed {
        let _ = writeln!(
            out,
            "[-] {} by {}, {} plays since added",
            track.name,
            format_artists(&track.artists),
            track.playcount
        );
    }

    for track in added {
        let _ = writeln!(out, "[+] {} by {}", track.name, format_artists(&track.artists));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_artists() {
        let artists = vec!["A".to_string(), "B".to_string()];
        assert_eq!(format_artists(&artists), "['A', 'B']");
        assert_eq!(format_artists(&[]), "[]");
        assert_eq!(
            format_artists(&["Guns N' Roses".to_string()]),
            "[\"Guns N' Roses\"]"
        );
    }

    #[test]
    fn test_summary_orders_removed_before_added() {
        let removed = vec![Track::new("Gone", ["A"], "X").with_playcount(3)];
        let added = vec![Track::new("New", ["B", "C"], "Y")];

        assert_eq!(
            summarize(&removed, &added),
            "[-] Gone by ['A'], 3 plays since added\n[+] New by ['B', 'C']\n"
        );
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(summarize(&[], &[]), "");
    }
}
