//! JSON reporter
//!
//! Outputs any report as pretty-printed JSON. Out-of-band statistics
//! serialise as the strings "inf", "-inf" and "undefined".

use anyhow::Result;
use serde::Serialize;

/// Render a report as JSON
pub fn render<T: Serialize + ?Sized>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;
    use crate::statistics::{compare, GroupCounts};

    #[test]
    fn test_json_render_valid() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");

        assert_eq!(parsed["settings"]["dimensions"], "full");
        let words = parsed["words"].as_array().expect("words array");
        assert_eq!(words.len(), 1);
        assert_eq!(words[0]["word"], "bit");
        assert_eq!(words[0]["register_field"], "consumption");
        assert_eq!(words[0]["verdict"], "orphaned");
        assert_eq!(words[0]["aggregate"], 1.0);
        assert_eq!(parsed["statistics"]["passages"], 3);
        assert_eq!(parsed["statistics"]["ablation"][1]["configuration"], "no_isolation");
    }

    #[test]
    fn test_json_out_of_band_values() {
        let c = compare(
            "a",
            GroupCounts::new(2, 2).unwrap(),
            "b",
            GroupCounts::new(0, 3).unwrap(),
            0.05,
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&render(&c).unwrap()).unwrap();
        assert_eq!(parsed["odds_ratio"], "inf");
        assert_eq!(parsed["table"]["a"], 2);
    }

    #[test]
    fn test_json_is_deterministic() {
        assert_eq!(render(&test_report()).unwrap(), render(&test_report()).unwrap());
    }
}
