//! JSON parsing helpers for advisory responses
//!
//! Models often wrap the JSON payload in prose or code fences, so the array is
//! located first and then validated strictly.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::AIInsight;

/// Insight as the model writes it, before impact is validated
#[derive(Debug, Deserialize)]
struct RawInsight {
    title: String,
    advice: String,
    impact: String,
}

fn truncate_raw(raw: &str) -> String {
    if raw.chars().count() > 200 {
        format!("{}...", raw.chars().take(200).collect::<String>())
    } else {
        raw.to_string()
    }
}

/// Parse an insight array from an advisory response.
///
/// Accepts a bare array or an array embedded in surrounding text (for example
/// `{"insights": [...]}`). Any element with an unknown impact rejects the
/// whole response.
pub fn parse_insights(response: &str) -> Result<Vec<AIInsight>> {
    let response = response.trim();
    let start = response.find('[');
    let end = response.rfind(']');

    let json_str = match (start, end) {
        (Some(s), Some(e)) if s < e => &response[s..=e],
        _ => {
            return Err(Error::InvalidData(format!(
                "No JSON array found in insights response | Raw: {}",
                truncate_raw(response)
            )))
        }
    };

    let raw: Vec<RawInsight> = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid insights JSON: {} | Raw: {}",
            e,
            truncate_raw(json_str)
        ))
    })?;

    raw.into_iter()
        .map(|r| {
            let impact = r.impact.parse().map_err(Error::InvalidData)?;
            Ok(AIInsight {
                title: r.title.trim().to_string(),
                advice: r.advice.trim().to_string(),
                impact,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Impact;

    #[test]
    fn test_parse_bare_array() {
        let response = r#"[
            {"title": "Dining leak", "advice": "Cook twice a week", "impact": "high"},
            {"title": "Laptop goal", "advice": "Move $50 a week", "impact": "Medium"}
        ]"#;
        let insights = parse_insights(response).unwrap();
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].impact, Impact::High);
        assert_eq!(insights[1].impact, Impact::Medium);
    }

    #[test]
    fn test_parse_with_prose_and_fences() {
        let response = "Here you go:\n```json\n[{\"title\": \"T\", \"advice\": \"A\", \"impact\": \"low\"}]\n```";
        let insights = parse_insights(response).unwrap();
        assert_eq!(insights[0].title, "T");
    }

    #[test]
    fn test_parse_wrapped_in_object() {
        let response = r#"{"insights": [{"title": "T", "advice": "A", "impact": "low"}]}"#;
        assert_eq!(parse_insights(response).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_insights("[]").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_impact_rejected() {
        let response = r#"[{"title": "T", "advice": "A", "impact": "critical"}]"#;
        assert!(parse_insights(response).is_err());
    }

    #[test]
    fn test_missing_field_rejected() {
        let response = r#"[{"title": "T", "impact": "low"}]"#;
        assert!(parse_insights(response).is_err());
    }

    #[test]
    fn test_no_array_rejected() {
        assert!(parse_insights("I cannot help with that.").is_err());
        assert!(parse_insights(r#"{"title": "T"}"#).is_err());
    }
}
