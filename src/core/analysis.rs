use crate::domain::model::{AnalysisCategory, AnalysisResult, Impact, DIMENSIONS};
use crate::utils::error::{ImpactError, Result};
use serde::Deserialize;
use std::fmt::Write;

pub const MISSING_SUMMARY: &str = "No analysis available.";
pub const MISSING_DETAIL: &str = "No detailed analysis available.";

/// Builds the analysis prompt. Output depends only on the arguments.
pub fn build_prompt(title: &str, text: &str) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are an expert policy analyst. Analyse the following UK Parliament bill across {} dimensions.",
        DIMENSIONS.len()
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "BILL TITLE: {}", title);
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "BILL TEXT:");
    let _ = writeln!(prompt, "{}", text);
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "---");
    let _ = writeln!(prompt);
    prompt.push_str(
        "For each dimension below, provide:\n\
         1. An IMPACT rating: \"positive\", \"negative\", \"neutral\", or \"mixed\"\n\
         2. A SUMMARY: 1-2 concise sentences about the expected impact\n\
         3. A DETAIL: A thorough analysis paragraph (3-6 sentences)\n\n\
         IMPORTANT INSTRUCTIONS:\n\
         - Focus on EXPECTED IMPACT, not the bill's stated intention\n\
         - Consider first AND second order effects\n\
         - Account for behavioural incentives: how will people change their behaviour in response?\n\
         - Weigh costs against benefits; where effects point both ways, estimate the net impact\n\
         - Be specific and evidence-based where possible\n\n\
         DIMENSIONS:\n",
    );
    for (i, dimension) in DIMENSIONS.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}: {}", i + 1, dimension.name, dimension.question);
    }
    let _ = writeln!(prompt);
    prompt.push_str(
        "Also provide a BILL SUMMARY: a clear, neutral 2-3 sentence summary of what the bill does.\n\n\
         Respond ONLY in this exact JSON format (no markdown, no code fences):\n",
    );
    prompt.push_str(&response_template());

    prompt
}

fn response_template() -> String {
    let impacts = Impact::ALL.map(|i| i.as_str()).join("|");
    let dimensions: Vec<serde_json::Value> = DIMENSIONS
        .iter()
        .map(|d| {
            serde_json::json!({
                "name": d.name,
                "impact": impacts,
                "summary": "...",
                "detail": "...",
            })
        })
        .collect();
    let template = serde_json::json!({
        "billSummary": "...",
        "dimensions": dimensions,
    });
    serde_json::to_string_pretty(&template).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelResponse {
    bill_summary: String,
    dimensions: Vec<serde_json::Value>,
}

/// Loose view of one dimension entry; any field may be missing or mistyped.
#[derive(Debug, Default, Deserialize)]
struct RawDimension {
    #[serde(default)]
    impact: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Parses the model's JSON answer into exactly one category per dimension.
///
/// Entries are matched to dimensions by position. A missing or malformed
/// entry becomes a neutral placeholder instead of failing the whole bill.
/// An unparseable document, a missing `billSummary` or a missing or empty
/// `dimensions` array is an error.
pub fn parse_response(raw: &str) -> Result<AnalysisResult> {
    let body = strip_code_fence(raw);
    let response: ModelResponse = serde_json::from_str(body)
        .map_err(|e| ImpactError::model(format!("response is not the expected JSON: {}", e)))?;
    if response.dimensions.is_empty() {
        return Err(ImpactError::model("response has no dimensions"));
    }

    let categories = DIMENSIONS
        .iter()
        .enumerate()
        .map(|(i, dimension)| {
            let entry = response
                .dimensions
                .get(i)
                .and_then(|value| serde_json::from_value::<RawDimension>(value.clone()).ok())
                .unwrap_or_default();

            AnalysisCategory {
                name: dimension.name.to_string(),
                icon: dimension.icon.to_string(),
                impact: entry
                    .impact
                    .as_deref()
                    .and_then(Impact::parse)
                    .unwrap_or_default(),
                summary: non_empty(entry.summary).unwrap_or_else(|| MISSING_SUMMARY.to_string()),
                detail: non_empty(entry.detail).unwrap_or_else(|| MISSING_DETAIL.to_string()),
            }
        })
        .collect();

    Ok(AnalysisResult {
        bill_summary: response.bill_summary,
        categories,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_response() -> serde_json::Value {
        let dimensions: Vec<serde_json::Value> = DIMENSIONS
            .iter()
            .map(|d| {
                serde_json::json!({
                    "name": d.name,
                    "impact": "positive",
                    "summary": format!("{} summary", d.name),
                    "detail": format!("{} detail", d.name),
                })
            })
            .collect();
        serde_json::json!({"billSummary": "Creates a register.", "dimensions": dimensions})
    }

    #[test]
    fn test_prompt_is_deterministic_and_ordered() {
        let first = build_prompt("Example Bill", "1 Short title");
        let second = build_prompt("Example Bill", "1 Short title");
        assert_eq!(first, second);

        assert!(first.contains("BILL TITLE: Example Bill"));
        assert!(first.contains("BILL TEXT:\n1 Short title\n"));
        assert!(first.contains("positive|negative|neutral|mixed"));

        let mut last = 0;
        for dimension in DIMENSIONS {
            let at = first[last..]
                .find(&format!("\"name\": \"{}\"", dimension.name))
                .map(|p| p + last)
                .expect("dimension in template");
            assert!(at >= last);
            last = at;
        }
    }

    #[test]
    fn test_parse_full_response() {
        let result = parse_response(&full_response().to_string()).unwrap();

        assert_eq!(result.bill_summary, "Creates a register.");
        assert_eq!(result.categories.len(), 6);
        for (category, dimension) in result.categories.iter().zip(DIMENSIONS.iter()) {
            assert_eq!(category.name, dimension.name);
            assert_eq!(category.icon, dimension.icon);
            assert_eq!(category.impact, Impact::Positive);
            assert_eq!(category.summary, format!("{} summary", dimension.name));
        }
    }

    #[test]
    fn test_missing_and_malformed_dimensions_get_defaults() {
        let raw = serde_json::json!({
            "billSummary": "Partial.",
            "dimensions": [
                {
                    "name": "Economy",
                    "impact": "negative",
                    "summary": "Costs rise.",
                    "detail": "Detail."
                },
                "not an object",
                {
                    "name": "Fairness & Justice",
                    "impact": "catastrophic",
                    "summary": "",
                    "detail": 42
                }
            ]
        });
        let result = parse_response(&raw.to_string()).unwrap();

        assert_eq!(result.categories.len(), 6);
        assert_eq!(result.categories[0].impact, Impact::Negative);
        assert_eq!(result.categories[1].impact, Impact::Neutral);
        assert_eq!(result.categories[1].summary, MISSING_SUMMARY);
        assert_eq!(result.categories[2].impact, Impact::Neutral);
        assert_eq!(result.categories[2].summary, MISSING_SUMMARY);
        assert_eq!(result.categories[2].detail, MISSING_DETAIL);
        assert_eq!(result.categories[5].name, "Environment");
        assert_eq!(result.categories[5].detail, MISSING_DETAIL);
    }

    #[test]
    fn test_response_names_are_not_trusted() {
        let raw = serde_json::json!({
            "billSummary": "Renamed.",
            "dimensions": [{"name": "Jobs", "impact": "mixed", "summary": "s", "detail": "d"}]
        });
        let result = parse_response(&raw.to_string()).unwrap();
        assert_eq!(result.categories[0].name, "Economy");
        assert_eq!(result.categories[0].impact, Impact::Mixed);
    }

    #[test]
    fn test_fenced_response_is_unwrapped() {
        let fenced = format!("```json\n{}\n```", full_response());
        assert!(parse_response(&fenced).is_ok());
    }

    #[test]
    fn test_unparseable_response_is_an_error() {
        assert!(parse_response("I cannot help with that.").is_err());
        assert!(parse_response(r#"{"dimensions": []}"#).is_err());
    }

    #[test]
    fn test_reply_without_dimensions_is_an_error() {
        let err = parse_response(r#"{"billSummary": "Only a summary."}"#).unwrap_err();
        assert!(matches!(err, ImpactError::ModelResponseError { .. }));

        let err = parse_response(r#"{"billSummary": "Only a summary.", "dimensions": []}"#)
            .unwrap_err();
        assert!(err.to_string().contains("no dimensions"));
    }

    #[test]
    fn test_reply_without_summary_is_an_error() {
        let mut reply = full_response();
        reply.as_object_mut().unwrap().remove("billSummary");

        let err = parse_response(&reply.to_string()).unwrap_err();
        assert!(matches!(err, ImpactError::ModelResponseError { .. }));
    }
}
