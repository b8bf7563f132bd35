//! Narrative summary
//!
//! Pure formatting over an assembled result. The only computation is the
//! mean of bucket confidences.

use crate::catalog::investment_option;
use crate::features::FEATURE_COUNT;
use crate::models::{BucketConfidence, PredictorVariant, RecommendationItem, ResultMetadata};
use crate::predictor::ModelMetadata;

/// Strategy label for an annual portfolio return
pub fn strategy_label(expected_return: f64) -> &'static str {
    if expected_return < 8.0 {
        "Conservative"
    } else if expected_return < 12.0 {
        "Moderate"
    } else {
        "Aggressive"
    }
}

/// Mean of published bucket confidences, `default` when none were published
pub fn mean_confidence(confidence: &BucketConfidence, default: f64) -> f64 {
    if confidence.is_empty() {
        return default;
    }
    confidence.values().sum::<f64>() / confidence.len() as f64
}

/// Whole-rupee amount with thousands separators
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < 0.0 {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

pub fn render(
    total_surplus: f64,
    items: &[RecommendationItem],
    metadata: &ResultMetadata,
    model: Option<&ModelMetadata>,
) -> String {
    let mut out = String::new();

    let (heading, return_label) = match metadata.predictor {
        PredictorVariant::ModelBacked => ("AI-Powered Investment Analysis", "ML Predicted Portfolio Return"),
        PredictorVariant::RuleBased => ("Rule-Based Investment Plan", "Estimated Portfolio Return"),
    };

    out.push_str(heading);
    out.push_str(":\n\n");
    out.push_str(&format!("Total Investment Amount: {}\n", format_amount(total_surplus)));
    out.push_str(&format!(
        "{}: {:.1}% per year\n",
        return_label, metadata.expected_portfolio_return
    ));
    out.push_str(&format!(
        "Investment Strategy: {}\n",
        strategy_label(metadata.expected_portfolio_return)
    ));
    out.push_str(&format!(
        "Confidence Level: {:.1}%\n",
        metadata.mean_confidence * 100.0
    ));

    if items.is_empty() {
        out.push_str("\nNo allocation is large enough to act on yet; keep the surplus in savings for now.\n");
    } else {
        out.push_str("\nAllocation:\n");
        for item in items {
            out.push_str(&format!(
                "{}. {}: {} ({:.1}%)\n",
                item.priority,
                investment_option(item.investment_type).name,
                format_amount(item.amount),
                item.percentage
            ));
        }

        let allocated: f64 = items.iter().map(|i| i.amount).sum();
        let unallocated = total_surplus - allocated;
        if unallocated >= 1.0 {
            out.push_str(&format!(
                "Unallocated: {} (kept as a savings buffer)\n",
                format_amount(unallocated)
            ));
        }
    }

    if let Some(model) = model {
        out.push_str("\nModel Insights:\n");
        if let Some(samples) = model.training_samples {
            out.push_str(&format!(
                "Training Data: {} historical investor profiles\n",
                format_amount(samples as f64).trim_start_matches('₹')
            ));
        }
        if let Some(date) = &model.training_date {
            out.push_str(&format!("Trained On: {}\n", date));
        }
        out.push_str(&format!(
            "Feature Analysis: {} financial parameters\n",
            FEATURE_COUNT
        ));
    }

    out.push_str("\nTip: systematic monthly investments (SIP) average out market swings.");

    out
}
