use super::style;
use crate::governance::{GovernanceDecision, ViolationType};

/// Terminal rendering of a decision: the released text, or a block notice
/// with reason, violation type and confidence.
pub fn render_decision(decision: &GovernanceDecision) -> String {
    match decision {
        GovernanceDecision::Released { response, verdict } => format!(
            "{}\n{}",
            response,
            style::dim(format!(
                "[released · {} · confidence {:.2}]",
                verdict.governor_version(),
                verdict.confidence_score()
            ))
        ),
        GovernanceDecision::Blocked { verdict } => {
            let mut lines = vec![
                style::danger("Response blocked by security policy"),
                format!("  {} {}", style::cyan("reason:    "), verdict.reasoning()),
            ];
            if verdict.violation_type() != ViolationType::None {
                lines.push(format!(
                    "  {} {}",
                    style::cyan("violation: "),
                    verdict.violation_type()
                ));
            }
            lines.push(format!(
                "  {} {:.2}",
                style::cyan("confidence:"),
                verdict.confidence_score()
            ));
            lines.join("\n")
        }
        GovernanceDecision::Rejected { reason } => {
            format!("{} {}", style::danger("Input rejected:"), reason)
        }
        GovernanceDecision::Throttled => {
            style::yellow("Rate limit exceeded. Please wait before sending another message.")
        }
        GovernanceDecision::Failed { message } => style::danger(message),
    }
}
