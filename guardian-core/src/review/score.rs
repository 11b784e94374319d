//! Heuristic review score

/// Markers counted as one finding each (case-insensitive)
pub const FINDING_MARKERS: &[&str] = &["issue:", "suggestion:", "warning:"];

/// Points deducted per finding
const PENALTY_PER_FINDING: u32 = 5;

/// Count finding markers in review text
pub fn count_findings(text: &str) -> usize {
    let lower = text.to_lowercase();
    FINDING_MARKERS
        .iter()
        .map(|marker| lower.matches(marker).count())
        .sum()
}

/// `100 - 5 * findings`, floored at 0
pub fn compute_score(text: &str) -> u8 {
    let findings = u32::try_from(count_findings(text)).unwrap_or(u32::MAX);
    100u32.saturating_sub(findings.saturating_mul(PENALTY_PER_FINDING)) as u8
}
