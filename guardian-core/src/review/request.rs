//! Review requests and code-context acquisition

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Per-file diff cap, in characters
pub const MAX_DIFF_CHARS: usize = 2000;

/// A changed file and its diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub path: String,
    #[serde(default)]
    pub diff: String,
}

impl FileDiff {
    pub fn new(path: impl Into<String>, diff: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            diff: diff.into(),
        }
    }
}

/// What the caller wants reviewed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Repository identifier, e.g. `owner/repo`
    #[serde(default)]
    pub repo: String,
    /// Commit identifier
    #[serde(default)]
    pub commit_id: String,
    /// Raw code to review instead of a file list
    #[serde(default, rename = "codeSnippet", skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default)]
    pub files: Vec<FileDiff>,
}

impl ReviewRequest {
    /// Request a review of a raw snippet
    pub fn snippet(code: impl Into<String>) -> Self {
        Self {
            code_snippet: Some(code.into()),
            ..Default::default()
        }
    }

    /// Request a review of a commit's files
    pub fn commit(
        repo: impl Into<String>,
        commit_id: impl Into<String>,
        files: Vec<FileDiff>,
    ) -> Self {
        Self {
            repo: repo.into(),
            commit_id: commit_id.into(),
            code_snippet: None,
            files,
        }
    }
}

/// Code handed to the AI reviewer
///
/// Built once by [`CodeContext::acquire`]; file diffs are already capped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeContext {
    /// A raw snippet
    Snippet(String),
    /// A commit's changed files
    Files {
        repo: String,
        commit_id: String,
        files: Vec<FileDiff>,
    },
}

impl CodeContext {
    /// Acquire context from a request, capping each diff at `max_diff_chars`
    ///
    /// A non-empty file list takes precedence over a snippet. With neither,
    /// fails with [`Error::NoCodeProvided`].
    pub fn acquire(request: &ReviewRequest, max_diff_chars: usize) -> Result<Self> {
        if !request.files.is_empty() {
            let files = request
                .files
                .iter()
                .map(|f| FileDiff::new(f.path.clone(), truncate_chars(&f.diff, max_diff_chars)))
                .collect();
            return Ok(CodeContext::Files {
                repo: request.repo.clone(),
                commit_id: request.commit_id.clone(),
                files,
            });
        }

        match request.code_snippet.as_deref() {
            Some(code) if !code.trim().is_empty() => Ok(CodeContext::Snippet(code.to_string())),
            _ => Err(Error::NoCodeProvided),
        }
    }

    /// Number of files under review; a snippet counts as one
    pub fn file_count(&self) -> usize {
        match self {
            CodeContext::Snippet(_) => 1,
            CodeContext::Files { files, .. } => files.len(),
        }
    }
}

/// First `max` characters of `s`
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        let diff = "x".repeat(5000);
        assert_eq!(truncate_chars(&diff, MAX_DIFF_CHARS).chars().count(), 2000);
        assert_eq!(truncate_chars("short", 2000), "short");
        // multi-byte characters are counted, not bytes
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_acquire_caps_each_diff() {
        let request = ReviewRequest::commit(
            "octo/app",
            "abc",
            vec![
                FileDiff::new("a.rs", "+".repeat(5000)),
                FileDiff::new("b.rs", "+small"),
            ],
        );

        match CodeContext::acquire(&request, MAX_DIFF_CHARS).unwrap() {
            CodeContext::Files { files, repo, .. } => {
                assert_eq!(repo, "octo/app");
                assert_eq!(files[0].diff.chars().count(), 2000);
                assert_eq!(files[1].diff, "+small");
            }
            other => panic!("unexpected context: {other:?}"),
        }
        // request itself is untouched
        assert_eq!(request.files[0].diff.len(), 5000);
    }

    #[test]
    fn test_acquire_snippet() {
        let ctx = CodeContext::acquire(&ReviewRequest::snippet("fn main() {}"), 10).unwrap();
        assert_eq!(ctx, CodeContext::Snippet("fn main() {}".to_string()));
        assert_eq!(ctx.file_count(), 1);
    }

    #[test]
    fn test_files_take_precedence_over_snippet() {
        let mut request = ReviewRequest::commit("r", "c", vec![FileDiff::new("a", "+a")]);
        request.code_snippet = Some("ignored".to_string());
        assert!(matches!(
            CodeContext::acquire(&request, MAX_DIFF_CHARS).unwrap(),
            CodeContext::Files { .. }
        ));
    }

    #[test]
    fn test_no_code_provided() {
        let empty = ReviewRequest::commit("r", "c", vec![]);
        assert!(matches!(
            CodeContext::acquire(&empty, MAX_DIFF_CHARS),
            Err(Error::NoCodeProvided)
        ));

        let blank = ReviewRequest::snippet("   ");
        assert!(matches!(
            CodeContext::acquire(&blank, MAX_DIFF_CHARS),
            Err(Error::NoCodeProvided)
        ));
    }

    #[test]
    fn test_request_json_shape() {
        let request: ReviewRequest = serde_json::from_str(
            r#"{"repo":"octo/app","commit_id":"abc","files":[{"path":"commit.diff","diff":"+x"}]}"#,
        )
        .unwrap();
        assert_eq!(request.files.len(), 1);
        assert!(request.code_snippet.is_none());

        let request: ReviewRequest =
            serde_json::from_str(r#"{"codeSnippet":"let x = 1;"}"#).unwrap();
        assert_eq!(request.code_snippet.as_deref(), Some("let x = 1;"));
    }
}
