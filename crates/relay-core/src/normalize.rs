//! Prompt normalization: turns verbose assistant prose into compact summaries.
//!
//! The pipeline is a fixed, ordered sequence of steps. Later steps operate on
//! the output of earlier ones, so reordering the tables below changes output:
//! 1. Collapse whitespace runs and trim.
//! 2. Strip at most one leading filler phrase.
//! 3. Strip at most one trailing filler phrase.
//! 4. Rewrite tool-usage phrasing (`I'll use the X tool to Y` → `Using X: Y`).
//! 5. Rewrite file operations (`Reading`, `Creating`, `Editing`).
//! 6. Rewrite common actions (`Running`, `Searching`, `Implementing`).
//! 7. Strip leftover connectives (`First, let me`, `Now I'll`, ...).
//! 8. Collapse whitespace and trim again.
//!
//! Every rewrite is global (all non-overlapping matches) and ends at a
//! sentence terminator: a `.` followed by whitespace or end of text, or end of
//! text. A `.` inside a token such as `config.json` does not end a match.

use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

/// Maximum number of actions returned by [`extract_actions`].
pub const MAX_ACTIONS: usize = 5;

/// Leading filler, matched case-sensitively at the very start.
const NOISE_PREFIXES: &[&str] = &[
    "As an AI assistant,",
    "I understand that",
    "Based on your request,",
    "To help you with",
    "I'll help you",
    "Let me assist you",
];

/// Trailing filler, matched case-sensitively at the very end.
const NOISE_SUFFIXES: &[&str] = &[
    "Please let me know if you need any clarification.",
    "Let me know if you have any questions.",
    "Feel free to ask if you need help.",
];

/// Rewrite table for steps 4–6, in application order.
///
/// Each pattern captures its object up to the sentence terminator; `sep`
/// re-emits the whitespace consumed after a terminating `.`.
const REWRITES: &[(&str, &str, &str)] = &[
    (
        "tool",
        r"\bI(?:'ll| will) use the (?P<tool>\w+) tool to (?P<target>.+?)(?:\.(?P<sep>\s)|\.$|$)",
        "Using ${tool}: ${target}${sep}",
    ),
    (
        "read",
        r"(?:\b(?:Let me|I'll|I will) )?\b(?:read|check|examine) the (?:file|contents of) (?P<target>.+?)(?:\.(?P<sep>\s)|\.$|$)",
        "Reading ${target}${sep}",
    ),
    (
        "create",
        r"(?:\b(?:Let me|I'll|I will) )?\b(?:create|write) (?:a )?(?:new )?(?:file )?(?P<target>.+?)(?:\.(?P<sep>\s)|\.$|$)",
        "Creating ${target}${sep}",
    ),
    (
        "edit",
        r"(?:\b(?:Let me|I'll|I will) )?\b(?:edit|modify|update) (?:the )?(?:file )?(?P<target>.+?)(?:\.(?P<sep>\s)|\.$|$)",
        "Editing ${target}${sep}",
    ),
    (
        "run",
        r"(?:\b(?:Let me|I'll|I will) )?\b(?:run|execute) (?:the )?(?P<target>.+?)(?:\.(?P<sep>\s)|\.$|$)",
        "Running ${target}${sep}",
    ),
    (
        "search",
        r"(?:\b(?:Let me|I'll|I will) )?\b(?:search|look) for (?P<target>.+?)(?:\.(?P<sep>\s)|\.$|$)",
        "Searching ${target}${sep}",
    ),
    (
        "implement",
        r"(?:\b(?:Let me|I'll|I will) )?\b(?:implement|add) (?P<target>.+?)(?:\.(?P<sep>\s)|\.$|$)",
        "Implementing ${target}${sep}",
    ),
];

/// Connective filler for step 7, removed anywhere (case-insensitive).
/// Temporal forms come first so `Now, let me` goes as a whole.
const CONNECTIVES: &[(&str, &str)] = &[
    ("first", r"(?i)\bfirst,? (?:let me|i'll|i will) "),
    ("now", r"(?i)\bnow,? (?:let me|i'll|i will) "),
    ("next", r"(?i)\bnext,? (?:let me|i'll|i will) "),
    ("bare", r"(?i)\b(?:let me|i'll|i will) "),
];

/// Action-verb families for [`extract_actions`], in collection order.
const ACTION_PATTERNS: &[&str] = &[
    r"(?i)\b(?:create|implement|add|build) (.+?)(?:\.|,|$)",
    r"(?i)\b(?:edit|modify|update|change) (.+?)(?:\.|,|$)",
    r"(?i)\b(?:run|execute) (.+?)(?:\.|,|$)",
    r"(?i)\b(?:search|find|look for) (.+?)(?:\.|,|$)",
    r"(?i)\b(?:read|check|examine) (.+?)(?:\.|,|$)",
];

/// One compiled pipeline rule.
struct Rule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn apply(&self, text: &str) -> String {
        let out = self.pattern.replace_all(text, self.replacement);
        if out != text {
            trace!("normalize: rule {} applied", self.name);
        }
        out.into_owned()
    }
}

struct Rules {
    whitespace: Regex,
    rewrites: Vec<Rule>,
    connectives: Vec<Rule>,
    actions: Vec<Regex>,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| Rules {
        whitespace: compile(r"\s+"),
        rewrites: REWRITES
            .iter()
            .map(|&(name, pattern, replacement)| Rule {
                name,
                pattern: compile(pattern),
                replacement,
            })
            .collect(),
        connectives: CONNECTIVES
            .iter()
            .map(|&(name, pattern)| Rule {
                name,
                pattern: compile(pattern),
                replacement: "",
            })
            .collect(),
        actions: ACTION_PATTERNS.iter().map(|p| compile(p)).collect(),
    })
}

fn collapse_whitespace(text: &str) -> String {
    rules().whitespace.replace_all(text, " ").trim().to_string()
}

fn strip_prefix_noise(text: &str) -> &str {
    NOISE_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .map(str::trim)
        .unwrap_or(text)
}

fn strip_suffix_noise(text: &str) -> &str {
    NOISE_SUFFIXES
        .iter()
        .find_map(|suffix| text.strip_suffix(suffix))
        .map(str::trim)
        .unwrap_or(text)
}

/// Normalize a free-text prompt into its compact form.
///
/// Total over any input: empty or already-compact text is returned unchanged.
pub fn normalize(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    let mut text = strip_suffix_noise(strip_prefix_noise(&collapsed)).to_string();

    for rule in &rules().rewrites {
        text = rule.apply(&text);
    }
    for rule in &rules().connectives {
        text = rule.apply(&text);
    }

    collapse_whitespace(&text)
}

/// Extract up to [`MAX_ACTIONS`] key actions from the raw, un-normalized text.
///
/// Families are scanned in order, matches within a family left to right.
/// Overlapping phrasing may be captured by more than one family; duplicates
/// are kept.
pub fn extract_actions(raw: &str) -> Vec<String> {
    rules()
        .actions
        .iter()
        .flat_map(|pattern| pattern.captures_iter(raw))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|action| !action.is_empty())
        .take(MAX_ACTIONS)
        .collect()
}

/// Normalized text, followed by ` | Actions: ...` when any actions were found.
pub fn summarize(raw: &str) -> String {
    let formatted = normalize(raw);
    let actions = extract_actions(raw);
    if actions.is_empty() {
        formatted
    } else {
        format!("{formatted} | Actions: {}", actions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(name: &str, text: &str) -> String {
        rules()
            .rewrites
            .iter()
            .chain(rules().connectives.iter())
            .find(|r| r.name == name)
            .map(|r| r.apply(text))
            .unwrap()
    }

    #[test]
    fn test_rule_names_unique() {
        let r = rules();
        let mut names: Vec<&str> = r
            .rewrites
            .iter()
            .chain(r.connectives.iter())
            .map(|rule| rule.name)
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert!(names.iter().all(|n| !n.is_empty()));
    }

    #[test]
    fn test_all_patterns_compile() {
        let r = rules();
        assert_eq!(r.rewrites.len(), REWRITES.len());
        assert_eq!(r.connectives.len(), CONNECTIVES.len());
        assert_eq!(r.actions.len(), ACTION_PATTERNS.len());
    }

    #[test]
    fn test_tool_usage_rewrite() {
        assert_eq!(
            normalize("I'll use the Read tool to look at config.json."),
            "Using Read: look at config.json"
        );
        assert_eq!(
            normalize("I will use the Grep tool to find callers"),
            "Using Grep: find callers"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
        assert!(extract_actions("").is_empty());
        assert_eq!(summarize(""), "");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize("  Deploying\n\n the   service \t now "), "Deploying the service now");
    }

    #[test]
    fn test_single_prefix_stripped() {
        assert_eq!(
            normalize("As an AI assistant, I understand that tests matter"),
            "I understand that tests matter"
        );
    }

    #[test]
    fn test_suffix_stripped() {
        assert_eq!(
            normalize("Deploying to staging. Let me know if you have any questions."),
            "Deploying to staging."
        );
    }

    #[test]
    fn test_file_rewrites() {
        assert_eq!(rewrite("read", "Let me read the file src/main.rs."), "Reading src/main.rs");
        assert_eq!(rewrite("create", "I'll create a new file lib.rs"), "Creating lib.rs");
        assert_eq!(rewrite("edit", "I will edit the file Cargo.toml."), "Editing Cargo.toml");
    }

    #[test]
    fn test_action_rewrites() {
        assert_eq!(rewrite("run", "run the test suite"), "Running test suite");
        assert_eq!(rewrite("search", "look for unused imports"), "Searching unused imports");
        assert_eq!(rewrite("implement", "I'll implement retry logic."), "Implementing retry logic");
    }

    #[test]
    fn test_rewrite_is_global() {
        assert_eq!(
            rewrite("run", "run the linter. run the tests."),
            "Running linter Running tests"
        );
    }

    #[test]
    fn test_word_boundary_respected() {
        assert_eq!(rewrite("run", "rerun later"), "rerun later");
        assert_eq!(rewrite("read", "thread the file x"), "thread the file x");
    }

    #[test]
    fn test_connectives_stripped() {
        assert_eq!(normalize("First, let me Deploy it"), "Deploy it");
        assert_eq!(normalize("Now I'll Deploy it"), "Deploy it");
        assert_eq!(normalize("next, i will Deploy it"), "Deploy it");
    }

    #[test]
    fn test_rule_order_matters() {
        // The tool rule fires before the run rule, which then compacts its description.
        assert_eq!(
            normalize(
                "As an AI assistant,   I'll use the Bash tool to run the test suite.  \
                 Let me know if you have any questions."
            ),
            "Using Bash: Running test suite"
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "I'll use the Read tool to look at config.json.",
            "First, let me read the file src/lib.rs. Then I'll run the tests.",
            "As an AI assistant, I will edit the file main.rs",
            "  Now, let me search for TODO markers.  ",
            "Plain status message, nothing to rewrite",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let input = "I'll create a file notes.md, then run cargo test.";
        assert_eq!(normalize(input), normalize(input));
        assert_eq!(extract_actions(input), extract_actions(input));
    }

    #[test]
    fn test_extract_actions_family_order() {
        let actions = extract_actions("Run the tests. Create a parser, then read the docs.");
        assert_eq!(actions, vec!["a parser", "the tests", "the docs"]);
    }

    #[test]
    fn test_extract_actions_capped() {
        let actions = extract_actions(
            "add a. add b. add c. add d. add e. add f. add g.",
        );
        assert_eq!(actions.len(), MAX_ACTIONS);
        assert_eq!(actions[0], "a");
        assert_eq!(actions[4], "e");
    }

    #[test]
    fn test_extract_actions_keeps_duplicates_across_families() {
        let actions = extract_actions("Build and check the config loader");
        assert_eq!(actions, vec!["and check the config loader", "the config loader"]);
    }

    #[test]
    fn test_summarize_appends_actions() {
        assert_eq!(
            summarize("I'll use the Bash tool to execute the build."),
            "Using Bash: Running build | Actions: the build"
        );
        assert_eq!(summarize("Status: all green"), "Status: all green");
    }
}
