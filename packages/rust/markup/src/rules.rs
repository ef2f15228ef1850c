//! Ordered rewrite tables for LaTeX-flavoured quiz text.
//!
//! A [`Rule`] is one `(pattern, replacement)` pair applied with a single
//! `replace_all` over the whole string. A [`RuleSet`] runs its rules in
//! declaration order; later rules see the output of earlier ones, so the
//! order inside each table is significant.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

/// A single rewrite: every match of `pattern` becomes `replacement`.
///
/// `replacement` may reference capture groups as `${1}`.
#[derive(Debug)]
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid regex"),
            replacement,
        }
    }

    /// Rule identifier, used in trace output.
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.replacement)
    }
}

/// A named, ordered list of rules.
#[derive(Debug)]
pub struct RuleSet {
    name: &'static str,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Table name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run every rule once, in order.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();

        for rule in &self.rules {
            if let Cow::Owned(rewritten) = rule.apply(&result) {
                trace!(table = self.name, rule = rule.name, "rule rewrote text");
                result = rewritten;
            }
        }

        result
    }
}

// ---------------------------------------------------------------------------
// Shared rules
// ---------------------------------------------------------------------------

/// How `\frac{A}{B}` is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractionStyle {
    /// `A/(B)`
    Parenthesized,
    /// `A/B`
    Bare,
}

impl FractionStyle {
    /// Replacement template over the numerator and denominator groups.
    pub fn replacement(self) -> &'static str {
        match self {
            Self::Parenthesized => "${1}/(${2})",
            Self::Bare => "${1}/${2}",
        }
    }
}

/// Fraction rule; `pattern` captures the numerator and denominator.
fn fraction(pattern: &str, style: FractionStyle) -> Rule {
    Rule::new("fraction", pattern, style.replacement())
}

fn th_superscript() -> Rule {
    Rule::new("th-superscript", r"\^\{\\text\s*\{th\}\}", "th")
}

fn command_with_argument() -> Rule {
    Rule::new("command-with-argument", r"\\[a-zA-Z]+\{[^}]*\}", "")
}

fn bare_command() -> Rule {
    Rule::new("bare-command", r"\\[a-zA-Z]+", "")
}

fn collapse_whitespace() -> Rule {
    Rule::new("collapse-whitespace", r"\s+", " ")
}

fn trim() -> Rule {
    Rule::new("trim", r"^\s+|\s+$", "")
}

// ---------------------------------------------------------------------------
// Extraction table: question and option text while building rows
// ---------------------------------------------------------------------------

/// Rules applied to question and option text at extraction time.
///
/// Fractions become `num/(den)`.
pub static EXTRACTION: LazyLock<RuleSet> = LazyLock::new(|| RuleSet {
    name: "extraction",
    rules: vec![
        fraction(
            r"\\frac\s*\{([^}]*)\}\s*\{([^}]*)\}",
            FractionStyle::Parenthesized,
        ),
        Rule::new("dollar", r"\$", ""),
        th_superscript(),
        command_with_argument(),
        bare_command(),
        collapse_whitespace(),
        trim(),
    ],
});

// ---------------------------------------------------------------------------
// Merge table: worked explanations as they are written into the sheet
// ---------------------------------------------------------------------------

/// Rules applied to explanations during the answer merge.
///
/// Newlines survive this table; only the final pass collapses them.
pub static MERGE: LazyLock<RuleSet> = LazyLock::new(|| RuleSet {
    name: "merge",
    rules: vec![
        fraction(r"\\frac\{([^}]+)\}\{([^}]+)\}", FractionStyle::Bare),
        Rule::new("ellipsis", r"\\ldots", "..."),
        Rule::new("times", r"\\times", "×"),
        Rule::new("right-arrow", r"\\rightarrow", "→"),
        // `\b` keeps `\leq` and `\geq` out of these two.
        Rule::new("less-equal", r"\\le\b", "≤"),
        Rule::new("greater-equal", r"\\ge\b", "≥"),
        Rule::new("quad", r"\\quad", " "),
        Rule::new("inline-math", r"\$(.*?)\$", "${1}"),
        Rule::new("backslash", r"\\", ""),
        trim(),
    ],
});

// ---------------------------------------------------------------------------
// Final table: the standalone normalization pass
// ---------------------------------------------------------------------------

/// Rules applied by the final normalization pass over whole columns.
///
/// Output of this table contains no `\`, `{`, `}` or `$`, so running it a
/// second time changes nothing.
pub static FINAL: LazyLock<RuleSet> = LazyLock::new(|| RuleSet {
    name: "final",
    rules: vec![
        // 1. fractions
        fraction(
            r"\\[dt]?frac\s*\{([^}]*)\}\s*\{([^}]*)\}",
            FractionStyle::Bare,
        ),
        // 2. known symbols and text wrappers
        th_superscript(),
        Rule::new("ellipsis", r"\\(?:ldots|cdots|dots)", "..."),
        Rule::new("times", r"\\times", "×"),
        Rule::new("dot", r"\\cdot\b", "·"),
        Rule::new("divide", r"\\div\b", "÷"),
        Rule::new("implies", r"\\Rightarrow", "⇒"),
        Rule::new("right-arrow", r"\\(?:rightarrow|to\b)", "→"),
        Rule::new("left-arrow", r"\\leftarrow", "←"),
        Rule::new("less-equal", r"\\leq?\b", "≤"),
        Rule::new("greater-equal", r"\\geq?\b", "≥"),
        Rule::new("not-equal", r"\\neq?\b", "≠"),
        Rule::new("plus-minus", r"\\pm\b", "±"),
        Rule::new("infinity", r"\\infty", "∞"),
        Rule::new("line-break", r"\\\\", " "),
        Rule::new("wide-space", r"\\q?quad", " "),
        Rule::new("thin-space", r"\\[,;:! ]", " "),
        Rule::new(
            "text-wrapper",
            r"\\(?:text|textbf|textit|mathrm|mathbf|operatorname|mbox)\s*\{([^}]*)\}",
            "${1}",
        ),
        // 3. inline math delimiters
        Rule::new("inline-math", r"\$(.*?)\$", "${1}"),
        Rule::new("paren-math", r"\\\((.*?)\\\)", "${1}"),
        Rule::new("bracket-math", r"\\\[(.*?)\\\]", "${1}"),
        // 4. block environments, contents included
        Rule::new(
            "environment",
            r"(?s)\\begin\{.*?\}.*?\\end\{.*?\}",
            "",
        ),
        // 5. leftover commands
        command_with_argument(),
        bare_command(),
        // 6. stray markup characters
        Rule::new("stray-markup", r"[${}\\]", ""),
        // 7. whitespace
        collapse_whitespace(),
        trim(),
    ],
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_compile_and_keep_order() {
        assert_eq!(EXTRACTION.rules()[0].name(), "fraction");
        assert_eq!(EXTRACTION.rules().last().map(Rule::name), Some("trim"));
        assert_eq!(MERGE.rules().last().map(Rule::name), Some("trim"));
        assert_eq!(FINAL.rules()[0].name(), "fraction");
        assert_eq!(FINAL.name(), "final");
    }

    #[test]
    fn fraction_rule_follows_style() {
        let pattern = r"\\frac\{([^}]+)\}\{([^}]+)\}";
        let parenthesized = fraction(pattern, FractionStyle::Parenthesized);
        let bare = fraction(pattern, FractionStyle::Bare);

        assert_eq!(parenthesized.name(), "fraction");
        assert_eq!(parenthesized.apply(r"\frac{a}{b+1}"), "a/(b+1)");
        assert_eq!(bare.apply(r"\frac{a}{b+1}"), "a/b+1");
    }

    #[test]
    fn extraction_fraction_keeps_parentheses() {
        assert_eq!(EXTRACTION.apply(r"\frac {1} {x+1}"), "1/(x+1)");
    }

    #[test]
    fn extraction_th_superscript() {
        assert_eq!(EXTRACTION.apply(r"the $n^{\text{th}}$ term"), "the nth term");
    }

    #[test]
    fn extraction_drops_commands_and_collapses() {
        assert_eq!(
            EXTRACTION.apply("  \\textbf{Note} area  of\n\\triangle ABC "),
            "area of ABC"
        );
    }

    #[test]
    fn merge_le_does_not_touch_leq() {
        assert_eq!(MERGE.apply(r"x \le 3"), "x ≤ 3");
        assert_eq!(MERGE.apply(r"x \leq 3"), "x leq 3");
    }

    #[test]
    fn merge_keeps_newlines_and_braces() {
        assert_eq!(
            MERGE.apply("Step 1: $a^{2}$\nStep 2: \\times 2\n"),
            "Step 1: a^{2}\nStep 2: × 2"
        );
    }

    #[test]
    fn merge_inline_math_is_single_line() {
        assert_eq!(MERGE.apply("$a\nb$"), "$a\nb$");
    }

    #[test]
    fn final_strips_environment_across_lines() {
        let input = "Before \\begin{align}\nx &= 1 \\\\\ny &= 2\n\\end{align} after";
        assert_eq!(FINAL.apply(input), "Before after");
    }

    #[test]
    fn final_unwraps_text_wrappers() {
        assert_eq!(FINAL.apply(r"$5\text{ cm}$"), "5 cm");
    }

    #[test]
    fn final_symbol_table() {
        assert_eq!(
            FINAL.apply(r"$a \geq b$, $c \neq d$, $x \to \infty$, $\pm 1$"),
            "a ≥ b, c ≠ d, x → ∞, ± 1"
        );
    }

    #[test]
    fn final_to_does_not_eat_top() {
        assert_eq!(FINAL.apply(r"\top x"), "x");
    }
}
