//! LaTeX markup normalization for quiz text.
//!
//! Question banks carry inline math (`$...$`, `\(...\)`), fractions,
//! `^{\text{th}}` superscripts and a handful of symbol commands. Each
//! pipeline stage cleans text with its own ordered [`RuleSet`]; pick one
//! with a [`Profile`] and call [`normalize`].
//!
//! This is not a general LaTeX converter: anything outside the tables in
//! [`rules`] is stripped rather than rendered.

pub mod rules;

pub use rules::{EXTRACTION, FINAL, FractionStyle, MERGE, Rule, RuleSet};

/// Which stage's rule table to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Question and option text while extracting rows.
    Extraction,
    /// Explanations while merging answers into the sheet.
    Merge,
    /// The standalone final pass over whole columns.
    Final,
}

impl Profile {
    /// The rule table for this profile.
    pub fn rules(self) -> &'static RuleSet {
        match self {
            Self::Extraction => &EXTRACTION,
            Self::Merge => &MERGE,
            Self::Final => &FINAL,
        }
    }
}

/// Normalize `text` with the rule table selected by `profile`.
pub fn normalize(text: &str, profile: Profile) -> String {
    profile.rules().apply(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fraction_per_profile() {
        assert_eq!(normalize(r"\frac{3}{4}", Profile::Extraction), "3/(4)");
        assert_eq!(normalize(r"\frac{3}{4}", Profile::Merge), "3/4");
        assert_eq!(normalize(r"\frac{3}{4}", Profile::Final), "3/4");
        assert_eq!(normalize(r"$\dfrac{3}{4}$", Profile::Final), "3/4");
    }

    #[test]
    fn merge_symbol_replacement() {
        assert_eq!(
            normalize(r"Compute $x^{2}$ \ldots end", Profile::Merge),
            "Compute x^{2} ... end"
        );
    }

    #[test]
    fn final_flattens_braces_and_exponents() {
        assert_eq!(
            normalize(r"Compute $x^{2}$ \ldots end", Profile::Final),
            "Compute x^2 ... end"
        );
    }

    #[test]
    fn final_unwraps_paren_math() {
        assert_eq!(
            normalize(r"If \(a \times b = 12\) then", Profile::Final),
            "If a × b = 12 then"
        );
    }

    #[test]
    fn final_removes_unknown_commands() {
        assert_eq!(
            normalize(r"\hline Area of \triangle{ABC} is \alpha", Profile::Final),
            "Area of is"
        );
    }

    #[test]
    fn final_collapses_multiline_explanation() {
        let input = "Since $x \\ge 2$,\n\nwe get $2x \\geq 4$.\n";
        assert_eq!(normalize(input, Profile::Final), "Since x ≥ 2, we get 2x ≥ 4.");
    }

    #[test]
    fn final_is_idempotent() {
        let samples = [
            r"Compute $x^{2}$ \ldots end",
            r"\frac{1}{2} of $$ \$ stray { braces } \\ and \(y\)",
            "\\begin{cases} a \\\\ b \\end{cases} tail $$$",
            r"the $n^{\text{th}}$ term \quad is $\frac{n}{n+1}$",
            r"\left( \frac{a}{b} \right) \cdots \textbf{done}",
            "plain text with   spaces\n\tand tabs",
            "",
        ];

        for sample in samples {
            let once = normalize(sample, Profile::Final);
            let twice = normalize(&once, Profile::Final);
            assert_eq!(twice, once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn extraction_is_stable_on_clean_text() {
        let once = normalize(r"Find $\frac{a}{b}$ if $a = 2$", Profile::Extraction);
        assert_eq!(once, "Find a/(b) if a = 2");
        assert_eq!(normalize(&once, Profile::Extraction), once);
    }
}
