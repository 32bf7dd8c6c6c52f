use serde::{Deserialize, Serialize};

pub const NO_DETAILS: &str = "No further details provided.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub classification: String,
    pub details: String,
}

impl Analysis {
    /// First line of the model's answer is the classification, the rest is the detail.
    pub fn from_answer(answer: &str) -> Self {
        let (first, rest) = match answer.trim().split_once('\n') {
            Some((first, rest)) => (first, Some(rest.trim())),
            None => (answer.trim(), None),
        };
        let details = match rest {
            Some(rest) if !rest.is_empty() => rest.to_string(),
            _ => NO_DETAILS.to_string(),
        };
        Self {
            classification: first.trim_end().to_string(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_line_answer() {
        let a = Analysis::from_answer("Recyclable\nPut it in the blue bin.");
        assert_eq!(a.classification, "Recyclable");
        assert_eq!(a.details, "Put it in the blue bin.");
    }

    #[test]
    fn test_single_line_answer_uses_fallback() {
        let a = Analysis::from_answer("Plastic");
        assert_eq!(a.classification, "Plastic");
        assert_eq!(a.details, NO_DETAILS);
    }

    #[test]
    fn test_details_keep_inner_lines_and_are_trimmed() {
        let a = Analysis::from_answer("\n Non-Recyclable\r\n\n  Energy Generation.\nBurns cleanly.  \n");
        assert_eq!(a.classification, "Non-Recyclable");
        assert_eq!(a.details, "Energy Generation.\nBurns cleanly.");
    }

    #[test]
    fn test_blank_remainder_uses_fallback() {
        let a = Analysis::from_answer("#1 PET\n   \n");
        assert_eq!(a.classification, "#1 PET");
        assert_eq!(a.details, NO_DETAILS);
    }

    #[test]
    fn test_empty_answer() {
        let a = Analysis::from_answer("");
        assert_eq!(a.classification, "");
        assert_eq!(a.details, NO_DETAILS);
    }
}
