use serde::{Deserialize, Serialize};

const RECYCLING_PROMPT: &str = "Analyze the object in the image and classify it as waste. \
First, determine if it is 'Recyclable' or 'Non-Recyclable'. \
If Recyclable, briefly explain how it can be recycled (2-3 lines). \
If Non-Recyclable, determine if it is suitable for 'Energy Generation' or 'Coprocessing'. \
Provide the main classification (Recyclable/Non-Recyclable) and the specific detail.";

const RESIN_CODE_PROMPT: &str = "Analyze the plastic object in the image and identify its \
Resin Identification Code. On the first line, answer only with the code and resin name, \
for example '#1 PET' or '#5 PP'. If the object is not plastic, answer 'Not Plastic' on the first line. \
On the following lines, briefly explain how you identified the resin and how the item \
should be disposed of or recycled (2-3 lines).";

const RESIN_NAMES: [&str; 7] = ["PET", "HDPE", "PVC", "LDPE", "PP", "PS", "OTHER"];

/// The category scheme the model is asked to answer in. Only the prompt enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Taxonomy {
    Recycling,
    ResinCode,
}

impl Taxonomy {
    pub fn prompt(&self) -> &'static str {
        match self {
            Taxonomy::Recycling => RECYCLING_PROMPT,
            Taxonomy::ResinCode => RESIN_CODE_PROMPT,
        }
    }

    /// Whether a classification line mentions one of the categories the prompt asks for.
    pub fn recognizes(&self, classification: &str) -> bool {
        let upper = classification.to_ascii_uppercase();
        match self {
            Taxonomy::Recycling => upper.contains("RECYCLABLE"),
            Taxonomy::ResinCode => {
                upper.contains("NOT PLASTIC")
                    || (1..=7).any(|n| upper.contains(&format!("#{}", n)))
                    || RESIN_NAMES.iter().any(|name| upper.contains(name))
            }
        }
    }
}
