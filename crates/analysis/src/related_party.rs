use crate::input::RelatedParty;
use crate::tables::RuleTables;

/// Match patterns for one declared related party, most specific first.
#[derive(Debug, Clone)]
pub struct RelatedPartyPattern {
    pub name: String,
    pub relationship: String,
    patterns: Vec<String>,
}

impl RelatedPartyPattern {
    /// Derive up to three uppercase substring patterns from the party name:
    /// the full name, the first two significant words, and the first
    /// significant word. Corporate suffixes and connector words are ignored,
    /// as are words of one or two characters.
    pub fn build(party: &RelatedParty, tables: &RuleTables) -> Self {
        let full = party.name.to_uppercase();
        let significant: Vec<&str> = full
            .split_whitespace()
            .filter(|w| w.len() > 2 && !tables.stop_words.contains(*w))
            .collect();

        let mut patterns = vec![full.clone()];
        if significant.len() >= 2 {
            patterns.push(format!("{} {}", significant[0], significant[1]));
        }
        if let Some(first) = significant.first() {
            let single = (*first).to_string();
            if !patterns.contains(&single) {
                patterns.push(single);
            }
        }

        RelatedPartyPattern {
            name: party.name.clone(),
            relationship: party.relationship.clone(),
            patterns,
        }
    }

    pub fn matches(&self, description_upper: &str) -> bool {
        self.patterns.iter().any(|p| description_upper.contains(p.as_str()))
    }
}

pub fn build_patterns(parties: &[RelatedParty], tables: &RuleTables) -> Vec<RelatedPartyPattern> {
    parties
        .iter()
        .map(|p| RelatedPartyPattern::build(p, tables))
        .collect()
}

/// First declared party whose patterns hit the description wins; there is no
/// scoring across parties.
pub fn match_party<'a>(
    patterns: &'a [RelatedPartyPattern],
    description_upper: &str,
) -> Option<&'a RelatedPartyPattern> {
    patterns.iter().find(|p| p.matches(description_upper))
}

/// Short free-text annotation for a matched related-party line: the first
/// context keyword found in the description plus the ~30 characters that
/// follow it. Empty when no keyword is present.
pub fn purpose_note(description_upper: &str, context_keywords: &[String]) -> String {
    for keyword in context_keywords {
        if let Some(pos) = description_upper.find(keyword.as_str()) {
            return description_upper[pos..].chars().take(30).collect();
        }
    }
    String::new()
}
