use crate::types::Domain;

/// A domain matches when every keyword group has at least one substring hit.
struct DomainRule {
    domain: Domain,
    groups: &'static [&'static [&'static str]],
}

/// Evaluated top to bottom; several rules can match the same text, so order matters.
const RULES: &[DomainRule] = &[
    DomainRule {
        domain: Domain::Sports,
        groups: &[&[
            "nfl", "nba", "football", "soccer", "tennis", "super bowl", "league", "cup",
            "winner", "match", "vs.", "f1", "prix",
        ]],
    },
    DomainRule {
        domain: Domain::Crypto,
        // Generic terms like "token" or "chain" alone are not enough; a coin name must hit too.
        groups: &[
            &[
                "bitcoin", "btc", "eth", "solana", "crypto", "token", "nft", "wallet", "chain",
                "price of",
            ],
            &["bitcoin", "eth", "solana", "crypto"],
        ],
    },
    DomainRule {
        domain: Domain::PoliticsUsa,
        groups: &[&[
            "trump", "biden", "harris", "election", "vote", "president", "nominate", "senate",
            "house", "republican", "democrat",
        ]],
    },
    DomainRule {
        domain: Domain::Geopolitics,
        groups: &[&[
            "war", "strike", "israel", "iran", "gaza", "ukraine", "russia", "china", "maduro",
            "venezuela", "military", "invasion", "ceasefire",
        ]],
    },
    DomainRule {
        domain: Domain::Economy,
        groups: &[&[
            "fed", "rate", "inflation", "s&p", "spx", "nasdaq", "stock", "earnings", "recession",
            "bank", "economy", "shutdown",
        ]],
    },
    DomainRule {
        domain: Domain::CultureTech,
        groups: &[&[
            "tweet", "twitter", "elon", "musk", "movie", "song", "spotify", "grammy", "oscar",
            "award", "weather",
        ]],
    },
];

impl DomainRule {
    fn matches(&self, text: &str) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|kw| text.contains(kw)))
    }
}

/// Classify a market from its question and slug. Total: falls through to `Other`.
pub fn classify_domain(question: &str, slug: &str) -> Domain {
    let text = format!("{question} {slug}").to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&text))
        .map(|rule| rule.domain)
        .unwrap_or(Domain::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nba_final_is_sports() {
        assert_eq!(
            classify_domain("Will the Lakers win the NBA finals?", "lakers-nba-finals"),
            Domain::Sports
        );
    }

    #[test]
    fn bitcoin_price_is_crypto() {
        assert_eq!(
            classify_domain("Bitcoin price above $100k by July?", "btc-100k-july"),
            Domain::Crypto
        );
    }

    #[test]
    fn weather_is_culture_and_tech() {
        assert_eq!(
            classify_domain("Will it rain in Paris tomorrow?", "paris-weather"),
            Domain::CultureTech
        );
    }

    #[test]
    fn no_keyword_is_other() {
        assert_eq!(
            classify_domain("Random unrelated question", "random-slug"),
            Domain::Other
        );
    }

    #[test]
    fn generic_chain_term_without_coin_name_is_not_crypto() {
        // "btc" and "token" hit the broad group but no coin name confirms it.
        assert_eq!(classify_domain("BTC token unlock", "btc-unlock"), Domain::Other);
        assert_eq!(classify_domain("Solana token unlock", "sol-unlock"), Domain::Crypto);
    }

    #[test]
    fn earlier_rule_wins_on_overlap() {
        // Both "match" (sports) and "trump" (politics) hit.
        assert_eq!(
            classify_domain("Will Trump attend the match?", "trump-match"),
            Domain::Sports
        );
        // "election" (politics) beats "war" (geopolitics).
        assert_eq!(
            classify_domain("Ukraine war before the election?", "ukraine-election"),
            Domain::PoliticsUsa
        );
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert_eq!(classify_domain("FED decision", "x"), Domain::Economy);
        // "rate" inside "pirates" is a hit: substring, not word, matching.
        assert_eq!(classify_domain("Pirates of the Caribbean 6?", "pirates"), Domain::Economy);
        assert_eq!(classify_domain("", ""), Domain::Other);
    }
}
