use crate::data_structures::{ComparisonFactor, FeatureSummary, Outcome, Side, Verdict};

struct Factor {
    name: &'static str,
    description: &'static str,
    /// True when the first operand has the strict advantage.
    first_wins: fn(&FeatureSummary, &FeatureSummary) -> bool,
}

// Evaluation order is part of the output. Equal values award the factor to the second stock.
const FACTORS: [Factor; 4] = [
    Factor {
        name: "Volatility",
        description: "Lower volatility generally indicates less risk",
        first_wins: |a, b| a.volatility < b.volatility,
    },
    Factor {
        name: "Price Trend",
        description: "Stronger upward price momentum",
        first_wins: |a, b| a.price_change_percent > b.price_change_percent,
    },
    Factor {
        name: "Trading Volume",
        description: "Higher volume indicates better liquidity",
        first_wins: |a, b| a.avg_volume > b.avg_volume,
    },
    Factor {
        name: "Average Daily Return",
        description: "Higher average daily price increase",
        first_wins: |a, b| a.daily_return > b.daily_return,
    },
];

pub const TIE_CONCLUSION: &str = "Both stocks appear equally matched in our analysis. Consider other factors or your investment goals before making a decision.";

/// Score two summaries factor by factor.
pub fn compare(a: &FeatureSummary, b: &FeatureSummary) -> Verdict {
    let mut score1 = 0u32;
    let mut score2 = 0u32;
    let mut factors = Vec::with_capacity(FACTORS.len());

    for factor in &FACTORS {
        let winner = if (factor.first_wins)(a, b) {
            score1 += 1;
            Side::Stock1
        } else {
            score2 += 1;
            Side::Stock2
        };
        factors.push(ComparisonFactor {
            factor: factor.name.to_string(),
            winner,
            description: factor.description.to_string(),
        });
    }

    let total = score1 + score2;
    let (winner, conclusion) = if score1 > score2 {
        (Outcome::Stock1, winning_conclusion("first", score1, total))
    } else if score2 > score1 {
        (Outcome::Stock2, winning_conclusion("second", score2, total))
    } else {
        (Outcome::Tie, TIE_CONCLUSION.to_string())
    };

    Verdict {
        winner,
        score1,
        score2,
        conclusion,
        factors,
    }
}

fn winning_conclusion(ordinal: &str, score: u32, total: u32) -> String {
    format!(
        "Based on our analysis, the {ordinal} stock appears to be a better investment option with a score of {score}/{total}."
    )
}
