use std::fmt::Write;

use tp_decode::{DecodeOutcome, GeneratedToken, StopReason};
use tp_sampler::is_greedy;

pub fn header(temperature: f32) -> String {
    if is_greedy(temperature) {
        format!("== temperature {} (greedy)", temperature)
    } else {
        format!("== temperature {}", temperature)
    }
}

/// One table row: the chosen token, then the top candidates with the chosen
/// one starred.
pub fn step_line(token: &GeneratedToken) -> String {
    let mut line = format!(
        "{:>3}  {:<12} p={:.4}  |",
        token.step,
        format!("{:?}", token.text),
        token.probability
    );
    for candidate in &token.top_candidates {
        let marker = if candidate.index == token.token_id { "*" } else { " " };
        let _ = write!(
            line,
            " {}{:?} {:.4}",
            marker, candidate.text, candidate.probability
        );
    }
    line
}

pub fn outcome_line(outcome: &DecodeOutcome) -> String {
    match outcome {
        DecodeOutcome::Completed { generated, reason } => {
            let why = match reason {
                StopReason::EndOfSequence => "end of sequence",
                StopReason::MaxTokens => "max tokens",
            };
            format!("-- completed: {} tokens ({})", generated, why)
        }
        DecodeOutcome::Cancelled { generated } => {
            format!("-- cancelled after {} tokens", generated)
        }
        DecodeOutcome::Failed(error) => format!("-- failed: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tp_decode::DecodeError;
    use tp_sampler::Candidate;

    fn token() -> GeneratedToken {
        GeneratedToken {
            step: 2,
            token_id: 4,
            text: " sat".to_string(),
            probability: 0.25,
            top_candidates: vec![
                Candidate {
                    index: 5,
                    text: " ran".to_string(),
                    probability: 0.75,
                },
                Candidate {
                    index: 4,
                    text: " sat".to_string(),
                    probability: 0.25,
                },
            ],
        }
    }

    #[test]
    fn test_header_marks_greedy() {
        assert_eq!(header(0.0), "== temperature 0 (greedy)");
        assert_eq!(header(0.8), "== temperature 0.8");
    }

    #[test]
    fn test_step_line_stars_chosen_candidate() {
        assert_eq!(
            step_line(&token()),
            "  2  \" sat\"       p=0.2500  |  \" ran\" 0.7500 *\" sat\" 0.2500"
        );
    }

    #[test]
    fn test_outcome_lines() {
        let completed = DecodeOutcome::Completed {
            generated: 8,
            reason: StopReason::EndOfSequence,
        };
        assert_eq!(outcome_line(&completed), "-- completed: 8 tokens (end of sequence)");
        assert_eq!(
            outcome_line(&DecodeOutcome::Cancelled { generated: 1 }),
            "-- cancelled after 1 tokens"
        );
        assert_eq!(
            outcome_line(&DecodeOutcome::Failed(DecodeError::EmptyScores)),
            "-- failed: model returned an empty score vector"
        );
    }
}
