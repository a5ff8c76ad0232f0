//! Beam-search decoding over per-step log-probabilities
//!
//! The search is model agnostic: the caller supplies a closure that maps a
//! decoder prefix to log-probabilities over the target vocabulary. Ties are
//! broken by beam index then token id, so a fixed model and a fixed
//! [`GenerationConfig`] always yield the same sequence.

use std::cmp::Ordering;
use tracing::debug;

use crate::core::models::GenerationConfig;

/// Token ids with special meaning to the decoder
#[derive(Debug, Clone)]
pub struct SpecialTokens {
    pub decoder_start: u32,
    pub eos: u32,
    /// Never emitted, e.g. the pad token
    pub banned: Vec<u32>,
}

#[derive(Debug, Clone)]
struct Hypothesis {
    tokens: Vec<u32>,
    score: f32,
}

impl Hypothesis {
    /// Sum of log-probs divided by generated length ^ `length_penalty`
    fn normalized(&self, length_penalty: f32) -> f32 {
        let generated = self.tokens.len().saturating_sub(1).max(1) as f32;
        self.score / generated.powf(length_penalty)
    }
}

/// Run beam search and return the best sequence without the start token or EOS
pub fn beam_search<F>(
    config: &GenerationConfig,
    special: &SpecialTokens,
    mut step: F,
) -> anyhow::Result<Vec<u32>>
where
    F: FnMut(&[u32]) -> anyhow::Result<Vec<f32>>,
{
    let num_beams = config.num_beams.max(1);
    let penalty = config.length_penalty;

    let mut live = vec![Hypothesis {
        tokens: vec![special.decoder_start],
        score: 0.0,
    }];
    let mut finished: Vec<Hypothesis> = Vec::new();
    let mut done = false;

    while !live.is_empty() && live[0].tokens.len() < config.max_length {
        let mut candidates: Vec<(usize, u32, f32)> = Vec::with_capacity(live.len() * 2 * num_beams);
        for (beam, hyp) in live.iter().enumerate() {
            let mut log_probs = step(&hyp.tokens)?;
            for &token in &special.banned {
                if let Some(lp) = log_probs.get_mut(token as usize) {
                    *lp = f32::NEG_INFINITY;
                }
            }
            for (token, lp) in top_k(&log_probs, 2 * num_beams) {
                candidates.push((beam, token, hyp.score + lp));
            }
        }
        candidates.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));

        let mut next = Vec::with_capacity(num_beams);
        for (rank, (beam, token, score)) in candidates.into_iter().enumerate() {
            if score == f32::NEG_INFINITY {
                break;
            }
            let mut tokens = live[beam].tokens.clone();
            tokens.push(token);

            if token == special.eos {
                // only EOS candidates that would have made the beam count
                if rank < num_beams {
                    finished.push(Hypothesis { tokens, score });
                }
            } else {
                next.push(Hypothesis { tokens, score });
            }

            if next.len() == num_beams {
                break;
            }
        }

        finished.sort_by(|a, b| by_normalized(b, a, penalty));
        finished.truncate(num_beams);
        live = next;

        if finished.len() >= num_beams {
            done = config.early_stopping || !can_improve(&finished, &live, penalty);
            if done {
                debug!("Beam search finished early at length {}", live.first().map_or(0, |h| h.tokens.len()));
                break;
            }
        }
    }

    if !done {
        finished.extend(live);
    }

    let best = finished
        .iter()
        .fold(None::<&Hypothesis>, |best, hyp| match best {
            Some(b) if by_normalized(hyp, b, penalty) != Ordering::Greater => Some(b),
            _ => Some(hyp),
        })
        .ok_or_else(|| anyhow::anyhow!("beam search produced no hypothesis"))?;

    let mut tokens: Vec<u32> = best.tokens[1..].to_vec();
    if tokens.last() == Some(&special.eos) {
        tokens.pop();
    }
    Ok(tokens)
}

fn by_normalized(a: &Hypothesis, b: &Hypothesis, penalty: f32) -> Ordering {
    a.normalized(penalty).total_cmp(&b.normalized(penalty))
}

/// Whether the best live beam could still beat the worst finished one
fn can_improve(finished: &[Hypothesis], live: &[Hypothesis], penalty: f32) -> bool {
    let Some(worst) = finished.last() else {
        return true;
    };
    live.iter()
        .map(|h| h.normalized(penalty))
        .fold(f32::NEG_INFINITY, f32::max)
        > worst.normalized(penalty)
}

/// Highest `k` entries, best first; NaN counts as impossible
fn top_k(log_probs: &[f32], k: usize) -> Vec<(u32, f32)> {
    let mut indexed: Vec<(u32, f32)> = log_probs
        .iter()
        .enumerate()
        .map(|(i, &lp)| (i as u32, if lp.is_nan() { f32::NEG_INFINITY } else { lp }))
        .collect();

    let order = |a: &(u32, f32), b: &(u32, f32)| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0));
    if k < indexed.len() {
        indexed.select_nth_unstable_by(k, order);
        indexed.truncate(k);
    }
    indexed.sort_by(order);
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: u32 = 0;
    const EOS: u32 = 1;
    const A: u32 = 2;
    const B: u32 = 3;

    fn special() -> SpecialTokens {
        SpecialTokens {
            decoder_start: START,
            eos: EOS,
            banned: vec![START],
        }
    }

    fn dist(probs: &[(u32, f32)]) -> Vec<f32> {
        let mut out = vec![1e-6_f32.ln(); 4];
        for &(token, p) in probs {
            out[token as usize] = p.ln();
        }
        out
    }

    /// Greedy picks A then A; the B branch is better overall
    fn garden_path(prefix: &[u32]) -> anyhow::Result<Vec<f32>> {
        Ok(match prefix {
            [START] => dist(&[(A, 0.6), (B, 0.4)]),
            [START, A] => dist(&[(EOS, 0.2), (A, 0.4), (B, 0.4)]),
            [START, B] => dist(&[(EOS, 0.9), (A, 0.05), (B, 0.05)]),
            _ => dist(&[(EOS, 1.0)]),
        })
    }

    fn config(num_beams: usize) -> GenerationConfig {
        GenerationConfig {
            max_length: 10,
            num_beams,
            early_stopping: true,
            length_penalty: 0.0,
        }
    }

    #[test]
    fn test_greedy_follows_local_best() {
        let tokens = beam_search(&config(1), &special(), garden_path).unwrap();
        assert_eq!(tokens, vec![A, A]);
    }

    #[test]
    fn test_beam_finds_better_sequence() {
        let tokens = beam_search(&config(2), &special(), garden_path).unwrap();
        assert_eq!(tokens, vec![B]);
    }

    #[test]
    fn test_without_early_stopping_same_winner() {
        let cfg = GenerationConfig {
            early_stopping: false,
            ..config(2)
        };
        let tokens = beam_search(&cfg, &special(), garden_path).unwrap();
        assert_eq!(tokens, vec![B]);
    }

    #[test]
    fn test_repeated_runs_are_deterministic() {
        let cfg = config(3);
        let first = beam_search(&cfg, &special(), garden_path).unwrap();
        for _ in 0..5 {
            assert_eq!(beam_search(&cfg, &special(), garden_path).unwrap(), first);
        }
    }

    #[test]
    fn test_max_length_bounds_output() {
        // never emits EOS
        let step = |_: &[u32]| -> anyhow::Result<Vec<f32>> { Ok(dist(&[(A, 0.9), (B, 0.1)])) };
        let cfg = GenerationConfig {
            max_length: 5,
            ..config(2)
        };
        let tokens = beam_search(&cfg, &special(), step).unwrap();
        assert_eq!(tokens.len(), 4);
        assert!(tokens.iter().all(|&t| t == A));
    }

    #[test]
    fn test_banned_token_never_emitted() {
        // START (pad) is the most likely token at every step
        let step = |prefix: &[u32]| -> anyhow::Result<Vec<f32>> {
            Ok(if prefix.len() < 3 {
                dist(&[(START, 0.7), (B, 0.3)])
            } else {
                dist(&[(START, 0.7), (EOS, 0.3)])
            })
        };
        let tokens = beam_search(&config(1), &special(), step).unwrap();
        assert_eq!(tokens, vec![B, B]);
    }

    #[test]
    fn test_step_error_propagates() {
        let step = |_: &[u32]| -> anyhow::Result<Vec<f32>> { anyhow::bail!("device lost") };
        let err = beam_search(&config(2), &special(), step).unwrap_err();
        assert_eq!(err.to_string(), "device lost");
    }

    #[test]
    fn test_top_k_orders_and_breaks_ties() {
        let top = top_k(&[0.1, f32::NAN, 0.5, 0.5, -1.0], 3);
        assert_eq!(top, vec![(2, 0.5), (3, 0.5), (0, 0.1)]);
    }

    #[test]
    fn test_length_penalty_prefers_longer() {
        let short = Hypothesis {
            tokens: vec![START, A, EOS],
            score: -2.0,
        };
        let long = Hypothesis {
            tokens: vec![START, A, A, A, EOS],
            score: -3.0,
        };
        assert_eq!(by_normalized(&long, &short, 1.0), Ordering::Greater);
        assert_eq!(by_normalized(&long, &short, 0.0), Ordering::Less);
    }
}
