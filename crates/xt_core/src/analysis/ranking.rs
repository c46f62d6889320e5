//! Ranking of scored passes by threat added.

use serde::Serialize;

use crate::analysis::threat::ScoredPass;

/// Number of passes shown in the "key threatening passes" table.
pub const DEFAULT_TOP_N: usize = 5;

/// One row of the top passes table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPass {
    pub player: Option<String>,
    pub minute: u32,
    pub second: u32,
    pub xt_added: f64,
}

impl From<&ScoredPass> for TopPass {
    fn from(pass: &ScoredPass) -> Self {
        Self {
            player: pass.player.clone(),
            minute: pass.minute,
            second: pass.second,
            xt_added: pass.xt_added,
        }
    }
}

/// Highest `xt_added` first; equal values keep their event order.
pub fn rank_passes(scored: &[ScoredPass], n: usize) -> Vec<TopPass> {
    let mut ranked: Vec<&ScoredPass> = scored.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.xt_added.total_cmp(&a.xt_added));
    ranked.into_iter().take(n).map(TopPass::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::PitchPoint;

    fn scored(order: usize, xt_added: f64) -> ScoredPass {
        ScoredPass {
            order,
            player: Some(format!("P{order}")),
            minute: order as u32,
            second: 0,
            start: PitchPoint::new(0.0, 0.0),
            end: PitchPoint::new(0.0, 0.0),
            xt_start: 0.0,
            xt_end: xt_added,
            xt_added,
        }
    }

    #[test]
    fn test_ranking_is_descending_and_stable() {
        let passes: Vec<ScoredPass> = [0.05, 0.05, 0.10, -0.02, 0.30]
            .iter()
            .enumerate()
            .map(|(i, &v)| scored(i, v))
            .collect();

        let top = rank_passes(&passes, DEFAULT_TOP_N);
        let values: Vec<f64> = top.iter().map(|p| p.xt_added).collect();
        assert_eq!(values, vec![0.30, 0.10, 0.05, 0.05, -0.02]);

        let tied: Vec<&str> = top[2..4].iter().map(|p| p.player.as_deref().unwrap()).collect();
        assert_eq!(tied, vec!["P0", "P1"]);
    }

    #[test]
    fn test_ranking_truncates() {
        let passes: Vec<ScoredPass> = (0..8).map(|i| scored(i, i as f64 * 0.01)).collect();
        let top = rank_passes(&passes, 5);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].minute, 7);

        assert!(rank_passes(&[], 5).is_empty());
        assert_eq!(rank_passes(&passes[..2], 5).len(), 2);
    }
}
