/// How a surfaced row was scored
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateScore {
    /// Exact path: distance to the target price and to the requested area.
    /// `None` when the row's value does not parse.
    Exact {
        price_distance: Option<f64>,
        area_distance: Option<f64>,
    },
    /// Neighbor path: position in the k-NN ranking
    Neighbor { rank: usize, distance: f64 },
}

/// A dataset row selected for output, by row index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub index: usize,
    pub score: CandidateScore,
}

impl ScoredCandidate {
    pub fn exact(index: usize, price_distance: Option<f64>, area_distance: Option<f64>) -> Self {
        Self {
            index,
            score: CandidateScore::Exact {
                price_distance,
                area_distance,
            },
        }
    }

    pub fn neighbor(index: usize, rank: usize, distance: f64) -> Self {
        Self {
            index,
            score: CandidateScore::Neighbor { rank, distance },
        }
    }
}
