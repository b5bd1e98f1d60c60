use thiserror::Error;

/// Which input pool failed the minimum-size check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPool {
    HomeTeam,
    AwayTeam,
    League,
}

impl std::fmt::Display for DataPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DataPool::HomeTeam => "home team",
            DataPool::AwayTeam => "away team",
            DataPool::League => "league",
        };
        f.write_str(s)
    }
}

/// The historical pools are too small for a meaningful estimate.
///
/// Callers should treat this as "show a neutral fallback", not as a crash.
/// The engine refuses to emit a low-quality guess instead of attaching a
/// tiny confidence score to one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("insufficient {pool} data: {available} usable fixtures, need {required}")]
pub struct InsufficientDataError {
    pub pool: DataPool,
    pub available: usize,
    pub required: usize,
}

/// A news modifier was constructed outside its allowed bounds.
///
/// Raised at construction time, before the value can reach the engine.
/// Bounds are hard invariants, not clamps.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("news modifier {field} = {value} outside [{min}, {max}]")]
pub struct InvalidModifierError {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}
