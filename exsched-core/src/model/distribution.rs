//! Distribution constraints: typed relations over sets of exams.

use super::entities::ExamPlacement;
use super::ExamModel;

/// The relation a distribution constraint enforces between its exams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionType {
    SamePeriod,
    DifferentPeriod,
    SameDay,
    DifferentDay,
    /// Exams must run in list order: each earlier exam strictly before each
    /// later one.
    Precedence,
    SameRoom,
    DifferentRoom,
}

impl DistributionType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "same-period" => Some(Self::SamePeriod),
            "different-period" => Some(Self::DifferentPeriod),
            "same-day" => Some(Self::SameDay),
            "different-day" => Some(Self::DifferentDay),
            "precedence" => Some(Self::Precedence),
            "same-room" => Some(Self::SameRoom),
            "different-room" => Some(Self::DifferentRoom),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SamePeriod => "same-period",
            Self::DifferentPeriod => "different-period",
            Self::SameDay => "same-day",
            Self::DifferentDay => "different-day",
            Self::Precedence => "precedence",
            Self::SameRoom => "same-room",
            Self::DifferentRoom => "different-room",
        }
    }
}

/// A hard-or-soft relation over an ordered list of exams.
#[derive(Debug, Clone)]
pub struct DistributionConstraint {
    pub id: usize,
    pub dtype: DistributionType,
    pub hard: bool,
    /// Penalty weight of each violated pair when the constraint is soft.
    pub weight: f64,
    pub exams: Vec<usize>,
}

impl DistributionConstraint {
    /// Whether the pair `(first, second)` satisfies the relation. `first`
    /// precedes `second` in the constraint's exam list; only `Precedence`
    /// cares about that order.
    pub fn is_satisfied_pair(
        &self,
        model: &ExamModel,
        first: &ExamPlacement,
        second: &ExamPlacement,
    ) -> bool {
        match self.dtype {
            DistributionType::SamePeriod => first.period == second.period,
            DistributionType::DifferentPeriod => first.period != second.period,
            DistributionType::SameDay => {
                model.period(first.period).day_index == model.period(second.period).day_index
            }
            DistributionType::DifferentDay => {
                model.period(first.period).day_index != model.period(second.period).day_index
            }
            DistributionType::Precedence => {
                model.period(first.period).id < model.period(second.period).id
            }
            DistributionType::SameRoom => first.rooms == second.rooms,
            DistributionType::DifferentRoom => {
                first.rooms.iter().all(|r| !second.rooms.contains(r))
            }
        }
    }

    /// Position of an exam inside the constraint's list, if it participates.
    pub fn position(&self, exam: usize) -> Option<usize> {
        self.exams.iter().position(|&e| e == exam)
    }
}
