use uuid::Uuid;

use crate::op_case::OperationCase;

/// An ordered, non-empty list of `OperationCase`s treated as a single
/// scheduling unit (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct TestScenario {
    pub id: Uuid,
    pub ops: Vec<OperationCase>,
    pub executed_count: u32,
    pub energy: i32,
}

impl TestScenario {
    /// Construct from a non-empty op list. Panics on an empty list — the
    /// spec's invariant is "ordered non-empty list"; callers (init, and
    /// extension) never have a reason to build an empty one.
    pub fn new(ops: Vec<OperationCase>) -> Self {
        assert!(!ops.is_empty(), "TestScenario must contain at least one OperationCase");
        Self {
            id: Uuid::new_v4(),
            ops,
            executed_count: 0,
            energy: 0,
        }
    }

    /// "Executed successfully" (§3) iff the last op's status is 2xx.
    pub fn succeeded(&self) -> bool {
        matches!(self.ops.last().and_then(|op| op.response_status), Some(status) if (200..300).contains(&status))
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzer_model::ExternalOp;

    fn case(status: Option<u16>) -> OperationCase {
        let mut case = OperationCase::new(ExternalOp::new("/a", "GET"));
        case.response_status = status;
        case
    }

    #[test]
    fn succeeded_checks_only_the_last_op() {
        let scenario = TestScenario::new(vec![case(Some(500)), case(Some(200))]);
        assert!(scenario.succeeded());

        let scenario = TestScenario::new(vec![case(Some(200)), case(Some(500))]);
        assert!(!scenario.succeeded());
    }

    #[test]
    fn succeeded_is_false_when_the_last_op_never_ran() {
        let scenario = TestScenario::new(vec![case(None)]);
        assert!(!scenario.succeeded());
    }
}
