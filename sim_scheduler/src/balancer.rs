//! SMP placement: binds each arriving process to the least-loaded core.

use crate::cpu_core::CpuCore;
use sched_types::CoreId;

/// Picks the core with the smallest load
///
/// Load is ready-queue length plus one for an occupied core. Ties go to the
/// lowest core index. Returns `None` only when there are no cores.
pub fn least_loaded(cores: &[CpuCore]) -> Option<CoreId> {
    cores
        .iter()
        .min_by_key(|core| (core.load(), core.id))
        .map(|core| core.id)
}

/// Current load of every core, in index order
pub fn loads(cores: &[CpuCore]) -> Vec<usize> {
    cores.iter().map(CpuCore::load).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_types::ProcessId;

    fn cores(count: usize) -> Vec<CpuCore> {
        (0..count).map(|i| CpuCore::new(CoreId(i))).collect()
    }

    #[test]
    fn test_no_cores() {
        assert_eq!(least_loaded(&[]), None);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        assert_eq!(least_loaded(&cores(4)), Some(CoreId(0)));
    }

    #[test]
    fn test_occupant_counts_as_load() {
        let mut cores = cores(2);
        cores[0].current = Some(ProcessId::new(1));
        assert_eq!(least_loaded(&cores), Some(CoreId(1)));
    }

    #[test]
    fn test_spreads_arrivals_evenly() {
        let mut cores = cores(3);
        for n in 1..=7 {
            let target = least_loaded(&cores).unwrap();
            cores[target.index()].enqueue(ProcessId::new(n));
        }
        assert_eq!(loads(&cores), vec![3, 2, 2]);
    }
}
