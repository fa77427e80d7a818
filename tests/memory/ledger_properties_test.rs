/*!
 * Ledger Property Tests
 */

use crate::common::ScriptedAllocator;
use pressure_sim::{DeallocationError, Ledger};
use proptest::prelude::*;
use std::sync::Arc;

fn ledger() -> Ledger {
    Ledger::with_allocator(800, Arc::new(ScriptedAllocator::default()))
}

proptest! {
    #[test]
    fn prop_allocations_only_grow(sizes in prop::collection::vec(1u64..=800, 0..64)) {
        let mut ledger = ledger();
        let mut previous_total = 0;

        for (i, size) in sizes.iter().enumerate() {
            prop_assert_eq!(ledger.allocate(*size).unwrap(), i + 1);
            prop_assert!(ledger.total_mb() >= previous_total);
            previous_total = ledger.total_mb();
        }

        prop_assert_eq!(ledger.block_count(), sizes.len());
        prop_assert_eq!(ledger.total_mb(), sizes.iter().sum::<u64>());
    }

    #[test]
    fn prop_deallocation_pops_suffix(
        sizes in prop::collection::vec(1u64..=50, 1..32),
        request in 1u64..400,
    ) {
        let mut ledger = ledger();
        for size in &sizes {
            ledger.allocate(*size).unwrap();
        }

        // expected survivors: drop from the back until the credited MB reach the request
        let mut kept = sizes.clone();
        let mut outstanding = request;
        while outstanding > 0 {
            match kept.pop() {
                Some(size) => outstanding = outstanding.saturating_sub(size.max(1)),
                None => break,
            }
        }

        prop_assert_eq!(ledger.deallocate(request).unwrap(), kept.len());
        prop_assert_eq!(ledger.block_sizes(), kept.clone());
        prop_assert_eq!(ledger.total_mb(), kept.iter().sum::<u64>());
    }

    #[test]
    fn prop_never_underflows(requests in prop::collection::vec(1u64..100, 1..16)) {
        let mut ledger = ledger();
        ledger.allocate(10).unwrap();

        for request in requests {
            match ledger.deallocate(request) {
                Ok(_) => {}
                Err(e) => prop_assert_eq!(e, DeallocationError::NothingAllocated),
            }
            prop_assert!(ledger.block_count() <= 1);
        }
        prop_assert_eq!(ledger.total_mb(), 0);
    }
}
