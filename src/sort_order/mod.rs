//! Sibling ordering.
//!
//! Moves swap the persisted sort-order values of two neighbouring siblings. Newly created
//! items all carry `"0"`, so a swap between two unset values would change nothing; when either
//! side of a move is unset the whole sibling list is renumbered first.

use crate::models::{sort_order_is_unset, ContentNode};
use crate::repository::{write_sort_order, ContentRepository, RepoResult};

pub const SORT_ORDER_STEP: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Only the literal `"up"` moves up; every other value is treated as `Down`.
    pub fn from_literal(s: &str) -> Self {
        if s == "up" {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Target missing, already at the edge, or swapping with itself.
    Unchanged,
    Swapped {
        with: String,
        /// Whether the siblings were renumbered before the swap.
        repaired: bool,
    },
}

pub struct SortOrderManager<'r, R: ?Sized> {
    repo: &'r mut R,
}

impl<'r, R> SortOrderManager<'r, R>
where
    R: ContentRepository + ?Sized,
{
    pub fn new(repo: &'r mut R) -> Self {
        Self { repo }
    }

    /// Move `target_id` one step within `siblings` (the displayed order).
    pub fn move_child(
        &mut self,
        siblings: &[ContentNode],
        target_id: &str,
        direction: Direction,
    ) -> RepoResult<MoveOutcome> {
        let Some(idx) = siblings.iter().position(|n| n.id == target_id) else {
            log::debug!("move {direction}: {target_id} is not among the listed siblings");
            return Ok(MoveOutcome::Unchanged);
        };

        let partner_idx = match direction {
            Direction::Up => idx.checked_sub(1),
            Direction::Down => Some(idx + 1).filter(|i| *i < siblings.len()),
        };
        let Some(partner_idx) = partner_idx else {
            return Ok(MoveOutcome::Unchanged);
        };

        let target = &siblings[idx];
        let partner = &siblings[partner_idx];
        if partner.id == target.id {
            return Ok(MoveOutcome::Unchanged);
        }

        let mut target_order = target.sort_order.clone();
        let mut partner_order = partner.sort_order.clone();

        let repaired = sort_order_is_unset(&target_order) || sort_order_is_unset(&partner_order);
        if repaired {
            let renumbered = self.renumber(siblings)?;
            target_order = renumbered[idx].clone();
            partner_order = renumbered[partner_idx].clone();
        }

        if let Err(e) = self.swap(&target.id, &target_order, &partner.id, &partner_order) {
            if repaired {
                self.restore(siblings);
            }
            return Err(e);
        }
        log::info!(
            "moved {} {direction}: swapped with {} ({target_order} <-> {partner_order}, repaired={repaired})",
            target.id,
            partner.id
        );

        Ok(MoveOutcome::Swapped {
            with: partner.id.clone(),
            repaired,
        })
    }

    /// Renumber every sibling in display order to 100, 200, 300, ...
    ///
    /// Returns the written values, index-aligned with `siblings`. If a write fails, the
    /// siblings already renumbered get their previous values back (best effort).
    pub fn renumber(&mut self, siblings: &[ContentNode]) -> RepoResult<Vec<String>> {
        let mut written = Vec::with_capacity(siblings.len());
        for (i, sib) in siblings.iter().enumerate() {
            let value = ((i as i64 + 1) * SORT_ORDER_STEP).to_string();
            if let Err(e) = write_sort_order(self.repo, &sib.id, &value) {
                self.restore(&siblings[..i]);
                return Err(e);
            }
            written.push(value);
        }
        log::info!("renumbered {} siblings", siblings.len());
        Ok(written)
    }

    /// Write back the sort orders `siblings` were read with.
    fn restore(&mut self, siblings: &[ContentNode]) {
        for sib in siblings {
            if let Err(e) = write_sort_order(self.repo, &sib.id, &sib.sort_order) {
                log::warn!("could not restore sort order of {}: {e}", sib.id);
            }
        }
    }

    /// Exchange two sort-order values with two scoped writes.
    ///
    /// The pair is not written atomically. If the second write fails the first one is
    /// rolled back to its previous value on a best-effort basis.
    fn swap(
        &mut self,
        target_id: &str,
        target_order: &str,
        partner_id: &str,
        partner_order: &str,
    ) -> RepoResult<()> {
        let tmp = target_order.to_string();
        write_sort_order(self.repo, target_id, partner_order)?;

        if let Err(e) = write_sort_order(self.repo, partner_id, &tmp) {
            if let Err(undo) = write_sort_order(self.repo, target_id, &tmp) {
                log::warn!("could not restore sort order of {target_id}: {undo}");
            }
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::fixtures::*;
    use crate::repository::{MemoryRepository, RepositoryError};

    const A: &str = "{AAAAAAAA-0000-4000-8000-000000000001}";
    const B: &str = "{AAAAAAAA-0000-4000-8000-000000000002}";
    const C: &str = "{AAAAAAAA-0000-4000-8000-000000000003}";
    const D: &str = "{AAAAAAAA-0000-4000-8000-000000000004}";

    fn repo_with(children: &[(&str, &str, &str)]) -> MemoryRepository {
        let mut r = MemoryRepository::new("master");
        templates(&mut r);
        r.insert_item(ROOT_ID, "Home", None, FOLDER_TEMPLATE, "");
        for (id, name, sort) in children {
            r.insert_item(id, name, Some(ROOT_ID), ARTICLE_TEMPLATE, sort);
        }
        r
    }

    fn siblings(r: &MemoryRepository) -> Vec<ContentNode> {
        r.get_children(ROOT_ID, "en").expect("children")
    }

    fn names(r: &MemoryRepository) -> Vec<String> {
        siblings(r).into_iter().map(|n| n.name).collect()
    }

    fn mv(r: &mut MemoryRepository, id: &str, d: Direction) -> MoveOutcome {
        let sibs = siblings(r);
        SortOrderManager::new(r).move_child(&sibs, id, d).expect("move")
    }

    #[test]
    fn test_direction_literal_fallback() {
        assert_eq!(Direction::from_literal("up"), Direction::Up);
        assert_eq!(Direction::from_literal("down"), Direction::Down);
        assert_eq!(Direction::from_literal("UP"), Direction::Down);
        assert_eq!(Direction::from_literal("sideways"), Direction::Down);
    }

    /// Sibling sort orders of length 1 to 5, mixing set and unset values.
    fn sequences() -> Vec<Vec<&'static str>> {
        let set = ["10", "20", "30", "40", "50"];
        let unset = ["0", "", " ", "0", ""];
        let mut out = Vec::new();
        for n in 1..=5 {
            out.push(set[..n].to_vec());
            out.push(unset[..n].to_vec());
            out.push((0..n).map(|k| if k % 2 == 0 { set[k] } else { unset[k] }).collect());
            out.push((0..n).map(|k| if k == 0 { unset[k] } else { set[k] }).collect());
            out.push((0..n).map(|k| if k + 1 == n { unset[k] } else { set[k] }).collect());
        }
        out
    }

    fn id_of(k: usize) -> String {
        format!("{{AAAAAAAA-0000-4000-8000-{:012}}}", k + 1)
    }

    fn repo_for(orders: &[&str]) -> MemoryRepository {
        let ids: Vec<String> = (0..orders.len()).map(id_of).collect();
        let names: Vec<String> = (0..orders.len()).map(|k| format!("N{k}")).collect();
        let rows: Vec<(&str, &str, &str)> = orders
            .iter()
            .enumerate()
            .map(|(k, o)| (ids[k].as_str(), names[k].as_str(), *o))
            .collect();
        repo_with(&rows)
    }

    fn orders_of(r: &MemoryRepository) -> Vec<String> {
        siblings(r).into_iter().map(|n| n.sort_order).collect()
    }

    #[test]
    fn test_first_up_and_last_down_are_noops() {
        for seq in sequences() {
            let mut r = repo_for(&seq);
            let sibs = siblings(&r);
            let before = orders_of(&r);
            let first = sibs[0].id.clone();
            let last = sibs[sibs.len() - 1].id.clone();

            assert_eq!(mv(&mut r, &first, Direction::Up), MoveOutcome::Unchanged, "{seq:?}");
            assert_eq!(mv(&mut r, &last, Direction::Down), MoveOutcome::Unchanged, "{seq:?}");
            assert_eq!(orders_of(&r), before, "{seq:?}");
        }
    }

    #[test]
    fn test_every_move_up_swaps_exactly_the_neighbours() {
        for seq in sequences() {
            for i in 1..seq.len() {
                let mut r = repo_for(&seq);
                let sibs = siblings(&r);
                let mut expected = names(&r);
                expected.swap(i - 1, i);

                let out = mv(&mut r, &sibs[i].id, Direction::Up);
                assert!(matches!(out, MoveOutcome::Swapped { .. }), "{seq:?} at {i}");
                assert_eq!(names(&r), expected, "{seq:?} at {i}");
            }
        }
    }

    #[test]
    fn test_single_child_never_swaps() {
        let mut r = repo_with(&[(A, "A", "0")]);
        assert_eq!(mv(&mut r, A, Direction::Up), MoveOutcome::Unchanged);
        assert_eq!(mv(&mut r, A, Direction::Down), MoveOutcome::Unchanged);
        assert_eq!(r.sort_order_of(A), Some("0"));
    }

    #[test]
    fn test_unknown_target_is_noop() {
        let mut r = repo_with(&[(A, "A", "100"), (B, "B", "200")]);
        assert_eq!(mv(&mut r, D, Direction::Up), MoveOutcome::Unchanged);
    }

    #[test]
    fn test_two_items_second_up_swaps_with_head() {
        let mut r = repo_with(&[(A, "A", "100"), (B, "B", "200")]);
        let out = mv(&mut r, B, Direction::Up);
        assert_eq!(
            out,
            MoveOutcome::Swapped {
                with: A.to_string(),
                repaired: false
            }
        );
        assert_eq!(names(&r), vec!["B", "A"]);
    }

    #[test]
    fn test_repair_then_swap_scenario() {
        let mut r = repo_with(&[(A, "A", "100"), (B, "B", "0"), (C, "C", "0")]);
        assert_eq!(names(&r), vec!["A", "B", "C"]);

        let out = mv(&mut r, C, Direction::Up);
        assert_eq!(
            out,
            MoveOutcome::Swapped {
                with: B.to_string(),
                repaired: true
            }
        );
        assert_eq!(r.sort_order_of(A), Some("100"));
        assert_eq!(r.sort_order_of(B), Some("300"));
        assert_eq!(r.sort_order_of(C), Some("200"));
        assert_eq!(names(&r), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_repair_yields_distinct_increasing_orders() {
        for seq in sequences() {
            for i in 0..seq.len() {
                for d in [Direction::Up, Direction::Down] {
                    let mut r = repo_for(&seq);
                    let target = siblings(&r)[i].id.clone();
                    let MoveOutcome::Swapped { repaired: true, .. } = mv(&mut r, &target, d) else {
                        continue;
                    };

                    let orders: Vec<i64> = orders_of(&r)
                        .iter()
                        .map(|o| o.parse::<i64>().expect("numeric"))
                        .collect();
                    assert!(orders.windows(2).all(|w| w[0] < w[1]), "{seq:?} {d} at {i}");
                }
            }
        }
    }

    #[test]
    fn test_repair_places_unset_child_after_its_set_neighbour() {
        let mut r = repo_with(&[
            (A, "A", "5"),
            (B, "B", "7"),
            (C, "C", ""),
            (D, "D", "0"),
        ]);
        mv(&mut r, B, Direction::Down);
        assert_eq!(names(&r), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_failed_repair_leaves_sort_orders_untouched() {
        let mut r = repo_with(&[(A, "A", "100"), (B, "B", "0"), (C, "C", "0")]);
        r.deny_writes(C);

        let sibs = siblings(&r);
        let err = SortOrderManager::new(&mut r)
            .move_child(&sibs, B, Direction::Up)
            .expect_err("denied");
        assert!(matches!(err, RepositoryError::AccessDenied(_)));
        assert_eq!(r.sort_order_of(A), Some("100"));
        assert_eq!(r.sort_order_of(B), Some("0"));
        assert_eq!(r.sort_order_of(C), Some("0"));
        assert!(!r.is_editing(A) && !r.is_editing(B) && !r.is_editing(C));
    }

    #[test]
    fn test_up_then_down_restores_order_without_repair() {
        let mut r = repo_with(&[(A, "A", "100"), (B, "B", "200"), (C, "C", "300")]);
        let before = names(&r);

        mv(&mut r, C, Direction::Up);
        assert_eq!(names(&r), vec!["A", "C", "B"]);
        let out = mv(&mut r, C, Direction::Down);
        assert_eq!(
            out,
            MoveOutcome::Swapped {
                with: B.to_string(),
                repaired: false
            }
        );
        assert_eq!(names(&r), before);
    }

    #[test]
    fn test_denied_partner_rolls_back_first_write() {
        let mut r = repo_with(&[(A, "A", "100"), (B, "B", "200")]);
        r.deny_writes(A);

        let sibs = siblings(&r);
        let err = SortOrderManager::new(&mut r)
            .move_child(&sibs, B, Direction::Up)
            .expect_err("denied");
        assert!(matches!(err, RepositoryError::AccessDenied(_)));
        assert_eq!(r.sort_order_of(A), Some("100"));
        assert_eq!(r.sort_order_of(B), Some("200"));
    }
}
