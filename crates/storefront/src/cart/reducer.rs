//! Pure cart state transitions.
//!
//! [`reduce`] is a pure function from the current line sequence and a
//! [`CartAction`] to the next sequence: no I/O, no clock, no randomness.
//! The [`CartStore`](super::CartStore) owns the persistence side effect.

use spice_pantry_core::ProductId;

use super::CartLine;

/// Hard upper bound on a line's quantity when the product's stock is
/// unknown.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// How to change a line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Add `n` to the quantity, clamped to the stock bound.
    Increase(u32),
    /// Subtract `n` from the quantity, flooring at 1. Never removes the
    /// line; removal is a separate caller decision.
    Decrease(u32),
    /// Set the quantity outright, clamped to the stock bound. Setting 0
    /// removes the line rather than keeping it at zero.
    Set(u32),
}

/// An action dispatched against the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add `quantity` of a product. Merges into an existing line with the
    /// same id; otherwise appends a new line at the end.
    Add { line: CartLine, quantity: u32 },
    /// Remove the line with this id. No-op if absent.
    Remove { id: ProductId },
    /// Change the quantity of the line with this id. No-op if absent.
    SetQuantity {
        id: ProductId,
        change: QuantityChange,
    },
    /// Empty the cart.
    Clear,
}

/// Apply one action to the cart, returning the next state.
///
/// Existing lines keep their position; new lines append at the end
/// (insertion order drives checkout-summary and rendering order).
#[must_use]
pub fn reduce(mut lines: Vec<CartLine>, action: CartAction) -> Vec<CartLine> {
    match action {
        CartAction::Add { line, quantity } => {
            if let Some(existing) = lines.iter_mut().find(|l| l.id == line.id) {
                // Fresh stock from the catalog overrides whatever the line
                // was added with.
                if line.stock.is_some() {
                    existing.stock = line.stock;
                }
                existing.quantity = existing
                    .quantity
                    .saturating_add(quantity)
                    .min(quantity_cap(existing.stock));
            } else {
                let mut line = line;
                line.quantity = quantity.max(1).min(quantity_cap(line.stock));
                lines.push(line);
            }
            lines
        }

        CartAction::Remove { id } => {
            lines.retain(|l| l.id != id);
            lines
        }

        CartAction::SetQuantity { id, change } => {
            if matches!(change, QuantityChange::Set(0)) {
                // A line never sits at quantity zero.
                lines.retain(|l| l.id != id);
                return lines;
            }
            if let Some(line) = lines.iter_mut().find(|l| l.id == id) {
                let cap = quantity_cap(line.stock);
                line.quantity = match change {
                    QuantityChange::Increase(n) => line.quantity.saturating_add(n).min(cap),
                    QuantityChange::Decrease(n) => line.quantity.saturating_sub(n).max(1),
                    QuantityChange::Set(n) => n.min(cap),
                };
            }
            lines
        }

        CartAction::Clear => Vec::new(),
    }
}

/// The effective quantity ceiling for a line.
const fn quantity_cap(stock: Option<u32>) -> u32 {
    match stock {
        Some(stock) if stock < MAX_LINE_QUANTITY => stock,
        _ => MAX_LINE_QUANTITY,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use spice_pantry_core::Price;

    use super::*;

    fn line(id: &str, price: i64, quantity: u32, stock: Option<u32>) -> CartLine {
        CartLine {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::rupees(Decimal::from(price)),
            quantity,
            stock,
            image: None,
            weight: None,
            category: None,
        }
    }

    fn quantities(lines: &[CartLine]) -> Vec<(&str, u32)> {
        lines.iter().map(|l| (l.id.as_str(), l.quantity)).collect()
    }

    #[test]
    fn test_add_new_line_appends_at_end() {
        let lines = reduce(
            vec![line("A", 100, 1, None)],
            CartAction::Add {
                line: line("B", 50, 1, None),
                quantity: 3,
            },
        );
        assert_eq!(quantities(&lines), vec![("A", 1), ("B", 3)]);
    }

    #[test]
    fn test_add_same_id_merges_into_one_line() {
        // cart = [{id:"A",price:100,quantity:2,stock:5}]; add the same again
        let lines = reduce(
            vec![line("A", 100, 2, Some(5))],
            CartAction::Add {
                line: line("A", 100, 2, Some(5)),
                quantity: 2,
            },
        );
        assert_eq!(quantities(&lines), vec![("A", 4)]);
    }

    #[test]
    fn test_add_clamps_to_stock() {
        let lines = reduce(
            vec![line("A", 100, 4, Some(5))],
            CartAction::Add {
                line: line("A", 100, 1, Some(5)),
                quantity: 3,
            },
        );
        assert_eq!(quantities(&lines), vec![("A", 5)]);
    }

    #[test]
    fn test_add_incoming_stock_overrides_stale_stock() {
        // Stock dropped from 10 to 3 since the line was added.
        let lines = reduce(
            vec![line("A", 100, 2, Some(10))],
            CartAction::Add {
                line: line("A", 100, 1, Some(3)),
                quantity: 5,
            },
        );
        assert_eq!(quantities(&lines), vec![("A", 3)]);
        assert_eq!(lines[0].stock, Some(3));
    }

    #[test]
    fn test_add_without_stock_clamps_to_max() {
        let lines = reduce(
            vec![line("A", 100, 990, None)],
            CartAction::Add {
                line: line("A", 100, 1, None),
                quantity: 50,
            },
        );
        assert_eq!(quantities(&lines), vec![("A", MAX_LINE_QUANTITY)]);
    }

    #[test]
    fn test_add_zero_quantity_new_line_floors_at_one() {
        let lines = reduce(
            Vec::new(),
            CartAction::Add {
                line: line("A", 100, 0, None),
                quantity: 0,
            },
        );
        assert_eq!(quantities(&lines), vec![("A", 1)]);
    }

    #[test]
    fn test_remove_filters_matching_id() {
        let lines = reduce(
            vec![line("A", 100, 1, None), line("B", 50, 2, None)],
            CartAction::Remove {
                id: ProductId::new("A"),
            },
        );
        assert_eq!(quantities(&lines), vec![("B", 2)]);
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let before = vec![line("A", 100, 1, None)];
        let after = reduce(
            before.clone(),
            CartAction::Remove {
                id: ProductId::new("Z"),
            },
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_increase_clamps_to_stock() {
        let lines = reduce(
            vec![line("A", 100, 4, Some(5))],
            CartAction::SetQuantity {
                id: ProductId::new("A"),
                change: QuantityChange::Increase(3),
            },
        );
        assert_eq!(quantities(&lines), vec![("A", 5)]);
    }

    #[test]
    fn test_decrease_floors_at_one_and_never_removes() {
        let lines = reduce(
            vec![line("A", 100, 1, Some(5))],
            CartAction::SetQuantity {
                id: ProductId::new("A"),
                change: QuantityChange::Decrease(1),
            },
        );
        assert_eq!(quantities(&lines), vec![("A", 1)]);

        let lines = reduce(
            lines,
            CartAction::SetQuantity {
                id: ProductId::new("A"),
                change: QuantityChange::Decrease(10),
            },
        );
        assert_eq!(quantities(&lines), vec![("A", 1)]);
    }

    #[test]
    fn test_decrease_then_remove_drops_the_line() {
        // Decreasing at quantity 1 keeps the line; the caller removes it.
        let lines = reduce(
            vec![line("A", 100, 1, None)],
            CartAction::SetQuantity {
                id: ProductId::new("A"),
                change: QuantityChange::Decrease(1),
            },
        );
        let lines = reduce(
            lines,
            CartAction::Remove {
                id: ProductId::new("A"),
            },
        );
        assert!(lines.is_empty());
    }

    #[test]
    fn test_set_clamps_to_stock() {
        let lines = reduce(
            vec![line("A", 100, 1, Some(5))],
            CartAction::SetQuantity {
                id: ProductId::new("A"),
                change: QuantityChange::Set(12),
            },
        );
        assert_eq!(quantities(&lines), vec![("A", 5)]);
    }

    #[test]
    fn test_set_zero_removes_the_line() {
        let lines = reduce(
            vec![line("A", 100, 3, Some(5)), line("B", 50, 1, None)],
            CartAction::SetQuantity {
                id: ProductId::new("A"),
                change: QuantityChange::Set(0),
            },
        );
        assert_eq!(quantities(&lines), vec![("B", 1)]);
    }

    #[test]
    fn test_set_quantity_absent_id_is_noop() {
        let before = vec![line("A", 100, 2, None)];
        let after = reduce(
            before.clone(),
            CartAction::SetQuantity {
                id: ProductId::new("Z"),
                change: QuantityChange::Increase(1),
            },
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_clear_always_yields_empty() {
        assert!(reduce(Vec::new(), CartAction::Clear).is_empty());
        assert!(
            reduce(
                vec![line("A", 100, 2, None), line("B", 50, 9, Some(10))],
                CartAction::Clear
            )
            .is_empty()
        );
    }

    #[test]
    fn test_invariant_holds_across_action_sequences() {
        let actions = vec![
            CartAction::Add {
                line: line("A", 100, 1, Some(3)),
                quantity: 2,
            },
            CartAction::Add {
                line: line("B", 50, 1, None),
                quantity: 1,
            },
            CartAction::SetQuantity {
                id: ProductId::new("A"),
                change: QuantityChange::Increase(10),
            },
            CartAction::SetQuantity {
                id: ProductId::new("B"),
                change: QuantityChange::Decrease(5),
            },
            CartAction::Add {
                line: line("A", 100, 1, Some(3)),
                quantity: 1,
            },
            CartAction::SetQuantity {
                id: ProductId::new("B"),
                change: QuantityChange::Set(400),
            },
        ];

        let mut lines = Vec::new();
        for action in actions {
            lines = reduce(lines, action);
            for l in &lines {
                assert!(l.quantity >= 1);
                assert!(l.quantity <= l.stock.unwrap_or(MAX_LINE_QUANTITY));
            }
        }
        assert_eq!(quantities(&lines), vec![("A", 3), ("B", 400)]);
    }
}
