/// Extended cost of a line: `quantity * unit_cost`.
///
/// Every record carrying a derived `total_cost` recomputes it through this
/// function whenever either operand changes.
pub fn line_total(quantity: f64, unit_cost: f64) -> f64 {
    quantity * unit_cost
}
