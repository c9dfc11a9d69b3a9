//! D'Hondt seat allocation

/// Allocate `seats` seats by the D'Hondt divisor method.
///
/// Every list contributes the quotients `votes[i] / d` for `d = 1..=seats`.
/// The `seats` largest quotients win one seat each. Quotients are generated
/// list-major, divisor-minor and sorted with a stable descending sort, so ties
/// go to the lower list index, then the smaller divisor.
///
/// At least one vote value must be positive.
pub fn dhondt_seats(votes: &[f64], seats: u32) -> Vec<u32> {
    let mut quotients: Vec<(f64, usize)> = Vec::with_capacity(votes.len() * seats as usize);
    for (index, &value) in votes.iter().enumerate() {
        for divisor in 1..=seats {
            quotients.push((value / f64::from(divisor), index));
        }
    }
    quotients.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut allocation = vec![0u32; votes.len()];
    for &(_, index) in quotients.iter().take(seats as usize) {
        allocation[index] += 1;
    }
    allocation
}
