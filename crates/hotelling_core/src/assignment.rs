//! Nearest-product customer assignment.
//!
//! Each customer goes to the product closest to its preference point.
//! Ties go to the product that comes first in the slice: the scan only
//! switches on a strictly smaller distance. Distances are compared
//! squared in [`WideFixed`](crate::math::WideFixed), which holds the square
//! of any on-map coordinate difference exactly, so equal distances really
//! are equal.

use tracing::{debug, warn};

use crate::components::{Customer, Product};

/// Outcome of one assignment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssignmentSummary {
    /// Customers that received a product.
    pub assigned: u32,
    /// Customers left without a product.
    pub unassigned: u32,
    /// The pass ran with no products at all.
    pub degenerate: bool,
}

/// Assign every customer to its nearest product.
///
/// Resets all `assigned_count`s to zero first, then increments exactly one
/// product per customer. With no products every customer is marked
/// unassigned and the summary is flagged degenerate; that is a valid
/// round, not an error.
///
/// Runs in O(products × customers).
pub fn assign_all(products: &mut [Product], customers: &mut [Customer]) -> AssignmentSummary {
    for product in products.iter_mut() {
        product.assigned_count = 0;
    }

    if products.is_empty() {
        for customer in customers.iter_mut() {
            customer.assigned = None;
        }
        warn!(
            customers = customers.len(),
            "no products placed, every customer left unassigned"
        );
        return AssignmentSummary {
            assigned: 0,
            unassigned: customers.len() as u32,
            degenerate: true,
        };
    }

    for customer in customers.iter_mut() {
        let idx = nearest_product(products, customer);
        let product = &mut products[idx];
        product.assigned_count += 1;
        customer.assigned = Some(product.owner);
    }

    debug!(
        products = products.len(),
        customers = customers.len(),
        "customer assignment complete"
    );

    AssignmentSummary {
        assigned: customers.len() as u32,
        unassigned: 0,
        degenerate: false,
    }
}

/// Index of the nearest product; the earliest wins ties.
///
/// `products` must not be empty.
fn nearest_product(products: &[Product], customer: &Customer) -> usize {
    let mut best = 0;
    let mut best_dist = products[0].position.distance_squared(customer.preference);

    for (idx, product) in products.iter().enumerate().skip(1) {
        let dist = product.position.distance_squared(customer.preference);
        if dist < best_dist {
            best = idx;
            best_dist = dist;
        }
    }

    best
}
