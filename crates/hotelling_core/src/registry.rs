//! Storage for the current round's products and customers.
//!
//! Products are kept in placement order. That order is observable: the
//! assignment engine breaks distance ties in favour of the product that
//! comes first, so a replaced product moves to the back.

use rand::Rng;
use tracing::debug;

use crate::components::{Customer, PlayerId, Product};
use crate::error::{EngineError, Result};
use crate::math::{Fixed, MapPoint};

/// Result of placing a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The newly placed product.
    pub product: Product,
    /// The product it replaced, if the owner had already placed one.
    pub replaced: Option<Product>,
}

/// Owns every product and customer of the round in progress.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    products: Vec<Product>,
    customers: Vec<Customer>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a product for `owner`, replacing any product it already has.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownPlayer`] if `owner` is not below
    /// `player_count`. The registry is unchanged on error.
    pub fn place_product(
        &mut self,
        owner: PlayerId,
        position: MapPoint,
        player_count: u32,
    ) -> Result<Placement> {
        if owner.index() >= player_count {
            return Err(EngineError::UnknownPlayer {
                player: owner.index(),
                player_count,
            });
        }

        let existing = self.products.iter().position(|p| p.owner == owner);
        let replaced = existing.map(|idx| self.products.remove(idx));
        if let Some(old) = replaced {
            debug!(%owner, from = %old.position, to = %position, "replacing product");
        }

        let product = Product::new(owner, position);
        self.products.push(product);
        Ok(Placement { product, replaced })
    }

    /// Replace the customer batch with `count` customers whose preferences
    /// are uniform over `[0, width] × [0, height]`.
    ///
    /// Every representable fixed-point coordinate in range is equally
    /// likely, edges included. The outcome depends only on `rng`.
    pub fn generate_customers<R: Rng + ?Sized>(
        &mut self,
        count: u32,
        width: Fixed,
        height: Fixed,
        rng: &mut R,
    ) -> &[Customer] {
        let max_x = width.to_bits().max(0);
        let max_y = height.to_bits().max(0);

        self.customers.clear();
        self.customers.extend((0..count).map(|_| {
            let x = Fixed::from_bits(rng.gen_range(0..=max_x));
            let y = Fixed::from_bits(rng.gen_range(0..=max_y));
            Customer::new(MapPoint::new(x, y))
        }));
        debug!(count, "generated customers");
        &self.customers
    }

    /// Remove every product and customer.
    pub fn clear_round(&mut self) {
        self.products.clear();
        self.customers.clear();
    }

    /// Products in iteration (tie-break) order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Customers of the current batch.
    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// The product owned by `owner`, if placed this round.
    #[must_use]
    pub fn product_for(&self, owner: PlayerId) -> Option<&Product> {
        self.products.iter().find(|p| p.owner == owner)
    }

    /// Number of placed products.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Number of customers in the batch.
    #[must_use]
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    /// Customers that did not receive a product in the last pass.
    #[must_use]
    pub fn unassigned_count(&self) -> usize {
        self.customers.iter().filter(|c| !c.is_assigned()).count()
    }

    /// Whether the registry holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.customers.is_empty()
    }

    /// Borrow products and customers mutably at once for an assignment pass.
    pub fn split_mut(&mut self) -> (&mut [Product], &mut [Customer]) {
        (&mut self.products, &mut self.customers)
    }
}
