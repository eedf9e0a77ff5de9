use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// One line of an in-progress order: a quantity and the item name exactly as
/// the customer said it. Duplicate names with different quantities are kept
/// as separate lines.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }

    /// Zips the slot-filled quantity and item lists from a webhook event into
    /// order lines.
    ///
    /// Dialogflow delivers quantities as floats; a quantity must be a whole
    /// number of at least 1 and both lists must have the same length.
    pub fn from_params(quantities: &[f64], names: &[String]) -> Result<Vec<Self>, OrderError> {
        if quantities.len() != names.len() {
            return Err(OrderError::MisalignedItems {
                quantities: quantities.len(),
                items: names.len(),
            });
        }

        quantities
            .iter()
            .zip(names)
            .map(|(&quantity, name)| {
                if quantity.fract() != 0.0 || quantity < 1.0 || quantity > i32::MAX as f64 {
                    return Err(OrderError::InvalidQuantity {
                        quantity,
                        name: name.clone(),
                    });
                }
                Ok(Self::new(name.clone(), quantity as u32))
            })
            .collect()
    }
}

impl fmt::Display for OrderLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.name)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
