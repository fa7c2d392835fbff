//! Appointment price derivation

use rust_decimal::Decimal;

/// Flat surcharge applied whenever a dye colour is selected
pub const DYE_SURCHARGE: Decimal = Decimal::TEN;

/// The three optional services an appointment may book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceSelection {
    pub hairstyle_id: Option<i32>,
    pub facial_hair_id: Option<i32>,
    pub dying_id: Option<i32>,
}

impl ServiceSelection {
    pub fn has_any(&self) -> bool {
        self.hairstyle_id.is_some() || self.facial_hair_id.is_some() || self.dying_id.is_some()
    }
}

/// Sum of the resolved catalog prices. A missing catalog row counts as zero;
/// the dye surcharge depends only on a dye being selected.
pub fn final_price(
    hairstyle_price: Option<Decimal>,
    facial_hair_price: Option<Decimal>,
    dye_selected: bool,
) -> Decimal {
    let mut total = hairstyle_price.unwrap_or_default() + facial_hair_price.unwrap_or_default();
    if dye_selected {
        total += DYE_SURCHARGE;
    }
    total
}
