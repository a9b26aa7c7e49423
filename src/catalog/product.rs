//! Subsidized fuel product codes (Decreto 31-2022).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A fuel product covered by the temporary subsidy.
#[derive(Debug, Clone, Copy)]
pub struct SubsidizedProduct {
    /// Product code carried in the Decreto312022 complement.
    pub code: &'static str,
    pub name: &'static str,
    /// Subsidy in GTQ per gallon.
    pub subsidy_per_gallon: Decimal,
}

/// Products covered by Decreto 31-2022, ordered by code.
pub static SUBSIDIZED_PRODUCTS: &[SubsidizedProduct] = &[
    SubsidizedProduct {
        code: "DSL",
        name: "Diesel",
        subsidy_per_gallon: dec!(5.00),
    },
    SubsidizedProduct {
        code: "GLP",
        name: "Gas licuado de petróleo",
        subsidy_per_gallon: dec!(5.00),
    },
    SubsidizedProduct {
        code: "GREG",
        name: "Gasolina regular",
        subsidy_per_gallon: dec!(5.00),
    },
    SubsidizedProduct {
        code: "GSUP",
        name: "Gasolina superior",
        subsidy_per_gallon: dec!(5.00),
    },
];

/// Look up a subsidized product by code.
pub fn subsidized_product(code: &str) -> Option<&'static SubsidizedProduct> {
    SUBSIDIZED_PRODUCTS.iter().find(|p| p.code == code)
}
