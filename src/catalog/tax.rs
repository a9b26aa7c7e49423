use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Closed set of tax kinds a DTE can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxType {
    Iva,
    Petroleo,
    TurismoHospedaje,
    TurismoPasajes,
    TimbrePrensa,
    Bomberos,
    TasaMunicipal,
    BebidasAlcoholicas,
    Tabaco,
    Cemento,
    BebidasNoAlcoholicas,
    TarifaPortuaria,
}

impl TaxType {
    /// `NombreCorto` as it appears on the wire.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Iva => "IVA",
            Self::Petroleo => "PETROLEO",
            Self::TurismoHospedaje => "TURISMO HOSPEDAJE",
            Self::TurismoPasajes => "TURISMO PASAJES",
            Self::TimbrePrensa => "TIMBRE DE PRENSA",
            Self::Bomberos => "BOMBEROS",
            Self::TasaMunicipal => "TASA MUNICIPAL",
            Self::BebidasAlcoholicas => "BEBIDAS ALCOHOLICAS",
            Self::Tabaco => "TABACO",
            Self::Cemento => "CEMENTO",
            Self::BebidasNoAlcoholicas => "BEBIDAS NO ALCOHOLICAS",
            Self::TarifaPortuaria => "TARIFA PORTUARIA",
        }
    }

    /// Parse from `NombreCorto`.
    pub fn from_short_name(name: &str) -> Option<Self> {
        match name.trim() {
            "IVA" => Some(Self::Iva),
            "PETROLEO" => Some(Self::Petroleo),
            "TURISMO HOSPEDAJE" => Some(Self::TurismoHospedaje),
            "TURISMO PASAJES" => Some(Self::TurismoPasajes),
            "TIMBRE DE PRENSA" => Some(Self::TimbrePrensa),
            "BOMBEROS" => Some(Self::Bomberos),
            "TASA MUNICIPAL" => Some(Self::TasaMunicipal),
            "BEBIDAS ALCOHOLICAS" => Some(Self::BebidasAlcoholicas),
            "TABACO" => Some(Self::Tabaco),
            "CEMENTO" => Some(Self::Cemento),
            "BEBIDAS NO ALCOHOLICAS" => Some(Self::BebidasNoAlcoholicas),
            "TARIFA PORTUARIA" => Some(Self::TarifaPortuaria),
            _ => None,
        }
    }
}

/// How a gravable unit taxes its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitRate {
    /// Percentage of the taxable amount.
    Percent(Decimal),
    /// Fixed GTQ amount per gravable unit (e.g. per gallon).
    PerUnit(Decimal),
    /// No tax due (exempt unit).
    Zero,
}

/// A gravable unit within a tax configuration.
#[derive(Debug, Clone, Copy)]
pub struct GravableUnit {
    /// `CodigoUnidadGravable`.
    pub code: u32,
    pub name: &'static str,
    pub rate: UnitRate,
}

/// Static configuration for one tax kind.
#[derive(Debug, Clone, Copy)]
pub struct TaxConfig {
    pub tax: TaxType,
    /// Stable SAT catalog code.
    pub code: u8,
    /// Legal basis the rulebook cites for the tax.
    pub base_legal: &'static str,
    /// Whether the tax amount is part of the document grand total.
    pub adds_to_total: bool,
    pub units: &'static [GravableUnit],
}

/// Catalog of tax configurations, ordered by SAT code.
pub static TAX_CONFIGS: &[TaxConfig] = &[
    TaxConfig {
        tax: TaxType::Iva,
        code: 1,
        base_legal: "Decreto 27-92",
        adds_to_total: true,
        units: &[
            GravableUnit {
                code: 1,
                name: "Gravado",
                rate: UnitRate::Percent(dec!(12)),
            },
            GravableUnit {
                code: 2,
                name: "Exento",
                rate: UnitRate::Zero,
            },
        ],
    },
    TaxConfig {
        tax: TaxType::Petroleo,
        code: 2,
        base_legal: "Decreto 38-92",
        adds_to_total: true,
        units: &[
            GravableUnit {
                code: 1,
                name: "Gasolina superior",
                rate: UnitRate::PerUnit(dec!(4.70)),
            },
            GravableUnit {
                code: 2,
                name: "Gasolina regular",
                rate: UnitRate::PerUnit(dec!(4.60)),
            },
            GravableUnit {
                code: 3,
                name: "Diesel y gas oil",
                rate: UnitRate::PerUnit(dec!(1.30)),
            },
            GravableUnit {
                code: 4,
                name: "Kerosina",
                rate: UnitRate::PerUnit(dec!(0.50)),
            },
            GravableUnit {
                code: 5,
                name: "Avjet",
                rate: UnitRate::PerUnit(dec!(0.50)),
            },
            GravableUnit {
                code: 6,
                name: "Nafta",
                rate: UnitRate::PerUnit(dec!(0.50)),
            },
        ],
    },
    TaxConfig {
        tax: TaxType::TurismoHospedaje,
        code: 3,
        base_legal: "Decreto 1701",
        adds_to_total: true,
        units: &[],
    },
    TaxConfig {
        tax: TaxType::TurismoPasajes,
        code: 4,
        base_legal: "Decreto 1701",
        adds_to_total: true,
        units: &[],
    },
    TaxConfig {
        tax: TaxType::TimbrePrensa,
        code: 5,
        base_legal: "Decreto 34-97",
        adds_to_total: true,
        units: &[],
    },
    TaxConfig {
        tax: TaxType::Bomberos,
        code: 6,
        base_legal: "Decreto 81-87",
        adds_to_total: true,
        units: &[],
    },
    TaxConfig {
        tax: TaxType::TasaMunicipal,
        code: 7,
        base_legal: "Código Municipal",
        adds_to_total: true,
        units: &[],
    },
    TaxConfig {
        tax: TaxType::BebidasAlcoholicas,
        code: 8,
        base_legal: "Decreto 21-04",
        adds_to_total: true,
        units: &[],
    },
    TaxConfig {
        tax: TaxType::Tabaco,
        code: 9,
        base_legal: "Decreto 61-77",
        adds_to_total: true,
        units: &[],
    },
    TaxConfig {
        tax: TaxType::Cemento,
        code: 10,
        base_legal: "Decreto 79-2000",
        adds_to_total: true,
        units: &[],
    },
    TaxConfig {
        tax: TaxType::BebidasNoAlcoholicas,
        code: 11,
        base_legal: "Decreto 09-2002",
        adds_to_total: true,
        units: &[],
    },
    TaxConfig {
        tax: TaxType::TarifaPortuaria,
        code: 12,
        base_legal: "Decreto 100-85",
        adds_to_total: true,
        units: &[],
    },
];

/// IVA standard rate as a fraction.
pub const IVA_RATE: Decimal = dec!(0.12);

/// Configuration for a tax kind.
pub fn tax_config(tax: TaxType) -> &'static TaxConfig {
    // TAX_CONFIGS covers the closed set exhaustively.
    TAX_CONFIGS
        .iter()
        .find(|c| c.tax == tax)
        .unwrap_or(&TAX_CONFIGS[0])
}

/// Gravable unit `code` within a tax kind, if cataloged.
pub fn gravable_unit(tax: TaxType, code: u32) -> Option<&'static GravableUnit> {
    tax_config(tax).units.iter().find(|u| u.code == code)
}
