use serde::{Deserialize, Serialize};

/// Closed set of DTE types under the FEL regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DteType {
    /// FACT — Factura.
    Fact,
    /// FCAM — Factura cambiaria.
    Fcam,
    /// FPEQ — Factura pequeño contribuyente.
    Fpeq,
    /// FCAP — Factura cambiaria pequeño contribuyente.
    Fcap,
    /// FESP — Factura especial.
    Fesp,
    /// NABN — Nota de abono.
    Nabn,
    /// RDON — Recibo por donación.
    Rdon,
    /// RECI — Recibo.
    Reci,
    /// NDEB — Nota de débito.
    Ndeb,
    /// NCRE — Nota de crédito.
    Ncre,
    /// FACA — Factura contribuyente agropecuario.
    Faca,
    /// FCCA — Factura cambiaria contribuyente agropecuario.
    Fcca,
    /// FAPE — Factura pequeño contribuyente régimen electrónico.
    Fape,
    /// FCPE — Factura cambiaria pequeño contribuyente régimen electrónico.
    Fcpe,
    /// FAAE — Factura contribuyente agropecuario régimen electrónico.
    Faae,
    /// FCAE — Factura cambiaria contribuyente agropecuario régimen electrónico.
    Fcae,
    /// CIVA — Constancia de exención de IVA.
    Civa,
    /// CAIS — Constancia de adquisición de insumos y servicios.
    Cais,
    /// NEV — Nota de envío.
    Nev,
    /// RANT — Recibo por anticipo.
    Rant,
}

impl DteType {
    /// Wire code used in the `Tipo` attribute.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fact => "FACT",
            Self::Fcam => "FCAM",
            Self::Fpeq => "FPEQ",
            Self::Fcap => "FCAP",
            Self::Fesp => "FESP",
            Self::Nabn => "NABN",
            Self::Rdon => "RDON",
            Self::Reci => "RECI",
            Self::Ndeb => "NDEB",
            Self::Ncre => "NCRE",
            Self::Faca => "FACA",
            Self::Fcca => "FCCA",
            Self::Fape => "FAPE",
            Self::Fcpe => "FCPE",
            Self::Faae => "FAAE",
            Self::Fcae => "FCAE",
            Self::Civa => "CIVA",
            Self::Cais => "CAIS",
            Self::Nev => "NEV",
            Self::Rant => "RANT",
        }
    }

    /// Parse from the `Tipo` attribute value.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "FACT" => Some(Self::Fact),
            "FCAM" => Some(Self::Fcam),
            "FPEQ" => Some(Self::Fpeq),
            "FCAP" => Some(Self::Fcap),
            "FESP" => Some(Self::Fesp),
            "NABN" => Some(Self::Nabn),
            "RDON" => Some(Self::Rdon),
            "RECI" => Some(Self::Reci),
            "NDEB" => Some(Self::Ndeb),
            "NCRE" => Some(Self::Ncre),
            "FACA" => Some(Self::Faca),
            "FCCA" => Some(Self::Fcca),
            "FAPE" => Some(Self::Fape),
            "FCPE" => Some(Self::Fcpe),
            "FAAE" => Some(Self::Faae),
            "FCAE" => Some(Self::Fcae),
            "CIVA" => Some(Self::Civa),
            "CAIS" => Some(Self::Cais),
            "NEV" => Some(Self::Nev),
            "RANT" => Some(Self::Rant),
            _ => None,
        }
    }

    /// Spanish description per the SAT catalog.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fact => "Factura",
            Self::Fcam => "Factura cambiaria",
            Self::Fpeq => "Factura pequeño contribuyente",
            Self::Fcap => "Factura cambiaria pequeño contribuyente",
            Self::Fesp => "Factura especial",
            Self::Nabn => "Nota de abono",
            Self::Rdon => "Recibo por donación",
            Self::Reci => "Recibo",
            Self::Ndeb => "Nota de débito",
            Self::Ncre => "Nota de crédito",
            Self::Faca => "Factura contribuyente agropecuario",
            Self::Fcca => "Factura cambiaria contribuyente agropecuario",
            Self::Fape => "Factura pequeño contribuyente régimen electrónico",
            Self::Fcpe => "Factura cambiaria pequeño contribuyente régimen electrónico",
            Self::Faae => "Factura contribuyente agropecuario régimen electrónico",
            Self::Fcae => "Factura cambiaria contribuyente agropecuario régimen electrónico",
            Self::Civa => "Constancia de exención de IVA",
            Self::Cais => "Constancia de adquisición de insumos y servicios",
            Self::Nev => "Nota de envío",
            Self::Rant => "Recibo por anticipo",
        }
    }

    /// Factura-class documents — the types subject to the consumidor-final
    /// cap and the IVA presence rules.
    pub fn is_invoice_class(&self) -> bool {
        matches!(
            self,
            Self::Fact
                | Self::Fcam
                | Self::Fpeq
                | Self::Fcap
                | Self::Fesp
                | Self::Faca
                | Self::Fcca
                | Self::Fape
                | Self::Fcpe
                | Self::Faae
                | Self::Fcae
        )
    }

    /// Agricultural regimes accept goods only.
    pub fn is_agricultural(&self) -> bool {
        matches!(self, Self::Faca | Self::Fcca | Self::Faae | Self::Fcae)
    }

    /// Small-contributor regimes do not charge IVA.
    pub fn is_small_contributor(&self) -> bool {
        matches!(self, Self::Fpeq | Self::Fcap | Self::Fape | Self::Fcpe)
    }

    /// Régimen electrónico variants.
    pub fn is_electronic_regime(&self) -> bool {
        matches!(self, Self::Fape | Self::Fcpe | Self::Faae | Self::Fcae)
    }

    /// Débito/crédito/abono notes.
    pub fn is_note(&self) -> bool {
        matches!(self, Self::Nabn | Self::Ndeb | Self::Ncre)
    }

    /// Exemption constancies, outside the certification-window rule.
    pub fn is_exemption_constancy(&self) -> bool {
        matches!(self, Self::Civa | Self::Cais)
    }

    /// Types that may never carry the export flag.
    pub fn forbids_export(&self) -> bool {
        matches!(
            self,
            Self::Nabn | Self::Rdon | Self::Reci | Self::Fesp | Self::Civa | Self::Cais
        )
    }

    /// Types that may carry the public-show flag.
    pub fn allows_public_show(&self) -> bool {
        matches!(
            self,
            Self::Fact | Self::Fcam | Self::Fpeq | Self::Fcap | Self::Fape | Self::Fcpe
        )
    }

    /// Maximum item count for the type, where the rulebook caps it.
    pub fn max_items(&self) -> Option<usize> {
        match self {
            Self::Civa => Some(2),
            _ => None,
        }
    }
}

/// All DTE types, in catalog order.
pub const ALL_DTE_TYPES: &[DteType] = &[
    DteType::Fact,
    DteType::Fcam,
    DteType::Fpeq,
    DteType::Fcap,
    DteType::Fesp,
    DteType::Nabn,
    DteType::Rdon,
    DteType::Reci,
    DteType::Ndeb,
    DteType::Ncre,
    DteType::Faca,
    DteType::Fcca,
    DteType::Fape,
    DteType::Fcpe,
    DteType::Faae,
    DteType::Fcae,
    DteType::Civa,
    DteType::Cais,
    DteType::Nev,
    DteType::Rant,
];
