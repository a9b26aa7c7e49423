//! Spanish error taxonomy.
//!
//! Surface codes (`ERR_xxx`) and engine-plane codes map to fixed Spanish
//! messages; rulebook codes (`N.N.N.N`) carry their messages inline at the
//! rule site, with specifics interpolated. Callers correlate by code.

/// Base Spanish message for a surface or engine-plane code.
pub fn message_for(code: &str) -> Option<&'static str> {
    let idx = MESSAGES.binary_search_by(|(c, _)| c.cmp(&code)).ok()?;
    Some(MESSAGES[idx].1)
}

/// Sorted (code, message) pairs. Sorted for binary search.
static MESSAGES: &[(&str, &str)] = &[
    ("CANCELLED", "Validación cancelada por el solicitante"),
    ("ERR_001", "El documento no cumple con el esquema XSD"),
    ("ERR_002", "El documento XML está mal formado"),
    ("ERR_101", "Rango de fechas inválido"),
    ("ERR_102", "NIT inválido"),
    ("ERR_103", "Montos inválidos"),
    ("ERR_104", "Cálculo de impuesto inválido"),
    ("ERR_201", "Credenciales inválidas"),
    ("ERR_202", "Token expirado"),
    ("ERR_301", "Error del API de SAT"),
    ("ERR_302", "Documento rechazado por SAT"),
    ("ERR_401", "Error de persistencia"),
    ("ERR_402", "Error de firma electrónica"),
    (
        "INVALID_ENCODING",
        "El documento contiene bytes que no son UTF-8 válido",
    ),
    (
        "MISSING_ENCODING_DECL",
        "El documento no declara codificación en el prólogo XML",
    ),
    (
        "REGISTRY_UNAVAILABLE",
        "El registro externo (RTU/RENAP) no está disponible",
    ),
    (
        "SCHEMA_LOAD_ERROR",
        "No fue posible obtener el esquema XSD del documento",
    ),
    (
        "SCHEMA_STALE_FALLBACK",
        "Se utilizó una copia vencida del esquema XSD",
    ),
];
