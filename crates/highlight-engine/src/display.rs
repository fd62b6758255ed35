//! Small display helpers shared by both clients

/// Widths below this are laid out as a phone
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("TR", "Türkiye"),
    ("US", "ABD"),
    ("GB", "İngiltere"),
    ("DE", "Almanya"),
    ("FR", "Fransa"),
    ("NL", "Hollanda"),
    ("RU", "Rusya"),
    ("UA", "Ukrayna"),
    ("AZ", "Azerbaycan"),
    ("KZ", "Kazakistan"),
    ("UZ", "Özbekistan"),
    ("TM", "Türkmenistan"),
    ("KG", "Kırgızistan"),
    ("SY", "Suriye"),
    ("IQ", "Irak"),
    ("IR", "İran"),
    ("AF", "Afganistan"),
    ("PK", "Pakistan"),
    ("EG", "Mısır"),
    ("SA", "Suudi Arabistan"),
    ("JO", "Ürdün"),
    ("PS", "Filistin"),
    ("YE", "Yemen"),
    ("SO", "Somali"),
    ("NG", "Nijerya"),
    ("CN", "Çin"),
    ("JP", "Japonya"),
    ("KR", "Güney Kore"),
    ("ID", "Endonezya"),
    ("BA", "Bosna Hersek"),
    ("AL", "Arnavutluk"),
    ("GR", "Yunanistan"),
    ("BG", "Bulgaristan"),
    ("RO", "Romanya"),
];

/// Flag emoji for an ISO 3166-1 alpha-2 code, globe when it is not one.
pub fn country_flag(code: &str) -> String {
    let code = code.trim();
    if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
        return "🌍".to_string();
    }
    code.to_ascii_uppercase()
        .bytes()
        .filter_map(|b| char::from_u32(0x1F1E6 + u32::from(b - b'A')))
        .collect()
}

/// Turkish country name, falling back to the code itself.
pub fn country_name(code: &str) -> String {
    let upper = code.trim().to_ascii_uppercase();
    COUNTRY_NAMES
        .iter()
        .find(|(c, _)| *c == upper)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// `Rapor_<name>_<surname>.pdf`, with inner whitespace runs as `_`
pub fn report_file_name(name: &str, surname: &str) -> String {
    let part = |s: &str| s.split_whitespace().collect::<Vec<_>>().join("_");
    format!("Rapor_{}_{}.pdf", part(name), part(surname))
}

pub fn is_mobile_width(width_px: f64) -> bool {
    width_px < MOBILE_BREAKPOINT_PX
}
