//! TDK spelling rule identifiers and their display titles
//!
//! The analysis backend only ever reports rule ids from this list (it drops
//! anything else before answering), but stored analyses may predate a rule
//! rename, so lookups fall back to the raw id.

use std::collections::HashSet;

/// Rule id → Turkish title, in rulebook order
pub const TDK_RULES: &[(&str, &str)] = &[
    ("TDK_01_BAGLAC_DE", "Bağlaç Olan 'da/de'"),
    ("TDK_02_BAGLAC_KI", "Bağlaç Olan 'ki'"),
    ("TDK_03_SORU_EKI", "Soru Eki 'mı/mi'"),
    ("TDK_04_SEY_SOZ", "'Şey' Sözcüğü"),
    ("TDK_05_BUYUK_CUMLE", "Cümle Başı Büyük Harf"),
    ("TDK_06_BUYUK_OZEL", "Özel İsimler"),
    ("TDK_07_BUYUK_KURUM", "Kurum Adları"),
    ("TDK_08_TARIH_GUN_AY", "Tarihlerin Yazımı"),
    ("TDK_09_KESME_OZEL", "Kesme İşareti (Özel)"),
    ("TDK_10_KESME_KURUM", "Kurum Ekleri"),
    ("TDK_11_YARDIMCI_FIIL_SES", "Yardımcı Fiiller"),
    ("TDK_12_SAYI_AYRI", "Sayıların Yazımı"),
    ("TDK_13_ULESTIRME", "Üleştirme Sayıları"),
    ("TDK_14_KISALTMA_BUYUK", "Kısaltmalar"),
    ("TDK_15_IKILEMELER", "İkilemeler"),
    ("TDK_16_PEKISTIRME", "Pekiştirmeler"),
    ("TDK_17_YUMUSAK_G", "Yumuşak G Kuralı"),
    ("TDK_18_HER_BIR", "'Her' Kelimesi"),
    ("TDK_19_BELIRSIZLIK_SIFATLARI", "Bitişik Kelimeler"),
    ("TDK_20_NOKTA", "Nokta Kullanımı"),
    ("TDK_21_VIRGUL", "Virgül Kullanımı"),
    ("TDK_22_DARALMA_KURALI", "Gereksiz Daralma"),
    ("TDK_23_YANLIS_YALNIZ", "Yanlış/Yalnız"),
    ("TDK_24_HERKES", "Herkes (s/z)"),
    ("TDK_25_SERTLESME", "Ünsüz Benzeşmesi"),
    ("TDK_26_HANE", "Hane Kelimesi"),
    ("TDK_27_ART_ARDA", "Art Arda"),
    ("TDK_28_YABANCI_KELIMELER", "Yabancı Kelimeler"),
    ("TDK_29_UNVANLAR", "Unvanların Yazımı"),
    ("TDK_30_YONLER", "Yön Adları"),
    ("TDK_31_ZAMAN_UYUMU", "Zaman ve Kip Uyumu"),
];

/// Shown when an error carries neither a rule id nor a type
pub const GENERIC_RULE_TITLE: &str = "Kural";

/// Title for a known rule id
pub fn lookup(rule_id: &str) -> Option<&'static str> {
    TDK_RULES
        .iter()
        .find(|(id, _)| *id == rule_id)
        .map(|(_, title)| *title)
}

/// Display title for an error: the table title, else the raw rule id,
/// else the error type, else [`GENERIC_RULE_TITLE`].
pub fn rule_title(rule_id: &str, error_type: Option<&str>) -> String {
    if let Some(title) = lookup(rule_id) {
        return title.to_string();
    }
    if !rule_id.is_empty() {
        return rule_id.to_string();
    }
    match error_type {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => GENERIC_RULE_TITLE.to_string(),
    }
}

/// Every known rule id, for sanitizing model output
pub fn known_rule_ids() -> HashSet<String> {
    TDK_RULES.iter().map(|(id, _)| id.to_string()).collect()
}
