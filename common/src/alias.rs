//! 略号変換モジュール
//!
//! QRタグに印字される略号（サンプル種別コード・取引先コード）と
//! 正式名称との対応を扱う。

/// サンプル種別コード表
///
/// タグの先頭フィールドに入る2文字コード。
pub const SAMPLE_TYPE_CODES: &[(&str, &str)] = &[
    ("HG", "Hanger"),
    ("PB", "Paper Booklet"),
    ("EB", "Export Booklet"),
    ("SC", "Swatch Card"),
];

/// 取引先コードの長さ
pub const MERCHANT_CODE_LEN: usize = 6;

/// 種別コードを正式名称に展開
///
/// 表にないコードはそのまま返す。
///
/// # Examples
/// ```
/// use sample_scan_common::expand_sample_type;
///
/// assert_eq!(expand_sample_type("PB"), "Paper Booklet");
/// assert_eq!(expand_sample_type("ZZ"), "ZZ");
/// ```
pub fn expand_sample_type(code: &str) -> String {
    SAMPLE_TYPE_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// 取引先名から取引先コードを生成
///
/// 空白をすべて除去し、先頭6文字を大文字化する。
/// 先頭6文字が同じ別の取引先は同じコードになる。
///
/// # Examples
/// ```
/// use sample_scan_common::merchant_code;
///
/// assert_eq!(merchant_code("Acme Corp"), "ACMECO");
/// ```
pub fn merchant_code(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .take(MERCHANT_CODE_LEN)
        .collect::<String>()
        .to_uppercase()
}

/// 取引先名が指定コードに縮約されるか
pub fn merchant_matches_code(name: &str, code: &str) -> bool {
    merchant_code(name) == code.to_uppercase()
}
