// ==========================================
// Localisation (i18n)
// ==========================================
// rust-i18n, English (default) and Brazilian Portuguese.
// The rust_i18n::i18n! macro is invoked in lib.rs.
// ==========================================

/// Current locale
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Switch locale ("en" or "pt-BR")
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// Translate a key without arguments
///
/// ```no_run
/// use altar_rota::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// Translate a key and substitute `%{name}` placeholders
///
/// ```no_run
/// use altar_rota::i18n::t_with_args;
/// let msg = t_with_args("run.completed", &[("count", "12")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
