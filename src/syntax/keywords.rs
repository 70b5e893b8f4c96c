//! C3 keywords and built-in type names.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

/// Built-in type names. These never need cross-module resolution.
pub const BUILTIN_TYPES: &[&str] = &[
    "void", "bool", "char", "double", "float", "float16", "float128", "bfloat", "int128", "ichar",
    "int", "iptr", "isz", "long", "short", "uint128", "uint", "ulong", "uptr", "ushort", "usz",
    "any", "anyfault", "fault", "typeid",
];

/// Reserved words, including the built-in types and compile-time keywords.
pub const KEYWORDS: &[&str] = &[
    "assert", "asm", "bitstruct", "break", "case", "catch", "const", "continue", "alias", "cenum",
    "faultdef", "interface", "lengthof", "default", "defer", "def", "distinct", "typedef", "do",
    "else", "enum", "extern", "false", "for", "foreach", "foreach_r", "fn", "tlocal", "if",
    "inline", "import", "macro", "module", "nextcase", "null", "return", "static", "struct",
    "switch", "true", "try", "union", "var", "while", "attrdef",
    "$alignof", "$assert", "$case", "$default", "$assignable", "$defined", "$echo", "$embed",
    "$exec", "$else", "$endfor", "$endforeach", "$endif", "$endswitch", "$eval", "$evaltype",
    "$error", "$feature", "$extnameof", "$for", "$foreach", "$if", "$is_const", "$kindof",
    "$include", "$nameof", "$offsetof", "$qnameof", "$sizeof", "$stringify", "$switch",
    "$typefrom", "$typeof", "$vacount", "$vatype", "$vaconst", "$vaarg", "$vaexpr", "$vasplat",
];

static BUILTIN_SET: Lazy<FxHashSet<&'static str>> = Lazy::new(|| BUILTIN_TYPES.iter().copied().collect());

static KEYWORD_SET: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| KEYWORDS.iter().chain(BUILTIN_TYPES).copied().collect());

pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_SET.contains(name)
}

/// Whether `name` is reserved; searches for keywords always come back empty.
pub fn is_keyword(name: &str) -> bool {
    KEYWORD_SET.contains(name)
}

/// `Point`, `IOError`, `_Private`: a capital letter followed somewhere by a
/// lowercase one.
pub fn is_type_ident(name: &str) -> bool {
    let trimmed = name.trim_start_matches('_');
    trimmed.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && trimmed.chars().any(|c| c.is_ascii_lowercase())
}

/// `MAX_SIZE`, `RED`: no lowercase letters at all.
pub fn is_const_ident(name: &str) -> bool {
    let trimmed = name.trim_start_matches('_');
    trimmed.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && !trimmed.chars().any(|c| c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("int", true)]
    #[case("fn", true)]
    #[case("$typeof", true)]
    #[case("Point", false)]
    #[case("value", false)]
    fn test_is_keyword(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_keyword(name), expected);
    }

    #[rstest]
    #[case("Point", true)]
    #[case("IOError", true)]
    #[case("_Hidden", true)]
    #[case("RED", false)]
    #[case("point", false)]
    fn test_is_type_ident(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_type_ident(name), expected);
    }

    #[test]
    fn test_const_ident() {
        assert!(is_const_ident("MAX_LEN"));
        assert!(!is_const_ident("Max"));
    }
}
