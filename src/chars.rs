//! Byte classes in the "C" locale.

pub(crate) fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

pub(crate) fn is_graph(b: u8) -> bool {
    (0x21..=0x7e).contains(&b)
}

pub(crate) fn is_print(b: u8) -> bool {
    (0x20..=0x7e).contains(&b)
}

pub(crate) fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

/// First byte of an identifier: letter, `_`, or `-`.
pub(crate) fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'-'
}

pub(crate) fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_tab_is_space() {
        assert!(is_space(0x0b));
        assert!(!is_space(b'x'));
    }

    #[test]
    fn space_is_printable_but_not_graphic() {
        assert!(is_print(b' '));
        assert!(!is_graph(b' '));
        assert!(!is_print(0x7f));
    }
}
