/// Pattern flags in canonical order, as (attribute name, flag letter).
pub const FLAGS: [(&str, char); 6] = [
    ("global", 'g'),
    ("ignoreCase", 'i'),
    ("multiline", 'm'),
    ("dotAll", 's'),
    ("unicode", 'u'),
    ("sticky", 'y'),
];

/// Index of a flag letter in [`FLAGS`].
pub(crate) fn flag_index(c: char) -> Option<usize> {
    FLAGS.iter().position(|&(_, letter)| letter == c)
}
