pub mod attachment;
pub mod mime;

pub use attachment::{MAX_ATTACHMENT_SIZE, load_attachment};

/// Splits a single-address-or-comma-joined-list field into header-ready
/// entries. No shape validation beyond trimming; the transport rejects
/// malformed addresses on submission.
pub fn split_addresses(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_comma_joined_addresses() {
        assert_eq!(
            split_addresses("a@x.io, b@y.io ,c@z.io"),
            ["a@x.io", "b@y.io", "c@z.io"]
        );
    }

    #[test]
    fn single_address_passes_through() {
        assert_eq!(split_addresses("dev@example.com"), ["dev@example.com"]);
    }

    #[test]
    fn empty_segments_are_dropped() {
        assert_eq!(split_addresses("a@x.io,, ,"), ["a@x.io"]);
    }
}
